//! Vendor command adapter
//!
//! Translates one vendor request into calls on an [`InterfaceController`]
//! and encodes the result as the IN data stage.

use crate::proxy::ControlError;
use common::{ControllerResult, InterfaceController};
use protocol::{INT_SIZE, InjectionMode, MAC_ADDRESS_LEN, MacAddress, VendorRequest, encode_i32};
use tracing::{debug, error, info, warn};

/// Run `request` against `controller`
///
/// Returns the unclamped response bytes. OUT requests that carry no result
/// return an empty vector.
pub fn handle(
    controller: &mut dyn InterfaceController,
    request: VendorRequest,
    data: &[u8],
) -> Result<Vec<u8>, ControlError> {
    debug!("Vendor request {} ({} data bytes)", request, data.len());

    match request {
        VendorRequest::OpenInject => open(controller, InjectionMode::Inject),
        VendorRequest::OpenMonitor => open(controller, InjectionMode::Monitor),
        VendorRequest::OpenInjectMonitor => open(controller, InjectionMode::InjectMonitor),
        VendorRequest::SetTimeout => {
            let timeout = int_argument(request, data)?;
            controller.set_timeout(timeout);
            Ok(Vec::new())
        }
        VendorRequest::GetTimeout => Ok(encode_i32(controller.timeout()).to_vec()),
        VendorRequest::GetCaptureInterface => Ok(controller.capture_interface().into_bytes()),
        VendorRequest::GetDriverName => Ok(controller.driver_name().into_bytes()),
        VendorRequest::Close => {
            controller.close();
            Ok(Vec::new())
        }
        VendorRequest::GetDatalink => Ok(encode_i32(controller.datalink()).to_vec()),
        VendorRequest::SetDatalink => {
            let datalink = int_argument(request, data)?;
            Ok(status_reply(request, controller.set_datalink(datalink)))
        }
        VendorRequest::GetChannel => Ok(encode_i32(controller.channel()).to_vec()),
        VendorRequest::SetChannel => {
            let channel = int_argument(request, data)?;
            Ok(status_reply(request, controller.set_channel(channel)))
        }
        VendorRequest::GetHardwareMac => {
            let mac = controller
                .hardware_mac()
                .inspect_err(|e| error!("802.11: {} failed: {}", request, e))?;
            Ok(mac.as_bytes().to_vec())
        }
        VendorRequest::SetHardwareMac => {
            if data.len() != MAC_ADDRESS_LEN {
                return Err(malformed(
                    request,
                    format!("expected {} address bytes, got {}", MAC_ADDRESS_LEN, data.len()),
                ));
            }
            let mac = mac_argument(request, data)?;
            Ok(status_reply(request, controller.set_hardware_mac(mac)))
        }
        VendorRequest::AddWepKey => {
            if data.len() < MAC_ADDRESS_LEN {
                return Err(malformed(
                    request,
                    format!("need a {}-byte BSSID, got {} bytes", MAC_ADDRESS_LEN, data.len()),
                ));
            }
            let (bssid, key) = data.split_at(MAC_ADDRESS_LEN);
            let bssid = mac_argument(request, bssid)?;
            Ok(status_reply(request, controller.add_wep_key(bssid, key)))
        }
    }
}

fn open(
    controller: &mut dyn InterfaceController,
    mode: InjectionMode,
) -> Result<Vec<u8>, ControlError> {
    match controller.open(mode) {
        Ok(rc) => {
            info!(
                "802.11: {} VAP: {}",
                mode,
                controller.vap_name().unwrap_or_default()
            );
            Ok(encode_i32(rc).to_vec())
        }
        Err(e) => {
            error!("802.11: Could not create {} interface: {}", mode, e);
            Err(e.into())
        }
    }
}

fn malformed(request: VendorRequest, reason: String) -> ControlError {
    ControlError::MalformedData { request, reason }
}

fn int_argument(request: VendorRequest, data: &[u8]) -> Result<i32, ControlError> {
    protocol::decode_i32(data).map_err(|_| {
        malformed(
            request,
            format!("expected {} bytes, got {}", INT_SIZE, data.len()),
        )
    })
}

fn mac_argument(request: VendorRequest, data: &[u8]) -> Result<MacAddress, ControlError> {
    MacAddress::try_from(data).map_err(|e| malformed(request, e.to_string()))
}

/// Encode a setter result, writing the negative library code on failure
fn status_reply(request: VendorRequest, result: ControllerResult<i32>) -> Vec<u8> {
    let rc = match result {
        Ok(rc) => rc,
        Err(e) => {
            warn!("802.11: {} failed: {}", request, e);
            e.code()
        }
    };
    encode_i32(rc).to_vec()
}
