//! 802.11 control device proxy
//!
//! Answers enumeration from a fixed [`DescriptorTable`] and forwards vendor
//! requests to the wireless interface controller attached at connect time.

use crate::config::{INTERFACE_KEY, ProxyConfig};
use crate::descriptors::DescriptorTable;
use crate::proxy::{ControlError, DeviceProxy};
use crate::vendor;
use common::{ControllerBackend, InterfaceController};
use protocol::{
    ConfigurationBundle, Recipient, RequestKind, SetupPacket, VendorRequest, clamp_response,
    hex_string, standard_request,
};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Address reported to the framework
const DEVICE_ADDRESS: u8 = 1;

/// Self-powered, no remote wakeup
const DEVICE_STATUS: [u8; 2] = [0x01, 0x00];

/// Interface status is reserved; endpoints never halt
const IDLE_STATUS: [u8; 2] = [0x00, 0x00];

pub struct Dot11DeviceProxy {
    interface: String,
    backend: Box<dyn ControllerBackend>,
    controller: Option<Box<dyn InterfaceController>>,
    descriptors: DescriptorTable,
}

impl Dot11DeviceProxy {
    pub fn new(
        interface: impl Into<String>,
        backend: Box<dyn ControllerBackend>,
        descriptors: DescriptorTable,
    ) -> Self {
        Self {
            interface: interface.into(),
            backend,
            controller: None,
            descriptors,
        }
    }

    /// Build a proxy from configuration, reading the interface once
    pub fn from_config(config: &ProxyConfig, backend: Box<dyn ControllerBackend>) -> Self {
        let interface = config.get(INTERFACE_KEY).unwrap_or_default();
        Self::new(
            interface,
            backend,
            DescriptorTable::new(&config.descriptor),
        )
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    fn standard_request(&self, setup: &SetupPacket) -> Result<Vec<u8>, ControlError> {
        match (setup.request, setup.is_in()) {
            (standard_request::GET_DESCRIPTOR, true) => self.descriptors.get_descriptor(setup),
            (standard_request::GET_CONFIGURATION, true)
            | (standard_request::GET_INTERFACE, true) => Ok(vec![1]),
            (standard_request::GET_STATUS, true) => self.status(setup),
            (
                standard_request::SET_CONFIGURATION
                | standard_request::SET_INTERFACE
                | standard_request::SET_ADDRESS
                | standard_request::CLEAR_FEATURE
                | standard_request::SET_FEATURE,
                false,
            ) => {
                debug!("Acknowledging standard request {:#04x}", setup.request);
                Ok(Vec::new())
            }
            _ => {
                warn!("Unhandled control request {}", setup);
                Err(ControlError::Stall)
            }
        }
    }

    fn status(&self, setup: &SetupPacket) -> Result<Vec<u8>, ControlError> {
        let known = match setup.recipient() {
            Recipient::Device => return Ok(DEVICE_STATUS.to_vec()),
            Recipient::Interface => self.descriptors.has_interface(setup.index),
            Recipient::Endpoint => self.descriptors.has_endpoint(setup.index),
            Recipient::Other | Recipient::Reserved(_) => false,
        };
        if !known {
            warn!("GET_STATUS for unknown target {}", setup);
            return Err(ControlError::Stall);
        }
        Ok(IDLE_STATUS.to_vec())
    }

    fn vendor_request(
        &mut self,
        setup: &SetupPacket,
        data: &[u8],
    ) -> Result<Vec<u8>, ControlError> {
        let request = VendorRequest::try_from(setup.request).map_err(|_| {
            warn!("Unsupported vendor request {:#04x}", setup.request);
            ControlError::UnsupportedRequest(setup.request)
        })?;

        let Some(controller) = self.controller.as_deref_mut() else {
            warn!("802.11: {} received before connect", request);
            return Err(ControlError::NotConnected(request));
        };

        vendor::handle(controller, request, data)
    }
}

impl DeviceProxy for Dot11DeviceProxy {
    fn connect(&mut self, _timeout: Duration) -> common::Result<()> {
        if self.controller.is_some() {
            debug!("802.11: Already connected to {}", self.interface);
            return Ok(());
        }

        if self.interface.is_empty() {
            error!("802.11 interface not set");
            return Err(common::Error::Config(format!(
                "{} is not set",
                INTERFACE_KEY
            )));
        }

        info!("802.11: Using interface {}", self.interface);
        let controller = self
            .backend
            .attach(&self.interface)
            .inspect_err(|e| error!("802.11: {}", e))?;
        info!("802.11: Driver: {}", controller.driver_name());

        self.controller = Some(controller);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.controller.take().is_some() {
            debug!("802.11: Released {}", self.interface);
        }
    }

    fn reset(&mut self) {}

    fn is_connected(&self) -> bool {
        self.controller.is_some()
    }

    fn is_highspeed(&self) -> bool {
        false
    }

    fn control_request(
        &mut self,
        setup: &SetupPacket,
        data: &[u8],
    ) -> Result<Vec<u8>, ControlError> {
        trace!("802.11< {}", hex_string(&setup.to_bytes()));

        let response = match setup.kind() {
            RequestKind::Standard => self.standard_request(setup)?,
            RequestKind::Vendor => self.vendor_request(setup, data)?,
            RequestKind::Class | RequestKind::Reserved => {
                warn!("Unhandled control request {}", setup);
                return Err(ControlError::Stall);
            }
        };

        // OUT setters still report their status to the framework
        let response = if setup.is_in() {
            clamp_response(response, setup.length)
        } else {
            response
        };

        trace!("802.11> {}", hex_string(&response));
        Ok(response)
    }

    fn send_data(&mut self, _endpoint: u8, _attributes: u8, _max_packet_size: u16, _data: &[u8]) {}

    fn receive_data(
        &mut self,
        _endpoint: u8,
        _attributes: u8,
        _max_packet_size: u16,
        _timeout: Duration,
    ) -> Vec<u8> {
        Vec::new()
    }

    fn set_config(
        &mut self,
        _full_speed: &ConfigurationBundle,
        _high_speed: Option<&ConfigurationBundle>,
    ) {
    }

    fn claim_interface(&mut self, _interface: u8) {}

    fn release_interface(&mut self, _interface: u8) {}

    fn address(&self) -> u8 {
        DEVICE_ADDRESS
    }

    fn description(&self) -> String {
        format!("802.11 Device ({})", self.interface)
    }
}

impl Drop for Dot11DeviceProxy {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::SimulatedBackend;
    use common::test_utils::FailingBackend;
    use protocol::{Direction, descriptor_type};

    fn proxy(interface: &str) -> Dot11DeviceProxy {
        Dot11DeviceProxy::new(
            interface,
            Box::new(SimulatedBackend::new()),
            DescriptorTable::default(),
        )
    }

    #[test]
    fn test_connect_requires_interface() {
        let mut proxy = proxy("");
        let err = proxy.connect(Duration::ZERO).unwrap_err();
        assert!(matches!(err, common::Error::Config(_)));
        assert!(!proxy.is_connected());
    }

    #[test]
    fn test_connect_backend_failure() {
        let mut proxy = Dot11DeviceProxy::new(
            "wlan0",
            Box::new(FailingBackend::no_driver()),
            DescriptorTable::default(),
        );
        assert!(matches!(
            proxy.connect(Duration::ZERO),
            Err(common::Error::Controller(_))
        ));
        assert!(!proxy.is_connected());
    }

    #[test]
    fn test_connect_disconnect() {
        let mut proxy = proxy("wlan0");
        proxy.connect(Duration::ZERO).unwrap();
        assert!(proxy.is_connected());
        proxy.connect(Duration::ZERO).unwrap();
        proxy.disconnect();
        assert!(!proxy.is_connected());
    }

    #[test]
    fn test_get_configuration() {
        let mut proxy = proxy("wlan0");
        let setup = SetupPacket::new(0x80, standard_request::GET_CONFIGURATION, 0, 0, 1);
        assert_eq!(proxy.control_request(&setup, &[]).unwrap(), vec![1]);
    }

    #[test]
    fn test_set_configuration_acknowledged() {
        let mut proxy = proxy("wlan0");
        let setup = SetupPacket::new(0x00, standard_request::SET_CONFIGURATION, 1, 0, 0);
        assert!(proxy.control_request(&setup, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_class_request_stalls() {
        let mut proxy = proxy("wlan0");
        // HID GET_REPORT
        let setup = SetupPacket::new(0xa1, 0x01, 0x0100, 0, 64);
        assert!(matches!(
            proxy.control_request(&setup, &[]),
            Err(ControlError::Stall)
        ));
    }

    #[test]
    fn test_descriptors_before_connect() {
        let mut proxy = proxy("");
        let setup = SetupPacket::get_descriptor(descriptor_type::DEVICE, 0, 0, 18);
        assert_eq!(proxy.control_request(&setup, &[]).unwrap().len(), 18);
    }

    #[test]
    fn test_vendor_before_connect() {
        let mut proxy = proxy("wlan0");
        let setup = SetupPacket::vendor(Direction::DeviceToHost, 10, 4);
        assert!(matches!(
            proxy.control_request(&setup, &[]),
            Err(ControlError::NotConnected(VendorRequest::GetChannel))
        ));
    }

    #[test]
    fn test_fixed_properties() {
        let proxy = proxy("wlan0");
        assert_eq!(proxy.address(), 1);
        assert!(!proxy.is_highspeed());
        assert_eq!(proxy.description(), "802.11 Device (wlan0)");
    }
}
