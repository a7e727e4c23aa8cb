//! Device proxy plugin boundary
//!
//! The proxy framework drives every emulated device through [`DeviceProxy`].
//! Control requests come in one at a time. A request that returns
//! `Err` is reported to the host as a stall.

use common::ControllerError;
use protocol::{ConfigurationBundle, SetupPacket, VendorRequest};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single control request
#[derive(Debug, Error)]
pub enum ControlError {
    /// Request is invalid for this device
    #[error("Request stalled")]
    Stall,

    /// Vendor request code outside the command table
    #[error("Unsupported vendor request {0:#04x}")]
    UnsupportedRequest(u8),

    /// Data stage too short or otherwise unusable
    #[error("Malformed data stage for {request}: {reason}")]
    MalformedData {
        request: VendorRequest,
        reason: String,
    },

    /// Vendor request issued while no interface is attached
    #[error("{0} issued before connect")]
    NotConnected(VendorRequest),

    /// Wireless library refused a mode change
    #[error(transparent)]
    Controller(#[from] ControllerError),
}

impl ControlError {
    /// Negative status for frameworks that signal a stall by return code
    pub fn status(&self) -> i32 {
        match self {
            Self::Controller(e) => e.code(),
            _ => -1,
        }
    }
}

/// Emulated USB device as seen by the proxy framework
pub trait DeviceProxy {
    /// Attach to the backing resource
    fn connect(&mut self, timeout: Duration) -> common::Result<()>;

    fn disconnect(&mut self);

    fn reset(&mut self);

    fn is_connected(&self) -> bool;

    fn is_highspeed(&self) -> bool;

    /// Handle one control transfer
    ///
    /// `data` is the OUT data stage (empty for IN requests). The returned
    /// bytes are the IN data stage, already limited to `setup.length`.
    fn control_request(
        &mut self,
        setup: &SetupPacket,
        data: &[u8],
    ) -> Result<Vec<u8>, ControlError>;

    fn send_data(&mut self, endpoint: u8, attributes: u8, max_packet_size: u16, data: &[u8]);

    fn receive_data(
        &mut self,
        endpoint: u8,
        attributes: u8,
        max_packet_size: u16,
        timeout: Duration,
    ) -> Vec<u8>;

    fn set_config(
        &mut self,
        full_speed: &ConfigurationBundle,
        high_speed: Option<&ConfigurationBundle>,
    );

    fn claim_interface(&mut self, interface: u8);

    fn release_interface(&mut self, interface: u8);

    /// USB device address
    fn address(&self) -> u8;

    /// Short human-readable description
    fn description(&self) -> String;
}
