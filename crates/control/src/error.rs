//! Error types for the host-side control utility

use protocol::{ProtocolError, VendorRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("USB transfer failed: {0}")]
    Usb(#[from] rusb::Error),

    #[error("{request} returned {received} bytes, expected {expected}")]
    ShortResponse {
        request: VendorRequest,
        expected: usize,
        received: usize,
    },

    #[error("No device with ID {vendor_id:04x}:{product_id:04x}")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

pub type Result<T> = std::result::Result<T, ControlError>;
