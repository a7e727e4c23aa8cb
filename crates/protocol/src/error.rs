//! Protocol error types

use thiserror::Error;

/// Wire-level decoding errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Input ended before a complete record was read
    #[error("Truncated input: needed {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// A descriptor's bLength does not match its type
    #[error("Invalid descriptor length {length} for descriptor type {descriptor_type:#04x}")]
    InvalidLength { descriptor_type: u8, length: u8 },

    /// Descriptor type byte differs from what the parser expected
    #[error("Unexpected descriptor type {found:#04x} (expected {expected:#04x})")]
    UnexpectedDescriptorType { expected: u8, found: u8 },

    /// MAC address could not be parsed
    #[error("Invalid MAC address: {0}")]
    InvalidMacAddress(String),

    /// Vendor request code outside the command table
    #[error("Unknown vendor request code {0:#04x}")]
    UnknownVendorRequest(u8),
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;
