//! Request codes and descriptor constants
//!
//! Standard USB values from chapter 9 of the USB 2.0 specification, plus
//! the vendor command table understood by the 802.11 control device.

use crate::error::{ProtocolError, Result};
use crate::setup::Direction;
use std::fmt;

/// bmRequestType direction bit (device to host)
pub const REQUEST_TYPE_DIR_IN: u8 = 0x80;
/// bmRequestType type mask
pub const REQUEST_TYPE_MASK: u8 = 0x60;
/// bmRequestType class request
pub const REQUEST_TYPE_CLASS: u8 = 0x20;
/// bmRequestType vendor request
pub const REQUEST_TYPE_VENDOR: u8 = 0x40;

/// Vendor IN request to the device
pub const VENDOR_IN: u8 = REQUEST_TYPE_VENDOR | REQUEST_TYPE_DIR_IN;
/// Vendor OUT request to the device
pub const VENDOR_OUT: u8 = REQUEST_TYPE_VENDOR;

/// US English, the only supported string language
pub const LANGUAGE_ID_EN_US: u16 = 0x0409;

/// HID interface/device class
pub const CLASS_HID: u8 = 0x03;

/// Endpoint transfer type: interrupt
pub const ENDPOINT_XFER_INT: u8 = 0x03;
/// Endpoint address direction bit
pub const ENDPOINT_DIR_IN: u8 = 0x80;

/// Configuration attribute bit 7 (must be set)
pub const CONFIG_ATT_ONE: u8 = 0x80;
/// Configuration attribute: self-powered
pub const CONFIG_ATT_SELFPOWER: u8 = 0x40;

/// Standard bRequest codes
pub mod standard_request {
    pub const GET_STATUS: u8 = 0x00;
    pub const CLEAR_FEATURE: u8 = 0x01;
    pub const SET_FEATURE: u8 = 0x03;
    pub const SET_ADDRESS: u8 = 0x05;
    pub const GET_DESCRIPTOR: u8 = 0x06;
    pub const SET_DESCRIPTOR: u8 = 0x07;
    pub const GET_CONFIGURATION: u8 = 0x08;
    pub const SET_CONFIGURATION: u8 = 0x09;
    pub const GET_INTERFACE: u8 = 0x0a;
    pub const SET_INTERFACE: u8 = 0x0b;
}

/// Descriptor type codes (high byte of wValue in GET_DESCRIPTOR)
pub mod descriptor_type {
    pub const DEVICE: u8 = 0x01;
    pub const CONFIGURATION: u8 = 0x02;
    pub const STRING: u8 = 0x03;
    pub const INTERFACE: u8 = 0x04;
    pub const ENDPOINT: u8 = 0x05;
    pub const DEVICE_QUALIFIER: u8 = 0x06;
    pub const OTHER_SPEED_CONFIGURATION: u8 = 0x07;
}

/// Vendor commands of the 802.11 control device
///
/// The discriminant is the bRequest code used on the wire.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorRequest {
    OpenInject = 0,
    OpenMonitor = 1,
    OpenInjectMonitor = 2,
    SetTimeout = 3,
    GetTimeout = 4,
    GetCaptureInterface = 5,
    GetDriverName = 6,
    Close = 7,
    GetDatalink = 8,
    SetDatalink = 9,
    GetChannel = 10,
    SetChannel = 11,
    GetHardwareMac = 12,
    SetHardwareMac = 13,
    AddWepKey = 14,
}

impl VendorRequest {
    /// Every command, in code order
    pub const ALL: [VendorRequest; 15] = [
        Self::OpenInject,
        Self::OpenMonitor,
        Self::OpenInjectMonitor,
        Self::SetTimeout,
        Self::GetTimeout,
        Self::GetCaptureInterface,
        Self::GetDriverName,
        Self::Close,
        Self::GetDatalink,
        Self::SetDatalink,
        Self::GetChannel,
        Self::SetChannel,
        Self::GetHardwareMac,
        Self::SetHardwareMac,
        Self::AddWepKey,
    ];

    /// bRequest code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Direction of the data stage the host uses for this command
    pub fn direction(self) -> Direction {
        match self {
            Self::SetTimeout
            | Self::Close
            | Self::SetDatalink
            | Self::SetChannel
            | Self::SetHardwareMac
            | Self::AddWepKey => Direction::HostToDevice,
            _ => Direction::DeviceToHost,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::OpenInject => "open-inject",
            Self::OpenMonitor => "open-monitor",
            Self::OpenInjectMonitor => "open-inject-monitor",
            Self::SetTimeout => "set-timeout",
            Self::GetTimeout => "get-timeout",
            Self::GetCaptureInterface => "get-capture-interface",
            Self::GetDriverName => "get-driver-name",
            Self::Close => "close",
            Self::GetDatalink => "get-datalink",
            Self::SetDatalink => "set-datalink",
            Self::GetChannel => "get-channel",
            Self::SetChannel => "set-channel",
            Self::GetHardwareMac => "get-hwmac",
            Self::SetHardwareMac => "set-hwmac",
            Self::AddWepKey => "add-wep-key",
        }
    }
}

impl TryFrom<u8> for VendorRequest {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(ProtocolError::UnknownVendorRequest(code))
    }
}

impl fmt::Display for VendorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_table_order() {
        for (i, request) in VendorRequest::ALL.iter().enumerate() {
            assert_eq!(request.code() as usize, i);
            assert_eq!(VendorRequest::try_from(request.code()).unwrap(), *request);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            VendorRequest::try_from(15),
            Err(ProtocolError::UnknownVendorRequest(15))
        );
        assert!(VendorRequest::try_from(0xff).is_err());
    }

    #[test]
    fn test_directions() {
        assert_eq!(
            VendorRequest::GetChannel.direction(),
            Direction::DeviceToHost
        );
        assert_eq!(
            VendorRequest::SetChannel.direction(),
            Direction::HostToDevice
        );
        assert_eq!(
            VendorRequest::OpenInjectMonitor.direction(),
            Direction::DeviceToHost
        );
        assert_eq!(VendorRequest::AddWepKey.direction(), Direction::HostToDevice);
    }

    #[test]
    fn test_vendor_request_type_bytes() {
        assert_eq!(VENDOR_IN, 0xc0);
        assert_eq!(VENDOR_OUT, 0x40);
    }
}
