//! USB control setup packet
//!
//! The 8-byte header of every control transfer. All multi-byte fields are
//! little-endian on the wire.

use crate::error::{ProtocolError, Result};
use crate::requests::{
    REQUEST_TYPE_CLASS, REQUEST_TYPE_DIR_IN, REQUEST_TYPE_MASK, REQUEST_TYPE_VENDOR,
    standard_request,
};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// Size of a setup packet in bytes
pub const SETUP_PACKET_SIZE: usize = 8;

/// Data stage direction (bit 7 of bmRequestType)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to device (OUT)
    HostToDevice,
    /// Device to host (IN)
    DeviceToHost,
}

/// Request type (bits 5..6 of bmRequestType)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Standard,
    Class,
    Vendor,
    Reserved,
}

/// Request recipient (bits 0..4 of bmRequestType)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Device,
    Interface,
    Endpoint,
    Other,
    Reserved(u8),
}

/// Decoded control setup packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupPacket {
    /// bmRequestType
    pub request_type: u8,
    /// bRequest
    pub request: u8,
    /// wValue
    pub value: u16,
    /// wIndex
    pub index: u16,
    /// wLength (maximum data stage length)
    pub length: u16,
}

impl SetupPacket {
    pub fn new(request_type: u8, request: u8, value: u16, index: u16, length: u16) -> Self {
        Self {
            request_type,
            request,
            value,
            index,
            length,
        }
    }

    /// Standard GET_DESCRIPTOR request addressed to the device
    pub fn get_descriptor(descriptor_type: u8, index: u8, language_id: u16, length: u16) -> Self {
        Self::new(
            REQUEST_TYPE_DIR_IN,
            standard_request::GET_DESCRIPTOR,
            (u16::from(descriptor_type) << 8) | u16::from(index),
            language_id,
            length,
        )
    }

    /// Vendor request addressed to the device, wValue and wIndex zero
    pub fn vendor(direction: Direction, request: u8, length: u16) -> Self {
        let request_type = match direction {
            Direction::DeviceToHost => REQUEST_TYPE_VENDOR | REQUEST_TYPE_DIR_IN,
            Direction::HostToDevice => REQUEST_TYPE_VENDOR,
        };
        Self::new(request_type, request, 0, 0, length)
    }

    /// Parse from the 8-byte wire form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SETUP_PACKET_SIZE {
            return Err(ProtocolError::Truncated {
                needed: SETUP_PACKET_SIZE,
                available: bytes.len(),
            });
        }

        Ok(Self {
            request_type: bytes[0],
            request: bytes[1],
            value: LittleEndian::read_u16(&bytes[2..4]),
            index: LittleEndian::read_u16(&bytes[4..6]),
            length: LittleEndian::read_u16(&bytes[6..8]),
        })
    }

    /// Serialize to the 8-byte wire form
    pub fn to_bytes(&self) -> [u8; SETUP_PACKET_SIZE] {
        let mut out = [0u8; SETUP_PACKET_SIZE];
        out[0] = self.request_type;
        out[1] = self.request;
        LittleEndian::write_u16(&mut out[2..4], self.value);
        LittleEndian::write_u16(&mut out[4..6], self.index);
        LittleEndian::write_u16(&mut out[6..8], self.length);
        out
    }

    pub fn direction(&self) -> Direction {
        if self.request_type & REQUEST_TYPE_DIR_IN != 0 {
            Direction::DeviceToHost
        } else {
            Direction::HostToDevice
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self.request_type & REQUEST_TYPE_MASK {
            0 => RequestKind::Standard,
            REQUEST_TYPE_CLASS => RequestKind::Class,
            REQUEST_TYPE_VENDOR => RequestKind::Vendor,
            _ => RequestKind::Reserved,
        }
    }

    pub fn recipient(&self) -> Recipient {
        match self.request_type & 0x1f {
            0 => Recipient::Device,
            1 => Recipient::Interface,
            2 => Recipient::Endpoint,
            3 => Recipient::Other,
            other => Recipient::Reserved(other),
        }
    }

    pub fn is_in(&self) -> bool {
        self.direction() == Direction::DeviceToHost
    }

    /// Descriptor type carried in the high byte of wValue
    pub fn descriptor_type(&self) -> u8 {
        (self.value >> 8) as u8
    }

    /// Descriptor index carried in the low byte of wValue
    pub fn descriptor_index(&self) -> u8 {
        (self.value & 0xff) as u8
    }
}

impl fmt::Display for SetupPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bmRequestType={:#04x} bRequest={:#04x} wValue={:#06x} wIndex={:#06x} wLength={}",
            self.request_type, self.request, self.value, self.index, self.length
        )
    }
}
