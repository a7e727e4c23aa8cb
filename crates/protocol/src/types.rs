//! Shared value types for the 802.11 command set

use crate::error::{ProtocolError, Result};
use crate::requests::VendorRequest;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of a MAC address in bytes
pub const MAC_ADDRESS_LEN: usize = 6;

/// IEEE 802 hardware address
///
/// Parsed from and displayed as `aa:bb:cc:dd:ee:ff`. A `-` separator is
/// also accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; MAC_ADDRESS_LEN]);

impl MacAddress {
    pub fn octets(&self) -> [u8; MAC_ADDRESS_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for MacAddress {
    type Error = ProtocolError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let octets: [u8; MAC_ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            ProtocolError::InvalidMacAddress(format!(
                "expected {} bytes, got {}",
                MAC_ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(octets))
    }
}

impl FromStr for MacAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split([':', '-']).collect();
        if parts.len() != MAC_ADDRESS_LEN {
            return Err(ProtocolError::InvalidMacAddress(s.to_string()));
        }

        let mut octets = [0u8; MAC_ADDRESS_LEN];
        for (octet, part) in octets.iter_mut().zip(parts) {
            if part.is_empty() || part.len() > 2 {
                return Err(ProtocolError::InvalidMacAddress(s.to_string()));
            }
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| ProtocolError::InvalidMacAddress(s.to_string()))?;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Interface mode requested by the open commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionMode {
    /// Injection only
    Inject,
    /// Monitor (capture) only
    Monitor,
    /// Combined injection and monitor
    InjectMonitor,
}

impl InjectionMode {
    /// Vendor command that opens this mode
    pub fn request(self) -> VendorRequest {
        match self {
            Self::Inject => VendorRequest::OpenInject,
            Self::Monitor => VendorRequest::OpenMonitor,
            Self::InjectMonitor => VendorRequest::OpenInjectMonitor,
        }
    }
}

impl fmt::Display for InjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inject => "Injector",
            Self::Monitor => "Monitor Mode",
            Self::InjectMonitor => "Injector / Monitor Mode",
        })
    }
}
