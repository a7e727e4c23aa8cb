//! USB descriptor records
//!
//! Fixed-layout device, configuration, interface, endpoint and string
//! descriptors. Each record serializes to its exact chapter 9 byte layout
//! and can be parsed back, which is how configuration bundles returned by
//! GET_DESCRIPTOR are checked.

use crate::error::{ProtocolError, Result};
use crate::requests::{ENDPOINT_DIR_IN, LANGUAGE_ID_EN_US, descriptor_type};
use byteorder::{ByteOrder, LittleEndian};

/// Largest string a descriptor can carry, in UTF-16 code units
pub const MAX_STRING_UNITS: usize = (u8::MAX as usize - 2) / 2;

fn check_header(bytes: &[u8], expected_type: u8, size: usize) -> Result<()> {
    if bytes.len() < size {
        return Err(ProtocolError::Truncated {
            needed: size,
            available: bytes.len(),
        });
    }
    if bytes[1] != expected_type {
        return Err(ProtocolError::UnexpectedDescriptorType {
            expected: expected_type,
            found: bytes[1],
        });
    }
    if usize::from(bytes[0]) != size {
        return Err(ProtocolError::InvalidLength {
            descriptor_type: expected_type,
            length: bytes[0],
        });
    }
    Ok(())
}

/// Standard device descriptor (18 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub usb_version: u16,
    pub device_class: u8,
    pub device_subclass: u8,
    pub device_protocol: u8,
    pub max_packet_size0: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub device_version: u16,
    pub manufacturer_index: u8,
    pub product_index: u8,
    pub serial_number_index: u8,
    pub num_configurations: u8,
}

impl DeviceDescriptor {
    pub const SIZE: usize = 18;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = Self::SIZE as u8;
        out[1] = descriptor_type::DEVICE;
        LittleEndian::write_u16(&mut out[2..4], self.usb_version);
        out[4] = self.device_class;
        out[5] = self.device_subclass;
        out[6] = self.device_protocol;
        out[7] = self.max_packet_size0;
        LittleEndian::write_u16(&mut out[8..10], self.vendor_id);
        LittleEndian::write_u16(&mut out[10..12], self.product_id);
        LittleEndian::write_u16(&mut out[12..14], self.device_version);
        out[14] = self.manufacturer_index;
        out[15] = self.product_index;
        out[16] = self.serial_number_index;
        out[17] = self.num_configurations;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_header(bytes, descriptor_type::DEVICE, Self::SIZE)?;
        Ok(Self {
            usb_version: LittleEndian::read_u16(&bytes[2..4]),
            device_class: bytes[4],
            device_subclass: bytes[5],
            device_protocol: bytes[6],
            max_packet_size0: bytes[7],
            vendor_id: LittleEndian::read_u16(&bytes[8..10]),
            product_id: LittleEndian::read_u16(&bytes[10..12]),
            device_version: LittleEndian::read_u16(&bytes[12..14]),
            manufacturer_index: bytes[14],
            product_index: bytes[15],
            serial_number_index: bytes[16],
            num_configurations: bytes[17],
        })
    }
}

/// Standard configuration descriptor header (9 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationDescriptor {
    /// wTotalLength: this header plus every interface/endpoint descriptor
    pub total_length: u16,
    pub num_interfaces: u8,
    pub configuration_value: u8,
    pub configuration_index: u8,
    pub attributes: u8,
    /// bMaxPower in 2 mA units
    pub max_power: u8,
}

impl ConfigurationDescriptor {
    pub const SIZE: usize = 9;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = Self::SIZE as u8;
        out[1] = descriptor_type::CONFIGURATION;
        LittleEndian::write_u16(&mut out[2..4], self.total_length);
        out[4] = self.num_interfaces;
        out[5] = self.configuration_value;
        out[6] = self.configuration_index;
        out[7] = self.attributes;
        out[8] = self.max_power;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_header(bytes, descriptor_type::CONFIGURATION, Self::SIZE)?;
        Ok(Self {
            total_length: LittleEndian::read_u16(&bytes[2..4]),
            num_interfaces: bytes[4],
            configuration_value: bytes[5],
            configuration_index: bytes[6],
            attributes: bytes[7],
            max_power: bytes[8],
        })
    }
}

/// Standard interface descriptor (9 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub interface_number: u8,
    pub alternate_setting: u8,
    pub num_endpoints: u8,
    pub interface_class: u8,
    pub interface_subclass: u8,
    pub interface_protocol: u8,
    pub interface_index: u8,
}

impl InterfaceDescriptor {
    pub const SIZE: usize = 9;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        [
            Self::SIZE as u8,
            descriptor_type::INTERFACE,
            self.interface_number,
            self.alternate_setting,
            self.num_endpoints,
            self.interface_class,
            self.interface_subclass,
            self.interface_protocol,
            self.interface_index,
        ]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_header(bytes, descriptor_type::INTERFACE, Self::SIZE)?;
        Ok(Self {
            interface_number: bytes[2],
            alternate_setting: bytes[3],
            num_endpoints: bytes[4],
            interface_class: bytes[5],
            interface_subclass: bytes[6],
            interface_protocol: bytes[7],
            interface_index: bytes[8],
        })
    }
}

/// Standard endpoint descriptor (7 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// bEndpointAddress, bit 7 set for IN
    pub address: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
    pub interval: u8,
}

impl EndpointDescriptor {
    pub const SIZE: usize = 7;

    pub fn is_in(&self) -> bool {
        self.address & ENDPOINT_DIR_IN != 0
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = Self::SIZE as u8;
        out[1] = descriptor_type::ENDPOINT;
        out[2] = self.address;
        out[3] = self.attributes;
        LittleEndian::write_u16(&mut out[4..6], self.max_packet_size);
        out[6] = self.interval;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_header(bytes, descriptor_type::ENDPOINT, Self::SIZE)?;
        Ok(Self {
            address: bytes[2],
            attributes: bytes[3],
            max_packet_size: LittleEndian::read_u16(&bytes[4..6]),
            interval: bytes[6],
        })
    }
}

/// A configuration together with its single interface and endpoints,
/// in the order GET_DESCRIPTOR(CONFIGURATION) returns them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationBundle {
    pub configuration: ConfigurationDescriptor,
    pub interface: InterfaceDescriptor,
    pub endpoints: Vec<EndpointDescriptor>,
}

impl ConfigurationBundle {
    /// Build a bundle, filling in wTotalLength and bNumEndpoints
    pub fn new(
        mut configuration: ConfigurationDescriptor,
        mut interface: InterfaceDescriptor,
        endpoints: Vec<EndpointDescriptor>,
    ) -> Self {
        let total = ConfigurationDescriptor::SIZE
            + InterfaceDescriptor::SIZE
            + endpoints.len() * EndpointDescriptor::SIZE;
        configuration.total_length = total as u16;
        interface.num_endpoints = endpoints.len() as u8;
        Self {
            configuration,
            interface,
            endpoints,
        }
    }

    pub fn total_length(&self) -> usize {
        usize::from(self.configuration.total_length)
    }

    /// Concatenated configuration + interface + endpoint descriptors
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_length());
        out.extend_from_slice(&self.configuration.to_bytes());
        out.extend_from_slice(&self.interface.to_bytes());
        for endpoint in &self.endpoints {
            out.extend_from_slice(&endpoint.to_bytes());
        }
        out
    }

    /// Parse a full configuration response
    ///
    /// Requires exactly one configuration followed by one interface and
    /// then the endpoints the interface declares, with nothing left over.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut iter = DescriptorIter::new(bytes);
        let configuration = ConfigurationDescriptor::from_bytes(expect_next(
            &mut iter,
            descriptor_type::CONFIGURATION,
        )?)?;
        let interface =
            InterfaceDescriptor::from_bytes(expect_next(&mut iter, descriptor_type::INTERFACE)?)?;
        let mut endpoints = Vec::with_capacity(usize::from(interface.num_endpoints));
        for _ in 0..interface.num_endpoints {
            endpoints.push(EndpointDescriptor::from_bytes(expect_next(
                &mut iter,
                descriptor_type::ENDPOINT,
            )?)?);
        }

        if let Some(extra) = iter.next() {
            let raw = extra?;
            return Err(ProtocolError::UnexpectedDescriptorType {
                expected: descriptor_type::CONFIGURATION,
                found: raw[1],
            });
        }

        Ok(Self {
            configuration,
            interface,
            endpoints,
        })
    }
}

fn expect_next<'a>(iter: &mut DescriptorIter<'a>, expected: u8) -> Result<&'a [u8]> {
    match iter.next() {
        Some(Ok(raw)) if raw[1] == expected => Ok(raw),
        Some(Ok(raw)) => Err(ProtocolError::UnexpectedDescriptorType {
            expected,
            found: raw[1],
        }),
        Some(Err(e)) => Err(e),
        None => Err(ProtocolError::Truncated {
            needed: 2,
            available: 0,
        }),
    }
}

/// Walks a buffer of concatenated descriptors by their bLength fields
pub struct DescriptorIter<'a> {
    remaining: &'a [u8],
}

impl<'a> DescriptorIter<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { remaining: bytes }
    }
}

impl<'a> Iterator for DescriptorIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        if self.remaining.len() < 2 {
            let available = self.remaining.len();
            self.remaining = &[];
            return Some(Err(ProtocolError::Truncated {
                needed: 2,
                available,
            }));
        }

        let length = usize::from(self.remaining[0]);
        if length < 2 {
            let descriptor_type = self.remaining[1];
            self.remaining = &[];
            return Some(Err(ProtocolError::InvalidLength {
                descriptor_type,
                length: length as u8,
            }));
        }
        if length > self.remaining.len() {
            let available = self.remaining.len();
            self.remaining = &[];
            return Some(Err(ProtocolError::Truncated {
                needed: length,
                available,
            }));
        }

        let (head, tail) = self.remaining.split_at(length);
        self.remaining = tail;
        Some(Ok(head))
    }
}

/// String descriptor
///
/// Index 0 holds the supported language IDs, every other index holds
/// UTF-16LE text. Text longer than [`MAX_STRING_UNITS`] is cut off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringDescriptor {
    bytes: Vec<u8>,
}

impl StringDescriptor {
    /// Language-ID table for index 0
    pub fn languages(language_ids: &[u16]) -> Self {
        Self::from_units(language_ids.iter().copied())
    }

    /// The language table advertising US English only
    pub fn default_languages() -> Self {
        Self::languages(&[LANGUAGE_ID_EN_US])
    }

    pub fn text(s: &str) -> Self {
        Self::from_units(s.encode_utf16())
    }

    fn from_units(units: impl Iterator<Item = u16>) -> Self {
        let mut bytes = vec![0, descriptor_type::STRING];
        for unit in units.take(MAX_STRING_UNITS) {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes[0] = bytes.len() as u8;
        Self { bytes }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(ProtocolError::Truncated {
                needed: 2,
                available: bytes.len(),
            });
        }
        if bytes[1] != descriptor_type::STRING {
            return Err(ProtocolError::UnexpectedDescriptorType {
                expected: descriptor_type::STRING,
                found: bytes[1],
            });
        }
        let length = usize::from(bytes[0]);
        if length < 2 || length % 2 != 0 {
            return Err(ProtocolError::InvalidLength {
                descriptor_type: descriptor_type::STRING,
                length: bytes[0],
            });
        }
        if bytes.len() < length {
            return Err(ProtocolError::Truncated {
                needed: length,
                available: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes[..length].to_vec(),
        })
    }

    /// bLength
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.len() <= 2
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload as UTF-16 code units
    pub fn units(&self) -> Vec<u16> {
        self.bytes[2..]
            .chunks_exact(2)
            .map(LittleEndian::read_u16)
            .collect()
    }

    /// Payload decoded as text, with invalid surrogates replaced
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::{CLASS_HID, ENDPOINT_XFER_INT};

    fn sample_bundle() -> ConfigurationBundle {
        ConfigurationBundle::new(
            ConfigurationDescriptor {
                total_length: 0,
                num_interfaces: 1,
                configuration_value: 1,
                configuration_index: 4,
                attributes: 0xc0,
                max_power: 1,
            },
            InterfaceDescriptor {
                interface_number: 0,
                alternate_setting: 0,
                num_endpoints: 0,
                interface_class: CLASS_HID,
                interface_subclass: 0,
                interface_protocol: 0,
                interface_index: 4,
            },
            vec![
                EndpointDescriptor {
                    address: 0x81,
                    attributes: ENDPOINT_XFER_INT,
                    max_packet_size: 64,
                    interval: 10,
                },
                EndpointDescriptor {
                    address: 0x01,
                    attributes: ENDPOINT_XFER_INT,
                    max_packet_size: 64,
                    interval: 10,
                },
            ],
        )
    }

    #[test]
    fn test_device_descriptor_layout() {
        let descriptor = DeviceDescriptor {
            usb_version: 0x0100,
            device_class: CLASS_HID,
            device_subclass: 0,
            device_protocol: 0,
            max_packet_size0: 64,
            vendor_id: 0xffff,
            product_id: 0x0005,
            device_version: 0,
            manufacturer_index: 1,
            product_index: 2,
            serial_number_index: 3,
            num_configurations: 1,
        };
        let bytes = descriptor.to_bytes();
        assert_eq!(
            bytes,
            [
                0x12, 0x01, 0x00, 0x01, 0x03, 0x00, 0x00, 0x40, 0xff, 0xff, 0x05, 0x00, 0x00,
                0x00, 0x01, 0x02, 0x03, 0x01
            ]
        );
        assert_eq!(DeviceDescriptor::from_bytes(&bytes).unwrap(), descriptor);
    }

    #[test]
    fn test_bundle_total_length() {
        let bundle = sample_bundle();
        assert_eq!(bundle.total_length(), 9 + 9 + 7 + 7);
        assert_eq!(bundle.interface.num_endpoints, 2);
        assert_eq!(bundle.to_bytes().len(), bundle.total_length());
    }

    #[test]
    fn test_bundle_parse() {
        let bundle = sample_bundle();
        let parsed = ConfigurationBundle::from_bytes(&bundle.to_bytes()).unwrap();
        assert_eq!(parsed, bundle);
        assert!(parsed.endpoints[0].is_in());
        assert!(!parsed.endpoints[1].is_in());
    }

    #[test]
    fn test_bundle_parse_rejects_truncation() {
        let bytes = sample_bundle().to_bytes();
        assert!(ConfigurationBundle::from_bytes(&bytes[..20]).is_err());
    }

    #[test]
    fn test_bundle_parse_rejects_trailing_descriptor() {
        let mut bytes = sample_bundle().to_bytes();
        bytes.extend_from_slice(&sample_bundle().endpoints[0].to_bytes());
        assert!(matches!(
            ConfigurationBundle::from_bytes(&bytes),
            Err(ProtocolError::UnexpectedDescriptorType { .. })
        ));
    }

    #[test]
    fn test_descriptor_iter_zero_length() {
        let mut iter = DescriptorIter::new(&[0x00, 0x02, 0x00]);
        assert!(matches!(
            iter.next(),
            Some(Err(ProtocolError::InvalidLength { .. }))
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_wrong_type_rejected() {
        let endpoint = sample_bundle().endpoints[0].to_bytes();
        assert_eq!(
            InterfaceDescriptor::from_bytes(&[
                9,
                descriptor_type::ENDPOINT,
                0,
                0,
                0,
                0,
                0,
                0,
                0
            ]),
            Err(ProtocolError::UnexpectedDescriptorType {
                expected: descriptor_type::INTERFACE,
                found: descriptor_type::ENDPOINT
            })
        );
        assert!(EndpointDescriptor::from_bytes(&endpoint).is_ok());
    }

    #[test]
    fn test_string_descriptor_text() {
        let descriptor = StringDescriptor::text("USBProxy");
        assert_eq!(descriptor.len(), 2 + 2 * 8);
        assert_eq!(descriptor.as_bytes()[0] as usize, descriptor.len());
        assert_eq!(descriptor.as_bytes()[1], descriptor_type::STRING);
        assert_eq!(descriptor.to_string_lossy(), "USBProxy");
    }

    #[test]
    fn test_language_descriptor() {
        let descriptor = StringDescriptor::default_languages();
        assert_eq!(descriptor.as_bytes(), &[0x04, 0x03, 0x09, 0x04]);
        assert_eq!(descriptor.units(), vec![LANGUAGE_ID_EN_US]);
    }

    #[test]
    fn test_string_descriptor_capped() {
        let long = "x".repeat(300);
        let descriptor = StringDescriptor::text(&long);
        assert_eq!(descriptor.len(), 2 + 2 * MAX_STRING_UNITS);
        assert!(descriptor.len() <= u8::MAX as usize);
    }

    #[test]
    fn test_string_descriptor_parse() {
        let descriptor = StringDescriptor::text("802.11");
        let parsed = StringDescriptor::from_bytes(descriptor.as_bytes()).unwrap();
        assert_eq!(parsed, descriptor);
        assert!(StringDescriptor::from_bytes(&[0x05, 0x03, 0x00, 0x00, 0x00]).is_err());
    }
}
