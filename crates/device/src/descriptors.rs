//! Descriptor table of the 802.11 control device
//!
//! Built once from a [`DeviceIdentity`] when the proxy is constructed and
//! never modified afterwards.

use crate::proxy::ControlError;
use protocol::{
    CLASS_HID, CONFIG_ATT_ONE, CONFIG_ATT_SELFPOWER, ConfigurationBundle,
    ConfigurationDescriptor, DeviceDescriptor, ENDPOINT_DIR_IN, ENDPOINT_XFER_INT,
    EndpointDescriptor, InterfaceDescriptor, LANGUAGE_ID_EN_US, SetupPacket, StringDescriptor,
    clamp_response, descriptor_type,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_VENDOR_ID: u16 = 0xffff;
pub const DEFAULT_PRODUCT_ID: u16 = 0x0005;

pub const STRING_MANUFACTURER: u8 = 1;
pub const STRING_PRODUCT: u8 = 2;
pub const STRING_SERIAL: u8 = 3;
pub const STRING_DOT11: u8 = 4;

/// Interrupt endpoint number used in both directions
pub const DATA_ENDPOINT: u8 = 1;
const MAX_PACKET_SIZE: u16 = 64;
const POLL_INTERVAL: u8 = 10;

/// Identity the device reports to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: String,
    pub product: String,
    pub serial: String,
    pub configuration: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            manufacturer: "USBProxy".to_string(),
            product: "802.11 HID Device".to_string(),
            serial: "0001".to_string(),
            configuration: "802.11".to_string(),
        }
    }
}

/// Device, configuration and string descriptors
#[derive(Debug, Clone)]
pub struct DescriptorTable {
    device: DeviceDescriptor,
    configuration: ConfigurationBundle,
    /// Index 0 is the language table
    strings: Vec<StringDescriptor>,
}

impl DescriptorTable {
    pub fn new(identity: &DeviceIdentity) -> Self {
        debug!(
            "V: {:04x} P: {:04x}",
            identity.vendor_id, identity.product_id
        );

        let device = DeviceDescriptor {
            usb_version: 0x0100,
            device_class: CLASS_HID,
            device_subclass: 0,
            device_protocol: 0,
            max_packet_size0: 64,
            vendor_id: identity.vendor_id,
            product_id: identity.product_id,
            device_version: 0,
            manufacturer_index: STRING_MANUFACTURER,
            product_index: STRING_PRODUCT,
            serial_number_index: STRING_SERIAL,
            num_configurations: 1,
        };

        let configuration = ConfigurationBundle::new(
            ConfigurationDescriptor {
                total_length: 0,
                num_interfaces: 1,
                configuration_value: 1,
                configuration_index: STRING_DOT11,
                attributes: CONFIG_ATT_ONE | CONFIG_ATT_SELFPOWER,
                max_power: 1,
            },
            InterfaceDescriptor {
                interface_number: 0,
                alternate_setting: 0,
                num_endpoints: 0,
                interface_class: CLASS_HID,
                interface_subclass: 0,
                interface_protocol: 0,
                interface_index: STRING_DOT11,
            },
            vec![
                EndpointDescriptor {
                    address: ENDPOINT_DIR_IN | DATA_ENDPOINT,
                    attributes: ENDPOINT_XFER_INT,
                    max_packet_size: MAX_PACKET_SIZE,
                    interval: POLL_INTERVAL,
                },
                EndpointDescriptor {
                    address: DATA_ENDPOINT,
                    attributes: ENDPOINT_XFER_INT,
                    max_packet_size: MAX_PACKET_SIZE,
                    interval: POLL_INTERVAL,
                },
            ],
        );

        let strings = vec![
            StringDescriptor::default_languages(),
            StringDescriptor::text(&identity.manufacturer),
            StringDescriptor::text(&identity.product),
            StringDescriptor::text(&identity.serial),
            StringDescriptor::text(&identity.configuration),
        ];

        Self {
            device,
            configuration,
            strings,
        }
    }

    pub fn device(&self) -> &DeviceDescriptor {
        &self.device
    }

    pub fn configuration(&self) -> &ConfigurationBundle {
        &self.configuration
    }

    pub fn string(&self, index: u8) -> Option<&StringDescriptor> {
        self.strings.get(usize::from(index))
    }

    /// Highest valid string index
    pub fn max_string_index(&self) -> u8 {
        (self.strings.len() - 1) as u8
    }

    /// Whether `index` (wIndex of an interface request) names an interface
    pub fn has_interface(&self, index: u16) -> bool {
        index == u16::from(self.configuration.interface.interface_number)
    }

    /// Whether `index` (wIndex of an endpoint request) names an endpoint
    ///
    /// The default control pipe answers in both directions.
    pub fn has_endpoint(&self, index: u16) -> bool {
        let Ok(address) = u8::try_from(index) else {
            return false;
        };
        address & !ENDPOINT_DIR_IN == 0
            || self
                .configuration
                .endpoints
                .iter()
                .any(|endpoint| endpoint.address == address)
    }

    /// Answer a GET_DESCRIPTOR request
    pub fn get_descriptor(&self, setup: &SetupPacket) -> Result<Vec<u8>, ControlError> {
        let index = setup.descriptor_index();
        let data = match setup.descriptor_type() {
            descriptor_type::DEVICE => self.device.to_bytes().to_vec(),
            descriptor_type::CONFIGURATION => {
                if index >= self.device.num_configurations {
                    debug!("Configuration index {} out of range", index);
                    return Err(ControlError::Stall);
                }
                self.configuration.to_bytes()
            }
            descriptor_type::STRING => {
                if index > 0 && setup.index != LANGUAGE_ID_EN_US {
                    debug!("Unsupported language {:#06x}", setup.index);
                    return Err(ControlError::Stall);
                }
                match self.string(index) {
                    Some(string) => string.as_bytes().to_vec(),
                    None => {
                        debug!("String index {} out of range", index);
                        return Err(ControlError::Stall);
                    }
                }
            }
            // Full-speed only
            descriptor_type::DEVICE_QUALIFIER | descriptor_type::OTHER_SPEED_CONFIGURATION => {
                return Err(ControlError::Stall);
            }
            other => {
                debug!("Unknown descriptor type {:#04x}", other);
                return Err(ControlError::Stall);
            }
        };

        Ok(clamp_response(data, setup.length))
    }
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self::new(&DeviceIdentity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(descriptor: u8, index: u8, language: u16, length: u16) -> Result<Vec<u8>, ControlError> {
        DescriptorTable::default().get_descriptor(&SetupPacket::get_descriptor(
            descriptor, index, language, length,
        ))
    }

    #[test]
    fn test_device_descriptor() {
        let bytes = get(descriptor_type::DEVICE, 0, 0, 64).unwrap();
        assert_eq!(bytes.len(), DeviceDescriptor::SIZE);
        let device = DeviceDescriptor::from_bytes(&bytes).unwrap();
        assert_eq!(device.vendor_id, 0xffff);
        assert_eq!(device.product_id, 0x0005);
        assert_eq!(device.device_class, CLASS_HID);
    }

    #[test]
    fn test_device_descriptor_short_read() {
        let bytes = get(descriptor_type::DEVICE, 0, 0, 8).unwrap();
        assert_eq!(bytes, &DescriptorTable::default().device().to_bytes()[..8]);
    }

    #[test]
    fn test_configuration_header_only() {
        let bytes = get(descriptor_type::CONFIGURATION, 0, 0, 9).unwrap();
        let header = ConfigurationDescriptor::from_bytes(&bytes).unwrap();
        assert_eq!(header.total_length, 32);
        assert_eq!(header.attributes, 0xc0);
    }

    #[test]
    fn test_configuration_out_of_range() {
        assert!(matches!(
            get(descriptor_type::CONFIGURATION, 1, 0, 255),
            Err(ControlError::Stall)
        ));
    }

    #[test]
    fn test_string_language_table_ignores_language_id() {
        let a = get(descriptor_type::STRING, 0, 0, 255).unwrap();
        let b = get(descriptor_type::STRING, 0, 0x0407, 255).unwrap();
        assert_eq!(a, vec![0x04, 0x03, 0x09, 0x04]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_string_lookup() {
        let bytes = get(descriptor_type::STRING, STRING_PRODUCT, 0x0409, 255).unwrap();
        let string = StringDescriptor::from_bytes(&bytes).unwrap();
        assert_eq!(string.to_string_lossy(), "802.11 HID Device");
    }

    #[test]
    fn test_string_stalls() {
        assert!(get(descriptor_type::STRING, 1, 0x0407, 255).is_err());
        assert!(get(descriptor_type::STRING, 5, 0x0409, 255).is_err());
        assert_eq!(DescriptorTable::default().max_string_index(), STRING_DOT11);
    }

    #[test]
    fn test_high_speed_descriptors_stall() {
        assert!(get(descriptor_type::DEVICE_QUALIFIER, 0, 0, 10).is_err());
        assert!(get(descriptor_type::OTHER_SPEED_CONFIGURATION, 0, 0, 255).is_err());
        assert!(get(0x22, 0, 0, 255).is_err());
    }

    #[test]
    fn test_custom_identity() {
        let identity = DeviceIdentity {
            vendor_id: 0x1d50,
            product_id: 0x6002,
            serial: "42".to_string(),
            ..DeviceIdentity::default()
        };
        let table = DescriptorTable::new(&identity);
        assert_eq!(table.device().vendor_id, 0x1d50);
        assert_eq!(
            table
                .string(STRING_SERIAL)
                .map(|s| s.to_string_lossy())
                .as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_known_interfaces_and_endpoints() {
        let table = DescriptorTable::default();
        assert!(table.has_interface(0));
        assert!(!table.has_interface(1));

        for address in [0x00, 0x80, 0x01, 0x81] {
            assert!(table.has_endpoint(address), "{:#04x}", address);
        }
        for address in [0x02, 0x82, 0x0101] {
            assert!(!table.has_endpoint(address), "{:#04x}", address);
        }
    }
}
