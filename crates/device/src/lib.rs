//! 802.11 control device proxy plugin
//!
//! Emulates a USB HID device whose vendor control requests drive a wireless
//! packet injection library. The proxy framework creates the device with
//! [`create_device_proxy`], calls [`DeviceProxy::connect`] once, and then
//! feeds it control requests.
//!
//! # Example
//!
//! ```
//! use device::{DeviceProxy, ProxyConfig, create_device_proxy, destroy_device_proxy};
//! use protocol::{SetupPacket, VendorRequest, decode_i32};
//! use std::time::Duration;
//!
//! let mut config = ProxyConfig::default();
//! config.dot11.backend = "simulated".to_string();
//! config.dot11.interface = "wlan0".to_string();
//!
//! let mut proxy = create_device_proxy(&config).unwrap();
//! proxy.connect(Duration::from_secs(1)).unwrap();
//!
//! let request = VendorRequest::GetChannel;
//! let setup = SetupPacket::vendor(request.direction(), request.code(), 4);
//! let reply = proxy.control_request(&setup, &[]).unwrap();
//! assert_eq!(decode_i32(&reply).unwrap(), 1);
//!
//! destroy_device_proxy(proxy);
//! ```

pub mod config;
pub mod descriptors;
pub mod dot11;
pub mod plugin;
pub mod proxy;
pub mod vendor;

pub use config::{INTERFACE_KEY, ProxyConfig};
pub use descriptors::{DescriptorTable, DeviceIdentity};
pub use dot11::Dot11DeviceProxy;
pub use plugin::{create_backend, create_device_proxy, destroy_device_proxy};
pub use proxy::{ControlError, DeviceProxy};
