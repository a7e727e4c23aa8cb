//! Wire protocol for the 802.11 control device
//!
//! This crate defines everything that crosses the USB link between the
//! emulated 802.11 control device and the host-side utility: the control
//! setup packet, standard descriptor records, the vendor command table and
//! the little-endian integer payload codec.
//!
//! # Example
//!
//! ```
//! use protocol::{SetupPacket, VendorRequest, Direction, decode_i32, encode_i32};
//!
//! // Host asks for the current channel
//! let request = VendorRequest::GetChannel;
//! let setup = SetupPacket::vendor(request.direction(), request.code(), 4);
//! assert_eq!(setup.direction(), Direction::DeviceToHost);
//!
//! // Device answers with a 4-byte little-endian integer
//! let reply = encode_i32(6);
//! assert_eq!(decode_i32(&reply).unwrap(), 6);
//! ```

pub mod codec;
pub mod descriptors;
pub mod error;
pub mod requests;
pub mod setup;
pub mod types;

pub use codec::{INT_SIZE, clamp_response, decode_i32, encode_i32, hex_string};
pub use descriptors::{
    ConfigurationBundle, ConfigurationDescriptor, DescriptorIter, DeviceDescriptor,
    EndpointDescriptor, InterfaceDescriptor, MAX_STRING_UNITS, StringDescriptor,
};
pub use error::{ProtocolError, Result};
pub use requests::{
    CLASS_HID, CONFIG_ATT_ONE, CONFIG_ATT_SELFPOWER, ENDPOINT_DIR_IN, ENDPOINT_XFER_INT,
    LANGUAGE_ID_EN_US, VENDOR_IN, VENDOR_OUT, VendorRequest, descriptor_type, standard_request,
};
pub use setup::{Direction, Recipient, RequestKind, SETUP_PACKET_SIZE, SetupPacket};
pub use types::{InjectionMode, MAC_ADDRESS_LEN, MacAddress};
