//! Host-side control for the 802.11 control device
//!
//! Sends the device's vendor commands over a USB control pipe. The
//! [`Dot11Control`] client works over any [`ControlTransport`]; a `rusb`
//! device handle from [`open_device`] is the usual one.

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::Dot11Control;
pub use config::{COMMAND_TIMEOUT_MS, ControlConfig, DEFAULT_TIMEOUT_MS};
pub use error::{ControlError, Result};
pub use transport::{ControlTransport, open_device};
