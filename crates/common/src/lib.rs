//! Common utilities for the 802.11 control device
//!
//! This crate provides shared functionality between the emulated device and
//! the host-side utility, including error handling, logging setup and the
//! wireless interface control capability with its backends.

pub mod controller;
pub mod error;
pub mod logging;
#[cfg(feature = "lorcon")]
pub mod lorcon;
pub mod simulated;
pub mod test_utils;

pub use controller::{
    ControllerBackend, ControllerError, ControllerResult, InterfaceController, datalink,
};
pub use error::{Error, Result};
pub use logging::setup_logging;
#[cfg(feature = "lorcon")]
pub use lorcon::{LorconBackend, LorconController};
pub use simulated::{SimulatedBackend, SimulatedController, SimulatedState};
