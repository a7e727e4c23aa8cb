//! Wireless interface control capability
//!
//! The device proxy never talks to an injection library directly. It goes
//! through [`InterfaceController`], which covers exactly the operations the
//! vendor command set needs, and obtains controllers from a
//! [`ControllerBackend`] when the proxy connects.

use protocol::{InjectionMode, MacAddress};
use thiserror::Error;

/// Errors reported by a controller or backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The underlying library returned a negative status
    #[error("{operation} failed ({code}): {message}")]
    Library {
        operation: &'static str,
        code: i32,
        message: String,
    },

    /// No driver could be matched to the interface
    #[error("Could not determine the driver for {0}")]
    NoDriver(String),

    /// The library refused to create a context for the interface
    #[error("Failed to create context for {0}")]
    ContextCreation(String),

    /// Backend not compiled into this build
    #[error("Backend '{0}' is not available in this build")]
    Unavailable(String),
}

impl ControllerError {
    /// Negative status to report to the host for this failure
    pub fn code(&self) -> i32 {
        match self {
            Self::Library { code, .. } if *code < 0 => *code,
            _ => -1,
        }
    }
}

pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

/// Operations on an attached wireless interface
///
/// Status-returning calls yield the library's non-negative status on
/// success. Calls are issued in whatever order the host sends them.
pub trait InterfaceController {
    /// Create the virtual interface for `mode`
    fn open(&mut self, mode: InjectionMode) -> ControllerResult<i32>;

    /// Name of the virtual interface created by the last successful open
    fn vap_name(&self) -> Option<String>;

    fn timeout(&self) -> i32;

    fn set_timeout(&mut self, timeout_ms: i32);

    /// Interface packets are captured from
    fn capture_interface(&self) -> String;

    fn driver_name(&self) -> String;

    /// Current datalink type (DLT_*)
    fn datalink(&self) -> i32;

    fn set_datalink(&mut self, datalink: i32) -> ControllerResult<i32>;

    fn channel(&self) -> i32;

    fn set_channel(&mut self, channel: i32) -> ControllerResult<i32>;

    fn hardware_mac(&self) -> ControllerResult<MacAddress>;

    fn set_hardware_mac(&mut self, mac: MacAddress) -> ControllerResult<i32>;

    /// Install a WEP key for traffic to/from `bssid`
    fn add_wep_key(&mut self, bssid: MacAddress, key: &[u8]) -> ControllerResult<i32>;

    /// Tear down the virtual interface
    fn close(&mut self);
}

/// Factory for controllers bound to a named interface
pub trait ControllerBackend {
    fn name(&self) -> &'static str;

    /// Discover the driver for `interface` and create a context for it
    fn attach(&self, interface: &str) -> ControllerResult<Box<dyn InterfaceController>>;
}

/// Link-layer types used with 802.11 capture
pub mod datalink {
    /// DLT_IEEE802_11: bare 802.11 frames
    pub const IEEE802_11: i32 = 105;
    /// DLT_PRISM_HEADER
    pub const PRISM_HEADER: i32 = 119;
    /// DLT_IEEE802_11_RADIO: radiotap header + 802.11
    pub const IEEE802_11_RADIO: i32 = 127;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = ControllerError::Library {
            operation: "set_channel",
            code: -22,
            message: "invalid channel".to_string(),
        };
        assert_eq!(err.code(), -22);
        assert!(err.to_string().contains("set_channel failed (-22)"));

        assert_eq!(ControllerError::NoDriver("wlan0".into()).code(), -1);
        assert_eq!(
            ControllerError::Library {
                operation: "x",
                code: 3,
                message: String::new(),
            }
            .code(),
            -1
        );
    }
}
