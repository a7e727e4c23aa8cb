//! Test utilities for the 802.11 control device
//!
//! Fakes for the failure paths that [`SimulatedBackend`](crate::SimulatedBackend)
//! never takes.
//!
//! # Example
//!
//! ```
//! use common::test_utils::FailingBackend;
//! use common::ControllerBackend;
//!
//! let backend = FailingBackend::no_driver();
//! assert!(backend.attach("wlan0").is_err());
//! ```

use crate::controller::{
    ControllerBackend, ControllerError, ControllerResult, InterfaceController,
};
use protocol::{InjectionMode, MacAddress};

/// BSSID used across tests
pub const TEST_BSSID: MacAddress = MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

/// Backend whose attach always fails
pub struct FailingBackend {
    error: ControllerError,
}

impl FailingBackend {
    /// Driver discovery fails
    pub fn no_driver() -> Self {
        Self {
            error: ControllerError::NoDriver("test".to_string()),
        }
    }

    /// Context creation fails
    pub fn no_context() -> Self {
        Self {
            error: ControllerError::ContextCreation("test".to_string()),
        }
    }
}

impl ControllerBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn attach(&self, _interface: &str) -> ControllerResult<Box<dyn InterfaceController>> {
        Err(self.error.clone())
    }
}

/// Backend handing out [`FailingController`]s
pub struct FailingControllerBackend {
    pub code: i32,
}

impl ControllerBackend for FailingControllerBackend {
    fn name(&self) -> &'static str {
        "failing-controller"
    }

    fn attach(&self, _interface: &str) -> ControllerResult<Box<dyn InterfaceController>> {
        Ok(Box::new(FailingController { code: self.code }))
    }
}

/// Controller whose status-returning calls all fail with `code`
pub struct FailingController {
    pub code: i32,
}

impl FailingController {
    fn fail<T>(&self, operation: &'static str) -> ControllerResult<T> {
        Err(ControllerError::Library {
            operation,
            code: self.code,
            message: "simulated failure".to_string(),
        })
    }
}

impl InterfaceController for FailingController {
    fn open(&mut self, _mode: InjectionMode) -> ControllerResult<i32> {
        self.fail("open")
    }

    fn vap_name(&self) -> Option<String> {
        None
    }

    fn timeout(&self) -> i32 {
        0
    }

    fn set_timeout(&mut self, _timeout_ms: i32) {}

    fn capture_interface(&self) -> String {
        String::new()
    }

    fn driver_name(&self) -> String {
        "failing".to_string()
    }

    fn datalink(&self) -> i32 {
        self.code
    }

    fn set_datalink(&mut self, _datalink: i32) -> ControllerResult<i32> {
        self.fail("set_datalink")
    }

    fn channel(&self) -> i32 {
        self.code
    }

    fn set_channel(&mut self, _channel: i32) -> ControllerResult<i32> {
        self.fail("set_channel")
    }

    fn hardware_mac(&self) -> ControllerResult<MacAddress> {
        self.fail("get_hwmac")
    }

    fn set_hardware_mac(&mut self, _mac: MacAddress) -> ControllerResult<i32> {
        self.fail("set_hwmac")
    }

    fn add_wep_key(&mut self, _bssid: MacAddress, _key: &[u8]) -> ControllerResult<i32> {
        self.fail("add_wepkey")
    }

    fn close(&mut self) {}
}
