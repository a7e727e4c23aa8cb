//! In-memory wireless interface
//!
//! Stands in for a real injection library when no hardware is present.
//! The backend and every controller it hands out share one
//! [`SimulatedState`], so the state stays observable after the controller
//! has been moved into a device proxy.

use crate::controller::{
    ControllerBackend, ControllerError, ControllerResult, InterfaceController, datalink,
};
use protocol::{InjectionMode, MacAddress};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Status reported for rejected arguments (-EINVAL)
pub const EINVAL: i32 = -22;

/// Default timeout, in milliseconds
pub const DEFAULT_TIMEOUT_MS: i32 = 1000;

/// Driver name reported by simulated interfaces
pub const DRIVER_NAME: &str = "simulated";

/// Everything a simulated interface remembers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedState {
    pub interface: String,
    pub mode: Option<InjectionMode>,
    pub vap: Option<String>,
    pub timeout_ms: i32,
    pub channel: i32,
    pub datalink: i32,
    pub mac: MacAddress,
    pub wep_keys: Vec<(MacAddress, Vec<u8>)>,
    pub open_count: u32,
    pub close_count: u32,
}

impl Default for SimulatedState {
    fn default() -> Self {
        Self {
            interface: String::new(),
            mode: None,
            vap: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            channel: 1,
            datalink: datalink::IEEE802_11_RADIO,
            // Locally administered unicast address
            mac: MacAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
            wep_keys: Vec::new(),
            open_count: 0,
            close_count: 0,
        }
    }
}

fn is_valid_channel(channel: i32) -> bool {
    (1..=14).contains(&channel) || (36..=165).contains(&channel)
}

fn invalid(operation: &'static str, message: String) -> ControllerError {
    ControllerError::Library {
        operation,
        code: EINVAL,
        message,
    }
}

/// Controller backed by [`SimulatedState`]
pub struct SimulatedController {
    state: Rc<RefCell<SimulatedState>>,
}

impl InterfaceController for SimulatedController {
    fn open(&mut self, mode: InjectionMode) -> ControllerResult<i32> {
        let mut state = self.state.borrow_mut();
        let vap = format!("{}mon", state.interface);
        debug!("Simulated open {:?} on {}", mode, state.interface);
        state.mode = Some(mode);
        state.vap = Some(vap);
        state.open_count += 1;
        Ok(0)
    }

    fn vap_name(&self) -> Option<String> {
        self.state.borrow().vap.clone()
    }

    fn timeout(&self) -> i32 {
        self.state.borrow().timeout_ms
    }

    fn set_timeout(&mut self, timeout_ms: i32) {
        self.state.borrow_mut().timeout_ms = timeout_ms;
    }

    fn capture_interface(&self) -> String {
        let state = self.state.borrow();
        state.vap.clone().unwrap_or_else(|| state.interface.clone())
    }

    fn driver_name(&self) -> String {
        DRIVER_NAME.to_string()
    }

    fn datalink(&self) -> i32 {
        self.state.borrow().datalink
    }

    fn set_datalink(&mut self, dlt: i32) -> ControllerResult<i32> {
        match dlt {
            datalink::IEEE802_11 | datalink::PRISM_HEADER | datalink::IEEE802_11_RADIO => {
                self.state.borrow_mut().datalink = dlt;
                Ok(0)
            }
            _ => Err(invalid(
                "set_datalink",
                format!("unsupported datalink type {}", dlt),
            )),
        }
    }

    fn channel(&self) -> i32 {
        self.state.borrow().channel
    }

    fn set_channel(&mut self, channel: i32) -> ControllerResult<i32> {
        if !is_valid_channel(channel) {
            return Err(invalid("set_channel", format!("invalid channel {}", channel)));
        }
        self.state.borrow_mut().channel = channel;
        Ok(0)
    }

    fn hardware_mac(&self) -> ControllerResult<MacAddress> {
        Ok(self.state.borrow().mac)
    }

    fn set_hardware_mac(&mut self, mac: MacAddress) -> ControllerResult<i32> {
        if mac.octets()[0] & 0x01 != 0 {
            return Err(invalid(
                "set_hwmac",
                format!("{} is a multicast address", mac),
            ));
        }
        self.state.borrow_mut().mac = mac;
        Ok(0)
    }

    fn add_wep_key(&mut self, bssid: MacAddress, key: &[u8]) -> ControllerResult<i32> {
        // WEP-40 and WEP-104
        if key.len() != 5 && key.len() != 13 {
            return Err(invalid(
                "add_wepkey",
                format!("invalid WEP key length {}", key.len()),
            ));
        }
        self.state.borrow_mut().wep_keys.push((bssid, key.to_vec()));
        Ok(0)
    }

    fn close(&mut self) {
        let mut state = self.state.borrow_mut();
        state.mode = None;
        state.vap = None;
        state.close_count += 1;
    }
}

/// Backend handing out [`SimulatedController`]s
#[derive(Default, Clone)]
pub struct SimulatedBackend {
    state: Rc<RefCell<SimulatedState>>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose interface starts with `mac`
    pub fn with_mac(mac: MacAddress) -> Self {
        let backend = Self::default();
        backend.state.borrow_mut().mac = mac;
        backend
    }

    /// Copy of the current shared state
    pub fn snapshot(&self) -> SimulatedState {
        self.state.borrow().clone()
    }
}

impl ControllerBackend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn attach(&self, interface: &str) -> ControllerResult<Box<dyn InterfaceController>> {
        if interface.is_empty() {
            return Err(ControllerError::NoDriver(interface.to_string()));
        }
        self.state.borrow_mut().interface = interface.to_string();
        Ok(Box::new(SimulatedController {
            state: Rc::clone(&self.state),
        }))
    }
}
