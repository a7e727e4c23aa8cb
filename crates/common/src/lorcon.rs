//! liblorcon2 backend
//!
//! Thin FFI layer over the LORCON packet injection library. Only compiled
//! with the `lorcon` feature, which links against `liborcon2`.

use crate::controller::{
    ControllerBackend, ControllerError, ControllerResult, InterfaceController,
};
use protocol::{InjectionMode, MAC_ADDRESS_LEN, MacAddress};
use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::ptr::NonNull;
use tracing::debug;

#[repr(C)]
struct LorconDriver {
    _private: [u8; 0],
}

#[repr(C)]
struct LorconContext {
    _private: [u8; 0],
}

#[link(name = "orcon2")]
unsafe extern "C" {
    fn lorcon_auto_driver(interface: *const c_char) -> *mut LorconDriver;
    fn lorcon_free_driver_list(list: *mut LorconDriver);
    fn lorcon_create(interface: *const c_char, driver: *mut LorconDriver) -> *mut LorconContext;
    fn lorcon_free(context: *mut LorconContext);
    fn lorcon_get_error(context: *mut LorconContext) -> *const c_char;

    fn lorcon_open_inject(context: *mut LorconContext) -> c_int;
    fn lorcon_open_monitor(context: *mut LorconContext) -> c_int;
    fn lorcon_open_injmon(context: *mut LorconContext) -> c_int;
    fn lorcon_close(context: *mut LorconContext);

    fn lorcon_get_vap(context: *mut LorconContext) -> *const c_char;
    fn lorcon_get_capiface(context: *mut LorconContext) -> *const c_char;
    fn lorcon_get_driver_name(context: *mut LorconContext) -> *const c_char;

    fn lorcon_get_timeout(context: *mut LorconContext) -> c_int;
    fn lorcon_set_timeout(context: *mut LorconContext, timeout: c_int);
    fn lorcon_get_datalink(context: *mut LorconContext) -> c_int;
    fn lorcon_set_datalink(context: *mut LorconContext, dlt: c_int) -> c_int;
    fn lorcon_get_channel(context: *mut LorconContext) -> c_int;
    fn lorcon_set_channel(context: *mut LorconContext, channel: c_int) -> c_int;

    fn lorcon_get_hwmac(context: *mut LorconContext, mac: *mut *mut u8) -> c_int;
    fn lorcon_set_hwmac(context: *mut LorconContext, mac_len: c_int, mac: *mut u8) -> c_int;
    fn lorcon_add_wepkey(
        context: *mut LorconContext,
        bssid: *mut u8,
        key: *mut u8,
        length: c_int,
    ) -> c_int;
}

unsafe extern "C" {
    fn free(ptr: *mut c_void);
}

/// Copy a library-owned C string, treating NULL as empty
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn owned_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Controller wrapping a live `lorcon_t` context
pub struct LorconController {
    context: NonNull<LorconContext>,
}

impl LorconController {
    fn raw(&self) -> *mut LorconContext {
        self.context.as_ptr()
    }

    fn last_error(&self) -> String {
        unsafe { owned_string(lorcon_get_error(self.raw())) }
    }

    fn status(&self, operation: &'static str, rv: c_int) -> ControllerResult<i32> {
        if rv < 0 {
            Err(ControllerError::Library {
                operation,
                code: rv,
                message: self.last_error(),
            })
        } else {
            Ok(rv)
        }
    }
}

impl InterfaceController for LorconController {
    fn open(&mut self, mode: InjectionMode) -> ControllerResult<i32> {
        let rv = unsafe {
            match mode {
                InjectionMode::Inject => lorcon_open_inject(self.raw()),
                InjectionMode::Monitor => lorcon_open_monitor(self.raw()),
                InjectionMode::InjectMonitor => lorcon_open_injmon(self.raw()),
            }
        };
        self.status("open", rv)
    }

    fn vap_name(&self) -> Option<String> {
        let vap = unsafe { owned_string(lorcon_get_vap(self.raw())) };
        (!vap.is_empty()).then_some(vap)
    }

    fn timeout(&self) -> i32 {
        unsafe { lorcon_get_timeout(self.raw()) }
    }

    fn set_timeout(&mut self, timeout_ms: i32) {
        unsafe { lorcon_set_timeout(self.raw(), timeout_ms) }
    }

    fn capture_interface(&self) -> String {
        unsafe { owned_string(lorcon_get_capiface(self.raw())) }
    }

    fn driver_name(&self) -> String {
        unsafe { owned_string(lorcon_get_driver_name(self.raw())) }
    }

    fn datalink(&self) -> i32 {
        unsafe { lorcon_get_datalink(self.raw()) }
    }

    fn set_datalink(&mut self, datalink: i32) -> ControllerResult<i32> {
        let rv = unsafe { lorcon_set_datalink(self.raw(), datalink) };
        self.status("set_datalink", rv)
    }

    fn channel(&self) -> i32 {
        unsafe { lorcon_get_channel(self.raw()) }
    }

    fn set_channel(&mut self, channel: i32) -> ControllerResult<i32> {
        let rv = unsafe { lorcon_set_channel(self.raw(), channel) };
        self.status("set_channel", rv)
    }

    fn hardware_mac(&self) -> ControllerResult<MacAddress> {
        let mut mac: *mut u8 = std::ptr::null_mut();
        let rv = unsafe { lorcon_get_hwmac(self.raw(), &mut mac) };
        self.status("get_hwmac", rv)?;
        if mac.is_null() || (rv as usize) < MAC_ADDRESS_LEN {
            return Err(ControllerError::Library {
                operation: "get_hwmac",
                code: -1,
                message: format!("driver returned {} address bytes", rv),
            });
        }

        // The driver allocates the address buffer and hands ownership to us.
        let mut octets = [0u8; MAC_ADDRESS_LEN];
        unsafe {
            std::ptr::copy_nonoverlapping(mac, octets.as_mut_ptr(), MAC_ADDRESS_LEN);
            free(mac.cast());
        }
        Ok(MacAddress(octets))
    }

    fn set_hardware_mac(&mut self, mac: MacAddress) -> ControllerResult<i32> {
        let mut octets = mac.octets();
        let rv = unsafe {
            lorcon_set_hwmac(self.raw(), MAC_ADDRESS_LEN as c_int, octets.as_mut_ptr())
        };
        self.status("set_hwmac", rv)
    }

    fn add_wep_key(&mut self, bssid: MacAddress, key: &[u8]) -> ControllerResult<i32> {
        let mut bssid = bssid.octets();
        let mut key = key.to_vec();
        let rv = unsafe {
            lorcon_add_wepkey(
                self.raw(),
                bssid.as_mut_ptr(),
                key.as_mut_ptr(),
                key.len() as c_int,
            )
        };
        self.status("add_wepkey", rv)
    }

    fn close(&mut self) {
        unsafe { lorcon_close(self.raw()) }
    }
}

impl Drop for LorconController {
    fn drop(&mut self) {
        debug!("Freeing LORCON context");
        unsafe { lorcon_free(self.raw()) }
    }
}

/// Backend that resolves drivers with `lorcon_auto_driver`
#[derive(Debug, Default, Clone, Copy)]
pub struct LorconBackend;

impl ControllerBackend for LorconBackend {
    fn name(&self) -> &'static str {
        "lorcon"
    }

    fn attach(&self, interface: &str) -> ControllerResult<Box<dyn InterfaceController>> {
        let c_interface = CString::new(interface)
            .map_err(|_| ControllerError::NoDriver(interface.to_string()))?;

        let driver = unsafe { lorcon_auto_driver(c_interface.as_ptr()) };
        if driver.is_null() {
            return Err(ControllerError::NoDriver(interface.to_string()));
        }

        let context = unsafe { lorcon_create(c_interface.as_ptr(), driver) };
        // The context keeps its own copy of the driver entry.
        unsafe { lorcon_free_driver_list(driver) };

        let context = NonNull::new(context)
            .ok_or_else(|| ControllerError::ContextCreation(interface.to_string()))?;
        debug!("Created LORCON context for {}", interface);

        Ok(Box::new(LorconController { context }))
    }
}
