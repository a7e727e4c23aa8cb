//! Control transfer transport
//!
//! [`ControlTransport`] is the one USB operation the control utility needs.
//! A real `rusb` device handle implements it directly.

use crate::error::{ControlError, Result};
use rusb::{Context, DeviceHandle, UsbContext};
use std::time::Duration;
use tracing::debug;

/// Synchronous control transfers on endpoint 0
pub trait ControlTransport {
    /// Run an IN transfer, returning the number of bytes placed in `buf`
    fn read_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;

    /// Run an OUT transfer, returning the number of bytes sent
    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;
}

impl<T: UsbContext> ControlTransport for DeviceHandle<T> {
    fn read_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::read_control(self, request_type, request, value, index, buf, timeout)
    }

    fn write_control(
        &mut self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::write_control(self, request_type, request, value, index, buf, timeout)
    }
}

/// Open the first device matching `vendor_id:product_id`
pub fn open_device(vendor_id: u16, product_id: u16) -> Result<DeviceHandle<Context>> {
    let context = Context::new()?;
    let handle = context
        .open_device_with_vid_pid(vendor_id, product_id)
        .ok_or(ControlError::DeviceNotFound {
            vendor_id,
            product_id,
        })?;
    debug!("Opened device {:04x}:{:04x}", vendor_id, product_id);
    Ok(handle)
}
