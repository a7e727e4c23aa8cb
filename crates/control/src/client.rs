//! Vendor command client
//!
//! Each method issues exactly one control transfer with `wValue` and
//! `wIndex` set to zero.

use crate::config::ControlSettings;
use crate::error::{ControlError, Result};
use crate::transport::ControlTransport;
use protocol::{
    DeviceDescriptor, Direction, INT_SIZE, InjectionMode, LANGUAGE_ID_EN_US, MAC_ADDRESS_LEN,
    MacAddress, StringDescriptor, VendorRequest, decode_i32, descriptor_type, encode_i32,
    standard_request,
};
use std::time::Duration;
use tracing::{debug, error};

/// Largest reply any string command can produce
const STRING_BUFFER_SIZE: usize = 255;

pub struct Dot11Control<T> {
    transport: T,
    timeout: Duration,
    open_timeout: Duration,
}

impl<T: ControlTransport> Dot11Control<T> {
    pub fn new(transport: T, timeout: Duration, open_timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            open_timeout,
        }
    }

    pub fn from_settings(transport: T, settings: &ControlSettings) -> Self {
        Self::new(transport, settings.timeout(), settings.open_timeout())
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Create a VAP in `mode`, returning the library status
    pub fn open(&mut self, mode: InjectionMode) -> Result<i32> {
        let request = mode.request();
        let reply = self.read(request, INT_SIZE, self.open_timeout)?;
        int_reply(request, &reply)
    }

    pub fn open_inject(&mut self) -> Result<i32> {
        self.open(InjectionMode::Inject)
    }

    pub fn open_monitor(&mut self) -> Result<i32> {
        self.open(InjectionMode::Monitor)
    }

    pub fn open_inject_monitor(&mut self) -> Result<i32> {
        self.open(InjectionMode::InjectMonitor)
    }

    pub fn set_timeout(&mut self, timeout_ms: i32) -> Result<()> {
        self.write(VendorRequest::SetTimeout, &encode_i32(timeout_ms))
    }

    pub fn get_timeout(&mut self) -> Result<i32> {
        self.read_int(VendorRequest::GetTimeout)
    }

    pub fn capture_interface(&mut self) -> Result<String> {
        self.read_string(VendorRequest::GetCaptureInterface)
    }

    pub fn driver_name(&mut self) -> Result<String> {
        self.read_string(VendorRequest::GetDriverName)
    }

    pub fn close(&mut self) -> Result<()> {
        self.write(VendorRequest::Close, &[])
    }

    pub fn get_datalink(&mut self) -> Result<i32> {
        self.read_int(VendorRequest::GetDatalink)
    }

    pub fn set_datalink(&mut self, datalink: i32) -> Result<()> {
        self.write(VendorRequest::SetDatalink, &encode_i32(datalink))
    }

    pub fn get_channel(&mut self) -> Result<i32> {
        self.read_int(VendorRequest::GetChannel)
    }

    pub fn set_channel(&mut self, channel: i32) -> Result<()> {
        self.write(VendorRequest::SetChannel, &encode_i32(channel))
    }

    pub fn get_hardware_mac(&mut self) -> Result<MacAddress> {
        let request = VendorRequest::GetHardwareMac;
        let reply = self.read(request, MAC_ADDRESS_LEN, self.timeout)?;
        if reply.len() < MAC_ADDRESS_LEN {
            return Err(ControlError::ShortResponse {
                request,
                expected: MAC_ADDRESS_LEN,
                received: reply.len(),
            });
        }
        Ok(MacAddress::try_from(reply.as_slice())?)
    }

    pub fn set_hardware_mac(&mut self, mac: MacAddress) -> Result<()> {
        self.write(VendorRequest::SetHardwareMac, mac.as_bytes())
    }

    /// Install a WEP key for `bssid`
    pub fn add_wep_key(&mut self, bssid: MacAddress, key: &[u8]) -> Result<()> {
        let mut data = Vec::with_capacity(MAC_ADDRESS_LEN + key.len());
        data.extend_from_slice(bssid.as_bytes());
        data.extend_from_slice(key);
        self.write(VendorRequest::AddWepKey, &data)
    }

    /// Read the standard device descriptor
    pub fn device_descriptor(&mut self) -> Result<DeviceDescriptor> {
        let reply = self.get_descriptor(
            descriptor_type::DEVICE,
            0,
            0,
            DeviceDescriptor::SIZE,
        )?;
        Ok(DeviceDescriptor::from_bytes(&reply)?)
    }

    /// Read string descriptor `index` in US English
    pub fn string_descriptor(&mut self, index: u8) -> Result<String> {
        let reply = self.get_descriptor(
            descriptor_type::STRING,
            index,
            LANGUAGE_ID_EN_US,
            STRING_BUFFER_SIZE,
        )?;
        Ok(StringDescriptor::from_bytes(&reply)?.to_string_lossy())
    }

    fn get_descriptor(
        &mut self,
        descriptor: u8,
        index: u8,
        language_id: u16,
        length: usize,
    ) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        let value = (u16::from(descriptor) << 8) | u16::from(index);
        let len = self
            .transport
            .read_control(
                0x80,
                standard_request::GET_DESCRIPTOR,
                value,
                language_id,
                &mut buf,
                self.timeout,
            )
            .inspect_err(|e| error!("GET_DESCRIPTOR {:#06x} failed: {}", value, e))?;
        buf.truncate(len);
        Ok(buf)
    }

    fn read(&mut self, request: VendorRequest, length: usize, timeout: Duration) -> Result<Vec<u8>> {
        debug_assert_eq!(request.direction(), Direction::DeviceToHost);
        let mut buf = vec![0u8; length];
        let len = self
            .transport
            .read_control(
                protocol::VENDOR_IN,
                request.code(),
                0,
                0,
                &mut buf,
                timeout,
            )
            .inspect_err(|e| error!("{} failed: {}", request, e))?;
        buf.truncate(len);
        debug!("{} <- {} bytes", request, len);
        Ok(buf)
    }

    fn write(&mut self, request: VendorRequest, data: &[u8]) -> Result<()> {
        debug_assert_eq!(request.direction(), Direction::HostToDevice);
        let len = self
            .transport
            .write_control(protocol::VENDOR_OUT, request.code(), 0, 0, data, self.timeout)
            .inspect_err(|e| error!("{} failed: {}", request, e))?;
        debug!("{} -> {} bytes", request, len);
        Ok(())
    }

    fn read_int(&mut self, request: VendorRequest) -> Result<i32> {
        let reply = self.read(request, INT_SIZE, self.timeout)?;
        int_reply(request, &reply)
    }

    fn read_string(&mut self, request: VendorRequest) -> Result<String> {
        let reply = self.read(request, STRING_BUFFER_SIZE, self.timeout)?;
        Ok(String::from_utf8_lossy(&reply).into_owned())
    }
}

fn int_reply(request: VendorRequest, reply: &[u8]) -> Result<i32> {
    decode_i32(reply).map_err(|_| ControlError::ShortResponse {
        request,
        expected: INT_SIZE,
        received: reply.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Records every transfer and answers IN requests from a queue
    #[derive(Default)]
    struct ScriptedTransport {
        replies: VecDeque<rusb::Result<Vec<u8>>>,
        sent: Vec<(u8, u8, Vec<u8>, Duration)>,
    }

    impl ControlTransport for ScriptedTransport {
        fn read_control(
            &mut self,
            request_type: u8,
            request: u8,
            _value: u16,
            _index: u16,
            buf: &mut [u8],
            timeout: Duration,
        ) -> rusb::Result<usize> {
            self.sent.push((request_type, request, Vec::new(), timeout));
            let reply = self.replies.pop_front().unwrap_or(Err(rusb::Error::Pipe))?;
            let len = reply.len().min(buf.len());
            buf[..len].copy_from_slice(&reply[..len]);
            Ok(len)
        }

        fn write_control(
            &mut self,
            request_type: u8,
            request: u8,
            _value: u16,
            _index: u16,
            buf: &[u8],
            timeout: Duration,
        ) -> rusb::Result<usize> {
            self.sent.push((request_type, request, buf.to_vec(), timeout));
            Ok(buf.len())
        }
    }

    fn client(replies: Vec<rusb::Result<Vec<u8>>>) -> Dot11Control<ScriptedTransport> {
        let transport = ScriptedTransport {
            replies: replies.into(),
            ..Default::default()
        };
        Dot11Control::new(
            transport,
            Duration::from_millis(1000),
            Duration::from_millis(20000),
        )
    }

    #[test]
    fn test_open_uses_long_timeout() {
        let mut control = client(vec![Ok(encode_i32(0).to_vec())]);
        assert_eq!(control.open_inject_monitor().unwrap(), 0);

        let sent = control.into_inner().sent;
        assert_eq!(sent[0].0, 0xc0);
        assert_eq!(sent[0].1, VendorRequest::OpenInjectMonitor.code());
        assert_eq!(sent[0].3, Duration::from_millis(20000));
    }

    #[test]
    fn test_set_channel_encoding() {
        let mut control = client(vec![]);
        control.set_channel(0x0102_0304).unwrap();

        let sent = control.into_inner().sent;
        assert_eq!(sent[0].0, 0x40);
        assert_eq!(sent[0].1, VendorRequest::SetChannel.code());
        assert_eq!(sent[0].2, vec![0x04, 0x03, 0x02, 0x01]);
        assert_eq!(sent[0].3, Duration::from_millis(1000));
    }

    #[test]
    fn test_short_int_reply() {
        let mut control = client(vec![Ok(vec![6])]);
        assert!(matches!(
            control.get_channel(),
            Err(ControlError::ShortResponse {
                request: VendorRequest::GetChannel,
                expected: 4,
                received: 1,
            })
        ));
    }

    #[test]
    fn test_transfer_error() {
        let mut control = client(vec![Err(rusb::Error::Timeout)]);
        assert!(matches!(
            control.get_timeout(),
            Err(ControlError::Usb(rusb::Error::Timeout))
        ));
    }

    #[test]
    fn test_string_reply() {
        let mut control = client(vec![Ok(b"wlan0mon".to_vec())]);
        assert_eq!(control.capture_interface().unwrap(), "wlan0mon");
    }

    #[test]
    fn test_wep_key_payload() {
        let mut control = client(vec![]);
        let bssid: MacAddress = "00:11:22:33:44:55".parse().unwrap();
        control.add_wep_key(bssid, &[1, 2, 3, 4, 5]).unwrap();

        let sent = control.into_inner().sent;
        assert_eq!(sent[0].2, vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 1, 2, 3, 4, 5]);
    }
}
