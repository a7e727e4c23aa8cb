//! Integer payload codec for vendor commands
//!
//! Integer arguments and results travel as 32-bit little-endian values in
//! a 4-byte data stage:
//! ```text
//! [value & 0xff][(value >> 8) & 0xff][(value >> 16) & 0xff][(value >> 24) & 0xff]
//! ```

use crate::error::{ProtocolError, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Size of an encoded integer
pub const INT_SIZE: usize = 4;

/// Encode a 32-bit integer into its 4-byte wire form
///
/// # Example
/// ```
/// use protocol::encode_i32;
///
/// assert_eq!(encode_i32(0x0102_0304), [0x04, 0x03, 0x02, 0x01]);
/// assert_eq!(encode_i32(-1), [0xff; 4]);
/// ```
pub fn encode_i32(value: i32) -> [u8; INT_SIZE] {
    let mut out = [0u8; INT_SIZE];
    LittleEndian::write_i32(&mut out, value);
    out
}

/// Decode a 32-bit integer from the first 4 bytes of `bytes`
///
/// # Example
/// ```
/// use protocol::{decode_i32, encode_i32};
///
/// let bytes = encode_i32(20000);
/// assert_eq!(decode_i32(&bytes).unwrap(), 20000);
/// assert!(decode_i32(&bytes[..3]).is_err());
/// ```
pub fn decode_i32(bytes: &[u8]) -> Result<i32> {
    if bytes.len() < INT_SIZE {
        return Err(ProtocolError::Truncated {
            needed: INT_SIZE,
            available: bytes.len(),
        });
    }
    Ok(LittleEndian::read_i32(&bytes[..INT_SIZE]))
}

/// Clamp a response to the host's requested length
pub fn clamp_response(mut data: Vec<u8>, requested: u16) -> Vec<u8> {
    let requested = usize::from(requested);
    if data.len() > requested {
        data.truncate(requested);
    }
    data
}

/// Render bytes as space-separated lowercase hex
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_masks_each_byte() {
        // Each byte must carry the shifted value, not a 0/1 truth value.
        assert_eq!(encode_i32(20000), [0x20, 0x4e, 0x00, 0x00]);
        assert_eq!(encode_i32(0x7f00_ff01), [0x01, 0xff, 0x00, 0x7f]);
    }

    #[test]
    fn test_decode_negative() {
        assert_eq!(decode_i32(&[0xfe, 0xff, 0xff, 0xff]).unwrap(), -2);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        assert_eq!(decode_i32(&[6, 0, 0, 0, 0xaa]).unwrap(), 6);
    }

    #[test]
    fn test_clamp_response() {
        assert_eq!(clamp_response(vec![1, 2, 3], 2), vec![1, 2]);
        assert_eq!(clamp_response(vec![1, 2, 3], 64), vec![1, 2, 3]);
        assert!(clamp_response(vec![1, 2, 3], 0).is_empty());
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[0x12, 0x01, 0xff]), "12 01 ff");
        assert_eq!(hex_string(&[]), "");
    }
}
