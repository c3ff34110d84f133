//! ISO/IEC 7816-4 padding to a fixed target length.
//!
//! Append a single `0x80` byte, then zero-fill to `target_len`. Unlike PKCS#7, the padding byte
//! carries no length information, so unpadding scans from the end for the marker instead of
//! reading a count byte.

use crate::error::{Error, Result};

/// Pads `data` to exactly `target_len` bytes. `data.len()` must be strictly less than
/// `target_len`, since at least the `0x80` marker byte is always appended.
pub fn pad(data: &[u8], target_len: usize) -> Result<Vec<u8>> {
    if data.len() >= target_len {
        return Err(Error::CipherChunkSize { expected: target_len - 1, actual: data.len() });
    }
    let mut out = Vec::with_capacity(target_len);
    out.extend_from_slice(data);
    out.push(0x80);
    out.resize(target_len, 0);
    Ok(out)
}

/// Reverses `pad`: strips trailing zero bytes, then the `0x80` marker.
pub fn unpad(data: &[u8]) -> Result<Vec<u8>> {
    let mut end = data.len();
    while end > 0 && data[end - 1] == 0 {
        end -= 1;
    }
    if end == 0 || data[end - 1] != 0x80 {
        return Err(Error::CipherPadding);
    }
    Ok(data[..end - 1].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_then_unpad_round_trips() {
        let data = b"hello world";
        let padded = pad(data, 32).unwrap();
        assert_eq!(padded.len(), 32);
        assert_eq!(unpad(&padded).unwrap(), data);
    }

    #[test]
    fn full_length_chunk_still_gets_marker_byte() {
        let data = [5u8; 16];
        let padded = pad(&data, 17).unwrap();
        assert_eq!(padded, [5u8, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 0x80]);
    }

    #[test]
    fn unpad_rejects_missing_marker() {
        let err = unpad(&[0u8; 8]).unwrap_err();
        assert!(matches!(err, Error::CipherPadding));
    }

    #[test]
    fn pad_rejects_oversized_input() {
        let err = pad(&[0u8; 10], 10).unwrap_err();
        assert!(matches!(err, Error::CipherChunkSize { .. }));
    }
}
