//! Hex counter files (`serial`, `crlnumber`).
//!
//! Counters are lowercase hex, zero-padded to at least two digits and to
//! an even number of digits so the string stays byte-aligned as it grows
//! (`02` … `ff`, then `0100`), with a trailing newline on disk.

use std::path::Path;

use crate::{write_atomic, StoreError, MODE_PUBLIC};

/// Format a counter value as its on-disk / display hex form.
pub fn format_serial(value: u64) -> String {
    let mut s = format!("{value:02x}");
    if s.len() % 2 != 0 {
        s.insert(0, '0');
    }
    s
}

/// Format a big-endian serial from raw DER integer bytes.
///
/// Leading zero bytes (DER sign padding) are stripped; the result keeps
/// the same even-width form as `format_serial`.
pub fn format_serial_bytes(raw: &[u8]) -> String {
    let stripped: &[u8] = {
        let mut bytes = raw;
        while bytes.len() > 1 && bytes[0] == 0 {
            bytes = &bytes[1..];
        }
        bytes
    };
    if stripped.is_empty() {
        return "00".to_string();
    }
    let mut s = String::with_capacity(stripped.len() * 2);
    for b in stripped {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

/// The file content for a counter value.
pub fn counter_bytes(value: u64) -> Vec<u8> {
    let mut bytes = format_serial(value).into_bytes();
    bytes.push(b'\n');
    bytes
}

/// Read a counter file: trim whitespace, parse as hex.
pub fn read_counter(path: &Path) -> Result<u64, StoreError> {
    let raw = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let trimmed = raw.trim();
    u64::from_str_radix(trimmed, 16).map_err(|_| StoreError::CounterParse {
        path: path.to_path_buf(),
        value: trimmed.to_string(),
    })
}

/// Write a counter value through the atomic replace primitive.
pub fn write_counter(path: &Path, value: u64) -> Result<(), StoreError> {
    write_atomic(path, &counter_bytes(value), MODE_PUBLIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("carp-counter-{name}-{nanos}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn format_pads_to_two_digits() {
        assert_eq!(format_serial(1), "01");
        assert_eq!(format_serial(2), "02");
        assert_eq!(format_serial(0x0a), "0a");
        assert_eq!(format_serial(0xff), "ff");
    }

    #[test]
    fn format_grows_byte_aligned_past_ff() {
        assert_eq!(format_serial(0x100), "0100");
        assert_eq!(format_serial(0x1ab), "01ab");
        assert_eq!(format_serial(0x10000), "010000");
    }

    #[test]
    fn format_bytes_strips_der_sign_padding() {
        assert_eq!(format_serial_bytes(&[0x01]), "01");
        assert_eq!(format_serial_bytes(&[0x00, 0xff]), "ff");
        assert_eq!(format_serial_bytes(&[0x01, 0x00]), "0100");
        assert_eq!(format_serial_bytes(&[0x00]), "00");
    }

    #[test]
    fn counter_round_trip() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("serial");

        for value in [1u64, 2, 0xff, 0x100, 0xdead] {
            write_counter(&path, value).unwrap();
            assert_eq!(read_counter(&path).unwrap(), value);
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_counter_trims_whitespace() {
        let dir = temp_dir("trim");
        let path = dir.join("serial");
        std::fs::write(&path, "  0a \n").unwrap();
        assert_eq!(read_counter(&path).unwrap(), 10);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_counter_rejects_garbage() {
        let dir = temp_dir("garbage");
        let path = dir.join("serial");
        std::fs::write(&path, "zz\n").unwrap();
        let err = read_counter(&path).unwrap_err();
        assert!(matches!(err, StoreError::CounterParse { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn on_disk_form_has_trailing_newline() {
        assert_eq!(counter_bytes(2), b"02\n");
        assert_eq!(counter_bytes(0x100), b"0100\n");
    }
}
