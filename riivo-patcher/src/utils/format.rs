//! Formatting utilities

use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format bytes as upper-case hex, the way manifests write them
pub fn format_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(4_699_979_776), "4.70 GB");
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x38, 0x60, 0x00, 0x01]), "38600001");
        assert_eq!(format_hex(&[]), "");
    }
}
