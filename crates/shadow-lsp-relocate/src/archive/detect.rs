use std::io::{self, Read};
use std::path::Path;

/// Local file header, or end of central directory for an archive without entries.
pub fn is_zip(data: &[u8]) -> bool {
    matches!(data, [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..])
}

pub fn is_zip_file(path: impl AsRef<Path>) -> io::Result<bool> {
    let mut header = [0u8; 4];
    let mut file = std::fs::File::open(path)?;
    match file.read_exact(&mut header) {
        Ok(()) => Ok(is_zip(&header)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_local_file_header() {
        assert!(is_zip(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]));
    }

    #[test]
    fn test_detect_empty_archive() {
        assert!(is_zip(&[0x50, 0x4B, 0x05, 0x06, 0x00, 0x00]));
    }

    #[test]
    fn test_detect_unknown_format() {
        assert!(!is_zip(&[0xDE, 0xAD, 0xBE, 0xEF]));
        assert!(!is_zip(&[0x1F, 0x8B, 0x08, 0x00]));
    }

    #[test]
    fn test_detect_truncated_header() {
        assert!(!is_zip(&[0x50, 0x4B]));
    }

    #[test]
    fn test_detect_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.jar");
        std::fs::write(&path, b"PK").unwrap();
        assert!(!is_zip_file(&path).unwrap());
    }
}
