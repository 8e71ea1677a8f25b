use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

const CHECKSUM_BUFFER_SIZE: usize = 4 * 1024;

/// Streams a file through Adler-32. Only the low 32 bits of the spec's
/// conceptual accumulator are significant, matching this crate's native
/// `u32` result.
pub fn adler32(path: &Path) -> io::Result<u32> {
    let file = File::open(path)?;
    let reader = BufReader::with_capacity(CHECKSUM_BUFFER_SIZE, file);
    adler32::adler32(reader)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn matches_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikipedia");
        fs::write(&path, b"Wikipedia").unwrap();
        // Adler-32("Wikipedia") = 0x11E60398, the textbook example value.
        assert_eq!(adler32(&path).unwrap(), 0x11E6_0398);
    }

    #[test]
    fn identical_content_same_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"the quick brown fox").unwrap();
        fs::write(&b, b"the quick brown fox").unwrap();
        assert_eq!(adler32(&a).unwrap(), adler32(&b).unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(adler32(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn large_file_spanning_buffer_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let content = vec![0x7Au8; CHECKSUM_BUFFER_SIZE * 5 + 3];
        fs::write(&a, &content).unwrap();
        fs::write(&b, &content).unwrap();
        assert_eq!(adler32(&a).unwrap(), adler32(&b).unwrap());
    }
}
