//! Exact-identity fingerprints (SHA-256).

use super::{Fingerprint, FingerprintPolicy, Fingerprinter};
use crate::error::FingerprintError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read block size (64 KiB)
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Streams the file through SHA-256 and hex-encodes the digest
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactFingerprinter;

impl ExactFingerprinter {
    pub fn new() -> Self {
        Self
    }

    /// Digest any byte stream, reading it in [`BLOCK_SIZE`] blocks
    pub fn digest_reader<R: Read>(mut reader: R) -> std::io::Result<Fingerprint> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; BLOCK_SIZE];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..n]);
        }

        Ok(Fingerprint::new(hex::encode(hasher.finalize())))
    }
}

impl Fingerprinter for ExactFingerprinter {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        let read_error = |source| FingerprintError::Read {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(read_error)?;
        Self::digest_reader(file).map_err(read_error)
    }

    fn policy(&self) -> FingerprintPolicy {
        FingerprintPolicy::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(contents).unwrap();
        path
    }

    #[test]
    fn empty_input_has_known_digest() {
        let fingerprint = ExactFingerprinter::digest_reader(&b""[..]).unwrap();
        assert_eq!(
            fingerprint.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn identical_content_matches_regardless_of_name() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "IMG_0001.JPG", b"same bytes");
        let b = write_file(&dir, "copy.jpg", b"same bytes");

        let fingerprinter = ExactFingerprinter::new();
        assert_eq!(
            fingerprinter.fingerprint(&a).unwrap(),
            fingerprinter.fingerprint(&b).unwrap()
        );
    }

    #[test]
    fn different_content_differs() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"first");
        let b = write_file(&dir, "b.bin", b"second");

        let fingerprinter = ExactFingerprinter::new();
        assert_ne!(
            fingerprinter.fingerprint(&a).unwrap(),
            fingerprinter.fingerprint(&b).unwrap()
        );
    }

    #[test]
    fn content_spanning_several_blocks_is_hashed_fully() {
        let dir = TempDir::new().unwrap();
        let mut contents = vec![7u8; BLOCK_SIZE * 2 + 10];
        let a = write_file(&dir, "a.bin", &contents);
        contents[BLOCK_SIZE * 2 + 5] = 8;
        let b = write_file(&dir, "b.bin", &contents);

        let fingerprinter = ExactFingerprinter::new();
        assert_ne!(
            fingerprinter.fingerprint(&a).unwrap(),
            fingerprinter.fingerprint(&b).unwrap()
        );
    }

    #[test]
    fn missing_file_is_read_error() {
        let result = ExactFingerprinter::new().fingerprint(Path::new("/nonexistent/a.bin"));
        assert!(matches!(result, Err(FingerprintError::Read { .. })));
    }
}
