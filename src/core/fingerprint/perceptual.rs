//! Perceptual fingerprints for still images.
//!
//! Three hashes from the image_hasher crate are computed over the decoded
//! pixels and joined with `-`:
//! - Mean (aHash) - brightness against the image average
//! - Gradient (dHash) - horizontal brightness gradients
//! - VertGradient - vertical brightness gradients
//!
//! Re-encoding, format conversion and mild resizing leave all three
//! unchanged, so such copies count as duplicates.

use super::{Fingerprint, FingerprintPolicy, Fingerprinter};
use crate::error::FingerprintError;
use image::{DynamicImage, ImageReader};
use image_hasher::{HashAlg, Hasher, HasherConfig as ImageHasherConfig};
use std::path::Path;

const HASH_SIZE: u32 = 8;

/// Composite perceptual fingerprinter
pub struct PerceptualFingerprinter {
    hashers: [Hasher; 3],
}

impl PerceptualFingerprinter {
    pub fn new() -> Self {
        let hasher = |alg| {
            ImageHasherConfig::new()
                .hash_size(HASH_SIZE, HASH_SIZE)
                .hash_alg(alg)
                .to_hasher()
        };

        Self {
            hashers: [
                hasher(HashAlg::Mean),
                hasher(HashAlg::Gradient),
                hasher(HashAlg::VertGradient),
            ],
        }
    }

    /// Fingerprint an already decoded image
    pub fn fingerprint_image(&self, image: &DynamicImage) -> Fingerprint {
        let codes: Vec<String> = self
            .hashers
            .iter()
            .map(|hasher| hex::encode(hasher.hash_image(image).as_bytes()))
            .collect();
        Fingerprint::new(codes.join("-"))
    }
}

impl Default for PerceptualFingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter for PerceptualFingerprinter {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| FingerprintError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let image = reader.decode().map_err(|e| FingerprintError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(self.fingerprint_image(&image))
    }

    fn policy(&self) -> FingerprintPolicy {
        FingerprintPolicy::Perceptual
    }
}
