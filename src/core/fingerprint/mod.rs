//! # Fingerprint Module
//!
//! Computes the content identity used for deduplication.
//!
//! ## Policies
//! - **Exact** - SHA-256 over the file bytes. Two files match only when they
//!   are byte-identical. Used for every media kind.
//! - **Perceptual** - three image hashes (mean, horizontal gradient, vertical
//!   gradient) over the decoded pixels. Re-encoded or converted copies of a
//!   still image match. Images only.
//!
//! The active image policy is chosen per run from configuration and reported
//! at startup; videos are always fingerprinted exactly.
//!
//! ## Example
//! ```rust,ignore
//! use photo_archiver::core::fingerprint::FingerprintPolicy;
//!
//! let fingerprinter = FingerprintPolicy::Exact.build();
//! let fingerprint = fingerprinter.fingerprint(&path)?;
//! ```

mod exact;
mod perceptual;

pub use exact::{ExactFingerprinter, BLOCK_SIZE};
pub use perceptual::PerceptualFingerprinter;

use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Opaque content identity: a hex digest or concatenated perceptual codes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Duplicate-detection policy for still images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintPolicy {
    /// Byte-identical content only
    #[default]
    Exact,
    /// Visually near-identical images
    Perceptual,
}

impl FingerprintPolicy {
    /// Build the fingerprinter for this policy
    pub fn build(self) -> Box<dyn Fingerprinter> {
        match self {
            FingerprintPolicy::Exact => Box::new(ExactFingerprinter::new()),
            FingerprintPolicy::Perceptual => Box::new(PerceptualFingerprinter::new()),
        }
    }
}

impl std::fmt::Display for FingerprintPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FingerprintPolicy::Exact => write!(f, "exact"),
            FingerprintPolicy::Perceptual => write!(f, "perceptual"),
        }
    }
}

impl FromStr for FingerprintPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(FingerprintPolicy::Exact),
            "perceptual" => Ok(FingerprintPolicy::Perceptual),
            other => Err(format!(
                "unknown fingerprint policy '{}' (expected 'exact' or 'perceptual')",
                other
            )),
        }
    }
}

/// Computes a fingerprint for a file
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FingerprintError>;

    /// The policy this fingerprinter implements
    fn policy(&self) -> FingerprintPolicy;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults_to_exact() {
        assert_eq!(FingerprintPolicy::default(), FingerprintPolicy::Exact);
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Perceptual".parse(), Ok(FingerprintPolicy::Perceptual));
        assert_eq!(" exact ".parse(), Ok(FingerprintPolicy::Exact));
        assert!("fuzzy".parse::<FingerprintPolicy>().is_err());
    }

    #[test]
    fn build_matches_policy() {
        assert_eq!(FingerprintPolicy::Exact.build().policy(), FingerprintPolicy::Exact);
        assert_eq!(
            FingerprintPolicy::Perceptual.build().policy(),
            FingerprintPolicy::Perceptual
        );
    }

    #[test]
    fn fingerprint_serializes_as_plain_string() {
        let json = serde_json::to_string(&Fingerprint::new("abc123")).unwrap();
        assert_eq!(json, "\"abc123\"");
    }
}
