//! # Engine Module
//!
//! Runs the archive workflow over input directories.
//!
//! ## Per-file Stages
//! 1. **Dispatch** - detect the media kind from content; no policy means ignored
//! 2. **Resolve** - derive date, device and name attributes
//! 3. **Fingerprint** - exact or perceptual content identity
//! 4. **Lookup** - a fingerprint already in the bucket is a duplicate
//! 5. **Name** - render the output path and pick a free disambiguation id
//! 6. **Write** - copy the file with its timestamps
//! 7. **Record** - add the fingerprint to the bucket
//!
//! Files are processed one at a time in scan order. A failure in any stage
//! is reported for that file and the run moves on.

mod executor;

pub use executor::{ArchiveEngine, EngineBuilder, EngineConfig};

use crate::core::fingerprint::Fingerprint;
use std::path::PathBuf;

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Copied into the archive and recorded
    Archived {
        source: PathBuf,
        destination: PathBuf,
        fingerprint: Fingerprint,
    },
    /// Content already archived at `existing`
    Duplicate { source: PathBuf, existing: PathBuf },
    /// Not a supported media kind
    Ignored {
        source: PathBuf,
        mime: Option<String>,
    },
}
