//! Event type definitions for progress reporting.

use crate::core::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the archive engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Input directory traversal
    Scan(ScanEvent),
    /// Per-file outcomes
    File(FileEvent),
    /// Run-level events
    Run(RunEvent),
}

/// Events while walking an input directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Walking a root has started
    Started { root: PathBuf },
    /// A requested root does not exist; it is skipped
    RootMissing { root: PathBuf },
    /// An entry could not be read but walking continues
    Error { path: PathBuf, message: String },
    /// A root was walked
    Completed { root: PathBuf, files: usize },
}

/// What happened to one input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FileEvent {
    /// Content type detected
    Classified {
        path: PathBuf,
        kind: MediaKind,
        mime: Option<String>,
    },
    /// Copied into the archive
    Archived {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Same content already archived; nothing written
    Duplicate { source: PathBuf, existing: PathBuf },
    /// No policy for this content
    Ignored { path: PathBuf, mime: Option<String> },
    /// Processing failed; the run continues
    Failed { path: PathBuf, message: String },
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    /// Run has started
    Started {
        roots: Vec<PathBuf>,
        output_dir: PathBuf,
        image_policy: String,
    },
    /// Run finished
    Completed { summary: RunSummary },
}

/// Counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files copied into the archive
    pub archived: usize,
    /// Files skipped because their content was already archived
    pub duplicates: usize,
    /// Files with no matching media kind
    pub ignored: usize,
    /// Files that failed
    pub failed: usize,
    /// Input roots that did not exist
    pub roots_missing: usize,
    /// One message per failure
    pub errors: Vec<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Number of files seen across all roots
    pub fn total_files(&self) -> usize {
        self.archived + self.duplicates + self.ignored + self.failed
    }
}
