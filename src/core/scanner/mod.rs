//! # Scanner Module
//!
//! Lists the files under the input directories.
//!
//! ## Order
//! Traversal is depth-first and entries are sorted by file name within each
//! directory, so a run over the same tree always visits files in the same
//! order. This matters for collision suffixes: the first file to claim a
//! name keeps it.
//!
//! Every regular file is returned, hidden or not, whatever its extension.
//! Content detection decides later what is media.
//!
//! ## Example
//! ```rust,ignore
//! use photo_archiver::core::scanner::{ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan_root(Path::new("/media/card/DCIM"), &null_sender())?;
//! ```

mod walker;

pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use std::path::PathBuf;

/// Files found under one root
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Regular files in traversal order
    pub files: Vec<PathBuf>,
    /// Entries that could not be read
    pub errors: Vec<ScanError>,
}
