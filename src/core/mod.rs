//! # Core Module
//!
//! The GUI-agnostic archival engine.
//!
//! ## Modules
//! - `config` - Loads settings from TOML config files
//! - `scanner` - Walks input directories in a stable order
//! - `dispatcher` - Detects media kind from file content
//! - `metadata` - Derives dates, device and name attributes
//! - `fingerprint` - Exact and perceptual content identity
//! - `policy` - Per-kind rules for metadata and fingerprints
//! - `registry` - Persistent fingerprint buckets
//! - `naming` - Output templates and collision handling
//! - `archive` - Copies files into the archive
//! - `engine` - Orchestrates the full workflow

pub mod archive;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod fingerprint;
pub mod media;
pub mod metadata;
pub mod naming;
pub mod policy;
pub mod registry;
pub mod scanner;

// Re-export commonly used types
pub use config::Settings;
pub use engine::{ArchiveEngine, EngineBuilder, FileOutcome};
pub use fingerprint::{Fingerprint, FingerprintPolicy};
pub use media::{MediaFile, MediaKind};
pub use metadata::{DateSource, ResolvedAttributes};
