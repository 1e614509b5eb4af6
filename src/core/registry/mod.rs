//! # Registry Module
//!
//! Remembers which content is already archived.
//!
//! ## Layout
//! The registry is partitioned into buckets. A bucket is one JSON object file
//! (rendered from the checksum-file template) mapping fingerprints to the
//! archived path:
//!
//! ```json
//! { "<fingerprint>": "/archive/alice/2019/20190714_180233_canon_eos_5d_img_0001.jpg" }
//! ```
//!
//! Fingerprints are only compared within one bucket, so buckets holding
//! different fingerprint policies never mix.
//!
//! ## Durability
//! - Every read-modify-write of a bucket runs under a per-bucket lock.
//! - The new contents go to a temporary file in the bucket directory, are
//!   synced, then renamed over the old file. A crash leaves either the old
//!   or the new bucket, never a partial one.
//! - A bucket that fails to parse is reported as corrupted and left as is.
//! - Entries are not re-validated: a path that was later deleted still
//!   counts as archived.

mod bucket;

pub use bucket::FingerprintRegistry;
