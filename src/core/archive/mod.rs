//! # Archive Module
//!
//! Copies media into the archive.
//!
//! The writer creates the destination directory tree, refuses to replace an
//! existing entry, copies the bytes, then carries over permissions and the
//! access/modification times of the source. A failed copy removes the
//! partial destination so a retry sees a free slot again.

mod writer;

pub use writer::ArchiveWriter;
