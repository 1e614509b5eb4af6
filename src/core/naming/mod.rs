//! # Naming Module
//!
//! Turns resolved attributes into archive paths.
//!
//! ## Templates
//! Templates use `{name}` placeholders for attribute keys, with `{{` and `}}`
//! for literal braces:
//!
//! ```text
//! {user}/{yyyy_}/{yyyy_}-{mm_}-{dd_}/{yyyy}{mm}{dd}_{HH}{MM}{SS}_{model}_{base}{id}.{ext}
//! ```
//!
//! Placeholders are checked when a template is parsed, so an unknown name
//! is a configuration error rather than a per-file failure.
//!
//! ## Collisions
//! [`PathResolver`] tries the disambiguation ids `""`, `"a"` .. `"z"` in
//! order and returns the first rendered path that does not exist yet. When
//! all 27 are taken it reports [`FileError::OutputSlotsExhausted`].
//!
//! [`FileError::OutputSlotsExhausted`]: crate::error::FileError::OutputSlotsExhausted

mod resolver;
mod template;

pub use resolver::{PathResolver, DISAMBIGUATION_IDS};
pub use template::{NamingTemplate, Segment};
