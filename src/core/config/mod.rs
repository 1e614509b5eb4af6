//! # Config Module
//!
//! Loads the run configuration.
//!
//! ## Files
//! Configuration is TOML, one table per section. For each of
//! `photorganyze.toml` and then `photorganyze_local.toml`, the first copy
//! found in the current directory, the home directory or
//! `<config dir>/photorganyze` is read. The local file overrides the main
//! one key by key.
//!
//! ```toml
//! [output]
//! directory = "~/Pictures/archive"
//! file_name = "{user}/{yyyy}/{yyyy}{mm}{dd}_{HH}{MM}{SS}_{model}_{base}{id}.{ext}"
//! checksum_file = "{user}/checksums.json"
//! user = "alice"
//!
//! [input]
//! default_directories = ["/media/card/DCIM"]
//! follow_symlinks = false
//! max_depth = 0              # 0 walks every level
//!
//! [fingerprint]
//! image_policy = "exact"     # or "perceptual"
//!
//! [naming]
//! night_shift_hours = 5
//!
//! [log]
//! file_name = "~/archive.log"
//! ```
//!
//! [`ConfigStore`] answers typed `(key, section)` lookups with fallbacks;
//! [`Settings`] is the validated object the engine is built from.

mod settings;
mod store;

pub use settings::{
    validate_night_shift, Settings, DEFAULT_CHECKSUM_TEMPLATE, DEFAULT_FILE_TEMPLATE, DEFAULT_OUTPUT_DIRECTORY,
    DEFAULT_USER,
};
pub use store::{config_locations, expand_tilde, ConfigStore, CONFIG_FILE_NAMES};

use crate::error::ConfigError;

/// Discover config files and build [`Settings`]
pub fn load_settings() -> Result<Settings, ConfigError> {
    Settings::from_store(&ConfigStore::discover()?)
}
