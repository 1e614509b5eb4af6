//! The run configuration handed to the engine.

use super::store::{expand_tilde, ConfigStore};
use crate::core::fingerprint::FingerprintPolicy;
use crate::core::metadata::DEFAULT_NIGHT_SHIFT_HOURS;
use crate::core::naming::NamingTemplate;
use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIRECTORY: &str = "~/Pictures/archive";
pub const DEFAULT_FILE_TEMPLATE: &str =
    "{user}/{yyyy_}/{yyyy_}-{mm_}-{dd_}/{yyyy}{mm}{dd}_{HH}{MM}{SS}_{model}_{base}{id}.{ext}";
pub const DEFAULT_CHECKSUM_TEMPLATE: &str = "{user}/checksums.json";
pub const DEFAULT_USER: &str = "default";

/// Largest accepted night shift, in either direction
const MAX_NIGHT_SHIFT_HOURS: i64 = 24;

/// Explicit, immutable run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Archive root
    pub output_dir: PathBuf,
    /// Naming template for archived files, relative to `output_dir`
    pub file_template: String,
    /// Template for registry bucket files, relative to `output_dir`
    pub checksum_template: String,
    pub user: String,
    /// Roots used when none are given on the command line
    pub default_directories: Vec<PathBuf>,
    /// Follow symbolic links while walking input directories
    pub follow_symlinks: bool,
    /// Deepest directory level walked below each root; `None` is unlimited
    pub max_depth: Option<usize>,
    pub log_file: Option<PathBuf>,
    pub image_policy: FingerprintPolicy,
    pub night_shift_hours: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: expand_tilde(DEFAULT_OUTPUT_DIRECTORY),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
            checksum_template: DEFAULT_CHECKSUM_TEMPLATE.to_string(),
            user: default_user(),
            default_directories: Vec::new(),
            follow_symlinks: false,
            max_depth: None,
            log_file: None,
            image_policy: FingerprintPolicy::default(),
            night_shift_hours: DEFAULT_NIGHT_SHIFT_HOURS,
        }
    }
}

impl Settings {
    /// Read and validate settings. Unset keys keep their defaults.
    pub fn from_store(store: &ConfigStore) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let file_template = store.get_str("file_name", "output", DEFAULT_FILE_TEMPLATE)?;
        validate_template(&file_template, "output", "file_name")?;
        let checksum_template =
            store.get_str("checksum_file", "output", DEFAULT_CHECKSUM_TEMPLATE)?;
        validate_template(&checksum_template, "output", "checksum_file")?;

        let image_policy = store
            .get_str("image_policy", "fingerprint", &defaults.image_policy.to_string())?
            .parse::<FingerprintPolicy>()
            .map_err(|reason| ConfigError::InvalidValue {
                section: "fingerprint".to_string(),
                key: "image_policy".to_string(),
                reason,
            })?;

        let night_shift_hours =
            store.get_int("night_shift_hours", "naming", DEFAULT_NIGHT_SHIFT_HOURS)?;
        validate_night_shift(night_shift_hours)?;

        let max_depth = match store.get_int("max_depth", "input", 0)? {
            0 => None,
            depth => Some(usize::try_from(depth).map_err(|_| ConfigError::InvalidValue {
                section: "input".to_string(),
                key: "max_depth".to_string(),
                reason: format!("{} is negative", depth),
            })?),
        };

        let log_file = if store.has("file_name", "log") {
            Some(store.get_path("file_name", "log", "")?).filter(|p| !p.as_os_str().is_empty())
        } else {
            None
        };

        Ok(Self {
            output_dir: store.get_path("directory", "output", DEFAULT_OUTPUT_DIRECTORY)?,
            file_template,
            checksum_template,
            user: store.get_str("user", "output", &defaults.user)?,
            default_directories: store
                .get_list("default_directories", "input", &[])?
                .iter()
                .map(|dir| expand_tilde(dir))
                .collect(),
            follow_symlinks: store.get_bool("follow_symlinks", "input", false)?,
            max_depth,
            log_file,
            image_policy,
            night_shift_hours,
        })
    }

    /// Replace the configured identity
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }
}

fn default_user() -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER.to_string())
}

/// Reject night shifts outside `-24..=24` hours
pub fn validate_night_shift(hours: i64) -> Result<(), ConfigError> {
    if !(-MAX_NIGHT_SHIFT_HOURS..=MAX_NIGHT_SHIFT_HOURS).contains(&hours) {
        return Err(ConfigError::InvalidValue {
            section: "naming".to_string(),
            key: "night_shift_hours".to_string(),
            reason: format!(
                "{} is outside -{max}..={max}",
                hours,
                max = MAX_NIGHT_SHIFT_HOURS
            ),
        });
    }
    Ok(())
}

fn validate_template(template: &str, section: &str, key: &str) -> Result<(), ConfigError> {
    NamingTemplate::parse(template)
        .map(|_| ())
        .map_err(|source| ConfigError::InvalidTemplate {
            section: section.to_string(),
            key: key.to_string(),
            source,
        })
}
