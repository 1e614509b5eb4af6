//! Typed `(key, section)` lookups over merged TOML files.

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::debug;

/// Config file names, lowest priority first
pub const CONFIG_FILE_NAMES: [&str; 2] = ["photorganyze.toml", "photorganyze_local.toml"];

/// Directories searched for each config file name, in order
pub fn config_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(".")];
    if let Some(home) = dirs::home_dir() {
        locations.push(home);
    }
    if let Some(config) = dirs::config_dir() {
        locations.push(config.join("photorganyze"));
    }
    locations
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(value: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (value, home) {
        ("~", Some(home)) => home,
        (v, Some(home)) if v.starts_with("~/") => home.join(&v[2..]),
        (v, _) => PathBuf::from(v),
    }
}

/// Configuration values grouped by section
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    sections: BTreeMap<String, Table>,
    sources: Vec<PathBuf>,
}

impl ConfigStore {
    /// Store with no values; every lookup returns its fallback
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse TOML text. `origin` is only used in error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let table: Table = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut sections = BTreeMap::new();
        for (name, value) in table {
            match value {
                Value::Table(section) => {
                    sections.insert(name, section);
                }
                _ => {
                    return Err(ConfigError::Parse {
                        path: origin.to_path_buf(),
                        reason: format!("'{}' must be inside a [section]", name),
                    })
                }
            }
        }

        Ok(Self {
            sections,
            sources: vec![origin.to_path_buf()],
        })
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load every config file found in the default locations
    pub fn discover() -> Result<Self, ConfigError> {
        Self::discover_in(&config_locations())
    }

    /// For each name in [`CONFIG_FILE_NAMES`], load the first match in
    /// `locations`. Later files override earlier ones key by key.
    pub fn discover_in(locations: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut store = Self::empty();
        for name in CONFIG_FILE_NAMES {
            if let Some(path) = locations.iter().map(|dir| dir.join(name)).find(|p| p.is_file()) {
                debug!(path = %path.display(), "Loading config file");
                store.merge(Self::load_file(&path)?);
            }
        }
        Ok(store)
    }

    /// Overlay `other` on top of this store
    pub fn merge(&mut self, other: ConfigStore) {
        for (name, section) in other.sections {
            self.sections.entry(name).or_default().extend(section);
        }
        self.sources.extend(other.sources);
    }

    /// Files this store was loaded from, in load order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn has(&self, key: &str, section: &str) -> bool {
        self.value(key, section).is_some()
    }

    fn value(&self, key: &str, section: &str) -> Option<&Value> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    pub fn get_str(&self, key: &str, section: &str, fallback: &str) -> Result<String, ConfigError> {
        match self.value(key, section) {
            None => Ok(fallback.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Integer(i)) => Ok(i.to_string()),
            Some(Value::Float(f)) => Ok(f.to_string()),
            Some(Value::Boolean(b)) => Ok(b.to_string()),
            Some(other) => Err(invalid(section, key, format!("expected a string, found {}", other.type_str()))),
        }
    }

    pub fn get_int(&self, key: &str, section: &str, fallback: i64) -> Result<i64, ConfigError> {
        match self.value(key, section) {
            None => Ok(fallback),
            Some(Value::Integer(i)) => Ok(*i),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| invalid(section, key, format!("'{}' is not an integer", s))),
            Some(other) => Err(invalid(section, key, format!("expected an integer, found {}", other.type_str()))),
        }
    }

    pub fn get_float(&self, key: &str, section: &str, fallback: f64) -> Result<f64, ConfigError> {
        match self.value(key, section) {
            None => Ok(fallback),
            Some(Value::Float(f)) => Ok(*f),
            Some(Value::Integer(i)) => Ok(*i as f64),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|_| invalid(section, key, format!("'{}' is not a number", s))),
            Some(other) => Err(invalid(section, key, format!("expected a number, found {}", other.type_str()))),
        }
    }

    /// Booleans, or the strings `yes/no`, `on/off`, `true/false`, `1/0`
    pub fn get_bool(&self, key: &str, section: &str, fallback: bool) -> Result<bool, ConfigError> {
        match self.value(key, section) {
            None => Ok(fallback),
            Some(Value::Boolean(b)) => Ok(*b),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "1" | "yes" | "true" | "on" => Ok(true),
                "0" | "no" | "false" | "off" => Ok(false),
                _ => Err(invalid(section, key, format!("'{}' is not a boolean", s))),
            },
            Some(other) => Err(invalid(section, key, format!("expected a boolean, found {}", other.type_str()))),
        }
    }

    /// A TOML array, or a string split on commas and whitespace
    pub fn get_list(
        &self,
        key: &str,
        section: &str,
        fallback: &[&str],
    ) -> Result<Vec<String>, ConfigError> {
        match self.value(key, section) {
            None => Ok(fallback.iter().map(|s| s.to_string()).collect()),
            Some(Value::String(s)) => Ok(s
                .replace(',', " ")
                .split_whitespace()
                .map(str::to_string)
                .collect()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(invalid(
                        section,
                        key,
                        format!("list items must be strings, found {}", other.type_str()),
                    )),
                })
                .collect(),
            Some(other) => Err(invalid(section, key, format!("expected a list, found {}", other.type_str()))),
        }
    }

    /// A string with `~` expanded to the home directory
    pub fn get_path(&self, key: &str, section: &str, fallback: &str) -> Result<PathBuf, ConfigError> {
        self.get_str(key, section, fallback).map(|s| expand_tilde(&s))
    }
}

fn invalid(section: &str, key: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(text: &str) -> ConfigStore {
        ConfigStore::from_toml_str(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn missing_values_use_fallback() {
        let config = ConfigStore::empty();
        assert_eq!(config.get_str("user", "output", "bob").unwrap(), "bob");
        assert_eq!(config.get_int("night_shift_hours", "naming", 5).unwrap(), 5);
        assert!(config.get_bool("dry_run", "output", true).unwrap());
    }

    #[test]
    fn typed_lookups() {
        let config = store(
            r#"
            [output]
            user = "alice"
            retries = 3
            ratio = 0.5
            verbose = "yes"

            [input]
            default_directories = "~/Pictures/import, /media/card"
            "#,
        );

        assert_eq!(config.get_str("user", "output", "").unwrap(), "alice");
        assert_eq!(config.get_int("retries", "output", 0).unwrap(), 3);
        assert_eq!(config.get_float("ratio", "output", 0.0).unwrap(), 0.5);
        assert!(config.get_bool("verbose", "output", false).unwrap());
        assert_eq!(
            config.get_list("default_directories", "input", &[]).unwrap(),
            vec!["~/Pictures/import", "/media/card"]
        );
    }

    #[test]
    fn list_accepts_toml_arrays() {
        let config = store("[input]\ndefault_directories = [\"/a\", \"/b c\"]\n");
        assert_eq!(
            config.get_list("default_directories", "input", &[]).unwrap(),
            vec!["/a", "/b c"]
        );
    }

    #[test]
    fn wrong_type_is_invalid_value() {
        let config = store("[naming]\nnight_shift_hours = \"late\"\n");
        assert!(matches!(
            config.get_int("night_shift_hours", "naming", 5),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn path_expands_tilde() {
        let config = store("[output]\ndirectory = \"~/archive\"\n");
        let path = config.get_path("directory", "output", "").unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("archive"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }

    #[test]
    fn keys_outside_sections_are_rejected() {
        let result = ConfigStore::from_toml_str("user = \"alice\"\n", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let result = ConfigStore::from_toml_str("[output\n", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn merge_overrides_key_by_key() {
        let mut base = store("[output]\nuser = \"alice\"\ndirectory = \"/archive\"\n");
        base.merge(store("[output]\nuser = \"bob\"\n"));

        assert_eq!(base.get_str("user", "output", "").unwrap(), "bob");
        assert_eq!(base.get_str("directory", "output", "").unwrap(), "/archive");
    }

    #[test]
    fn discover_prefers_first_location_and_layers_local_file() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(
            first.path().join("photorganyze.toml"),
            "[output]\nuser = \"first\"\ndirectory = \"/one\"\n",
        )
        .unwrap();
        fs::write(
            second.path().join("photorganyze.toml"),
            "[output]\nuser = \"second\"\n",
        )
        .unwrap();
        fs::write(
            second.path().join("photorganyze_local.toml"),
            "[output]\ndirectory = \"/local\"\n",
        )
        .unwrap();

        let config = ConfigStore::discover_in(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ])
        .unwrap();

        assert_eq!(config.get_str("user", "output", "").unwrap(), "first");
        assert_eq!(config.get_str("directory", "output", "").unwrap(), "/local");
        assert_eq!(config.sources().len(), 2);
    }
}
