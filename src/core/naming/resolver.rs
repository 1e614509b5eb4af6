//! Output and bucket path resolution.

use super::template::NamingTemplate;
use crate::core::metadata::ResolvedAttributes;
use crate::error::{FileError, TemplateError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Disambiguation ids, tried in order
pub const DISAMBIGUATION_IDS: [&str; 27] = [
    "", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q",
    "r", "s", "t", "u", "v", "w", "x", "y", "z",
];

/// Renders archive and bucket paths under one output directory
#[derive(Debug, Clone)]
pub struct PathResolver {
    output_dir: PathBuf,
    file_template: NamingTemplate,
    bucket_template: NamingTemplate,
}

impl PathResolver {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        file_template: NamingTemplate,
        bucket_template: NamingTemplate,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_template,
            bucket_template,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Registry bucket file for these attributes
    pub fn bucket_path(&self, attrs: &ResolvedAttributes) -> Result<PathBuf, TemplateError> {
        Ok(self.output_dir.join(self.bucket_template.render(attrs)?))
    }

    /// Output path for a given id, without probing the filesystem
    pub fn render(&self, attrs: &ResolvedAttributes) -> Result<PathBuf, TemplateError> {
        Ok(self.output_dir.join(self.file_template.render(attrs)?))
    }

    /// First output path with no existing filesystem entry.
    ///
    /// Sets the `id` attribute to the id that was used.
    pub fn resolve(&self, attrs: &mut ResolvedAttributes) -> Result<PathBuf, FileError> {
        let mut previous: Option<PathBuf> = None;

        for (attempt, id) in DISAMBIGUATION_IDS.iter().enumerate() {
            attrs.set_id(id);
            let candidate = self.render(attrs)?;

            // Templates without {id} render the same path every time
            if previous.as_ref() == Some(&candidate) {
                attrs.set_id("");
                return Err(FileError::OutputSlotsExhausted {
                    path: candidate,
                    attempts: attempt,
                });
            }

            if std::fs::symlink_metadata(&candidate).is_err() {
                if !id.is_empty() {
                    debug!(path = %candidate.display(), id = %id, "Output name taken, using suffix");
                }
                return Ok(candidate);
            }
            previous = Some(candidate);
        }

        attrs.set_id("");
        Err(FileError::OutputSlotsExhausted {
            path: self.render(attrs)?,
            attempts: DISAMBIGUATION_IDS.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::DateSource;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn attrs() -> ResolvedAttributes {
        let values: BTreeMap<String, String> = [
            ("user", "alice"),
            ("yyyy", "2019"),
            ("model", "canon_eos_5d"),
            ("base", "img_0001"),
            ("ext", "jpg"),
            ("id", ""),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        ResolvedAttributes::new(values, DateSource::Sentinel)
    }

    fn resolver(dir: &TempDir, file_template: &str) -> PathResolver {
        PathResolver::new(
            dir.path(),
            NamingTemplate::parse(file_template).unwrap(),
            NamingTemplate::parse("{user}/checksums.json").unwrap(),
        )
    }

    #[test]
    fn free_slot_uses_empty_id() {
        let dir = TempDir::new().unwrap();
        let mut attrs = attrs();

        let path = resolver(&dir, "{yyyy}/{base}{id}.{ext}")
            .resolve(&mut attrs)
            .unwrap();

        assert_eq!(path, dir.path().join("2019/img_0001.jpg"));
        assert_eq!(attrs.get("id"), Some(""));
    }

    #[test]
    fn taken_slot_advances_to_next_id() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("2019")).unwrap();
        fs::write(dir.path().join("2019/img_0001.jpg"), b"x").unwrap();
        fs::write(dir.path().join("2019/img_0001a.jpg"), b"x").unwrap();
        let mut attrs = attrs();

        let path = resolver(&dir, "{yyyy}/{base}{id}.{ext}")
            .resolve(&mut attrs)
            .unwrap();

        assert_eq!(path, dir.path().join("2019/img_0001b.jpg"));
        assert_eq!(attrs.get("id"), Some("b"));
    }

    #[test]
    fn all_slots_taken_is_exhausted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("2019")).unwrap();
        for id in DISAMBIGUATION_IDS {
            fs::write(dir.path().join(format!("2019/img_0001{}.jpg", id)), b"x").unwrap();
        }

        let result = resolver(&dir, "{yyyy}/{base}{id}.{ext}").resolve(&mut attrs());

        match result {
            Err(FileError::OutputSlotsExhausted { attempts, .. }) => assert_eq!(attempts, 27),
            other => panic!("expected OutputSlotsExhausted, got {:?}", other),
        }
    }

    #[test]
    fn template_without_id_gives_up_after_one_probe() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("2019")).unwrap();
        fs::write(dir.path().join("2019/img_0001.jpg"), b"x").unwrap();

        let result = resolver(&dir, "{yyyy}/{base}.{ext}").resolve(&mut attrs());

        match result {
            Err(FileError::OutputSlotsExhausted { attempts, .. }) => assert_eq!(attempts, 1),
            other => panic!("expected OutputSlotsExhausted, got {:?}", other),
        }
    }

    #[test]
    fn existing_directory_counts_as_taken() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("2019/img_0001.jpg")).unwrap();

        let path = resolver(&dir, "{yyyy}/{base}{id}.{ext}")
            .resolve(&mut attrs())
            .unwrap();

        assert_eq!(path, dir.path().join("2019/img_0001a.jpg"));
    }

    #[test]
    fn bucket_path_is_under_output_dir() {
        let dir = TempDir::new().unwrap();
        let bucket = resolver(&dir, "{base}{id}.{ext}").bucket_path(&attrs()).unwrap();
        assert_eq!(bucket, dir.path().join("alice/checksums.json"));
    }
}
