//! Directory walking implementation using walkdir.

use super::ScanResult;
use crate::error::ScanError;
use crate::events::{EventSender, ScanEvent};
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

/// Scanner implementation using the walkdir crate
#[derive(Debug, Clone, Default)]
pub struct WalkDirScanner {
    config: ScanConfig,
}

impl WalkDirScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Walk one root.
    ///
    /// Fails only when the root itself is missing or not a directory.
    /// Unreadable entries below it are collected in the result.
    pub fn scan_root(&self, root: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            events.scan(ScanEvent::RootMissing {
                root: root.to_path_buf(),
            });
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.scan(ScanEvent::Started {
            root: root.to_path_buf(),
        });

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut result = ScanResult::default();
        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        result.files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_else(|| root.to_path_buf());
                    let error = ScanError::Walk {
                        path: path.clone(),
                        reason: e.to_string(),
                    };
                    warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    events.scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    });
                    result.errors.push(error);
                }
            }
        }

        events.scan(ScanEvent::Completed {
            root: root.to_path_buf(),
            files: result.files.len(),
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{null_sender, Event, EventChannel};
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, relative: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn files_are_sorted_depth_first() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "b.jpg");
        touch(&dir, "a/z.jpg");
        touch(&dir, "a/b/c.jpg");
        touch(&dir, "c.mov");

        let result = WalkDirScanner::default()
            .scan_root(dir.path(), &null_sender())
            .unwrap();

        let relative: Vec<_> = result
            .files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(relative, vec!["a/b/c.jpg", "a/z.jpg", "b.jpg", "c.mov"]);
    }

    #[test]
    fn hidden_and_unknown_files_are_included() {
        let dir = TempDir::new().unwrap();
        touch(&dir, ".hidden.jpg");
        touch(&dir, "notes.txt");

        let result = WalkDirScanner::default()
            .scan_root(dir.path(), &null_sender())
            .unwrap();

        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn missing_root_is_reported() {
        let (sender, receiver) = EventChannel::new();

        let result = WalkDirScanner::default().scan_root(Path::new("/nonexistent/import"), &sender);

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
        assert!(matches!(
            receiver.try_recv(),
            Some(Event::Scan(ScanEvent::RootMissing { .. }))
        ));
    }

    #[test]
    fn max_depth_limits_recursion() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "top.jpg");
        touch(&dir, "nested/deep.jpg");

        let scanner = WalkDirScanner::new(ScanConfig {
            max_depth: Some(1),
            ..ScanConfig::default()
        });
        let result = scanner.scan_root(dir.path(), &null_sender()).unwrap();

        assert_eq!(result.files.len(), 1);
    }
}
