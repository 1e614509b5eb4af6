//! Copy-with-metadata writer.

use crate::error::StorageError;
use filetime::FileTime;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Writes archived copies
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveWriter;

impl ArchiveWriter {
    pub fn new() -> Self {
        Self
    }

    /// Copy `source` to `destination`, returning the number of bytes copied.
    ///
    /// `destination` must not exist. Its parent directories are created as
    /// needed.
    pub fn store(&self, source: &Path, destination: &Path) -> Result<u64, StorageError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let input = File::open(source).map_err(|e| StorageError::OpenSource {
            path: source.to_path_buf(),
            source: e,
        })?;
        let source_meta = input.metadata().map_err(|e| StorageError::OpenSource {
            path: source.to_path_buf(),
            source: e,
        })?;

        let output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .map_err(|e| StorageError::CreateDestination {
                path: destination.to_path_buf(),
                source: e,
            })?;

        let copied = match copy_contents(input, output) {
            Ok(copied) => copied,
            Err(e) => {
                remove_copy(destination);
                return Err(StorageError::Copy {
                    from: source.to_path_buf(),
                    to: destination.to_path_buf(),
                    source: e,
                });
            }
        };

        if let Err(e) = preserve_metadata(&source_meta, destination) {
            remove_copy(destination);
            return Err(StorageError::PreserveMetadata {
                path: destination.to_path_buf(),
                source: e,
            });
        }

        debug!(
            from = %source.display(),
            to = %destination.display(),
            bytes = copied,
            "Stored file"
        );
        Ok(copied)
    }

    /// Remove a stored copy that could not be recorded
    pub fn discard(&self, destination: &Path) {
        remove_copy(destination);
        debug!(path = %destination.display(), "Discarded stored file");
    }
}

fn copy_contents(input: File, output: File) -> io::Result<u64> {
    let mut reader = BufReader::new(input);
    let mut writer = BufWriter::new(output);
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(copied)
}

fn preserve_metadata(source_meta: &fs::Metadata, destination: &Path) -> io::Result<()> {
    fs::set_permissions(destination, source_meta.permissions())?;
    let atime = FileTime::from_last_access_time(source_meta);
    let mtime = FileTime::from_last_modification_time(source_meta);
    filetime::set_file_times(destination, atime, mtime)
}

fn remove_copy(destination: &Path) {
    if let Err(e) = fs::remove_file(destination) {
        warn!(path = %destination.display(), error = %e, "Failed to remove archived copy");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_source(dir: &TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("IMG_0001.JPG");
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn store_creates_directories_and_copies_bytes() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let source = create_source(&temp_src, b"test content");
        let destination = temp_dest.path().join("alice/2024/01/img_0001.jpg");

        let copied = ArchiveWriter::new().store(&source, &destination).unwrap();

        assert_eq!(copied, 12);
        assert_eq!(fs::read(&destination).unwrap(), b"test content");
        assert!(source.exists());
    }

    #[test]
    fn store_preserves_modification_time() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let source = create_source(&temp_src, b"test content");
        let mtime = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();
        let destination = temp_dest.path().join("copy.jpg");

        ArchiveWriter::new().store(&source, &destination).unwrap();

        let meta = fs::metadata(&destination).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
    }

    #[test]
    fn store_never_overwrites() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let source = create_source(&temp_src, b"new");
        let destination = temp_dest.path().join("taken.jpg");
        fs::write(&destination, b"old").unwrap();

        let result = ArchiveWriter::new().store(&source, &destination);

        assert!(matches!(result, Err(StorageError::CreateDestination { .. })));
        assert_eq!(fs::read(&destination).unwrap(), b"old");
    }

    #[test]
    fn missing_source_is_reported() {
        let temp_dest = TempDir::new().unwrap();
        let destination = temp_dest.path().join("out.jpg");

        let result = ArchiveWriter::new().store(Path::new("/nonexistent/a.jpg"), &destination);

        assert!(matches!(result, Err(StorageError::OpenSource { .. })));
        assert!(!destination.exists());
    }

    #[test]
    fn existing_directory_tree_is_fine() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let source = create_source(&temp_src, b"x");
        fs::create_dir_all(temp_dest.path().join("2024")).unwrap();

        let result = ArchiveWriter::new().store(&source, &temp_dest.path().join("2024/a.jpg"));

        assert!(result.is_ok());
    }

    #[test]
    fn discard_removes_stored_copy_and_keeps_source() {
        let temp_src = TempDir::new().unwrap();
        let temp_dest = TempDir::new().unwrap();
        let source = create_source(&temp_src, b"x");
        let destination = temp_dest.path().join("2024/a.jpg");
        let writer = ArchiveWriter::new();
        writer.store(&source, &destination).unwrap();

        writer.discard(&destination);

        assert!(!destination.exists());
        assert!(source.exists());
    }
}
