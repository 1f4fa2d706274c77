//! Image I/O operations service
//!
//! This module separates file I/O operations from business logic,
//! making the system more testable and maintainable.

use crate::error::{BgStripError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name endings treated as batch candidates
pub const SUPPORTED_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".bmp", ".webp"];

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Read a whole image file into memory
    ///
    /// # Errors
    /// - `BgStripError::InputNotFound` if the path does not exist
    /// - `BgStripError::Io` on any other read failure
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgStripError::InputNotFound(path_ref.to_path_buf()));
        }

        std::fs::read(path_ref)
            .map_err(|e| BgStripError::file_io_error("read image file", path_ref, &e))
    }

    /// Write encoded bytes, creating the parent directory first
    ///
    /// # Errors
    /// `BgStripError::Io` if the directory or the file cannot be written
    pub fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
        let path_ref = path.as_ref();

        Self::ensure_parent_dir(path_ref)?;

        std::fs::write(path_ref, bytes)
            .map_err(|e| BgStripError::file_io_error("write output file", path_ref, &e))?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), path_ref.display());
        Ok(())
    }

    /// Create the parent directory of `path` if it is missing
    ///
    /// # Errors
    /// `BgStripError::Io` if the directory cannot be created
    pub fn ensure_parent_dir(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
                .map_err(|e| BgStripError::file_io_error("create output directory", parent, &e)),
            _ => Ok(()),
        }
    }

    /// Check if a file name ends in one of the supported image extensions
    ///
    /// The comparison is case-insensitive and looks at the whole name, so a
    /// file literally called `.png` still counts.
    pub fn is_supported_format<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .is_some_and(|name| SUPPORTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
    }

    /// Enumerate candidate images under `dir`
    ///
    /// Entries are sorted by file name at every level. With `recursive`
    /// the whole tree is walked; otherwise only the top level is listed.
    /// A directory equal to `exclude` (compared after canonicalization) is
    /// never descended into, which keeps an output directory nested inside
    /// the input directory from being re-processed.
    ///
    /// # Errors
    /// `BgStripError::Io` if `dir` itself cannot be read. Unreadable
    /// subdirectories are logged and skipped.
    pub fn find_images(dir: &Path, recursive: bool, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
        let max_depth = if recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir() && exclude.is_some_and(|ex| Self::same_path(entry.path(), ex)))
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(BgStripError::file_io_error(
                        "list input directory",
                        dir,
                        &std::io::Error::from(e),
                    ));
                },
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                },
            };

            // `path().is_file()` follows symlinks, `file_type()` would not
            if entry.path().is_file() && Self::is_supported_format(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn same_path(a: &Path, b: &Path) -> bool {
        match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_is_supported_format() {
        assert!(ImageIOService::is_supported_format("test.jpg"));
        assert!(ImageIOService::is_supported_format("test.jpeg"));
        assert!(ImageIOService::is_supported_format("test.png"));
        assert!(ImageIOService::is_supported_format("test.webp"));
        assert!(ImageIOService::is_supported_format("test.bmp"));
        assert!(ImageIOService::is_supported_format("TEST.JPG"));
        assert!(ImageIOService::is_supported_format("dir/Photo.PnG"));
        assert!(ImageIOService::is_supported_format(".png"));

        assert!(!ImageIOService::is_supported_format("test.tiff"));
        assert!(!ImageIOService::is_supported_format("test.txt"));
        assert!(!ImageIOService::is_supported_format("test"));
        assert!(!ImageIOService::is_supported_format("png"));
    }

    #[test]
    fn test_read_nonexistent_file() {
        let dir = tempdir().unwrap();
        let err = ImageIOService::read_bytes(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, BgStripError::InputNotFound(_)));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("out.png");

        ImageIOService::write_bytes(&target, b"payload").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
        assert_eq!(ImageIOService::read_bytes(&target).unwrap(), b"payload");
    }

    #[test]
    fn test_find_images_top_level_only() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.JPG"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("nested").join("c.webp"));

        let found = ImageIOService::find_images(dir.path(), false, None).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png"]);
    }

    #[test]
    fn test_find_images_recursive() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("top.png"));
        touch(&dir.path().join("nested").join("deep").join("inner.bmp"));

        let found = ImageIOService::find_images(dir.path(), true, None).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&dir.path().join("nested").join("deep").join("inner.bmp")));
    }

    #[test]
    fn test_find_images_skips_directories_named_like_images() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("album.png")).unwrap();

        let found = ImageIOService::find_images(dir.path(), true, None).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_find_images_excludes_output_dir() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("in.png"));
        touch(&dir.path().join("out").join("in.png"));

        let found =
            ImageIOService::find_images(dir.path(), true, Some(&dir.path().join("out"))).unwrap();
        assert_eq!(found, vec![dir.path().join("in.png")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_images_follows_symlinked_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input");
        touch(&dir.path().join("real.png"));
        std::fs::create_dir(&input).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.png"), input.join("link.png")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.png"), input.join("dangling.png")).unwrap();

        let found = ImageIOService::find_images(&input, false, None).unwrap();
        assert_eq!(found, vec![input.join("link.png")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_candidates() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.PNG");
        assert!(ImageIOService::is_supported_format(Path::new(name)));
        assert!(!ImageIOService::is_supported_format(Path::new(OsStr::from_bytes(b"caf\xe9.txt"))));
    }

    #[test]
    fn test_find_images_missing_dir_is_error() {
        let dir = tempdir().unwrap();
        let result = ImageIOService::find_images(&dir.path().join("nope"), false, None);
        assert!(matches!(result, Err(BgStripError::Io(_))));
    }
}
