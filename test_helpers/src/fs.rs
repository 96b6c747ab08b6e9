//! Temporary directory fixtures with UTF-8 paths.
//!
//! # Examples
//!
//! ```
//! use wiregen_test_helpers::fs;
//!
//! let (_guard, root) = fs::temp_dir().expect("temp dir");
//! fs::write_file(&root, "pkg/a.go", "package pkg\n").expect("write");
//! assert_eq!(fs::read_file(&root, "pkg/a.go").expect("read"), "package pkg\n");
//! ```

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory, returning the guard that deletes it on
/// drop together with its UTF-8 path.
///
/// # Errors
///
/// Fails when the directory cannot be created or its path is not UTF-8.
pub fn temp_dir() -> Result<(TempDir, Utf8PathBuf)> {
    let dir = tempfile::tempdir().context("create temporary directory")?;
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|path| anyhow!("temporary path is not UTF-8: {}", path.display()))?;
    Ok((dir, path))
}

/// Writes `contents` to `root/rel`, creating parent directories.
///
/// # Errors
///
/// Fails when a directory or the file cannot be written.
pub fn write_file(root: &Utf8Path, rel: &str, contents: &str) -> Result<Utf8PathBuf> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    std::fs::write(&path, contents).with_context(|| format!("write {path}"))?;
    Ok(path)
}

/// Reads `root/rel` as UTF-8 text.
///
/// # Errors
///
/// Fails when the file cannot be read.
pub fn read_file(root: &Utf8Path, rel: &str) -> Result<String> {
    let path = root.join(rel);
    std::fs::read_to_string(&path).with_context(|| format!("read {path}"))
}
