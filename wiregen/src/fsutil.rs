//! File helpers shared by the renderer and the env-file synchronizer.

use std::io::{ErrorKind, Write};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tempfile::Builder;

use crate::error::{WiregenError, WiregenResult};

fn parent_of(path: &Utf8Path) -> &Utf8Path {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    }
}

/// Opens `path`, creating it and any missing parents first.
pub(crate) fn ensure_dir(path: &Utf8Path) -> WiregenResult<Dir> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(dir),
        Err(open_err) if open_err.kind() == ErrorKind::NotFound => {
            Dir::create_ambient_dir_all(path, ambient_authority())
                .map_err(|err| WiregenError::io(path, err))?;
            Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| WiregenError::io(path, err))
        }
        Err(open_err) => Err(WiregenError::io(path, open_err)),
    }
}

/// Reads `path`, returning `None` when it is missing or unreadable.
pub(crate) fn read_optional(path: &Utf8Path) -> Option<String> {
    let name = path.file_name()?;
    let dir = Dir::open_ambient_dir(parent_of(path), ambient_authority()).ok()?;
    match dir.read_to_string(name) {
        Ok(contents) => Some(contents),
        Err(err) => {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %path, error = %err, "ignoring unreadable file");
            }
            None
        }
    }
}

/// Mode of a replaced file, or `0o644` before umask for a new one.
#[cfg(unix)]
fn target_permissions(path: &Utf8Path) -> std::fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.permissions(),
        _ => std::fs::Permissions::from_mode(0o644),
    }
}

/// Replaces `path` with `contents` through a temporary file in the same
/// directory, so readers never observe a partial write. An existing file
/// keeps its permissions.
pub(crate) fn write_atomic(path: &Utf8Path, contents: &str) -> WiregenResult<()> {
    let parent = parent_of(path);
    ensure_dir(parent)?;
    let mut builder = Builder::new();
    #[cfg(unix)]
    builder.permissions(target_permissions(path));
    let mut staged = builder
        .tempfile_in(parent.as_std_path())
        .map_err(|err| WiregenError::io(parent, err))?;
    staged
        .write_all(contents.as_bytes())
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|err| WiregenError::io(path, err))?;
    staged
        .persist(path.as_std_path())
        .map_err(|err| WiregenError::io(path, err.error))?;
    Ok(())
}

/// Deletes `path`, returning whether a file was removed.
pub(crate) fn remove_if_exists(path: &Utf8Path) -> WiregenResult<bool> {
    let Some(name) = path.file_name() else {
        return Ok(false);
    };
    let dir = match Dir::open_ambient_dir(parent_of(path), ambient_authority()) {
        Ok(dir) => dir,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(WiregenError::io(path, err)),
    };
    match dir.remove_file(name) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(WiregenError::io(path, err)),
    }
}
