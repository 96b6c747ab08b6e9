//! Project discovery: `go.mod` lookup and deterministic source collection.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use walkdir::{DirEntry, WalkDir};

use super::{SourceFile, parse_source};
use crate::error::{WiregenError, WiregenResult};

const SKIPPED_DIRS: &[&str] = &["vendor", "testdata", "node_modules"];

/// Module metadata read from `go.mod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    /// Module path declared by the `module` directive.
    pub path: String,
}

impl GoModule {
    /// Parses the `module` directive out of `go.mod` contents.
    #[must_use]
    pub fn parse(contents: &str) -> Option<Self> {
        contents.lines().find_map(|line| {
            let rest = line.trim().strip_prefix("module")?;
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let path = rest.trim().trim_matches('"');
            (!path.is_empty()).then(|| Self {
                path: path.to_owned(),
            })
        })
    }

    /// Import path of the package living in `dir` (relative to the module
    /// root).
    #[must_use]
    pub fn import_path(&self, dir: &Utf8Path) -> String {
        let rel = dir.as_str().trim_matches('/');
        if rel.is_empty() || rel == "." {
            self.path.clone()
        } else {
            format!("{}/{rel}", self.path)
        }
    }

    /// Last segment of the module path, used as the default project name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A Go project loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct Project {
    /// Project root directory.
    pub root: Utf8PathBuf,
    /// Module metadata, when the root has a `go.mod`.
    pub module: Option<GoModule>,
    /// Parsed source files, sorted by path.
    pub files: Vec<SourceFile>,
}

/// Loads every non-test `.go` file below `root`.
///
/// Hidden directories and `vendor`, `testdata` and `node_modules` are
/// skipped. Files are visited in lexicographic order so repeated runs see
/// declarations in the same order.
///
/// # Errors
///
/// Returns [`WiregenError::Io`] when a directory or file cannot be read and
/// [`WiregenError::Parse`] when a file is not valid Go.
pub fn load_project(root: &Utf8Path) -> WiregenResult<Project> {
    let dir = Dir::open_ambient_dir(root, ambient_authority())
        .map_err(|err| WiregenError::io(root, err))?;
    let module = match dir.read_to_string("go.mod") {
        Ok(contents) => GoModule::parse(&contents),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => return Err(WiregenError::io(root.join("go.mod"), err)),
    };

    let paths = collect_go_files(root)?;

    let mut files = Vec::with_capacity(paths.len());
    for rel in paths {
        let text = dir
            .read_to_string(&rel)
            .map_err(|err| WiregenError::io(root.join(&rel), err))?;
        files.push(parse_source(&rel, &text)?);
    }
    tracing::debug!(root = %root, files = files.len(), "loaded project sources");

    Ok(Project {
        root: root.to_path_buf(),
        module,
        files,
    })
}

fn collect_go_files(root: &Utf8Path) -> WiregenResult<Vec<Utf8PathBuf>> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_type().is_dir() || !is_skipped_dir(entry)
        });

    let mut paths = Vec::new();
    for entry_result in walker {
        let entry = entry_result.map_err(|err| {
            let path = err
                .path()
                .and_then(Utf8Path::from_path)
                .map_or_else(|| root.to_path_buf(), Utf8Path::to_path_buf);
            WiregenError::io(path, err.into())
        })?;
        let name = entry.file_name().to_string_lossy();
        if !entry.file_type().is_file() || !name.ends_with(".go") || name.ends_with("_test.go") {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .ok()
            .and_then(Utf8Path::from_path)
            .ok_or_else(|| WiregenError::io(root, std::io::ErrorKind::InvalidData.into()))?;
        paths.push(rel.to_path_buf());
    }
    Ok(paths)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.iter().any(|skipped| *skipped == name)
}
