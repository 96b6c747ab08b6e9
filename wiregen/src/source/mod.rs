//! Go source front-end.
//!
//! Turns Go files into plain [`TypeDecl`] records that the annotation
//! scanner consumes. Only what annotation processing needs is modelled:
//! package names, type names, the doc comment attached to each type, and
//! for struct types the ordered fields with their raw tag text.
//!
//! ```
//! use wiregen::source::{DeclKind, parse_source};
//!
//! let file = parse_source(
//!     "config/db.go",
//!     "package config\n\n// @app-cfg\ntype DB struct {\n\tHost string `default:\"localhost\"`\n}\n",
//! )
//! .expect("valid source");
//! assert_eq!(file.package, "config");
//! let decl = file.decls.first().expect("one declaration");
//! assert_eq!(decl.kind, DeclKind::Struct);
//! assert_eq!(decl.fields.first().map(|f| f.tag.as_str()), Some("default:\"localhost\""));
//! ```

mod parser;
mod walk;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{WiregenError, WiregenResult};

pub use walk::{GoModule, Project, load_project};

/// Shape of a declared type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeclKind {
    /// `type X struct { ... }`.
    Struct,
    /// Any other type expression (interfaces, aliases, named scalars).
    #[default]
    Other,
}

/// A struct field with its raw tag text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name; embedded fields use the final identifier of their type.
    pub name: String,
    /// Tag literal contents without the surrounding quotes, for example
    /// `default:"localhost" envconfig:"HOST"`.
    pub tag: String,
}

/// A top-level type declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDecl {
    /// Go package name declared by the file.
    pub package: String,
    /// Directory of the declaring file relative to the project root.
    pub dir: Utf8PathBuf,
    /// Declared type name.
    pub name: String,
    /// Doc comment text attached to the declaration, one line per comment
    /// line, delimiters removed.
    pub doc: String,
    /// Whether the type is a struct.
    pub kind: DeclKind,
    /// Struct fields in declaration order (empty for non-struct types).
    pub fields: Vec<FieldDecl>,
}

/// Declarations read from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the file relative to the project root.
    pub path: Utf8PathBuf,
    /// Package clause name.
    pub package: String,
    /// Declarations in source order.
    pub decls: Vec<TypeDecl>,
}

/// Parses Go source text.
///
/// `path` is used to label errors and to derive each declaration's
/// directory.
///
/// # Errors
///
/// Returns [`WiregenError::Parse`] when the text is not valid Go, such as an
/// unterminated string or comment.
pub fn parse_source(file: impl AsRef<Utf8Path>, text: &str) -> WiregenResult<SourceFile> {
    let path = file.as_ref();
    let parsed = parser::parse_go(text).map_err(|err| {
        let declaration = match err.line {
            Some(line) => format!("{path}:{line}"),
            None => path.to_string(),
        };
        WiregenError::parse(declaration, err.message)
    })?;
    let dir = path.parent().map(Utf8Path::to_path_buf).unwrap_or_default();
    let decls = parsed
        .decls
        .into_iter()
        .map(|decl| TypeDecl {
            package: parsed.package.clone(),
            dir: dir.clone(),
            ..decl
        })
        .collect();
    Ok(SourceFile {
        path: path.to_path_buf(),
        package: parsed.package,
        decls,
    })
}

#[cfg(test)]
mod tests;
