//! Annotation model and scanner.
//!
//! An [`Annotation`] is the structured form of a type declaration whose doc
//! comment carries a marker such as `@app-cfg (prefix:"DB")`. Struct-shaped
//! declarations also carry their fields with the parameters parsed from
//! each field's tag.

mod scanner;
mod tag;

use camino::Utf8PathBuf;

use crate::source::DeclKind;

pub use scanner::{DEFAULT_MARKER, Scanner};
pub use tag::{MarkerMatch, TagParams, TagSyntaxError, find_marker, parse_params};

/// A tagged type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Marker that selected the declaration, for example `@app-cfg`.
    pub tag_name: String,
    /// Go package declaring the type.
    pub package: String,
    /// Declared type name.
    pub type_name: String,
    /// Directory of the declaring file relative to the project root.
    pub dir: Utf8PathBuf,
    /// Parameters written after the marker.
    pub params: TagParams,
    /// Whether the declaration is a struct.
    pub kind: DeclKind,
    /// Struct fields in declaration order.
    pub fields: Vec<Field>,
}

impl Annotation {
    /// Package-qualified type name, `pkg.Type`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package, self.type_name)
    }

    /// Whether the annotated declaration is a struct.
    #[must_use]
    pub fn is_struct(&self) -> bool {
        self.kind == DeclKind::Struct
    }
}

/// A struct field of an annotated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Parameters parsed from the field tag.
    pub tag_params: TagParams,
}
