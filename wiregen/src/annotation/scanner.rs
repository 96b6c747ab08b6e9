//! Extracts annotations from parsed declarations.

use super::tag::{MarkerMatch, TagSyntaxError, find_marker, parse_params};
use super::{Annotation, Field};
use crate::error::{WiregenError, WiregenResult};
use crate::source::{SourceFile, TypeDecl};

/// Marker recognised when no other is configured.
pub const DEFAULT_MARKER: &str = "@app-cfg";

/// Selects declarations carrying a marker and parses their parameters.
#[derive(Debug, Clone)]
pub struct Scanner {
    marker: String,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl Scanner {
    /// Creates a scanner for `marker`.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Marker this scanner looks for.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns the annotations found in `decls`, in input order.
    ///
    /// Declarations without the marker are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`WiregenError::Parse`] naming `pkg.Type` (or
    /// `pkg.Type.Field` for field tags) when parameter text is malformed.
    pub fn scan<'a, I>(&self, decls: I) -> WiregenResult<Vec<Annotation>>
    where
        I: IntoIterator<Item = &'a TypeDecl>,
    {
        let mut found = Vec::new();
        for decl in decls {
            if let Some(annotation) = self.annotate(decl)? {
                found.push(annotation);
            }
        }
        Ok(found)
    }

    /// Scans every declaration of every file.
    ///
    /// # Errors
    ///
    /// See [`Scanner::scan`].
    pub fn scan_files(&self, files: &[SourceFile]) -> WiregenResult<Vec<Annotation>> {
        self.scan(files.iter().flat_map(|file| file.decls.iter()))
    }

    fn annotate(&self, decl: &TypeDecl) -> WiregenResult<Option<Annotation>> {
        let qualified = format!("{}.{}", decl.package, decl.name);
        let fail = |err: TagSyntaxError| WiregenError::parse(qualified.clone(), err.to_string());
        let MarkerMatch::Present(raw) = find_marker(&decl.doc, &self.marker).map_err(fail)? else {
            return Ok(None);
        };
        let params = parse_params(&raw).map_err(fail)?;

        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let tag_params = parse_params(&field.tag).map_err(|err| {
                WiregenError::parse(format!("{qualified}.{}", field.name), err.to_string())
            })?;
            fields.push(Field {
                name: field.name.clone(),
                tag_params,
            });
        }
        tracing::debug!(marker = %self.marker, declaration = %qualified, "found annotation");

        Ok(Some(Annotation {
            tag_name: self.marker.clone(),
            package: decl.package.clone(),
            type_name: decl.name.clone(),
            dir: decl.dir.clone(),
            params,
            kind: decl.kind,
            fields,
        }))
    }
}
