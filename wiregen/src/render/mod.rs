//! Renders configuration descriptors into Go wiring source.
//!
//! The default template registers one `typapp.Constructor` per descriptor;
//! each constructor allocates the spec type and fills it with
//! `envconfig.Process(prefix, &cfg)`. Custom templates receive the same
//! context: `package`, `imports`, `side_effects` (blank imports) and
//! `configs` (with `ctor_name`, `prefix`, `spec_type` and `fields`).

use std::process::Command;

use camino::Utf8Path;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::{ComponentError, WiregenResult};
use crate::synth::ConfigDescriptor;

/// Built-in Go template.
pub const DEFAULT_TEMPLATE: &str = include_str!("app_cfg.go.tera");

const TEMPLATE_NAME: &str = "app_cfg.go";

/// Result of rendering a descriptor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Source text for the generated file.
    Source(String),
    /// There was nothing to register; any previous output should be removed.
    Empty,
}

#[derive(Serialize)]
struct TemplateData<'a> {
    package: &'a str,
    imports: &'a [String],
    side_effects: &'a [String],
    configs: &'a [ConfigDescriptor],
}

/// Template renderer for generated wiring code.
#[derive(Debug)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Creates a renderer using [`DEFAULT_TEMPLATE`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::WiregenError::Template`] if the template fails to
    /// compile.
    pub fn new() -> WiregenResult<Self> {
        Self::with_template(DEFAULT_TEMPLATE)
    }

    /// Creates a renderer from custom template text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WiregenError::Template`] if the template fails to
    /// compile.
    pub fn with_template(source: &str) -> WiregenResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self { tera })
    }

    /// Renders `configs` for `package`.
    ///
    /// Returns [`Rendered::Empty`] when `configs` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WiregenError::Template`] when rendering fails.
    pub fn render(
        &self,
        package: &str,
        imports: &[String],
        side_effects: &[String],
        configs: &[ConfigDescriptor],
    ) -> WiregenResult<Rendered> {
        if configs.is_empty() {
            return Ok(Rendered::Empty);
        }
        let context = Context::from_serialize(TemplateData {
            package,
            imports,
            side_effects,
            configs,
        })?;
        Ok(Rendered::Source(self.tera.render(TEMPLATE_NAME, &context)?))
    }
}

/// Normalises the imports of a generated file.
pub trait ImportFormatter {
    /// Rewrites `path` in place.
    ///
    /// # Errors
    ///
    /// Returns an error when the formatter cannot run or rejects the file.
    fn format(&self, path: &Utf8Path) -> Result<(), ComponentError>;
}

impl<F: ImportFormatter + ?Sized> ImportFormatter for Box<F> {
    fn format(&self, path: &Utf8Path) -> Result<(), ComponentError> {
        (**self).format(path)
    }
}

/// Runs `goimports -w` on the generated file.
#[derive(Debug, Clone)]
pub struct GoImports {
    program: String,
}

impl Default for GoImports {
    fn default() -> Self {
        Self {
            program: "goimports".to_owned(),
        }
    }
}

impl GoImports {
    /// Uses `program` instead of `goimports` from `PATH`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ImportFormatter for GoImports {
    fn format(&self, path: &Utf8Path) -> Result<(), ComponentError> {
        let status = Command::new(&self.program)
            .arg("-w")
            .arg(path.as_std_path())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("{} exited with {status}", self.program).into())
        }
    }
}

/// Leaves generated files untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl ImportFormatter for NoopFormatter {
    fn format(&self, _path: &Utf8Path) -> Result<(), ComponentError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests;
