//! Build context shared by every command of the build tool.

use std::fmt;

use camino::Utf8PathBuf;

use crate::capability::{BuildCommand, Component};
use crate::container::{self, Scope};
use crate::error::{ComponentError, WiregenError, WiregenResult};
use crate::synth::ConfigDescriptor;

/// Project metadata plus the modules that make up the build.
#[derive(Default)]
pub struct Context {
    /// Project name.
    pub name: String,
    /// Project root directory.
    pub root: Utf8PathBuf,
    /// Free-form description shown in help output.
    pub description: String,
    /// Project version.
    pub version: String,
    /// Modules in registration order.
    pub modules: Vec<Box<dyn Component>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("description", &self.description)
            .field("version", &self.version)
            .field("modules", &self.modules.len())
            .finish()
    }
}

impl Context {
    /// Creates a context for project `name` rooted at `root`.
    pub fn new(name: impl Into<String>, root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            ..Self::default()
        }
    }

    /// Appends a module.
    #[must_use]
    pub fn with_module(mut self, module: impl Component + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Checks that the context can drive a build.
    ///
    /// # Errors
    ///
    /// Returns [`WiregenError::InvalidContext`] naming `Name` or `Root`,
    /// checked in that order, when either is empty.
    pub fn preparing(&self) -> WiregenResult<()> {
        if self.name.is_empty() {
            return Err(WiregenError::InvalidContext { field: "Name" });
        }
        if self.root.as_str().is_empty() {
            return Err(WiregenError::InvalidContext { field: "Root" });
        }
        Ok(())
    }

    /// The `Before` hook: validates the context, then runs every preparer in
    /// module order.
    ///
    /// # Errors
    ///
    /// Returns the validation error, or the first preparer failure.
    pub fn before(&self) -> WiregenResult<()> {
        self.preparing()?;
        for preparer in self.modules.iter().filter_map(|module| module.as_preparer()) {
            preparer.prepare().map_err(WiregenError::from_action)?;
        }
        Ok(())
    }

    /// Configuration surfaces of every configurer module, in module order.
    #[must_use]
    pub fn config_descriptors(&self) -> Vec<ConfigDescriptor> {
        self.modules
            .iter()
            .filter_map(|module| module.as_configurer())
            .flat_map(|configurer| configurer.configure())
            .collect()
    }

    /// Commands contributed by build-commander modules, in module order.
    #[must_use]
    pub fn commands(&self) -> Vec<BuildCommand> {
        self.modules
            .iter()
            .filter_map(|module| module.as_build_commander())
            .flat_map(|commander| commander.commands())
            .collect()
    }

    /// Runs `action` in a fresh container scope built from the modules.
    ///
    /// # Errors
    ///
    /// See [`container::run_action`].
    pub fn run_action<R, F>(&self, action: F) -> WiregenResult<R>
    where
        F: FnOnce(&Scope) -> Result<R, ComponentError>,
    {
        container::run_action(&self.modules, action)
    }
}
