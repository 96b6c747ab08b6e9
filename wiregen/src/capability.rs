//! Optional behaviours a build module may offer.
//!
//! A [`Component`] advertises each capability by returning itself from the
//! matching accessor; the defaults return `None`, so a component that
//! overrides nothing takes part in every lifecycle stage as a no-op.
//!
//! ```
//! use wiregen::capability::{Component, Preparer, is_preparer, is_provider};
//! use wiregen::ComponentError;
//!
//! struct Migrations;
//!
//! impl Preparer for Migrations {
//!     fn prepare(&self) -> Result<(), ComponentError> {
//!         Ok(())
//!     }
//! }
//!
//! impl Component for Migrations {
//!     fn as_preparer(&self) -> Option<&dyn Preparer> {
//!         Some(self)
//!     }
//! }
//!
//! assert!(is_preparer(&Migrations));
//! assert!(!is_provider(&Migrations));
//! ```

use std::fmt;

use crate::container::{Constructor, Scope};
use crate::context::Context;
use crate::error::ComponentError;
use crate::synth::ConfigDescriptor;

/// Contributes constructors to a container scope.
pub trait Provider {
    /// Constructors to register, in order.
    fn provide(&self) -> Vec<Constructor>;
}

/// Releases resources when a container scope ends.
pub trait Destroyer {
    /// Tears down whatever the component acquired in `scope`.
    ///
    /// # Errors
    ///
    /// Returns the failure to report; the remaining destroyers still run.
    fn destroy(&self, scope: &Scope) -> Result<(), ComponentError>;
}

/// Runs before any command executes.
pub trait Preparer {
    /// Prepares the component.
    ///
    /// # Errors
    ///
    /// Returns an error to abort the command.
    fn prepare(&self) -> Result<(), ComponentError>;
}

/// Exposes a configuration surface.
pub trait Configurer {
    /// Environment-backed configuration the component reads.
    fn configure(&self) -> Vec<ConfigDescriptor>;
}

/// Contributes sub-commands to the build tool.
pub trait BuildCommander {
    /// Commands offered by the component.
    fn commands(&self) -> Vec<BuildCommand>;
}

/// Action run by a [`BuildCommand`] inside a fresh container scope.
pub type CommandAction = Box<dyn Fn(&Context, &Scope) -> Result<(), ComponentError>>;

/// A named build-tool sub-command.
pub struct BuildCommand {
    /// Command name used for dispatch.
    pub name: String,
    /// One-line description.
    pub usage: String,
    /// Work performed when the command runs.
    pub action: CommandAction,
}

impl BuildCommand {
    /// Creates a command.
    pub fn new<F>(name: impl Into<String>, usage: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Context, &Scope) -> Result<(), ComponentError> + 'static,
    {
        Self {
            name: name.into(),
            usage: usage.into(),
            action: Box::new(action),
        }
    }
}

impl fmt::Debug for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildCommand")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// A build module and the capabilities it implements.
pub trait Component {
    /// Returns the component as a [`Provider`], if it is one.
    fn as_provider(&self) -> Option<&dyn Provider> {
        None
    }

    /// Returns the component as a [`Destroyer`], if it is one.
    fn as_destroyer(&self) -> Option<&dyn Destroyer> {
        None
    }

    /// Returns the component as a [`Preparer`], if it is one.
    fn as_preparer(&self) -> Option<&dyn Preparer> {
        None
    }

    /// Returns the component as a [`Configurer`], if it is one.
    fn as_configurer(&self) -> Option<&dyn Configurer> {
        None
    }

    /// Returns the component as a [`BuildCommander`], if it is one.
    fn as_build_commander(&self) -> Option<&dyn BuildCommander> {
        None
    }
}

/// Whether `component` provides constructors.
#[must_use]
pub fn is_provider(component: &dyn Component) -> bool {
    component.as_provider().is_some()
}

/// Whether `component` releases resources at scope end.
#[must_use]
pub fn is_destroyer(component: &dyn Component) -> bool {
    component.as_destroyer().is_some()
}

/// Whether `component` runs a preparation step.
#[must_use]
pub fn is_preparer(component: &dyn Component) -> bool {
    component.as_preparer().is_some()
}

/// Whether `component` exposes configuration.
#[must_use]
pub fn is_configurer(component: &dyn Component) -> bool {
    component.as_configurer().is_some()
}

/// Whether `component` contributes build commands.
#[must_use]
pub fn is_build_commander(component: &dyn Component) -> bool {
    component.as_build_commander().is_some()
}
