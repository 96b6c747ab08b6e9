//! Error types produced by the generation pipeline and the DI container.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::container::WiringError;

/// Boxed error returned by user components, constructor factories and
/// command actions.
pub type ComponentError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias for results carrying a [`WiregenError`].
pub type WiregenResult<T> = Result<T, WiregenError>;

/// Errors that can occur while generating wiring code or running an action.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WiregenError {
    /// Annotation or tag text could not be parsed.
    #[error("failed to parse '{declaration}': {message}")]
    Parse {
        /// Declaration (file, type or field) that carried the malformed text.
        declaration: String,
        /// Human-readable description of the syntax problem.
        message: String,
    },

    /// Rendering the generated source failed.
    #[error("failed to render template: {0}")]
    Template(#[from] tera::Error),

    /// Reading or writing a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that triggered the failure.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Registering or resolving a constructor failed.
    #[error(transparent)]
    Wiring(#[from] WiringError),

    /// A build context field required by the `Before` hook is empty.
    #[error("Invalid Context: {field} can't be empty")]
    InvalidContext {
        /// Name of the empty context field.
        field: &'static str,
    },

    /// No build command with the requested name exists.
    #[error("unknown command '{name}'")]
    UnknownCommand {
        /// Requested command name.
        name: String,
    },

    /// A constructor name was required but the annotation omitted it.
    #[error("constructor name missing for '{spec_type}'; set ctor_name on the annotation")]
    UnnamedConstructor {
        /// Fully-qualified type whose annotation lacks `ctor_name`.
        spec_type: String,
    },

    /// A preparer or command action returned an error.
    #[error("action failed: {0}")]
    Action(#[source] ComponentError),

    /// A destroyer failed while tearing down a container scope.
    #[error("teardown failed: {0}")]
    Teardown(#[source] ComponentError),
}

impl WiregenError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(declaration: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            declaration: declaration.into(),
            message: message.into(),
        }
    }

    /// Classifies an error returned from an action, surfacing container
    /// failures as [`WiregenError::Wiring`] rather than opaque action errors.
    pub(crate) fn from_action(err: ComponentError) -> Self {
        match err.downcast::<WiringError>() {
            Ok(wiring) => Self::Wiring(*wiring),
            Err(other) => match other.downcast::<Self>() {
                Ok(own) => *own,
                Err(opaque) => Self::Action(opaque),
            },
        }
    }
}
