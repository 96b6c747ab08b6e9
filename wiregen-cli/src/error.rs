//! Error types for the `wiregen` command line.

use camino::Utf8PathBuf;
use thiserror::Error;
use wiregen::WiregenError;

/// Errors surfaced by the `wiregen` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Generation, validation or command failure.
    #[error(transparent)]
    Wiregen(#[from] WiregenError),

    /// Layered settings could not be extracted.
    #[error("invalid configuration: {0}")]
    Config(Box<figment::Error>),

    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    /// A file named by the settings could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
