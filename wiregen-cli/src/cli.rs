//! Command-line interface definitions for `wiregen`.

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use wiregen::CtorNamePolicy;

/// Parsed CLI arguments for `wiregen`.
#[derive(Debug, Parser)]
#[command(name = "wiregen")]
#[command(about = "Generate @app-cfg wiring and keep the env file in sync")]
#[command(version)]
pub struct Args {
    /// Project root containing `go.mod`.
    #[arg(long, global = true, value_name = "dir", default_value = ".")]
    pub root: Utf8PathBuf,
    /// Project name (defaults to the last segment of the module path).
    #[arg(long, global = true)]
    pub name: Option<String>,
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long = "verbose", short = 'v', global = true)]
    pub is_verbose: bool,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Build-tool commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the wiring file and seed the env file.
    Generate(GenerateArgs),
    /// Log every annotated declaration without writing anything.
    Scan,
    /// Synchronise the env file only.
    Env(EnvArgs),
}

impl Command {
    /// Name the command is registered under in the build tool.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Generate(_) => "generate",
            Self::Scan => "scan",
            Self::Env(_) => "env",
        }
    }
}

/// Flags for `wiregen generate`.
#[derive(Debug, Default, Clone, ClapArgs)]
pub struct GenerateArgs {
    /// Directory of the generated package.
    #[arg(long, value_name = "dir")]
    pub destination: Option<Utf8PathBuf>,
    /// Generated file, overriding `<destination>/app_cfg_annotated.go`.
    #[arg(long, value_name = "file")]
    pub target: Option<Utf8PathBuf>,
    /// Marker selecting annotated types.
    #[arg(long, value_name = "name")]
    pub tag: Option<String>,
    /// Template file replacing the built-in one.
    #[arg(long, value_name = "file")]
    pub template: Option<Utf8PathBuf>,
    /// Env file to synchronise.
    #[command(flatten)]
    pub env: EnvArgs,
    /// Skip env-file synchronisation.
    #[arg(long = "no-dotenv")]
    pub should_skip_dotenv: bool,
    /// Skip running `goimports` on the generated file.
    #[arg(long = "no-format")]
    pub should_skip_format: bool,
    /// Handling of annotations without `ctor_name`.
    #[arg(long, value_enum, value_name = "policy")]
    pub ctor_policy: Option<CtorPolicy>,
}

/// Env-file selection shared by `generate` and `env`.
#[derive(Debug, Default, Clone, ClapArgs)]
pub struct EnvArgs {
    /// Env file to synchronise, relative to the root.
    #[arg(long, value_name = "file")]
    pub env_file: Option<Utf8PathBuf>,
}

/// Constructor-name policies accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CtorPolicy {
    /// Keep an empty name as-is.
    Verbatim,
    /// Derive `New<TypeName>` for an empty name.
    Derive,
    /// Fail on an empty name.
    Reject,
}

impl From<CtorPolicy> for CtorNamePolicy {
    fn from(policy: CtorPolicy) -> Self {
        match policy {
            CtorPolicy::Verbatim => Self::Verbatim,
            CtorPolicy::Derive => Self::DeriveFromType,
            CtorPolicy::Reject => Self::Reject,
        }
    }
}
