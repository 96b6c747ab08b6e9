//! Library backing the `wiregen` binary.
//!
//! [`run`] resolves layered settings, builds the build context with the
//! `@app-cfg` module and dispatches the requested command through
//! [`wiregen::BuildTool`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use wiregen::render::{GoImports, ImportFormatter, NoopFormatter};
use wiregen::source::GoModule;
use wiregen::{AppCfgAnnotator, BuildTool, Context};

use crate::cli::Args;
use crate::commands::AppCfgModule;
use crate::config::{Overrides, Settings};
use crate::error::CliError;

/// Runs the command selected by `args`.
///
/// # Errors
///
/// Returns configuration failures and anything the command or the `Before`
/// hook reports.
pub fn run(args: &Args) -> Result<(), CliError> {
    let settings = Settings::load(&args.root, &Overrides::from(&args.command))?;
    tracing::debug!(?settings, "resolved settings");

    let formatter: Box<dyn ImportFormatter> = if settings.format {
        Box::new(GoImports::default())
    } else {
        Box::new(NoopFormatter)
    };
    let annotator = AppCfgAnnotator::new(settings.annotator_config(&args.root)?, formatter)?;

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| default_project_name(&args.root));
    let context = Context {
        description: "wiregen build tool".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ..Context::new(name, args.root.clone())
    }
    .with_module(AppCfgModule::new(annotator));

    BuildTool::new(context).run(args.command.name())?;
    Ok(())
}

/// Last segment of the `go.mod` module path, else the root directory name.
#[must_use]
pub fn default_project_name(root: &Utf8Path) -> String {
    Dir::open_ambient_dir(root, ambient_authority())
        .and_then(|dir| dir.read_to_string("go.mod"))
        .ok()
        .and_then(|contents| GoModule::parse(&contents))
        .map(|module| module.name().to_owned())
        .or_else(|| {
            root.canonicalize_utf8()
                .ok()
                .and_then(|path| path.file_name().map(str::to_owned))
        })
        .unwrap_or_default()
}
