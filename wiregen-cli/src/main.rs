//! CLI entrypoint for `wiregen`.

use clap::Parser;
use wiregen_cli::cli::Args;
use wiregen_cli::error::CliError;
use wiregen_cli::logging;

fn main() -> Result<(), CliError> {
    let args = Args::parse();
    logging::init(args.is_verbose)?;
    wiregen_cli::run(&args).inspect_err(|err| tracing::error!(error = %err, "wiregen failed"))
}
