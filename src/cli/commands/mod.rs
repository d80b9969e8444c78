//! Command implementations for the csv2json CLI
//!
//! Each command is implemented in its own module:
//! - `convert`: CSV to JSON conversion with optional persistence
//! - `batches`: listing and showing stored batches
//! - `shared`: logging and configuration setup used by all commands

pub mod batches;
pub mod convert;
pub mod shared;

use anyhow::Result;
use tracing::debug;

use crate::cli::args::{Args, Commands};

/// Main command runner for csv2json
///
/// Loads the layered configuration for the selected subcommand, sets up
/// logging and dispatches to the command handler.
pub fn run(args: Args) -> Result<()> {
    let (Some(command), Some(common)) = (args.command.as_ref(), args.common()) else {
        return Ok(());
    };

    let config = shared::load_configuration(common)?;
    shared::setup_logging(&config.logging.level, common.quiet)?;
    if let Some(path) = shared::resolve_config_file(common) {
        debug!("Using config file: {}", path.display());
    }

    match command {
        Commands::Convert(convert_args) => convert::run_convert(convert_args, config).map(|_| ()),
        Commands::List(list_args) => batches::run_list(list_args, &config).map(|_| ()),
        Commands::Show(show_args) => batches::run_show(show_args, &config).map(|_| ()),
    }
}
