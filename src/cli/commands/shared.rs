//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading and converter construction
//! used by every subcommand.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::app::services::converter::Converter;
use crate::cli::args::CommonArgs;
use crate::config::{Config, StorageBackend};
use crate::{Error, Result};

/// Set up structured logging on stderr
///
/// `RUST_LOG` wins over `level` when set.
pub fn setup_logging(level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("csv2json={}", level)));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}

/// The config file to read: the explicit one, else the default if it exists
pub fn resolve_config_file(args: &CommonArgs) -> Option<PathBuf> {
    match &args.config_file {
        Some(path) => Some(path.clone()),
        None => Config::default_config_path()
            .ok()
            .filter(|path| path.exists()),
    }
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(args: &CommonArgs) -> Result<Config> {
    let config_file = resolve_config_file(args);
    let mut config = Config::load_layered(config_file.as_deref())?;

    apply_cli_overrides(&mut config, args);
    config.validate()?;

    Ok(config)
}

/// Apply flags shared by every subcommand
pub fn apply_cli_overrides(config: &mut Config, args: &CommonArgs) {
    if let Some(dir) = &args.store_dir {
        config.storage.backend = StorageBackend::Directory;
        config.storage.directory = Some(dir.clone());
    }
    if let Some(level) = args.get_log_level() {
        config.logging.level = level.to_string();
    }
}

/// Converter for `config`, dropping to convert-only if the store cannot be opened
pub fn converter_or_convert_only(config: &Config) -> Converter {
    match config.converter() {
        Ok(converter) => converter,
        Err(e) => {
            warn!("Failed to open store: {}", e);
            warn!("Running without persistence - CSV conversion will still work");
            Converter::convert_only().with_column_policy(config.conversion.column_policy)
        }
    }
}
