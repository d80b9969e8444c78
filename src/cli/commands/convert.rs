//! Convert command implementation
//!
//! Reads CSV from a file or standard input, writes the JSON array to standard
//! output or a file and reports the stored batch id on stderr.

use std::fs::{self, File};
use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::*;
use tracing::{debug, info};

use super::shared::converter_or_convert_only;
use crate::app::services::converter::{Conversion, ConversionStats, Converter};
use crate::cli::args::ConvertArgs;
use crate::config::Config;
use crate::constants::STDIN_BATCH_NAME;
use crate::error::Error;

/// Run the convert command
pub fn run_convert(args: &ConvertArgs, mut config: Config) -> Result<Conversion> {
    if let Some(policy) = args.column_policy {
        config.conversion.column_policy = policy;
    }
    if args.no_store {
        config = config.without_storage();
    }

    let converter = converter_or_convert_only(&config);
    debug!(
        "Converting {} (column policy: {}, store: {})",
        args.input.display(),
        converter.column_policy(),
        if converter.storage().is_configured() { "on" } else { "off" }
    );

    let conversion = convert_input(&converter, args)?;
    write_output(args, &conversion)?;

    info!("Converted {}", conversion.stats.summary());
    if conversion.stats.blank_lines_skipped > 0 {
        debug!("Skipped {} blank lines", conversion.stats.blank_lines_skipped);
    }
    if let Some(id) = conversion.batch_id {
        if !args.common.quiet {
            eprintln!("{} {}", "Stored as batch".bright_green(), id.to_string().bold());
        }
    }

    Ok(conversion)
}

fn convert_input(converter: &Converter, args: &ConvertArgs) -> Result<Conversion> {
    if args.reads_stdin() {
        let name = args.batch_name.as_deref().unwrap_or(STDIN_BATCH_NAME);
        return converter
            .convert(io::stdin().lock(), name)
            .map_err(|e| describe_failure(e, "standard input"));
    }

    let source = args.input.display().to_string();
    let conversion = match &args.batch_name {
        Some(name) => {
            let file = File::open(&args.input)
                .with_context(|| format!("Failed to open {}", source))?;
            converter.convert(file, name)
        }
        None => converter.convert_file(&args.input),
    };
    conversion.map_err(|e| describe_failure(e, &source))
}

/// Attach a context line that tells bad input apart from I/O or store failures
fn describe_failure(error: Error, source: &str) -> anyhow::Error {
    let context = if error.is_input_error() {
        format!("Invalid CSV in {}", source)
    } else {
        format!("Failed to convert {}", source)
    };
    anyhow::Error::new(error).context(context)
}

fn write_output(args: &ConvertArgs, conversion: &Conversion) -> Result<()> {
    match &args.output {
        Some(path) => {
            fs::write(path, &conversion.json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "Wrote {} to {}",
                ConversionStats::format_size(conversion.stats.json_bytes),
                path.display()
            );
        }
        None => {
            write_json_line(&mut io::stdout().lock(), &conversion.json)
                .context("Failed to write to standard output")?;
        }
    }
    Ok(())
}

fn write_json_line<W: Write>(out: &mut W, json: &[u8]) -> io::Result<()> {
    out.write_all(json)?;
    out.write_all(b"\n")?;
    out.flush()
}
