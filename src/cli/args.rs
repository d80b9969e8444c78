//! Command-line argument definitions for csv2json
//!
//! This module defines the CLI interface using the clap derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::app::models::{BatchId, ColumnPolicy};

/// CLI arguments for the CSV to JSON converter
#[derive(Debug, Clone, Parser)]
#[command(
    name = "csv2json",
    version,
    about = "Convert CSV with a header row into a JSON array of objects",
    long_about = "Reads CSV (RFC 4180 quoting, comma delimiter, first row is the header) and \
                  writes a JSON array with one object per data row, keys in header order and \
                  every value a string. Converted batches can optionally be kept in a \
                  directory store and listed or shown later."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert a CSV file or standard input to JSON
    Convert(ConvertArgs),
    /// List batches held in the store
    List(ListArgs),
    /// Print the records of one stored batch as JSON
    Show(ShowArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CommonArgs {
    /// Root directory of the batch store
    ///
    /// Overrides `storage.directory` from the config file and the
    /// CSV2JSON_STORE_DIR environment variable.
    #[arg(long = "store", value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// <config dir>/csv2json/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help = "Suppress output except errors"
    )]
    pub quiet: bool,
}

impl CommonArgs {
    /// Log level from the flags, or `None` when neither -v nor -q was given
    pub fn get_log_level(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// CSV file to convert, or `-` for standard input
    #[arg(value_name = "INPUT", default_value = crate::constants::STDIN_PATH)]
    pub input: PathBuf,

    /// Write JSON to FILE instead of standard output
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Batch name recorded in the store (defaults to the input file name)
    #[arg(long = "name", value_name = "NAME")]
    pub batch_name: Option<String>,

    /// Do not persist this conversion even if a store is configured
    #[arg(long = "no-store", conflicts_with = "store_dir")]
    pub no_store: bool,

    /// How to treat rows whose field count differs from the header (strict or pad)
    #[arg(long = "column-policy", value_name = "POLICY", value_parser = ColumnPolicy::from_str)]
    pub column_policy: Option<ColumnPolicy>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ConvertArgs {
    /// True when the input is standard input
    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == crate::constants::STDIN_PATH
    }
}

#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
    /// Output format for the listing
    #[arg(long = "format", value_enum, default_value = "human")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Clone, Parser)]
pub struct ShowArgs {
    /// Identifier printed by `convert` or `list`
    #[arg(value_name = "ID")]
    pub id: BatchId,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Human,
    /// JSON array of batch summaries
    Json,
}

impl Args {
    /// Options shared by the selected subcommand
    pub fn common(&self) -> Option<&CommonArgs> {
        match self.command.as_ref()? {
            Commands::Convert(args) => Some(&args.common),
            Commands::List(args) => Some(&args.common),
            Commands::Show(args) => Some(&args.common),
        }
    }
}
