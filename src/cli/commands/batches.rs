//! List and show commands for stored batches

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use tracing::debug;

use crate::Error;
use crate::app::models::{BatchId, StoredBatch};
use crate::app::services::converter::Converter;
use crate::cli::args::{ListArgs, OutputFormat, ShowArgs};
use crate::config::Config;

const NO_STORE_HINT: &str =
    "no store configured; pass --store DIR, set CSV2JSON_STORE_DIR or configure [storage] in the config file";

/// One line of the batch listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub id: BatchId,
    pub name: String,
    pub ingested_at: DateTime<Utc>,
    pub records: usize,
}

impl From<&StoredBatch> for BatchSummary {
    fn from(batch: &StoredBatch) -> Self {
        Self {
            id: batch.id,
            name: batch.name.clone(),
            ingested_at: batch.ingested_at,
            records: batch.record_count(),
        }
    }
}

/// Run the list command
pub fn run_list(args: &ListArgs, config: &Config) -> Result<Vec<BatchSummary>> {
    let converter = open_store(config)?;
    let batches = converter.get_all().map_err(with_hint)?;
    debug!("Loaded {} batches", batches.len());

    let summaries: Vec<BatchSummary> = batches.iter().map(BatchSummary::from).collect();
    write_listing(&mut io::stdout().lock(), &summaries, args.format)
        .context("Failed to write batch listing")?;
    Ok(summaries)
}

/// Run the show command
pub fn run_show(args: &ShowArgs, config: &Config) -> Result<StoredBatch> {
    let converter = open_store(config)?;
    let batch = converter.get_by_id(args.id).map_err(with_hint)?;

    write_records(&mut io::stdout().lock(), &batch, args.pretty)
        .context("Failed to write batch records")?;
    Ok(batch)
}

fn open_store(config: &Config) -> Result<Converter> {
    config.converter().context("Failed to open store")
}

fn with_hint(error: Error) -> anyhow::Error {
    match error {
        Error::StoreNotConfigured => anyhow::Error::new(error).context(NO_STORE_HINT),
        other => other.into(),
    }
}

/// Write batch summaries as a table or a JSON array
pub fn write_listing<W: Write>(
    out: &mut W,
    summaries: &[BatchSummary],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, summaries)?;
            writeln!(out)?;
        }
        OutputFormat::Human => {
            if summaries.is_empty() {
                writeln!(out, "{}", "No batches stored".bright_yellow())?;
                return Ok(());
            }

            writeln!(out, "{}", "Stored batches".bright_green().bold())?;
            for summary in summaries {
                writeln!(
                    out,
                    "  {:>6}  {}  {:>8} records  {}",
                    summary.id.to_string().bright_white().bold(),
                    summary.ingested_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    summary.records,
                    summary.name.bright_cyan()
                )?;
            }
        }
    }
    Ok(())
}

/// Write the records of a batch as a JSON array
pub fn write_records<W: Write>(out: &mut W, batch: &StoredBatch, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, &batch.records)?;
    } else {
        serde_json::to_writer(&mut *out, &batch.records)?;
    }
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Record;
    use crate::cli::args::{Args, Commands};
    use clap::Parser;
    use tempfile::TempDir;

    fn batch(id: u64, name: &str) -> StoredBatch {
        StoredBatch {
            id: BatchId::new(id),
            name: name.to_string(),
            ingested_at: Utc::now(),
            records: vec![
                Record::from_iter([("name", "Alice"), ("age", "30")]),
                Record::from_iter([("name", "Bob"), ("age", "25")]),
            ],
        }
    }

    #[test]
    fn test_summary_from_batch() {
        let summary = BatchSummary::from(&batch(3, "people.csv"));
        assert_eq!(summary.id, BatchId::new(3));
        assert_eq!(summary.name, "people.csv");
        assert_eq!(summary.records, 2);
    }

    #[test]
    fn test_json_listing() {
        let summaries = vec![BatchSummary::from(&batch(1, "a.csv"))];
        let mut out = Vec::new();
        write_listing(&mut out, &summaries, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["name"], "a.csv");
        assert_eq!(value[0]["records"], 2);
    }

    #[test]
    fn test_human_listing() {
        let summaries = vec![
            BatchSummary::from(&batch(1, "a.csv")),
            BatchSummary::from(&batch(2, "b.csv")),
        ];
        let mut out = Vec::new();
        write_listing(&mut out, &summaries, OutputFormat::Human).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("a.csv"));
        assert!(text.contains("b.csv"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_human_listing_empty() {
        let mut out = Vec::new();
        write_listing(&mut out, &[], OutputFormat::Human).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No batches stored"));
    }

    #[test]
    fn test_write_records_keeps_key_order() {
        let mut out = Vec::new();
        write_records(&mut out, &batch(1, "a.csv"), false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[{\"name\":\"Alice\",\"age\":\"30\"},{\"name\":\"Bob\",\"age\":\"25\"}]\n"
        );
    }

    #[test]
    fn test_list_without_store_explains_how_to_configure() {
        let args = match Args::try_parse_from(["csv2json", "list"]).unwrap().command {
            Some(Commands::List(args)) => args,
            other => panic!("expected list, got {:?}", other),
        };
        let error = run_list(&args, &Config::default()).unwrap_err();

        assert!(format!("{}", error).contains("--store"));
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::StoreNotConfigured)
        ));
    }

    #[test]
    fn test_show_unknown_batch() {
        let dir = TempDir::new().unwrap();
        let config = Config::default().with_store_directory(dir.path());
        let args = match Args::try_parse_from(["csv2json", "show", "9"]).unwrap().command {
            Some(Commands::Show(args)) => args,
            other => panic!("expected show, got {:?}", other),
        };

        let error = run_show(&args, &config).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::NotFound { .. })
        ));
    }
}
