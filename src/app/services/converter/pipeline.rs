//! Conversion orchestration
//!
//! Composes the reader, the mapper and the JSON encoder into a single
//! bytes-in, JSON-bytes-out operation and hands the records to the storage
//! capability when one is configured.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use super::stats::{Conversion, ConversionStats};
use crate::app::models::{BatchId, ColumnPolicy, Record, StoredBatch};
use crate::app::services::csv_reader::parse_csv;
use crate::app::services::json_encoder::{JsonArrayWriter, encode_records};
use crate::app::services::record_mapper::RecordMapper;
use crate::app::storage::{Storage, StoragePort};
use crate::constants::{DEFAULT_BATCH_NAME, MAX_REPORTED_MISMATCHES};
use crate::error::{ColumnMismatch, FormatError};
use crate::{Error, Result};

/// CSV → JSON converter with optional persistence
///
/// Without storage every call is a pure function of its input and records are
/// streamed straight into the encoder. With storage the records of a call are
/// buffered, encoded and saved as one batch; the JSON is only returned when
/// the save succeeded. Both modes produce identical JSON for identical input.
///
/// The converter holds no per-call state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    storage: Storage,
    column_policy: ColumnPolicy,
}

impl Converter {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            column_policy: ColumnPolicy::default(),
        }
    }

    /// Converter without a store
    pub fn convert_only() -> Self {
        Self::new(Storage::Unconfigured)
    }

    /// Converter that persists every converted batch to `port`
    pub fn with_store(port: impl StoragePort + 'static) -> Self {
        Self::new(Storage::configured(port))
    }

    /// Set how rows of the wrong width are handled
    pub fn with_column_policy(mut self, policy: ColumnPolicy) -> Self {
        self.column_policy = policy;
        self
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn column_policy(&self) -> ColumnPolicy {
        self.column_policy
    }

    /// Convert a CSV stream into a JSON array of objects
    ///
    /// Fails with [`Error::EndOfInput`] when the stream holds no rows and
    /// with [`Error::Format`] on malformed input, in which case the store is
    /// never called. A failing save fails the whole call.
    pub fn convert<R: Read>(&self, input: R, batch_name: &str) -> Result<Conversion> {
        let mut reader = parse_csv(input);
        let header = Arc::new(reader.read_header()?);
        let columns = header.len();
        let keys = header.keys().len();
        if header.has_duplicates() {
            warn!(
                "Header repeats column names; {} columns map to {} keys and later values win",
                columns, keys
            );
        }
        let mut records = RecordMapper::new(header, &mut reader, self.column_policy);

        let (json, batch_id) = match &self.storage {
            Storage::Unconfigured => {
                let mut writer = JsonArrayWriter::new(Vec::new())?;
                for_each_record(&mut records, |record| writer.write_record(&record))?;
                (writer.finish()?, None)
            }
            Storage::Configured(_) => {
                let mut buffered: Vec<Record> = Vec::new();
                for_each_record(&mut records, |record| {
                    buffered.push(record);
                    Ok(())
                })?;
                let json = encode_records(&buffered)?;
                let batch_id = self.storage.save(batch_name, &buffered)?;
                (json, batch_id)
            }
        };

        let record_count = records.records_mapped();
        let stats = ConversionStats {
            columns,
            keys,
            records: record_count,
            blank_lines_skipped: reader.blank_lines_skipped(),
            json_bytes: json.len(),
        };

        Ok(Conversion {
            json,
            batch_id,
            stats,
        })
    }

    /// Convert a stream without a batch name
    pub fn convert_reader<R: Read>(&self, input: R) -> Result<Conversion> {
        self.convert(input, DEFAULT_BATCH_NAME)
    }

    /// Convert a CSV file, using its file name as the batch name
    pub fn convert_file(&self, path: &Path) -> Result<Conversion> {
        let file = File::open(path)
            .map_err(|e| Error::io(format!("Failed to open file {}", path.display()), e))?;
        let batch_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.convert(file, &batch_name)
    }

    /// Every stored batch; fails with [`Error::StoreNotConfigured`] without a store
    pub fn get_all(&self) -> Result<Vec<StoredBatch>> {
        self.storage.get_all()
    }

    /// One stored batch; fails with [`Error::StoreNotConfigured`] without a store
    pub fn get_by_id(&self, id: BatchId) -> Result<StoredBatch> {
        self.storage.get_by_id(id)
    }
}

/// Feed every record to `sink`, stopping at the first error
///
/// A column-count error keeps the scan going so that all mismatched rows are
/// reported together.
fn for_each_record<I, F>(records: &mut I, mut sink: F) -> Result<()>
where
    I: Iterator<Item = Result<Record>>,
    F: FnMut(Record) -> Result<()>,
{
    while let Some(item) = records.next() {
        match item {
            Ok(record) => sink(record)?,
            Err(Error::Format(FormatError::ColumnCount(first))) => {
                return Err(collect_mismatches(first, records));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn collect_mismatches<I>(mut mismatches: Vec<ColumnMismatch>, rest: &mut I) -> Error
where
    I: Iterator<Item = Result<Record>>,
{
    while mismatches.len() < MAX_REPORTED_MISMATCHES {
        match rest.next() {
            Some(Ok(_)) => continue,
            Some(Err(Error::Format(FormatError::ColumnCount(more)))) => mismatches.extend(more),
            Some(Err(_)) | None => break,
        }
    }
    mismatches.truncate(MAX_REPORTED_MISMATCHES);
    FormatError::ColumnCount(mismatches).into()
}
