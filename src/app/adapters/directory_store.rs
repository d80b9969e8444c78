//! Directory-backed storage
//!
//! Each batch is one JSON document named `batch-<id>.json` under the store
//! root. Documents are written to a temporary file in the same directory and
//! moved into place without clobbering, so two writers racing for the same
//! identifier never overwrite each other: the loser retries with the next id.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::app::models::{BatchId, Record, StoredBatch};
use crate::app::storage::StoragePort;
use crate::constants::{BATCH_FILE_EXTENSION, BATCH_FILE_PREFIX};
use crate::{Error, Result};

/// Attempts at claiming a fresh identifier before giving up
const MAX_SAVE_ATTEMPTS: usize = 16;

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            Error::storage_with_source(
                format!("Failed to create store directory {}", root.display()),
                e,
            )
        })?;
        if !root.is_dir() {
            return Err(Error::storage(format!(
                "Store path is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn batch_path(&self, id: BatchId) -> PathBuf {
        self.root
            .join(format!("{}{}.{}", BATCH_FILE_PREFIX, id, BATCH_FILE_EXTENSION))
    }

    /// Identifiers of every batch file under the root, ascending
    fn batch_ids(&self) -> Result<Vec<BatchId>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            Error::storage_with_source(
                format!("Failed to list store directory {}", self.root.display()),
                e,
            )
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::storage_with_source("Failed to read store directory entry", e)
            })?;
            if let Some(id) = entry.file_name().to_str().and_then(parse_batch_file_name) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read_batch(&self, id: BatchId) -> Result<StoredBatch> {
        let path = self.batch_path(id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::not_found(id)),
            Err(e) => {
                return Err(Error::storage_with_source(
                    format!("Failed to open {}", path.display()),
                    e,
                ));
            }
        };

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::storage_with_source(format!("Corrupt batch file {}", path.display()), e)
        })
    }

    fn write_temp(&self, batch: &StoredBatch) -> Result<NamedTempFile> {
        let mut temp = NamedTempFile::new_in(&self.root).map_err(|e| {
            Error::storage_with_source("Failed to create temporary batch file", e)
        })?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer(&mut writer, batch)
                .map_err(|e| Error::storage_with_source("Failed to serialize batch", e))?;
            writer
                .flush()
                .map_err(|e| Error::storage_with_source("Failed to write batch file", e))?;
        }
        Ok(temp)
    }
}

impl StoragePort for DirectoryStore {
    fn save(&self, batch_name: &str, records: &[Record]) -> Result<BatchId> {
        let mut id = self
            .batch_ids()?
            .last()
            .map_or(BatchId::new(1), |last| last.next());
        let mut batch = StoredBatch {
            id,
            name: batch_name.to_string(),
            ingested_at: Utc::now(),
            records: records.to_vec(),
        };

        for _ in 0..MAX_SAVE_ATTEMPTS {
            let temp = self.write_temp(&batch)?;
            match temp.persist_noclobber(self.batch_path(id)) {
                Ok(_) => {
                    debug!(
                        "Saved batch {} ('{}', {} records) to {}",
                        id,
                        batch_name,
                        records.len(),
                        self.root.display()
                    );
                    return Ok(id);
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    debug!("Batch id {} already taken, retrying", id);
                    id = id.next();
                    batch.id = id;
                }
                Err(e) => {
                    return Err(Error::storage_with_source(
                        format!("Failed to persist batch {}", id),
                        e.error,
                    ));
                }
            }
        }

        warn!(
            "Gave up saving batch '{}' after {} attempts",
            batch_name, MAX_SAVE_ATTEMPTS
        );
        Err(Error::storage(format!(
            "Could not claim a batch id for '{}' after {} attempts",
            batch_name, MAX_SAVE_ATTEMPTS
        )))
    }

    fn get_all(&self) -> Result<Vec<StoredBatch>> {
        let ids = self.batch_ids()?;
        let mut batches = Vec::with_capacity(ids.len());
        for id in ids {
            match self.read_batch(id) {
                Ok(batch) => batches.push(batch),
                // removed between listing and reading
                Err(Error::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(batches)
    }

    fn get_by_id(&self, id: BatchId) -> Result<StoredBatch> {
        self.read_batch(id)
    }
}

/// Parse `batch-<id>.json` into an identifier
fn parse_batch_file_name(name: &str) -> Option<BatchId> {
    name.strip_prefix(BATCH_FILE_PREFIX)?
        .strip_suffix(BATCH_FILE_EXTENSION)?
        .strip_suffix('.')?
        .parse::<u64>()
        .ok()
        .map(BatchId::new)
}
