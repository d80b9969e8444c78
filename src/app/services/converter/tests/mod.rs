//! Test utilities and mock stores for converter testing

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app::models::{BatchId, Record, StoredBatch};
use crate::app::storage::StoragePort;
use crate::{Error, Result};

mod persistence_tests;

/// Store whose `save` always fails, counting how often it was called
#[derive(Debug, Default)]
pub struct FailingStore {
    pub save_calls: AtomicUsize,
}

impl StoragePort for FailingStore {
    fn save(&self, _batch_name: &str, _records: &[Record]) -> Result<BatchId> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::storage("backend unavailable"))
    }

    fn get_all(&self) -> Result<Vec<StoredBatch>> {
        Err(Error::storage("backend unavailable"))
    }

    fn get_by_id(&self, _id: BatchId) -> Result<StoredBatch> {
        Err(Error::storage("backend unavailable"))
    }
}

/// Store that records what it was asked to save
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub saved: Mutex<Vec<(String, Vec<Record>)>>,
}

impl StoragePort for RecordingStore {
    fn save(&self, batch_name: &str, records: &[Record]) -> Result<BatchId> {
        let mut saved = self.saved.lock().unwrap();
        saved.push((batch_name.to_string(), records.to_vec()));
        Ok(BatchId::new(saved.len() as u64))
    }

    fn get_all(&self) -> Result<Vec<StoredBatch>> {
        Ok(Vec::new())
    }

    fn get_by_id(&self, id: BatchId) -> Result<StoredBatch> {
        Err(Error::not_found(id))
    }
}

/// Three-row sample used across scenarios
pub const PEOPLE_CSV: &str = "name,age,city\nAlice,30,NYC\nBob,25,LA";

/// Expected JSON for [`PEOPLE_CSV`]
pub const PEOPLE_JSON: &str =
    r#"[{"name":"Alice","age":"30","city":"NYC"},{"name":"Bob","age":"25","city":"LA"}]"#;
