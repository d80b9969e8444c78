//! In-process storage backend
//!
//! Keeps batches in a map guarded by an `RwLock`. Identifiers start at 1 and
//! increase with every save. Useful for embedding and for tests; nothing
//! survives the process.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::app::models::{BatchId, Record, StoredBatch};
use crate::app::storage::StoragePort;
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: u64,
    batches: BTreeMap<BatchId, StoredBatch>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of batches currently held
    pub fn batch_count(&self) -> Result<usize> {
        let state = self
            .state
            .read()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        Ok(state.batches.len())
    }
}

impl StoragePort for MemoryStore {
    fn save(&self, batch_name: &str, records: &[Record]) -> Result<BatchId> {
        let mut state = self
            .state
            .write()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;

        state.last_id += 1;
        let id = BatchId::new(state.last_id);
        state.batches.insert(
            id,
            StoredBatch {
                id,
                name: batch_name.to_string(),
                ingested_at: Utc::now(),
                records: records.to_vec(),
            },
        );
        Ok(id)
    }

    fn get_all(&self) -> Result<Vec<StoredBatch>> {
        let state = self
            .state
            .read()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        Ok(state.batches.values().cloned().collect())
    }

    fn get_by_id(&self, id: BatchId) -> Result<StoredBatch> {
        let state = self
            .state
            .read()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        state
            .batches
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| Record::from_iter([("n", i.to_string())]))
            .collect()
    }

    #[test]
    fn test_ids_increase_from_one() {
        let store = MemoryStore::new();
        assert_eq!(store.save("a", &records(1)).unwrap(), BatchId::new(1));
        assert_eq!(store.save("b", &records(2)).unwrap(), BatchId::new(2));
        assert_eq!(store.batch_count().unwrap(), 2);
    }

    #[test]
    fn test_get_all_is_ordered_by_id() {
        let store = MemoryStore::new();
        store.save("first", &records(1)).unwrap();
        store.save("second", &records(3)).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(
            all.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        assert_eq!(all[1].record_count(), 3);
    }

    #[test]
    fn test_get_by_id_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_by_id(BatchId::new(9)),
            Err(Error::NotFound { id }) if id == BatchId::new(9)
        ));
    }

    #[test]
    fn test_concurrent_saves_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.save(&format!("batch-{}", i), &records(2)).unwrap())
            })
            .collect();

        let mut ids: Vec<BatchId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.get_all().unwrap().len(), 8);
    }
}
