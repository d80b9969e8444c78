//! Storage port for persisting converted batches
//!
//! The converter depends only on the [`StoragePort`] trait. Whether a store
//! is present is decided at construction time and expressed by the
//! [`Storage`] capability: `Configured` forwards to a backend, `Unconfigured`
//! turns saves into no-ops and makes queries fail with
//! [`Error::StoreNotConfigured`].

use std::fmt;
use std::sync::Arc;

use crate::app::models::{BatchId, Record, StoredBatch};
use crate::{Error, Result};

/// Operations the converter requires from a backing store
///
/// Implementations must be safe to call concurrently; `save` may be invoked
/// from several threads for different batch names at once.
pub trait StoragePort: Send + Sync + fmt::Debug {
    /// Persist records as one named batch and return its identifier
    fn save(&self, batch_name: &str, records: &[Record]) -> Result<BatchId>;

    /// Every stored batch, ordered by identifier
    fn get_all(&self) -> Result<Vec<StoredBatch>>;

    /// One stored batch, or [`Error::NotFound`]
    fn get_by_id(&self, id: BatchId) -> Result<StoredBatch>;
}

/// Optional storage capability
#[derive(Debug, Clone, Default)]
pub enum Storage {
    Configured(Arc<dyn StoragePort>),
    #[default]
    Unconfigured,
}

impl Storage {
    pub fn configured(port: impl StoragePort + 'static) -> Self {
        Storage::Configured(Arc::new(port))
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Storage::Configured(_))
    }

    /// Save a batch, returning its id, or do nothing without a store
    pub fn save(&self, batch_name: &str, records: &[Record]) -> Result<Option<BatchId>> {
        match self {
            Storage::Configured(port) => port.save(batch_name, records).map(Some),
            Storage::Unconfigured => Ok(None),
        }
    }

    pub fn get_all(&self) -> Result<Vec<StoredBatch>> {
        match self {
            Storage::Configured(port) => port.get_all(),
            Storage::Unconfigured => Err(Error::StoreNotConfigured),
        }
    }

    pub fn get_by_id(&self, id: BatchId) -> Result<StoredBatch> {
        match self {
            Storage::Configured(port) => port.get_by_id(id),
            Storage::Unconfigured => Err(Error::StoreNotConfigured),
        }
    }
}
