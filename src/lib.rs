//! csv2json Library
//!
//! A Rust library for converting delimited text (RFC 4180 style CSV with a
//! header row) into a JSON array of objects, optionally persisting every
//! converted batch to a pluggable store.
//!
//! This library provides tools for:
//! - Streaming CSV parsing with strict quote handling and line tracking
//! - Binding rows to header keys with order-preserving records
//! - Incremental JSON array encoding
//! - Conversion orchestration with an optional storage capability
//! - In-memory and directory-backed batch stores

pub mod config;
pub mod constants;
pub mod error;

// Core application modules
pub mod app {
    pub mod models;
    pub mod storage;
    pub mod services {
        pub mod converter;
        pub mod csv_reader;
        pub mod json_encoder;
        pub mod record_mapper;
    }
    pub mod adapters {
        pub mod directory_store;
        pub mod memory_store;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{BatchId, ColumnPolicy, Header, Record, Row, StoredBatch};
pub use app::services::converter::{Conversion, ConversionStats, Converter};
pub use app::services::csv_reader::parse_csv;
pub use app::storage::{Storage, StoragePort};
pub use config::Config;
pub use error::{ColumnMismatch, Error, FormatError, Result};
