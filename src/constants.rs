//! Application constants for csv2json
//!
//! This module contains the CSV dialect, configuration defaults and the
//! environment variable names used throughout the converter.

// =============================================================================
// CSV Dialect
// =============================================================================

/// Field delimiter
pub const FIELD_DELIMITER: u8 = b',';

/// Quote character for fields containing delimiters, quotes or line breaks
pub const QUOTE: u8 = b'"';

/// Upper bound on mismatched rows collected into a single column-count error
pub const MAX_REPORTED_MISMATCHES: usize = 20;

// =============================================================================
// Storage
// =============================================================================

/// File name prefix for batches written by the directory store
pub const BATCH_FILE_PREFIX: &str = "batch-";

/// File extension for batches written by the directory store
pub const BATCH_FILE_EXTENSION: &str = "json";

/// Batch name used when the caller does not supply one
pub const DEFAULT_BATCH_NAME: &str = "";

/// Batch name recorded for data read from standard input
pub const STDIN_BATCH_NAME: &str = "stdin";

// =============================================================================
// Configuration
// =============================================================================

/// Application directory under the platform config/data directories
pub const APP_DIR_NAME: &str = "csv2json";

/// Config file name inside the application config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable naming the directory store root
pub const ENV_STORE_DIR: &str = "CSV2JSON_STORE_DIR";

/// Environment variable selecting the column policy (`strict` or `pad`)
pub const ENV_COLUMN_POLICY: &str = "CSV2JSON_COLUMN_POLICY";

/// Environment variable selecting the default log level
pub const ENV_LOG_LEVEL: &str = "CSV2JSON_LOG_LEVEL";

/// Log level used when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Path argument meaning "read from standard input"
pub const STDIN_PATH: &str = "-";
