//! Conversion orchestrator for CSV → JSON with optional persistence
//!
//! ## Architecture
//!
//! - [`pipeline`] - the [`Converter`] composing reader, mapper and encoder
//! - [`stats`] - the [`Conversion`] result and its counters
//!
//! ## Usage
//!
//! ```rust
//! use csv2json::app::services::converter::Converter;
//!
//! # fn example() -> csv2json::Result<()> {
//! let converter = Converter::convert_only();
//! let conversion = converter.convert("name,age\nAlice,30".as_bytes(), "people.csv")?;
//!
//! assert_eq!(conversion.json_str(), r#"[{"name":"Alice","age":"30"}]"#);
//! assert_eq!(conversion.batch_id, None);
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use pipeline::Converter;
pub use stats::{Conversion, ConversionStats};
