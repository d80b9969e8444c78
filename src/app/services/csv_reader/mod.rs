//! CSV reader for comma-separated input streams
//!
//! Turns a byte stream into a lazy sequence of [`Row`](crate::app::models::Row)s.
//!
//! ## Dialect
//!
//! - Fields are separated by `,`, records by LF or CRLF (normalized to LF,
//!   also inside quoted fields)
//! - A field wrapped in double quotes may contain delimiters and line breaks;
//!   `""` inside such a field is one literal quote
//! - Whitespace around unquoted fields is kept exactly as written
//! - Blank lines are skipped
//!
//! A quote inside an unquoted field, text after a closing quote, an
//! unterminated quoted field and invalid UTF-8 are all reported as
//! [`FormatError`](crate::error::FormatError)s.
//!
//! ## Usage
//!
//! ```rust
//! use csv2json::app::services::csv_reader::parse_csv;
//!
//! # fn example() -> csv2json::Result<()> {
//! let mut reader = parse_csv("name,city\n\"Smith, J\",Leeds\n".as_bytes());
//! let header = reader.read_header()?;
//! assert_eq!(header.columns(), ["name", "city"]);
//!
//! for row in reader {
//!     let row = row?;
//!     assert_eq!(row.fields, ["Smith, J", "Leeds"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod reader;

#[cfg(test)]
pub mod tests;

pub use reader::CsvReader;

use std::io::{BufReader, Read};

/// Wrap a readable stream in a lazy CSV row reader
pub fn parse_csv<R: Read>(input: R) -> CsvReader<BufReader<R>> {
    CsvReader::new(BufReader::new(input))
}
