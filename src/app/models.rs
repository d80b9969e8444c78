//! Data models for CSV conversion
//!
//! This module contains the structures that flow through the pipeline: the
//! [`Header`] taken from the first CSV row, raw [`Row`]s produced by the
//! reader, field-mapped [`Record`]s and the [`StoredBatch`] view handed back
//! by a storage backend.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Rows and Headers
// =============================================================================

/// One logical CSV record as produced by the reader
///
/// A row may span several physical lines when a quoted field contains a line
/// break; `line` is the physical line the row started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Record index: the header is row 0, the first data row is row 1
    pub index: usize,

    /// 1-based physical line number where the row starts
    pub line: usize,

    /// Field values in input order
    pub fields: Vec<String>,
}

impl Row {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Column names taken verbatim from the first CSV row
///
/// Names do not have to be unique. A repeated name binds to the key slot of
/// its first occurrence and the value of its last occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
    keys: Vec<String>,
    slots: Vec<usize>,
}

impl Header {
    pub fn new(columns: Vec<String>) -> Self {
        let mut keys: Vec<String> = Vec::with_capacity(columns.len());
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(columns.len());
        let mut slots = Vec::with_capacity(columns.len());

        for column in &columns {
            let slot = match positions.get(column.as_str()) {
                Some(&slot) => slot,
                None => {
                    let slot = keys.len();
                    positions.insert(column.as_str(), slot);
                    keys.push(column.clone());
                    slot
                }
            };
            slots.push(slot);
        }

        Self {
            columns,
            keys,
            slots,
        }
    }

    /// Number of columns as written in the input, duplicates included
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names as written in the input
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Distinct keys in first-occurrence order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Whether any column name appears more than once
    pub fn has_duplicates(&self) -> bool {
        self.keys.len() != self.columns.len()
    }

    /// Bind field values to column names, producing a record
    ///
    /// Only `min(self.len(), values.len())` values are bound. Keys without a
    /// value are filled with an empty string; callers decide beforehand
    /// whether a short row is acceptable.
    pub fn bind(&self, values: Vec<String>) -> Record {
        let mut fields: Vec<(String, String)> = self
            .keys
            .iter()
            .map(|key| (key.clone(), String::new()))
            .collect();

        for (value, &slot) in values.into_iter().zip(&self.slots) {
            fields[slot].1 = value;
        }

        Record { fields }
    }
}

// =============================================================================
// Records
// =============================================================================

/// A data row as an ordered column name → value mapping
///
/// Values are always strings; no numeric or boolean coercion is applied.
/// Key order follows the header and is preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field, keeping the position of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'v> Visitor<'v> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object with string values")
            }

            fn visit_map<A: MapAccess<'v>>(
                self,
                mut access: A,
            ) -> std::result::Result<Record, A::Error> {
                let mut record = Record {
                    fields: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                // Stored objects are written from records, so keys are already unique
                while let Some(entry) = access.next_entry::<String, String>()? {
                    record.fields.push(entry);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

// =============================================================================
// Column Policy
// =============================================================================

/// How rows whose field count differs from the header are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnPolicy {
    /// Reject the conversion, naming every mismatched row
    #[default]
    Strict,
    /// Pad short rows with empty strings and drop extra fields
    Pad,
}

impl FromStr for ColumnPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ColumnPolicy::Strict),
            "pad" => Ok(ColumnPolicy::Pad),
            other => Err(Error::configuration(format!(
                "Unknown column policy '{}'. Expected 'strict' or 'pad'",
                other
            ))),
        }
    }
}

impl fmt::Display for ColumnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnPolicy::Strict => f.write_str("strict"),
            ColumnPolicy::Pad => f.write_str("pad"),
        }
    }
}

// =============================================================================
// Stored Batches
// =============================================================================

/// Identifier assigned to a batch by a storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(u64);

impl BatchId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The identifier following this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(BatchId)
            .map_err(|_| Error::configuration(format!("Invalid batch id '{}'", s)))
    }
}

/// A named group of records persisted together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBatch {
    /// Identifier generated by the store
    pub id: BatchId,

    /// Name supplied by the caller (usually the source file name)
    pub name: String,

    /// When the store accepted the batch
    pub ingested_at: DateTime<Utc>,

    /// Records in input order
    pub records: Vec<Record>,
}

impl StoredBatch {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_bind_in_column_order() {
        let header = Header::new(strings(&["a", "b", "c"]));
        let record = header.bind(strings(&["1", "2", "3"]));

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(record.get("b"), Some("2"));
        assert!(!header.has_duplicates());
    }

    #[test]
    fn test_header_duplicate_names_last_value_wins() {
        let header = Header::new(strings(&["id", "name", "id"]));
        assert!(header.has_duplicates());
        assert_eq!(header.len(), 3);
        assert_eq!(header.keys(), &strings(&["id", "name"])[..]);

        let record = header.bind(strings(&["1", "Alice", "2"]));
        assert_eq!(record.len(), 2);
        assert_eq!(record.iter().collect::<Vec<_>>(), vec![("id", "2"), ("name", "Alice")]);
    }

    #[test]
    fn test_header_bind_short_row_fills_empty() {
        let header = Header::new(strings(&["a", "b"]));
        let record = header.bind(strings(&["1"]));
        assert_eq!(record.get("a"), Some("1"));
        assert_eq!(record.get("b"), Some(""));
    }

    #[test]
    fn test_record_serializes_in_key_order() {
        let record: Record = vec![("z", "1"), ("a", "2"), ("m", "3")].into_iter().collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2","m":"3"}"#);

        let decoded: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_wide_record_deserializes_in_order() {
        let record: Record = (0..5_000)
            .map(|i| (format!("col{}", i), i.to_string()))
            .collect();
        let json = serde_json::to_string(&record).unwrap();

        let decoded: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.len(), 5_000);
        assert_eq!(decoded.keys().nth(4_999), Some("col4999"));
        assert_eq!(decoded.get("col1234"), Some("1234"));
    }

    #[test]
    fn test_record_rejects_non_string_values() {
        let result = serde_json::from_str::<Record>(r#"{"age":30}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_column_policy_parsing() {
        assert_eq!("strict".parse::<ColumnPolicy>().unwrap(), ColumnPolicy::Strict);
        assert_eq!(" PAD ".parse::<ColumnPolicy>().unwrap(), ColumnPolicy::Pad);
        assert!("lenient".parse::<ColumnPolicy>().is_err());
        assert_eq!(ColumnPolicy::default(), ColumnPolicy::Strict);
    }

    #[test]
    fn test_batch_id_round_trip() {
        let id: BatchId = "17".parse().unwrap();
        assert_eq!(id.get(), 17);
        assert_eq!(id.next(), BatchId::new(18));
        assert_eq!(id.to_string(), "17");
        assert!("abc".parse::<BatchId>().is_err());
    }
}
