//! Lazy row → record mapping

use std::sync::Arc;

use super::{check_width, tolerates_mismatch};
use crate::app::models::{ColumnPolicy, Header, Record, Row};
use crate::error::FormatError;
use crate::Result;

/// Iterator adapter turning rows into records
///
/// Under [`ColumnPolicy::Strict`] a row of the wrong width yields a
/// [`FormatError::ColumnCount`] naming that row; iteration may continue
/// afterwards so callers can collect every mismatch. Under
/// [`ColumnPolicy::Pad`] short rows are padded with empty strings and extra
/// fields are dropped.
#[derive(Debug)]
pub struct RecordMapper<I> {
    header: Arc<Header>,
    rows: I,
    policy: ColumnPolicy,
    records_mapped: usize,
}

impl<I> RecordMapper<I>
where
    I: Iterator<Item = Result<Row>>,
{
    pub fn new(header: Arc<Header>, rows: I, policy: ColumnPolicy) -> Self {
        Self {
            header,
            rows,
            policy,
            records_mapped: 0,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Number of records produced so far
    pub fn records_mapped(&self) -> usize {
        self.records_mapped
    }

    fn map_row(&self, mut row: Row) -> Result<Record> {
        if let Some(mismatch) = check_width(&self.header, &row) {
            if !tolerates_mismatch(self.policy) {
                return Err(FormatError::ColumnCount(vec![mismatch]).into());
            }
            row.fields.truncate(self.header.len());
        }
        Ok(self.header.bind(row.fields))
    }
}

impl<I> Iterator for RecordMapper<I>
where
    I: Iterator<Item = Result<Row>>,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e)),
        };
        let record = self.map_row(row);
        if record.is_ok() {
            self.records_mapped += 1;
        }
        Some(record)
    }
}
