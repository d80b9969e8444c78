//! Record mapping from raw rows to column name → value records
//!
//! The mapper binds each data row to the [`Header`] and enforces the
//! configured [`ColumnPolicy`]. Values are never type-converted: `"30"`,
//! `"true"` and `""` all stay strings.

pub mod mapper;

pub use mapper::RecordMapper;

use crate::app::models::{ColumnPolicy, Header, Row};
use crate::error::ColumnMismatch;

/// Check a row against the header width
///
/// Returns `None` when the field count matches.
pub fn check_width(header: &Header, row: &Row) -> Option<ColumnMismatch> {
    if row.len() == header.len() {
        return None;
    }
    Some(ColumnMismatch {
        row: row.index,
        line: row.line,
        expected: header.len(),
        actual: row.len(),
    })
}

/// Whether a policy tolerates a row of the wrong width
pub fn tolerates_mismatch(policy: ColumnPolicy) -> bool {
    matches!(policy, ColumnPolicy::Pad)
}
