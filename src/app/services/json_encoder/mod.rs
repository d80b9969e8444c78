//! JSON encoding of record sequences
//!
//! Records are written as a JSON array of objects, one object per record,
//! keys in header order and every value a JSON string. The array framing is
//! written incrementally with explicit separators, so the number of records
//! does not need to be known up front. An empty sequence encodes as `[]`.

pub mod encoder;

pub use encoder::JsonArrayWriter;

use crate::Result;
use crate::app::models::Record;

/// Encode a sequence of records into JSON bytes
pub fn encode_records<'a, I>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = JsonArrayWriter::new(Vec::new())?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.finish()
}
