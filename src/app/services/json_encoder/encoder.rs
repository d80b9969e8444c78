//! Incremental JSON array writer

use std::io::Write;

use crate::app::models::Record;
use crate::{Error, Result};

/// Writes records into any [`Write`] sink as one JSON array
///
/// The opening bracket is written on construction, each record is preceded
/// by a separator when needed and [`finish`](Self::finish) closes the array
/// and hands the sink back. String escaping is done by `serde_json`.
#[derive(Debug)]
pub struct JsonArrayWriter<W: Write> {
    sink: W,
    records_written: usize,
    bytes_written: usize,
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn new(mut sink: W) -> Result<Self> {
        sink.write_all(b"[")
            .map_err(|e| Error::io("Failed to start JSON array", e))?;
        Ok(Self {
            sink,
            records_written: 0,
            bytes_written: 1,
        })
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let encoded = serde_json::to_vec(record)
            .map_err(|e| Error::json("Failed to encode record", e))?;

        if self.records_written > 0 {
            self.write_raw(b",")?;
        }
        self.write_raw(&encoded)?;
        self.records_written += 1;
        Ok(())
    }

    /// Close the array and return the sink
    pub fn finish(mut self) -> Result<W> {
        self.write_raw(b"]")?;
        self.sink
            .flush()
            .map_err(|e| Error::io("Failed to flush JSON output", e))?;
        Ok(self.sink)
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Bytes written so far, opening bracket included
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink
            .write_all(bytes)
            .map_err(|e| Error::io("Failed to write JSON output", e))?;
        self.bytes_written += bytes.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::json_encoder::encode_records;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_sequence_is_empty_array() {
        let json = encode_records(std::iter::empty()).unwrap();
        assert_eq!(json, b"[]");
    }

    #[test]
    fn test_records_are_comma_separated_in_order() {
        let records = vec![
            record(&[("name", "Alice"), ("age", "30")]),
            record(&[("name", "Bob"), ("age", "25")]),
        ];
        let json = encode_records(&records).unwrap();

        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"[{"name":"Alice","age":"30"},{"name":"Bob","age":"25"}]"#
        );
    }

    #[test]
    fn test_key_order_follows_record() {
        let records = vec![record(&[("c", "3"), ("a", "1"), ("b", "2")])];
        let json = String::from_utf8(encode_records(&records).unwrap()).unwrap();
        assert_eq!(json, r#"[{"c":"3","a":"1","b":"2"}]"#);
    }

    #[test]
    fn test_string_escaping() {
        let records = vec![record(&[("text", "say \"hi\"\\\n\t\u{1}")])];
        let json = String::from_utf8(encode_records(&records).unwrap()).unwrap();

        assert_eq!(json, r#"[{"text":"say \"hi\"\\\n\t\u0001"}]"#);
    }

    #[test]
    fn test_non_bmp_characters_round_trip() {
        let value = "rocket 🚀 and 𝄞 clef";
        let records = vec![record(&[("emoji", value)])];
        let json = encode_records(&records).unwrap();

        let decoded: Vec<Record> = serde_json::from_slice(&json).unwrap();
        assert_eq!(decoded[0].get("emoji"), Some(value));
    }

    #[test]
    fn test_writer_tracks_counts() {
        let mut writer = JsonArrayWriter::new(Vec::new()).unwrap();
        writer.write_record(&record(&[("a", "1")])).unwrap();
        writer.write_record(&record(&[("a", "2")])).unwrap();
        assert_eq!(writer.records_written(), 2);

        let bytes_before_close = writer.bytes_written();
        let out = writer.finish().unwrap();
        assert_eq!(out.len(), bytes_before_close + 1);
    }
}
