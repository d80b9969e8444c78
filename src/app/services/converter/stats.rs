//! Conversion results and statistics

use crate::app::models::BatchId;

/// Outcome of one successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// The JSON array, UTF-8 encoded
    pub json: Vec<u8>,

    /// Identifier assigned by the store, `None` in convert-only mode
    pub batch_id: Option<BatchId>,

    pub stats: ConversionStats,
}

impl Conversion {
    /// The JSON output as text
    pub fn json_str(&self) -> &str {
        // The encoder only writes serde_json output and ASCII framing
        std::str::from_utf8(&self.json).unwrap_or_default()
    }

    pub fn into_json(self) -> Vec<u8> {
        self.json
    }
}

/// Counters describing a conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConversionStats {
    /// Header width as written in the input
    pub columns: usize,

    /// Keys per record; fewer than `columns` when the header repeats a name
    pub keys: usize,

    /// Records emitted into the JSON array
    pub records: usize,

    /// Blank lines skipped by the reader
    pub blank_lines_skipped: usize,

    /// Size of the JSON output
    pub json_bytes: usize,
}

impl ConversionStats {
    /// Format a byte count in human-readable form
    pub fn format_size(bytes: usize) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} records x {} columns -> {}",
            self.records,
            self.columns,
            Self::format_size(self.json_bytes)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(ConversionStats::format_size(0), "0 B");
        assert_eq!(ConversionStats::format_size(512), "512 B");
        assert_eq!(ConversionStats::format_size(2048), "2.00 KB");
        assert_eq!(ConversionStats::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_summary() {
        let stats = ConversionStats {
            columns: 3,
            keys: 3,
            records: 2,
            blank_lines_skipped: 0,
            json_bytes: 80,
        };
        assert_eq!(stats.summary(), "2 records x 3 columns -> 80 B");
    }
}
