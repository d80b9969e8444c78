//! Test utilities for the CSV reader

use crate::Result;

use super::parse_csv;


/// Parse the whole input and return every row's fields
pub fn read_all(input: &str) -> Result<Vec<Vec<String>>> {
    parse_csv(input.as_bytes())
        .map(|row| row.map(|row| row.fields))
        .collect()
}

/// Build an owned field list from string slices
pub fn fields(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
