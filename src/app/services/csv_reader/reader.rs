//! Streaming CSV tokenizer
//!
//! Reads one physical line at a time and assembles logical rows, pulling
//! further lines only while a quoted field is still open.

use std::io::BufRead;

use crate::app::models::{Header, Row};
use crate::constants::{FIELD_DELIMITER, QUOTE};
use crate::error::FormatError;
use crate::{Error, Result};

/// Lazy, single-pass reader producing [`Row`]s from a buffered byte stream
///
/// The reader is an iterator over `Result<Row>`. After the first error it
/// yields nothing further; the stream cannot be restarted.
#[derive(Debug)]
pub struct CsvReader<R> {
    source: R,
    line_buf: Vec<u8>,
    line: usize,
    rows_read: usize,
    blank_lines: usize,
    finished: bool,
}

impl<R: BufRead> CsvReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            line_buf: Vec::new(),
            line: 0,
            rows_read: 0,
            blank_lines: 0,
            finished: false,
        }
    }

    /// Read the first row and turn it into a [`Header`]
    ///
    /// Fails with [`Error::EndOfInput`] when the stream holds no rows at all.
    pub fn read_header(&mut self) -> Result<Header> {
        match self.next() {
            Some(Ok(row)) => Ok(Header::new(row.fields)),
            Some(Err(e)) => Err(e),
            None => Err(Error::EndOfInput),
        }
    }

    /// Number of rows produced so far, header included
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Number of blank lines skipped so far
    pub fn blank_lines_skipped(&self) -> usize {
        self.blank_lines
    }

    /// Read the next logical row, or `None` at end of input
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        loop {
            if !self.fill_line()? {
                return Ok(None);
            }
            if self.line_buf.is_empty() {
                self.blank_lines += 1;
                continue;
            }

            let start_line = self.line;
            let fields = self.parse_fields(start_line)?;
            let row = Row {
                index: self.rows_read,
                line: start_line,
                fields,
            };
            self.rows_read += 1;
            return Ok(Some(row));
        }
    }

    /// Replace `line_buf` with the next physical line, line ending removed
    fn fill_line(&mut self) -> Result<bool> {
        self.line_buf.clear();
        let read = self
            .source
            .read_until(b'\n', &mut self.line_buf)
            .map_err(|e| Error::io(format!("Failed to read CSV line {}", self.line + 1), e))?;
        if read == 0 {
            return Ok(false);
        }

        self.line += 1;
        if self.line_buf.last() == Some(&b'\n') {
            self.line_buf.pop();
        }
        // CRLF, or a lone CR on the final unterminated line
        if self.line_buf.last() == Some(&b'\r') {
            self.line_buf.pop();
        }
        Ok(true)
    }

    fn parse_fields(&mut self, start_line: usize) -> Result<Vec<String>> {
        let mut fields = Vec::new();
        let mut pos = 0;

        loop {
            if self.line_buf.get(pos) == Some(&QUOTE) {
                let (field, next) = self.parse_quoted(pos + 1, start_line)?;
                fields.push(field);
                pos = next;
            } else {
                let end = self.line_buf[pos..]
                    .iter()
                    .position(|&b| b == FIELD_DELIMITER)
                    .map_or(self.line_buf.len(), |offset| pos + offset);
                let raw = &self.line_buf[pos..end];
                if let Some(offset) = raw.iter().position(|&b| b == QUOTE) {
                    return Err(FormatError::BareQuote {
                        line: self.line,
                        column: pos + offset + 1,
                    }
                    .into());
                }
                fields.push(decode(raw.to_vec(), self.line)?);
                pos = end;
            }

            // parse_quoted and the unquoted scan both stop on a delimiter or
            // at the end of the line
            if pos < self.line_buf.len() {
                pos += 1;
            } else {
                return Ok(fields);
            }
        }
    }

    /// Parse a quoted field whose opening quote precedes `start`
    ///
    /// Returns the unescaped value and the position just past the closing
    /// quote, which is either a delimiter or the end of the current line.
    fn parse_quoted(&mut self, start: usize, start_line: usize) -> Result<(String, usize)> {
        let mut value = Vec::new();
        let mut pos = start;

        loop {
            match self.line_buf[pos..].iter().position(|&b| b == QUOTE) {
                Some(offset) => {
                    let quote = pos + offset;
                    value.extend_from_slice(&self.line_buf[pos..quote]);
                    match self.line_buf.get(quote + 1) {
                        Some(&QUOTE) => {
                            value.push(QUOTE);
                            pos = quote + 2;
                        }
                        Some(&FIELD_DELIMITER) | None => {
                            return Ok((decode(value, start_line)?, quote + 1));
                        }
                        Some(_) => {
                            return Err(FormatError::ExtraneousQuote {
                                line: self.line,
                                column: quote + 2,
                            }
                            .into());
                        }
                    }
                }
                None => {
                    value.extend_from_slice(&self.line_buf[pos..]);
                    value.push(b'\n');
                    if !self.fill_line()? {
                        return Err(FormatError::UnterminatedQuote { line: start_line }.into());
                    }
                    pos = 0;
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for CsvReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn decode(bytes: Vec<u8>, line: usize) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { line }.into())
}
