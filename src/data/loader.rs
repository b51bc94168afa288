// ============================================================
// Layer 4 — Record Loader
// ============================================================
// Reads raw text records from a CSV file (one named text column)
// or from any line-oriented reader such as stdin.
//
// How the CSV is read:
//   - the first row is the header; the text column is located by
//     name (BOM and surrounding spaces ignored)
//   - rows may have any number of fields; a row too short to
//     reach the text column yields a record with no text
//   - fields are read as raw bytes and decoded per field, so one
//     badly encoded cell never poisons the rest of the file
//
// Failure handling:
//   - file cannot be opened         → SourceError::Open (fatal)
//   - header unreadable             → SourceError::Header (fatal)
//   - text column absent            → SourceError::MissingColumn (fatal)
//   - a single row cannot be parsed → warn, count, skip
//   - the underlying reader fails   → warn, stop
//
// Reference: csv crate documentation (ReaderBuilder, ByteRecord)
//            encoding_rs documentation (WINDOWS_1252)

use std::fs::File;
use std::io::{BufRead, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::record::RawRecord;
use crate::domain::traits::RecordSource;

// ─── SourceError ──────────────────────────────────────────────────────────────
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open input '{path}'")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read the header row of '{origin}'")]
    Header {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' not found in '{origin}' (available: {available:?})")]
    MissingColumn {
        column:    String,
        origin:    String,
        available: Vec<String>,
    },
}

// ─── TextEncoding ─────────────────────────────────────────────────────────────
/// How raw field bytes are turned into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// UTF-8 when the bytes are valid UTF-8, Windows-1252 otherwise
    #[default]
    Auto,
    /// UTF-8, invalid sequences replaced with U+FFFD
    Utf8,
    /// Windows-1252 (a superset of Latin-1)
    Latin1,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => decode_windows_1252(bytes),
            TextEncoding::Auto => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(_) => decode_windows_1252(bytes),
            },
        }
    }
}

fn decode_windows_1252(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

// ─── CsvRecordSource ──────────────────────────────────────────────────────────
/// Streams the text column of a CSV file as RawRecords.
pub struct CsvRecordSource<R> {
    reader:   csv::Reader<R>,
    record:   ByteRecord,
    column:   usize,
    encoding: TextEncoding,
    origin:   String,
    row:      usize,
    skipped:  usize,
    finished: bool,
}

impl CsvRecordSource<File> {
    /// Open `path` and locate `column` in its header.
    pub fn open(
        path: impl AsRef<Path>,
        column: &str,
        encoding: TextEncoding,
    ) -> Result<Self, SourceError> {
        let path   = path.as_ref();
        let origin = path.display().to_string();
        let file   = File::open(path).map_err(|source| SourceError::Open {
            path: origin.clone(),
            source,
        })?;
        Self::from_reader(file, origin, column, encoding)
    }
}

impl<R: Read> CsvRecordSource<R> {
    /// Wrap any reader. `origin` names the input in logs and errors.
    pub fn from_reader(
        reader: R,
        origin: impl Into<String>,
        column: &str,
        encoding: TextEncoding,
    ) -> Result<Self, SourceError> {
        let origin     = origin.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(|source| SourceError::Header {
                origin: origin.clone(),
                source,
            })?
            .iter()
            .map(|field| clean_header(&encoding.decode(field)))
            .collect();

        let index = headers
            .iter()
            .position(|h| h == column.trim())
            .ok_or_else(|| SourceError::MissingColumn {
                column:    column.to_string(),
                origin:    origin.clone(),
                available: headers.clone(),
            })?;

        tracing::debug!(
            "Reading column '{}' (index {}) of '{}'",
            column, index, origin
        );

        Ok(Self {
            reader,
            record: ByteRecord::new(),
            column: index,
            encoding,
            origin,
            row: 0,
            skipped: 0,
            finished: false,
        })
    }
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

impl<R: Read> Iterator for CsvRecordSource<R> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        while !self.finished {
            match self.reader.read_byte_record(&mut self.record) {
                Ok(true) => {
                    self.row += 1;
                    let text = self
                        .record
                        .get(self.column)
                        .map(|bytes| self.encoding.decode(bytes));
                    return Some(RawRecord::new(self.row, text));
                }
                Ok(false) => self.finished = true,
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    tracing::warn!("Stopped reading '{}' after row {}: {}", self.origin, self.row, e);
                    self.finished = true;
                }
                Err(e) => {
                    self.row     += 1;
                    self.skipped += 1;
                    tracing::warn!("Skipping malformed row {} in '{}': {}", self.row, self.origin, e);
                }
            }
        }
        None
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn skipped_rows(&self) -> usize {
        self.skipped
    }
}

// ─── LineSource ───────────────────────────────────────────────────────────────
/// Every line of a reader is one record (line terminator removed).
pub struct LineSource<R> {
    reader:   R,
    buffer:   Vec<u8>,
    encoding: TextEncoding,
    row:      usize,
    finished: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R, encoding: TextEncoding) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            encoding,
            row: 0,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        if self.finished {
            return None;
        }

        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => {
                let line = self
                    .buffer
                    .strip_suffix(b"\n")
                    .unwrap_or(&self.buffer);
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                self.row += 1;
                Some(RawRecord::with_text(self.row, self.encoding.decode(line)))
            }
            Err(e) => {
                tracing::warn!("Stopped reading input after line {}: {}", self.row, e);
                self.finished = true;
                None
            }
        }
    }
}

impl<R: BufRead> RecordSource for LineSource<R> {
    fn skipped_rows(&self) -> usize {
        0
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(data: &[u8], column: &str) -> Result<CsvRecordSource<Cursor<Vec<u8>>>, SourceError> {
        CsvRecordSource::from_reader(Cursor::new(data.to_vec()), "test.csv", column, TextEncoding::Auto)
    }

    #[test]
    fn reads_named_column() {
        let csv = b"id,text,lang\n1,hello world,en\n2,\"quoted, with comma\",en\n";
        let records: Vec<RawRecord> = source(csv, "text").unwrap().collect();
        assert_eq!(
            records,
            vec![
                RawRecord::with_text(1, "hello world"),
                RawRecord::with_text(2, "quoted, with comma"),
            ]
        );
    }

    #[test]
    fn missing_column_is_fatal() {
        let err = source(b"id,body\n1,x\n", "text").err().unwrap();
        match err {
            SourceError::MissingColumn { column, available, .. } => {
                assert_eq!(column, "text");
                assert_eq!(available, vec!["id", "body"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_bom_and_padding_are_ignored() {
        let csv = b"\xef\xbb\xbf text ,id\nhi,1\n";
        let records: Vec<RawRecord> = source(csv, "text").unwrap().collect();
        assert_eq!(records, vec![RawRecord::with_text(1, "hi")]);
    }

    #[test]
    fn short_rows_have_no_text() {
        let csv = b"id,text\n1\n2,two\n";
        let records: Vec<RawRecord> = source(csv, "text").unwrap().collect();
        assert_eq!(records[0], RawRecord::new(1, None));
        assert_eq!(records[1], RawRecord::with_text(2, "two"));
    }

    #[test]
    fn multiline_fields_stay_in_one_record() {
        let csv = b"text\n\"line one\nline two\"\nnext\n";
        let records: Vec<RawRecord> = source(csv, "text").unwrap().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text_or_empty(), "line one\nline two");
    }

    #[test]
    fn auto_encoding_falls_back_to_windows_1252() {
        let csv = b"text\ncaf\xe9\ncaf\xc3\xa9\n";
        let texts: Vec<String> = source(csv, "text")
            .unwrap()
            .map(|r| r.text_or_empty().to_string())
            .collect();
        assert_eq!(texts, vec!["café", "café"]);
    }

    #[test]
    fn explicit_encodings() {
        assert_eq!(TextEncoding::Latin1.decode(b"\xc3\xa9"), "Ã©");
        assert_eq!(TextEncoding::Utf8.decode(b"caf\xe9"), "caf\u{fffd}");
        assert_eq!(TextEncoding::Auto.decode(b"\x93hi\x94"), "\u{201c}hi\u{201d}");
    }

    #[test]
    fn open_reports_missing_file() {
        let err = CsvRecordSource::open("/definitely/not/here.csv", "text", TextEncoding::Auto)
            .err()
            .unwrap();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn line_source_strips_terminators() {
        let input = Cursor::new(b"one\r\ntwo\n\nthree".to_vec());
        let texts: Vec<String> = LineSource::new(input, TextEncoding::Auto)
            .map(|r| r.text_or_empty().to_string())
            .collect();
        assert_eq!(texts, vec!["one", "two", "", "three"]);
    }
}
