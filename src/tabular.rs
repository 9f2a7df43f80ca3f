//! # Triage File Storage
//!
//! This module moves records between memory and the delimited triage file.
//! The file uses column labels (not keys) as its header so an operator can
//! edit it in a spreadsheet using only the documented labels, and then hand
//! it back to `codetriage pull`.
//!
//! ## Writing
//!
//! [`TabularStore::write`] renders every record before touching the disk, so a
//! record that does not fit the schema never leaves a half-written file
//! behind. An existing destination is only replaced when the caller says so.
//!
//! ## Reading
//!
//! [`TabularStore::read`] checks the file exists and returns a [`TriageFile`].
//! Each call to [`TriageFile::rows`] opens the file afresh and parses it
//! lazily, so the row sequence can be walked as often as needed. Header
//! labels are mapped back to schema keys: unknown labels are ignored and
//! columns missing from the header keep their defaults. A cell that cannot be
//! coerced is reported on the [`ParsedRow`] (and logged) while the rest of the
//! row is still produced.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::record::Record;
use crate::schema::{Column, Schema, Value, ValueType};

/// Reads and writes records as a CSV triage file.
#[derive(Debug, Clone, Copy)]
pub struct TabularStore {
    schema: Schema,
}

impl TabularStore {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Write `records` to `destination`, returning the number of rows written.
    ///
    /// If the destination exists and `overwrite` is false this fails with
    /// `DestinationExists` without modifying anything.
    pub fn write(&self, records: &[Record], destination: &Path, overwrite: bool) -> Result<usize> {
        if destination.exists() && !overwrite {
            return Err(Error::DestinationExists {
                path: destination.to_path_buf(),
            });
        }

        let rows = records
            .iter()
            .map(|record| self.render(record))
            .collect::<Result<Vec<_>>>()?;

        let file = File::create(destination).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => Error::DestinationUnwritable {
                path: destination.to_path_buf(),
                source: e,
            },
            _ => Error::Io(e),
        })?;

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);
        writer.write_record(self.schema.labels())?;
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        debug!("Wrote {} rows to {}", rows.len(), destination.display());
        Ok(rows.len())
    }

    /// Open a triage file for reading.
    ///
    /// Fails with `SourceMissing` if `source` does not exist.
    pub fn read(&self, source: &Path) -> Result<TriageFile> {
        if !source.exists() {
            return Err(Error::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        Ok(TriageFile {
            schema: self.schema,
            path: source.to_path_buf(),
        })
    }

    fn render(&self, record: &Record) -> Result<Vec<String>> {
        self.schema
            .describe()
            .iter()
            .map(|column| record.get(column.key).map(Value::render))
            .collect()
    }
}

/// A triage file on disk that can be parsed any number of times.
#[derive(Debug, Clone)]
pub struct TriageFile {
    schema: Schema,
    path: PathBuf,
}

impl TriageFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a fresh pass over the file's data rows.
    pub fn rows(&self) -> Result<Rows> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::SourceMissing {
                path: self.path.clone(),
            },
            _ => Error::Io(e),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(file);

        let columns = reader
            .headers()?
            .iter()
            .map(|label| {
                let label = normalize_label(label);
                let column = self.schema.column_by_label(label);
                if column.is_none() {
                    debug!("Ignoring unknown column '{}' in {}", label, self.path.display());
                }
                column
            })
            .collect();

        Ok(Rows {
            schema: self.schema,
            columns,
            records: reader.into_records(),
        })
    }

    /// Parse every row, keeping only the records.
    pub fn records(&self) -> Result<Vec<Record>> {
        self.rows()?.map(|row| row.map(|row| row.record)).collect()
    }
}

/// One parsed data line.
#[derive(Debug)]
pub struct ParsedRow {
    /// 1-based line number in the file.
    pub line: u64,
    pub record: Record,
    /// Cells that failed to coerce; those fields hold their defaults.
    pub errors: Vec<Error>,
}

/// Lazy iterator over the data rows of a [`TriageFile`].
pub struct Rows {
    schema: Schema,
    /// Header position -> schema column, `None` for unknown labels.
    columns: Vec<Option<&'static Column>>,
    records: csv::StringRecordsIntoIter<File>,
}

impl Rows {
    fn parse(&self, raw: &csv::StringRecord) -> ParsedRow {
        let line = raw.position().map(|p| p.line()).unwrap_or_default();
        let mut record = Record::new(self.schema);
        let mut errors = Vec::new();

        for (cell, column) in raw.iter().zip(&self.columns) {
            let Some(column) = column else {
                continue;
            };

            let outcome = coerce(column.value_type, cell)
                .map_err(|message| Error::Coercion {
                    label: column.label.to_string(),
                    value: cell.to_string(),
                    expected: column.value_type,
                    message,
                })
                .and_then(|value| record.set(column.key, value));

            if let Err(error) = outcome {
                warn!("Line {}: {}", line, error);
                errors.push(error);
            }
        }

        ParsedRow {
            line,
            record,
            errors,
        }
    }
}

impl Iterator for Rows {
    type Item = Result<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.records.next()? {
            Ok(raw) => Some(Ok(self.parse(&raw))),
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Convert one cell to a value of `value_type`.
///
/// - boolean: case-insensitive `true` is true, anything else (including an
///   empty cell) is false
/// - integer: an empty cell is 0, otherwise the decimal value
/// - text: the cell as-is
pub fn coerce(value_type: ValueType, cell: &str) -> std::result::Result<Value, String> {
    match value_type {
        ValueType::Text => Ok(Value::Text(cell.to_string())),
        ValueType::Boolean => Ok(Value::Boolean(cell.trim().eq_ignore_ascii_case("true"))),
        ValueType::Integer => {
            let digits = cell.trim();
            if digits.is_empty() {
                return Ok(Value::Integer(0));
            }
            digits
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| e.to_string())
        }
    }
}

/// Spreadsheet exports often prefix the first header with a byte-order mark.
fn normalize_label(label: &str) -> &str {
    label.trim_start_matches('\u{feff}').trim()
}
