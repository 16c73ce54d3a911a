//! Tabular rows
//!
//! A [`Row`] is an ordered column → cell mapping. Cells are either a string
//! value or [`Cell::Missing`]. Every row carries the synthetic
//! [`LINE_NUMBER_COLUMN`] holding its zero-based position in the source.

use ingot_config::RowsConfig;
use std::io::Read;
use std::sync::Arc;
use thiserror::Error;

/// Name of the synthetic column holding the row ordinal
pub const LINE_NUMBER_COLUMN: &str = "LINENUMBER";

/// A single cell of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    /// A present value
    Value(&'a str),
    /// A missing value (empty cell, `NaN`, `NULL`, ...)
    Missing,
}

impl<'a> Cell<'a> {
    /// The value, if present
    pub fn value(self) -> Option<&'a str> {
        match self {
            Cell::Value(v) => Some(v),
            Cell::Missing => None,
        }
    }
}

/// An immutable tabular record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Row {
    /// Build a row from `(column, value)` pairs; `None` marks a missing cell.
    ///
    /// The line number column is added with the given ordinal.
    pub fn from_pairs<I, K, V>(line_number: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (k, v) in pairs {
            columns.push(k.into());
            values.push(v.map(Into::into));
        }
        Self::with_line_number(columns.into(), values, line_number)
    }

    fn with_line_number(
        columns: Arc<[String]>,
        mut values: Vec<Option<String>>,
        line_number: usize,
    ) -> Self {
        let columns = match columns.iter().position(|c| c == LINE_NUMBER_COLUMN) {
            Some(idx) => {
                values[idx] = Some(line_number.to_string());
                columns
            }
            None => {
                let mut extended: Vec<String> = columns.iter().cloned().collect();
                extended.push(LINE_NUMBER_COLUMN.to_string());
                values.push(Some(line_number.to_string()));
                extended.into()
            }
        };
        Self { columns, values }
    }

    /// Look up a cell; `None` if the row has no such column
    pub fn cell(&self, column: &str) -> Option<Cell<'_>> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| match &self.values[idx] {
                Some(v) => Cell::Value(v.as_str()),
                None => Cell::Missing,
            })
    }

    /// Column names, line number column included
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Zero-based position of this row in its source
    pub fn line_number(&self) -> usize {
        self.cell(LINE_NUMBER_COLUMN)
            .and_then(Cell::value)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

/// Errors raised while reading rows
#[derive(Error, Debug)]
pub enum RowError {
    /// The CSV reader failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The delimiter is not a single byte
    #[error("Delimiter '{0}' is not a single ASCII character")]
    Delimiter(char),
}

/// Iterator over the rows of a CSV source
///
/// Short records are padded with missing cells; cells matching one of the
/// configured null markers become [`Cell::Missing`].
pub struct CsvRows<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    columns: Arc<[String]>,
    line_idx: Option<usize>,
    config: RowsConfig,
    next_line: usize,
}

impl<R: Read> CsvRows<R> {
    /// Open a CSV source; the first record is the header
    pub fn from_reader(reader: R, config: &RowsConfig) -> Result<Self, RowError> {
        if !config.delimiter.is_ascii() {
            return Err(RowError::Delimiter(config.delimiter));
        }
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(config.delimiter as u8)
            .flexible(true)
            .from_reader(reader);

        let mut columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let line_idx = columns.iter().position(|c| c == LINE_NUMBER_COLUMN);
        if line_idx.is_none() {
            columns.push(LINE_NUMBER_COLUMN.to_string());
        }

        Ok(Self {
            records: reader.into_records(),
            columns: columns.into(),
            line_idx,
            config: config.clone(),
            next_line: 0,
        })
    }

    /// Header names, line number column included
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn to_row(&self, record: &csv::StringRecord, line_number: usize) -> Row {
        let width = self.columns.len();
        let mut values: Vec<Option<String>> = Vec::with_capacity(width);
        for idx in 0..width {
            if Some(idx) == self.line_idx || (self.line_idx.is_none() && idx == width - 1) {
                values.push(Some(line_number.to_string()));
                continue;
            }
            let value = record
                .get(idx)
                .filter(|v| !self.config.is_null(v))
                .map(str::to_string);
            values.push(value);
        }
        Row {
            columns: Arc::clone(&self.columns),
            values,
        }
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<Row, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        let line_number = self.next_line;
        self.next_line += 1;
        Some(Ok(self.to_row(&record, line_number)))
    }
}
