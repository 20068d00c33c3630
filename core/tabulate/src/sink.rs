//! FILENAME: core/tabulate/src/sink.rs
//! PURPOSE: Delimited text output, one header row then one row per cell.
//! CONTEXT: Write failures are sticky. The first one is kept, later writes
//! become no-ops, and the failure surfaces once from `flush`/`finish`,
//! the way buffered writers fail as a batch.

use std::io::{self, Write};

use crate::definition::{Dimensions, Row};
use crate::error::TableError;
use crate::options::{CategoryField, ConvertOptions};

pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    category_field: CategoryField,
    header_written: bool,
    rows: u64,
    error: Option<csv::Error>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W, options: &ConvertOptions) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        CsvSink {
            writer,
            category_field: options.category_field,
            header_written: false,
            rows: 0,
            error: None,
        }
    }

    /// Writes the header: dimension labels followed by `count`. Must come first.
    pub fn write_header(&mut self, dims: &Dimensions) {
        if self.header_written {
            self.record_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "header written twice",
            ));
            return;
        }
        self.header_written = true;
        self.write_record(dims.header());
    }

    /// Writes one data row: the chosen category text per dimension, then the count.
    pub fn write_row(&mut self, row: Row<'_>) {
        if !self.header_written {
            self.record_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "data row written before the header",
            ));
            return;
        }
        let count = row.count.to_string();
        let field = self.category_field;
        self.write_record(
            row.categories
                .iter()
                .map(|c| c.field(field))
                .chain(std::iter::once(count.as_str())),
        );
        self.rows += 1;
    }

    /// Data rows accepted so far (the header is not counted).
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Flushes buffered rows and reports the first failure, if any.
    pub fn flush(&mut self) -> Result<(), TableError> {
        if let Some(e) = self.error.take() {
            return Err(TableError::Sink(e));
        }
        self.writer.flush().map_err(|e| TableError::Sink(e.into()))
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W, TableError> {
        self.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| TableError::Sink(e.into_error().into()))
    }

    fn write_record<I, T>(&mut self, fields: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.writer.write_record(fields) {
            self.error = Some(e);
        }
    }

    fn record_error(&mut self, e: io::Error) {
        if self.error.is_none() {
            self.error = Some(e.into());
        }
    }
}
