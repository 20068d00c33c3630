//! FILENAME: core/tabulate/src/memory.rs
//! PURPOSE: Non-streaming fallback. Decodes the whole response, then writes the table.
//! CONTEXT: Memory grows with the number of cells, so this is for small tables
//! and for cross-checking the streamed path. Output and error kinds match
//! `graphql_json_to_csv`; only detection order differs, since member order
//! is unknown once the document has been decoded.

use std::io::{self, BufReader, Read, Write};

use jsonstream::{ErrorKind, StructuralError};
use log::{info, warn};

use crate::assembler::ConvertSummary;
use crate::definition::{protocol_message, Dimensions, Response, Table};
use crate::error::TableError;
use crate::iterator::RowIterator;
use crate::options::ConvertOptions;
use crate::sink::CsvSink;

const TABLE_PATH: &str = "$.data.dataset.table";

impl Response {
    /// Applies the envelope rules and hands out the table.
    /// A non-empty `errors` list wins over everything else.
    pub fn into_table(self) -> Result<Table, TableError> {
        if let Some(message) = protocol_message(self.errors.as_deref().unwrap_or_default()) {
            return Err(TableError::Protocol(message));
        }
        self.data
            .and_then(|d| d.dataset)
            .and_then(|d| d.table)
            .ok_or_else(|| contract("$", "response contains no table").into())
    }
}

/// Decodes the whole response from `reader` and writes the table to `writer`.
pub fn convert_in_memory<R: Read, W: Write>(
    reader: R,
    writer: W,
    options: &ConvertOptions,
) -> Result<ConvertSummary, TableError> {
    // serde_json reads byte by byte; it needs a buffered source.
    let response: Response =
        serde_json::from_reader(BufReader::new(reader)).map_err(json_error)?;
    let table = response.into_table()?;

    if let Some(message) = table.error {
        return Err(TableError::TableBlocked(message));
    }
    let Some(values) = table.values else {
        warn!(target: "TABLE", "table has no values; nothing written");
        return Ok(ConvertSummary::default());
    };
    let Some(dims) = table.dimensions else {
        return Err(contract(TABLE_PATH, "values received before dimensions").into());
    };
    let dims = Dimensions::new(dims)
        .map_err(|e| contract(format!("{}.dimensions", TABLE_PATH), e.to_string()))?;

    if values.len() as u64 != dims.cell_count() {
        return Err(contract(
            format!("{}.values", TABLE_PATH),
            format!(
                "received {} values but the dimensions describe {} cells",
                values.len(),
                dims.cell_count()
            ),
        )
        .into());
    }

    let mut sink = CsvSink::new(writer, options);
    sink.write_header(&dims);
    let mut cells = RowIterator::new(&dims);
    for count in values {
        if let Some(row) = cells.row(count) {
            sink.write_row(row);
        }
        cells.advance();
    }

    let summary = ConvertSummary {
        rows: sink.rows_written(),
        cells_expected: dims.cell_count(),
        dimensions: dims.len(),
    };
    sink.finish()?;

    info!(
        target: "TABLE",
        "wrote {} rows across {} dimensions (in memory)",
        summary.rows, summary.dimensions
    );
    Ok(summary)
}

fn contract(path: impl Into<String>, message: impl Into<String>) -> StructuralError {
    StructuralError::new(path, 0, ErrorKind::Contract(message.into()))
}

/// serde_json reports line/column rather than a byte offset; the message keeps them.
pub(crate) fn json_error(e: serde_json::Error) -> StructuralError {
    let kind = if e.is_io() {
        ErrorKind::Io(io::Error::from(e))
    } else if e.is_eof() {
        ErrorKind::UnexpectedEof
    } else {
        ErrorKind::Shape(e)
    };
    StructuralError::new("$", 0, kind)
}
