//! FILENAME: core/tabulate/src/assembler.rs
//! Table Assembler - drives the decoder across the response and emits rows.
//!
//! Expected document (member order is NOT guaranteed, unknown members are skipped):
//!
//!   { "data": { "dataset": { "table": {
//!         "dimensions": [ ... ], "values": [ ... ], "error": str | null } } },
//!     "errors": [ { "message": str }, ... ] }
//!
//! States:
//!   AwaitingEnvelope -> InData -> InDataset -> InTable
//!     -> { ReadingDimensions | ReadingError | ReadingValues } -> ... -> Done
//!   ErrorAborted is reachable from anywhere.
//!
//! Rules:
//! 1. `dimensions` must be complete before the first value; `values` first is fatal
//! 2. Each value is written the moment it is decoded; values are never buffered
//! 3. The number of values must equal the number of cells exactly
//! 4. A non-empty `errors` list or a table `error` aborts the conversion, even
//!    if rows were already written (those rows are then invalid)

use std::io::{Read, Write};

use jsonstream::Decoder;
use log::{debug, info, warn};

use crate::definition::{protocol_message, Dimension, Dimensions, GraphQLError};
use crate::error::TableError;
use crate::iterator::RowIterator;
use crate::options::ConvertOptions;
use crate::sink::CsvSink;

// ============================================================================
// STATE
// ============================================================================

/// Where in the document the assembler currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// At the top level of the response object (before, between or after members).
    AwaitingEnvelope,
    InData,
    InDataset,
    InTable,
    ReadingDimensions,
    ReadingError,
    ReadingValues,
    Done,
    ErrorAborted,
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Data rows written (the header is not counted).
    pub rows: u64,
    /// Cells described by the dimensions.
    pub cells_expected: u64,
    /// Number of dimensions in the table.
    pub dimensions: usize,
}

// ============================================================================
// ASSEMBLER
// ============================================================================

pub struct TableAssembler<R: Read, W: Write> {
    decoder: Decoder<R>,
    sink: CsvSink<W>,
    state: State,
    dimensions: Option<Dimensions>,
    table_seen: bool,
    values_seen: bool,
    summary: ConvertSummary,
}

impl<R: Read, W: Write> TableAssembler<R, W> {
    pub fn new(reader: R, writer: W, options: &ConvertOptions) -> Self {
        TableAssembler {
            decoder: Decoder::new(reader),
            sink: CsvSink::new(writer, options),
            state: State::AwaitingEnvelope,
            dimensions: None,
            table_seen: false,
            values_seen: false,
            summary: ConvertSummary::default(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The underlying cursor, for inspecting position and buffer use.
    pub fn decoder(&self) -> &Decoder<R> {
        &self.decoder
    }

    /// Reads the whole response, writing rows as values arrive.
    pub fn run(&mut self) -> Result<ConvertSummary, TableError> {
        match self.read_envelope() {
            Ok(()) => {
                self.transition(State::Done);
                info!(
                    target: "TABLE",
                    "wrote {} rows across {} dimensions",
                    self.summary.rows, self.summary.dimensions
                );
                Ok(self.summary)
            }
            Err(e) => {
                self.transition(State::ErrorAborted);
                debug!(target: "TABLE", "conversion aborted: {}", e);
                Err(e)
            }
        }
    }

    /// Flushes the sink and returns the output writer.
    pub fn into_writer(self) -> Result<W, TableError> {
        self.sink.finish()
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            debug!(target: "TABLE", "{:?} -> {:?} at {}", self.state, next, self.decoder.path());
            self.state = next;
        }
    }

    // ========================================================================
    // ENVELOPE
    // ========================================================================

    fn read_envelope(&mut self) -> Result<(), TableError> {
        if !self.decoder.enter_object()? {
            return Err(self.decoder.error("no JSON object found in response").into());
        }

        while self.decoder.has_more()? {
            match self.decoder.decode_name()?.as_str() {
                "data" => {
                    self.transition(State::InData);
                    if self.decoder.enter_object()? {
                        self.read_data()?;
                        self.decoder.exit_composite()?;
                    }
                    self.transition(State::AwaitingEnvelope);
                }
                "errors" => self.read_errors()?,
                other => self.skip_member(other)?,
            }
        }
        self.decoder.exit_composite()?;
        self.decoder.finish()?;

        if !self.table_seen {
            return Err(self.decoder.error("response contains no table").into());
        }
        Ok(())
    }

    fn read_errors(&mut self) -> Result<(), TableError> {
        let errors: Option<Vec<GraphQLError>> = self.decoder.decode_into()?;
        match protocol_message(errors.as_deref().unwrap_or_default()) {
            Some(message) => Err(TableError::Protocol(message)),
            None => Ok(()),
        }
    }

    fn read_data(&mut self) -> Result<(), TableError> {
        while self.decoder.has_more()? {
            match self.decoder.decode_name()?.as_str() {
                "dataset" => {
                    self.transition(State::InDataset);
                    if self.decoder.enter_object()? {
                        self.read_dataset()?;
                        self.decoder.exit_composite()?;
                    }
                    self.transition(State::InData);
                }
                other => self.skip_member(other)?,
            }
        }
        Ok(())
    }

    fn read_dataset(&mut self) -> Result<(), TableError> {
        while self.decoder.has_more()? {
            match self.decoder.decode_name()?.as_str() {
                "table" => {
                    self.transition(State::InTable);
                    if self.decoder.enter_object()? {
                        self.table_seen = true;
                        self.read_table()?;
                        self.decoder.exit_composite()?;
                    }
                    self.transition(State::InDataset);
                }
                other => self.skip_member(other)?,
            }
        }
        Ok(())
    }

    // ========================================================================
    // TABLE
    // ========================================================================

    fn read_table(&mut self) -> Result<(), TableError> {
        while self.decoder.has_more()? {
            match self.decoder.decode_name()?.as_str() {
                "dimensions" => {
                    self.transition(State::ReadingDimensions);
                    self.read_dimensions()?;
                }
                "error" => {
                    self.transition(State::ReadingError);
                    if let Some(message) = self.decoder.decode_string()? {
                        return Err(TableError::TableBlocked(message));
                    }
                }
                "values" => {
                    self.transition(State::ReadingValues);
                    self.read_values()?;
                }
                other => self.skip_member(other)?,
            }
            self.transition(State::InTable);
        }

        if !self.values_seen {
            warn!(target: "TABLE", "table has no values; nothing written");
        }
        Ok(())
    }

    fn read_dimensions(&mut self) -> Result<(), TableError> {
        if self.dimensions.is_some() {
            return Err(self.decoder.error("duplicate dimensions").into());
        }
        let dims: Option<Vec<Dimension>> = self.decoder.decode_into()?;
        let Some(dims) = dims else {
            debug!(target: "TABLE", "dimensions are null");
            return Ok(());
        };

        let dims = Dimensions::new(dims).map_err(|e| self.decoder.error(e.to_string()))?;
        debug!(
            target: "TABLE",
            "{} dimensions describing {} cells",
            dims.len(),
            dims.cell_count()
        );
        self.summary.dimensions = dims.len();
        self.summary.cells_expected = dims.cell_count();
        self.dimensions = Some(dims);
        Ok(())
    }

    fn read_values(&mut self) -> Result<(), TableError> {
        if self.values_seen {
            return Err(self.decoder.error("duplicate values").into());
        }
        let Some(dims) = self.dimensions.as_ref() else {
            return Err(self.decoder.error("values received before dimensions").into());
        };
        if !self.decoder.enter_array()? {
            debug!(target: "TABLE", "values are null");
            return Ok(());
        }
        self.values_seen = true;

        self.summary.rows = stream_values(&mut self.decoder, dims, &mut self.sink)?;
        self.decoder.exit_composite()?;
        Ok(())
    }

    fn skip_member(&mut self, name: &str) -> Result<(), TableError> {
        debug!(target: "TABLE", "skipping unrecognized member {:?} at {}", name, self.decoder.path());
        self.decoder.skip_value()?;
        Ok(())
    }
}

/// Writes the header, then one row per decoded value, then flushes.
/// The cursor must be inside the `values` array.
fn stream_values<R: Read, W: Write>(
    decoder: &mut Decoder<R>,
    dims: &Dimensions,
    sink: &mut CsvSink<W>,
) -> Result<u64, TableError> {
    sink.write_header(dims);

    let mut cells = RowIterator::new(dims);
    while decoder.has_more()? {
        if cells.is_exhausted() {
            return Err(decoder
                .error(format!(
                    "more values than the {} cells described by the dimensions",
                    cells.cell_count()
                ))
                .into());
        }
        let count = decoder.decode_i64()?;
        if let Some(row) = cells.row(count) {
            sink.write_row(row);
        }
        cells.advance();
    }

    if !cells.is_exhausted() {
        return Err(decoder
            .error(format!(
                "received {} values but the dimensions describe {} cells",
                cells.position(),
                cells.cell_count()
            ))
            .into());
    }

    sink.flush()?;
    Ok(sink.rows_written())
}

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Converts a GraphQL table response read from `reader` into CSV on `writer`,
/// without holding the response in memory.
pub fn graphql_json_to_csv<R: Read, W: Write>(
    reader: R,
    writer: W,
    options: &ConvertOptions,
) -> Result<ConvertSummary, TableError> {
    let mut assembler = TableAssembler::new(reader, writer, options);
    let summary = assembler.run()?;
    assembler.into_writer()?;
    Ok(summary)
}
