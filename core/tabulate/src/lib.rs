//! FILENAME: core/tabulate/src/lib.rs
//! PURPOSE: Library root for converting Cantabular table responses into CSV.
//! CONTEXT: A table query returns its cells flattened into one `values` array,
//! ordered row-major over the table's dimensions. This crate re-expands that
//! array into one delimited row per cell while the response is still arriving.
//!
//! PIPELINE: Response Bytes --> Decoder --> Table Assembler --> Row Iterator --> CSV Sink
//!
//! SUPPORTED OPERATIONS:
//! - Streamed conversion in memory bounded by the dimensions (`graphql_json_to_csv`)
//! - In-memory fallback for small tables (`convert_in_memory`)
//! - Label or code category columns, configurable delimiter
//! - Listing a dataset's rule variables and other variables

pub mod assembler;
pub mod definition;
pub mod error;
pub mod iterator;
pub mod memory;
pub mod options;
pub mod sink;
pub mod variables;


use std::io::{Read, Write};

// Re-export commonly used types for convenience
pub use assembler::{graphql_json_to_csv, ConvertSummary, State, TableAssembler};
pub use definition::{
    Category, Dimension, Dimensions, GraphQLError, Response, Row, Table, Variable, COUNT_COLUMN,
};
pub use error::{DimensionError, TableError};
pub use iterator::RowIterator;
pub use memory::convert_in_memory;
pub use options::{CategoryField, ConvertMode, ConvertOptions};
pub use sink::CsvSink;
pub use variables::VariableListing;

/// Converts a table response with the chosen mode.
pub fn convert<R: Read, W: Write>(
    reader: R,
    writer: W,
    mode: ConvertMode,
    options: &ConvertOptions,
) -> Result<ConvertSummary, TableError> {
    match mode {
        ConvertMode::Streamed => graphql_json_to_csv(reader, writer, options),
        ConvertMode::InMemory => convert_in_memory(reader, writer, options),
    }
}
