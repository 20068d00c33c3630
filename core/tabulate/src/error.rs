//! FILENAME: core/tabulate/src/error.rs

use std::io;

use jsonstream::StructuralError;
use thiserror::Error;

/// Every way a table conversion can fail. Output written before the failure is not valid.
#[derive(Error, Debug)]
pub enum TableError {
    /// The response's top-level `errors` list was non-empty.
    #[error("{0}")]
    Protocol(String),

    /// The server refused the table, e.g. by disclosure control.
    #[error("Table blocked: {0}")]
    TableBlocked(String),

    #[error("Malformed response: {0}")]
    Structural(#[from] StructuralError),

    #[error("Output error: {0}")]
    Sink(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TableError {
    /// Process exit status for a CLI embedding.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DimensionError {
    #[error("dimension {variable:?} declares {count} categories but lists {categories}")]
    CountMismatch {
        variable: String,
        count: usize,
        categories: usize,
    },

    #[error("number of table cells overflows")]
    TooManyCells,
}
