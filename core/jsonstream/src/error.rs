//! FILENAME: core/jsonstream/src/error.rs
//! PURPOSE: The single structural error type of the decoder.
//! CONTEXT: Every failure (I/O, malformed input, wrong type, premature end,
//! cursor misuse) is one `StructuralError` carrying the document path where
//! it happened, so the caller can report "where" without knowing "how".

use thiserror::Error;

/// What went wrong. Always wrapped in a [`StructuralError`].
#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },

    #[error("invalid cursor operation: {0}")]
    Misuse(&'static str),

    #[error("cannot decode value: {0}")]
    Shape(#[from] serde_json::Error),

    /// A rule of the caller's document contract was broken (set via `Decoder::error`).
    #[error("{0}")]
    Contract(String),
}

/// A failure to read the document, located by path and byte offset.
#[derive(Error, Debug)]
#[error("{kind} at {path} (byte {offset})")]
pub struct StructuralError {
    path: String,
    offset: u64,
    kind: ErrorKind,
}

impl StructuralError {
    pub fn new(path: impl Into<String>, offset: u64, kind: ErrorKind) -> Self {
        StructuralError {
            path: path.into(),
            offset,
            kind,
        }
    }

    /// Location in the document, e.g. `$.data.dataset.table.values[12]`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of input bytes consumed when the error was detected.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, ErrorKind::UnexpectedEof)
    }
}
