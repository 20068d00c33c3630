//! FILENAME: core/jsonstream/src/lib.rs
//! PURPOSE: Library root for the streaming JSON decoder.
//! CONTEXT: This crate exposes a pull-based cursor over a JSON document that
//! arrives as a byte stream. The caller walks the document one member at a
//! time and never needs the whole document in memory.
//!
//! PIPELINE: Byte Stream --> Lexer --> Tokens --> Decoder (cursor) --> Caller
//!
//! SUPPORTED OPERATIONS:
//! - Entering and leaving objects and arrays (`null` accepted in their place)
//! - Reading member names inside objects
//! - Reading scalar leaves (string, number, boolean, null)
//! - Bulk decoding of a bounded substructure into any serde type
//! - Skipping unread members in O(skipped size)

pub mod decoder;
pub mod error;
pub mod lexer;
pub mod token;
pub mod value;


// Re-export commonly used types for convenience
pub use decoder::{Composite, Decoder};
pub use error::{ErrorKind, StructuralError};
pub use lexer::Lexer;
pub use token::Token;
pub use value::{Number, Scalar};

pub type DecodeResult<T> = Result<T, StructuralError>;
