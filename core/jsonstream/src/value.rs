//! FILENAME: core/jsonstream/src/value.rs
//! PURPOSE: Scalar leaf values returned by the decoder.
//! CONTEXT: Numbers keep their literal text; callers choose how to interpret it.

use std::fmt;

/// A JSON number as it appeared in the input.
/// The lexer guarantees the text follows the JSON number grammar.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Number(String);

impl Number {
    pub(crate) fn from_literal(text: String) -> Self {
        Number(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value if the literal is an integer that fits in an i64.
    /// Literals with a fraction or exponent are never integers here.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A leaf value: anything that is not an object or array.
#[derive(Debug, PartialEq, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// Name of the scalar's JSON type, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::String(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Scalar::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Converts into a `serde_json::Value` for bulk decoding.
    pub fn into_json(self) -> Result<serde_json::Value, serde_json::Error> {
        Ok(match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(b),
            Scalar::Number(n) => serde_json::Value::Number(n.as_str().parse()?),
            Scalar::String(s) => serde_json::Value::String(s),
        })
    }
}
