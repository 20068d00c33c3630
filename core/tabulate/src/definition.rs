//! FILENAME: core/tabulate/src/definition.rs
//! Table Definition - The decoded shape of a cross tabulation.
//!
//! This module contains all the types needed to DESCRIBE a table response.
//! These structures are:
//! - Deserializable straight from the GraphQL response
//! - Built once per table and read-only afterwards
//! - Small: proportional to the number of categories, never to the number of cells

use serde::{Deserialize, Serialize};

use crate::error::DimensionError;
use crate::options::CategoryField;

/// Name of the trailing column holding each cell's count.
pub const COUNT_COLUMN: &str = "count";

// ============================================================================
// CATEGORIES AND VARIABLES
// ============================================================================

/// One value a dimension can take. Identity is `code`; `label` is display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub label: String,
}

impl Category {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Category {
            code: code.into(),
            label: label.into(),
        }
    }

    /// The text emitted for this category in an output row.
    pub fn field(&self, which: CategoryField) -> &str {
        match which {
            CategoryField::Label => &self.label,
            CategoryField::Code => &self.code,
        }
    }
}

/// A classification axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub label: String,
}

/// One axis of the table with its ordered categories.
/// Category `k` is radix position `k` of this axis in the flat value array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub count: usize,
    pub categories: Vec<Category>,
    pub variable: Variable,
}

// ============================================================================
// DIMENSION SET
// ============================================================================

/// The validated, ordered dimensions of a table, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimensions {
    dims: Vec<Dimension>,
    cells: u64,
}

impl Dimensions {
    /// Validates every dimension and freezes the set.
    pub fn new(dims: Vec<Dimension>) -> Result<Self, DimensionError> {
        let mut cells: u64 = 1;
        for dim in &dims {
            if dim.count != dim.categories.len() {
                return Err(DimensionError::CountMismatch {
                    variable: dim.variable.name.clone(),
                    count: dim.count,
                    categories: dim.categories.len(),
                });
            }
            cells = cells
                .checked_mul(dim.count as u64)
                .ok_or(DimensionError::TooManyCells)?;
        }
        Ok(Dimensions { dims, cells })
    }

    /// Number of cells: the product of all category counts (1 for no dimensions).
    pub fn cell_count(&self) -> u64 {
        self.cells
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.dims.iter()
    }

    pub fn as_slice(&self) -> &[Dimension] {
        &self.dims
    }

    /// Variable labels followed by `count`.
    pub fn header(&self) -> Vec<&str> {
        self.dims
            .iter()
            .map(|d| d.variable.label.as_str())
            .chain(std::iter::once(COUNT_COLUMN))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Dimensions {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.dims.iter()
    }
}

// ============================================================================
// ROW
// ============================================================================

/// A transient view of one cell: its category in every dimension plus its count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    pub categories: &'a [&'a Category],
    pub count: i64,
}

// ============================================================================
// GRAPHQL ENVELOPE
// ============================================================================

/// One entry of the top-level `errors` list. Other members (locations, path) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

/// Joins the messages of a non-empty `errors` list, one per line.
pub fn protocol_message(errors: &[GraphQLError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    Some(messages.join("\n"))
}

/// The whole response, for the in-memory fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub data: Option<ResponseData>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData {
    pub dataset: Option<Dataset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    pub table: Option<Table>,
}

/// A fully materialized table. `error` set means the table must not be iterated.
#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    pub dimensions: Option<Vec<Dimension>>,
    pub values: Option<Vec<i64>>,
    pub error: Option<String>,
}
