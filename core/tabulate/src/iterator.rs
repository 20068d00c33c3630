//! FILENAME: core/tabulate/src/iterator.rs
//! Row Iterator - maps the linear cell index to a category in every dimension.
//!
//! The server flattens the table in row-major order: the last dimension's
//! index varies fastest. The iterator keeps one counter per dimension
//! (a mixed-radix odometer):
//!
//!   counts [2, 3]:  (0,0) (0,1) (0,2) (1,0) (1,1) (1,2)
//!
//! After each cell the innermost counter is incremented; when it reaches its
//! dimension's count it resets to zero and carries into the counter on its left.
//!
//! The iterator does not know when the incoming values end. The caller feeds
//! exactly one value per `advance` and checks `is_exhausted` against the
//! value stream in both directions.

use smallvec::SmallVec;

use crate::definition::{Category, Dimension, Dimensions, Row};

pub struct RowIterator<'a> {
    dims: &'a [Dimension],
    cells: u64,
    position: u64,
    /// Category index per dimension, outermost first.
    indices: SmallVec<[usize; 8]>,
    /// The categories those indices select, kept in step with `indices`.
    current: SmallVec<[&'a Category; 8]>,
}

impl<'a> RowIterator<'a> {
    /// Creates an iterator positioned on the first cell.
    pub fn new(dimensions: &'a Dimensions) -> Self {
        let dims = dimensions.as_slice();
        let cells = dimensions.cell_count();
        let current = if cells > 0 {
            dims.iter().map(|d| &d.categories[0]).collect()
        } else {
            SmallVec::new()
        };

        RowIterator {
            dims,
            cells,
            position: 0,
            indices: SmallVec::from_elem(0, dims.len()),
            current,
        }
    }

    /// Total number of cells the dimensions describe.
    pub fn cell_count(&self) -> u64 {
        self.cells
    }

    /// 0-based index of the current cell (equals the number of cells passed).
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.cells
    }

    /// Category index per dimension for the current cell.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Categories of the current cell, or `None` once every cell was visited.
    pub fn current(&self) -> Option<&[&'a Category]> {
        if self.is_exhausted() {
            None
        } else {
            Some(&self.current)
        }
    }

    /// Category of the current cell in one dimension.
    pub fn category_at(&self, column: usize) -> Option<&'a Category> {
        if self.is_exhausted() {
            return None;
        }
        self.current.get(column).copied()
    }

    /// The current cell as a row carrying `count`.
    pub fn row(&self, count: i64) -> Option<Row<'_>> {
        self.current().map(|categories| Row { categories, count })
    }

    /// Moves to the next cell. Does nothing once exhausted.
    pub fn advance(&mut self) {
        if self.is_exhausted() {
            return;
        }
        self.position += 1;

        for j in (0..self.indices.len()).rev() {
            let dim = &self.dims[j];
            self.indices[j] += 1;
            if self.indices[j] < dim.count {
                self.current[j] = &dim.categories[self.indices[j]];
                return;
            }
            self.indices[j] = 0;
            self.current[j] = &dim.categories[0];
        }
    }
}
