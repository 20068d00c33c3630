//! FILENAME: tests/common/mod.rs
//! Fixtures for tabulate integration tests: table shapes, lazily generated
//! responses and output writers that keep no more than one line.

#![allow(dead_code)]

use std::io::{self, Read, Write};

use tabulate::{Category, Dimension, Variable};

// ============================================================================
// TABLE SHAPES
// ============================================================================

/// A table shape. Variable `X` with n categories gets labels `x0..x{n-1}`
/// and codes `1..n`.
pub struct TableFixture {
    pub dimensions: Vec<Dimension>,
}

impl TableFixture {
    pub fn new(shape: &[(&str, usize)]) -> Self {
        let dimensions = shape
            .iter()
            .map(|(name, count)| Dimension {
                count: *count,
                categories: (0..*count)
                    .map(|k| {
                        Category::new((k + 1).to_string(), format!("{}{}", name.to_lowercase(), k))
                    })
                    .collect(),
                variable: Variable {
                    name: name.to_lowercase(),
                    label: name.to_string(),
                },
            })
            .collect();
        TableFixture { dimensions }
    }

    pub fn cell_count(&self) -> u64 {
        self.dimensions.iter().map(|d| d.count as u64).product()
    }

    pub fn dimensions_json(&self) -> String {
        serde_json::to_string(&self.dimensions).unwrap()
    }

    /// Full response text carrying `values`.
    pub fn response(&self, values: &[i64]) -> String {
        format!("{}{}{}", self.head(), serde_json::to_string(values).unwrap(), TAIL)
    }

    /// Everything before the `values` array.
    fn head(&self) -> String {
        format!(
            r#"{{"data":{{"dataset":{{"table":{{"dimensions":{},"values":"#,
            self.dimensions_json()
        )
    }

    /// CSV text the fixture must convert to, with labels.
    pub fn expected_csv(&self, values: &[i64]) -> String {
        let mut out = String::new();
        let header: Vec<&str> = self
            .dimensions
            .iter()
            .map(|d| d.variable.label.as_str())
            .chain(std::iter::once("count"))
            .collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for (cell, value) in values.iter().enumerate() {
            for label in self.labels_at(cell as u64) {
                out.push_str(&label);
                out.push(',');
            }
            out.push_str(&value.to_string());
            out.push('\n');
        }
        out
    }

    /// Category labels of one cell, computed by division rather than by stepping.
    pub fn labels_at(&self, cell: u64) -> Vec<String> {
        let mut rest = cell;
        let mut labels = Vec::with_capacity(self.dimensions.len());
        for dim in self.dimensions.iter().rev() {
            let count = dim.count as u64;
            labels.push(dim.categories[(rest % count) as usize].label.clone());
            rest /= count;
        }
        labels.reverse();
        labels
    }
}

const TAIL: &str = r#","error":null}}}}"#;

/// Deterministic count for a cell.
pub fn value_at(cell: u64) -> i64 {
    ((cell * 7919) % 100_000) as i64
}

// ============================================================================
// GENERATED INPUT
// ============================================================================

enum Stage {
    Head,
    Values,
    Tail,
    Done,
}

/// A response whose `values` array is produced on demand, so tables far
/// larger than memory can be fed through the converter.
pub struct SyntheticResponse {
    head: Vec<u8>,
    cells: u64,
    next: u64,
    stage: Stage,
    chunk: Vec<u8>,
    pos: usize,
}

impl SyntheticResponse {
    pub fn new(fixture: &TableFixture) -> Self {
        Self::with_cells(fixture, fixture.cell_count())
    }

    /// Emits `cells` values regardless of the shape, for mismatch tests.
    pub fn with_cells(fixture: &TableFixture, cells: u64) -> Self {
        SyntheticResponse {
            head: fixture.head().into_bytes(),
            cells,
            next: 0,
            stage: Stage::Head,
            chunk: Vec::new(),
            pos: 0,
        }
    }

    fn refill(&mut self) -> bool {
        self.chunk.clear();
        self.pos = 0;
        match self.stage {
            Stage::Head => {
                self.chunk.extend_from_slice(&self.head);
                self.chunk.push(b'[');
                self.stage = Stage::Values;
            }
            Stage::Values => {
                let end = (self.next + 4096).min(self.cells);
                while self.next < end {
                    if self.next > 0 {
                        self.chunk.push(b',');
                    }
                    write!(self.chunk, "{}", value_at(self.next)).unwrap();
                    self.next += 1;
                }
                if self.next == self.cells {
                    self.stage = Stage::Tail;
                }
            }
            Stage::Tail => {
                self.chunk.push(b']');
                self.chunk.extend_from_slice(TAIL.as_bytes());
                self.stage = Stage::Done;
            }
            Stage::Done => return false,
        }
        true
    }
}

impl Read for SyntheticResponse {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.chunk.len() {
            if !self.refill() {
                return Ok(0);
            }
        }
        let n = buf.len().min(self.chunk.len() - self.pos);
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Hands out at most one byte per read.
pub struct Trickle<'a>(pub &'a [u8]);

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match (self.0.split_first(), buf.first_mut()) {
            (Some((byte, rest)), Some(slot)) => {
                *slot = *byte;
                self.0 = rest;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Counts what is written and keeps only the last complete line.
#[derive(Default)]
pub struct CountingWriter {
    pub bytes: u64,
    pub lines: u64,
    pub first_line: Option<String>,
    pub last_line: String,
    current: Vec<u8>,
}

impl Write for CountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&self.current).into_owned();
                self.current.clear();
                if self.first_line.is_none() {
                    self.first_line = Some(line.clone());
                }
                self.last_line = line;
                self.lines += 1;
            } else {
                self.current.push(byte);
            }
        }
        self.bytes += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
