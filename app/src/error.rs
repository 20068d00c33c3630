//! FILENAME: app/src/error.rs

use std::io;
use std::path::PathBuf;

use tabulate::TableError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Cannot create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Table(e) => e.exit_code(),
            AppError::Open { .. } | AppError::Create { .. } => 1,
        }
    }
}
