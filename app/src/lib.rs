//! FILENAME: app/src/lib.rs
// PURPOSE: Library side of the `cantabular-csv` binary.
// CONTEXT: Parses configuration, sets up logging and maps every failure to
// one process exit status. The conversion itself lives in `tabulate`.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;


pub use cli::{Categories, Cli, Command, Mode, TableArgs, VariablesArgs};
pub use commands::run;
pub use error::AppError;
