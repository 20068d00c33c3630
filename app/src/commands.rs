//! FILENAME: app/src/commands.rs
// PURPOSE: Subcommand handlers. Each opens its input and output, calls into
// tabulate and reports through the log.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::cli::{Cli, Command, TableArgs, VariablesArgs};
use crate::error::AppError;

pub fn run(cli: &Cli) -> Result<(), AppError> {
    match &cli.command {
        Command::Table(args) => run_table(args),
        Command::Variables(args) => run_variables(args),
    }
}

fn run_table(args: &TableArgs) -> Result<(), AppError> {
    let options = args.convert_options();
    let input = open_input(args.input.as_deref())?;

    let target = file_target(args.output.as_deref());
    let result = match target {
        Some(path) => {
            let file = File::create(path).map_err(|source| AppError::Create {
                path: path.to_path_buf(),
                source,
            })?;
            let result = tabulate::convert(input, file, args.mode.into(), &options);
            if result.is_err() {
                // Rows already written are not a valid partial table.
                if let Err(e) = fs::remove_file(path) {
                    warn!(target: "CLI", "could not remove {}: {}", path.display(), e);
                }
            }
            result
        }
        None => tabulate::convert(input, io::stdout().lock(), args.mode.into(), &options),
    };

    let summary = result?;
    info!(
        target: "CLI",
        "{} rows of {} cells written to {}",
        summary.rows,
        summary.cells_expected,
        target.map_or_else(|| "stdout".to_string(), |p| p.display().to_string())
    );
    Ok(())
}

fn run_variables(args: &VariablesArgs) -> Result<(), AppError> {
    let input = open_input(args.input.as_deref())?;
    let listing = tabulate::VariableListing::from_reader(input)?;
    listing.write_to(BufWriter::new(io::stdout().lock()))?;
    Ok(())
}

/// `None` and `-` mean stdin.
fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, AppError> {
    match file_target(path) {
        Some(path) => {
            let file = File::open(path).map_err(|source| AppError::Open {
                path: PathBuf::from(path),
                source,
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn file_target(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| p.as_os_str() != "-")
}
