//! FILENAME: app/src/cli.rs
// PURPOSE: Command line and environment configuration.

use std::path::PathBuf;

use tabulate::{CategoryField, ConvertMode, ConvertOptions};

#[derive(Debug, clap::Parser)]
#[clap(
    name = "cantabular-csv",
    version,
    about = "Convert Cantabular GraphQL table responses into CSV"
)]
pub struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Convert a table query response into CSV, one row per cell.
    Table(TableArgs),
    /// List the rule variables and other variables of a dataset.
    Variables(VariablesArgs),
}

#[derive(Debug, clap::Args)]
pub struct TableArgs {
    /// Saved GraphQL response. Reads stdin when absent or `-`.
    pub input: Option<PathBuf>,

    /// Where to write the CSV. Writes stdout when absent or `-`.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    #[clap(long, value_enum, env = "CANTABULAR_CSV_MODE", default_value_t = Mode::Streamed)]
    pub mode: Mode,

    /// Which category text fills the dimension columns.
    #[clap(long, value_enum, env = "CANTABULAR_CSV_CATEGORIES", default_value_t = Categories::Label)]
    pub categories: Categories,

    /// Single-byte field delimiter; `\t` for tab.
    #[clap(
        short,
        long,
        env = "CANTABULAR_CSV_DELIMITER",
        default_value = ",",
        value_parser = parse_delimiter
    )]
    pub delimiter: u8,
}

#[derive(Debug, clap::Args)]
pub struct VariablesArgs {
    /// Saved GraphQL response. Reads stdin when absent or `-`.
    pub input: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Write rows while the response is read
    Streamed,
    /// Decode the whole response first (small tables only)
    InMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Categories {
    Label,
    Code,
}

impl From<Mode> for ConvertMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Streamed => ConvertMode::Streamed,
            Mode::InMemory => ConvertMode::InMemory,
        }
    }
}

impl From<Categories> for CategoryField {
    fn from(categories: Categories) -> Self {
        match categories {
            Categories::Label => CategoryField::Label,
            Categories::Code => CategoryField::Code,
        }
    }
}

impl TableArgs {
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            delimiter: self.delimiter,
            category_field: self.categories.into(),
        }
    }
}

pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    let byte = match s.as_bytes() {
        b"\\t" => b'\t',
        [b] if b.is_ascii() => *b,
        _ => return Err(format!("delimiter must be a single ASCII character, got {:?}", s)),
    };
    if matches!(byte, b'"' | b'\n' | b'\r') {
        return Err(format!("{:?} cannot be used as a delimiter", byte as char));
    }
    Ok(byte)
}
