//! FILENAME: app/src/main.rs
// PURPOSE: Command line entry point.
// Failures print `ERROR: <message>` on stderr and exit with status 1.

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = app_lib::Cli::parse();
    app_lib::logging::init(cli.verbose);

    match app_lib::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
