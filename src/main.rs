//! Cloud Storage CLI - manage files, folders and API keys from the terminal

use cloud_storage_cli::cli::Cli;
use cloud_storage_cli::{commands, logger};

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

/// Main application entry point
#[allow(clippy::print_stderr)]
fn run() -> i32 {
    let cli = Cli::parse_args();

    if let Err(err) = logger::initialize(cli.verbose) {
        eprintln!("Warning: {err}");
    }

    match commands::execute(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {err:#}");
            commands::exit_code(&err)
        }
    }
}
