//! `dcap` binary entrypoint.

use std::process::ExitCode;

use clap::Parser;
use deferred_capture::cli_app::{Cli, run};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dcap: {err}");
            ExitCode::FAILURE
        }
    }
}
