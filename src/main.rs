// predictd - main.rs
// Loads one model artifact at startup and serves GET /predict over HTTP.

use std::process::ExitCode;

use clap::Parser;
use predictd::cli::{dispatch, Cli};
use predictd::log_sink::init_tracing;

fn main() -> ExitCode {
    init_tracing();
    dispatch(Cli::parse())
}
