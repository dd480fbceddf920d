use std::process::ExitCode;

use clap::Parser;
use headfloat::cli::{self, CliArgs};
use headfloat::logger;

fn main() -> ExitCode {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let args = CliArgs::parse();
    cli::run(args)
}
