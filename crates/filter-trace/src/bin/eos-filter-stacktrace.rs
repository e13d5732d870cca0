use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use eos_filter_trace::cli::{self, Args};

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let skipped = cli::run(&args, io::stdout().lock())?;
    Ok(if skipped > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
