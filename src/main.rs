//! mlvbatch CLI: convert MLV clips in parallel; exits non-zero if any clip failed.

use anyhow::Result;
use clap::Parser;
use mlvbatch::engine::arg_parser::Cli;
use mlvbatch::engine::handle_run;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let all_ok = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
