//! xor - apply a repeating-key XOR to a byte stream
//!
//! Builds a two-stage chain (input → XOR filter) and drains it to the
//! output, either as raw bytes or as `\xHH` escape text.

mod cli;
mod config;
mod constants;
mod errors;
mod logging;
mod run;

use clap::Parser;
use tracing::debug;

use crate::cli::Cli;
use crate::config::load_config;
use crate::errors::exit_code_for;
use crate::run::RunSettings;

fn main() {
    let cli = Cli::parse();
    logging::init();

    if let Err(e) = run_cli(&cli) {
        if !cli.quiet {
            eprintln!("Error: {}", e);
        }
        std::process::exit(exit_code_for(&e));
    }
}

fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let settings = RunSettings::resolve(cli, config)?;
    debug!(
        hex = settings.hex,
        chunk_size = settings.chunk_size,
        custom_key = settings.key.is_some(),
        "resolved settings"
    );

    let stats = run::run(&settings)?;
    debug!(
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        "done"
    );
    Ok(())
}
