use std::path::PathBuf;

use clap::{ArgAction, Parser};

use xorpipe_core::VERSION;

/// xor - Apply a repeating-key XOR to a byte stream
#[derive(Parser, Debug)]
#[command(name = "xor")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Show the version number
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Write output as hex escape codes
    #[arg(short = 'H', long)]
    pub hex: bool,

    /// The input file [default: stdin]
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// The output file [default: stdout]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// The XOR key (supports \b \f \n \r \t \xHH escapes) [default: built-in]
    #[arg(
        short,
        long,
        value_name = "SECRET",
        env = "XORPIPE_KEY",
        hide_env_values = true
    )]
    pub key: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE", env = "XORPIPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read chunk size in bytes
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Quiet mode (no error message on failure)
    #[arg(short, long)]
    pub quiet: bool,
}
