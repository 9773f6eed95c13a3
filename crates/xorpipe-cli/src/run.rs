//! The XOR driver: assemble the chain, decode the key, drain to the sink.

use std::path::PathBuf;

use tracing::debug;
use xorpipe_core::escape::parse_key;
use xorpipe_core::io::{open_sink, open_source};
use xorpipe_core::pipeline::DEFAULT_CHUNK_SIZE;
use xorpipe_core::{drain, Chain, Control, DrainOptions, DrainStats, Render, Stage, XorFilter};

use crate::cli::Cli;
use crate::config::XorConfig;
use crate::errors::CliError;

/// Effective settings for one run, after merging CLI args over config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Raw key text, escape-decoded when the chain is assembled.
    pub key: Option<String>,
    pub hex: bool,
    pub chunk_size: usize,
}

impl RunSettings {
    /// Merge command-line values over config file values.
    pub fn resolve(cli: &Cli, config: XorConfig) -> anyhow::Result<Self> {
        let chunk_size = cli
            .chunk_size
            .or(config.output.chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            return Err(CliError::invalid_input("--chunk-size must be greater than zero").into());
        }

        Ok(Self {
            input: cli.input.clone(),
            output: cli.output.clone(),
            key: cli.key.clone().or(config.filter.key),
            hex: cli.hex || config.output.hex,
            chunk_size,
        })
    }

    fn drain_options(&self) -> DrainOptions {
        DrainOptions {
            render: if self.hex { Render::Hex } else { Render::Raw },
            chunk_size: self.chunk_size,
            // Only console hex output gets a closing newline.
            trailing_newline: self.hex && self.output.is_none(),
        }
    }
}

/// Run the source → XOR filter chain into the sink.
///
/// Everything is opened before the first read; a failure at any step
/// aborts the run and drops whatever was already opened.
pub fn run(settings: &RunSettings) -> anyhow::Result<DrainStats> {
    let source = open_source(settings.input.as_deref()).map_err(CliError::from_core)?;

    let mut filter = XorFilter::new();
    if let Some(raw) = settings.key.as_deref() {
        let key = parse_key(raw).map_err(CliError::from_core)?;
        filter
            .control(Control::SetKey(key))
            .map_err(CliError::from_core)?;
    }

    let mut chain = Chain::new(source).push(filter);
    let mut sink =
        Chain::new(open_sink(settings.output.as_deref()).map_err(CliError::from_core)?);

    let stats = drain(&mut chain, &mut sink, &settings.drain_options())
        .map_err(CliError::from_core)?;
    debug!(?chain, "run complete");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterSection, OutputSection};
    use crate::constants::exit_codes;
    use crate::errors::exit_code_for;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn settings(input: PathBuf, output: PathBuf, key: &str, hex: bool) -> RunSettings {
        RunSettings {
            input: Some(input),
            output: Some(output),
            key: Some(key.to_string()),
            hex,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[test]
    fn test_hex_run_to_file_has_no_trailing_newline() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.txt");
        fs::write(&input, [0x01, 0x02, 0x03]).unwrap();

        let stats = run(&settings(input, output.clone(), "AB", true)).unwrap();
        assert_eq!(stats.bytes_in, 3);
        assert_eq!(fs::read_to_string(&output).unwrap(), r"\x40\x40\x42");
    }

    #[test]
    fn test_raw_run_round_trips() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("plain.txt");
        let cipher = dir.path().join("cipher.bin");
        let restored = dir.path().join("restored.txt");
        fs::write(&plain, "attack at dawn\n").unwrap();

        run(&settings(plain, cipher.clone(), r"\x13\t", false)).unwrap();
        run(&settings(cipher, restored.clone(), r"\x13\t", false)).unwrap();
        assert_eq!(fs::read_to_string(&restored).unwrap(), "attack at dawn\n");
    }

    #[test]
    fn test_default_key_when_none_given() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("zeros.bin");
        let output = dir.path().join("out.bin");
        fs::write(&input, [0u8; 6]).unwrap();

        let mut s = settings(input, output.clone(), "", false);
        s.key = None;
        run(&s).unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"s3cr3t");
    }

    #[test]
    fn test_bad_key_fails_before_sink_is_created() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.bin");
        fs::write(&input, b"data").unwrap();

        let err = run(&settings(input, output.clone(), r"\x4", false)).unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::INVALID_INPUT);
        assert!(!output.exists());
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.bin");
        fs::write(&input, b"data").unwrap();

        let err = run(&settings(input, dir.path().join("out.bin"), "", false)).unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::INVALID_INPUT);
    }

    #[test]
    fn test_missing_input_is_io_failure() {
        let dir = tempdir().unwrap();
        let err = run(&settings(
            dir.path().join("missing.bin"),
            dir.path().join("out.bin"),
            "k",
            false,
        ))
        .unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::IO_FAILED);
    }

    #[test]
    fn test_unwritable_output_is_io_failure() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.bin");
        fs::write(&input, b"data").unwrap();

        let output = dir.path().join("no-such-dir").join("out.bin");
        let err = run(&settings(input, output, "k", false)).unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::IO_FAILED);
        assert!(err.to_string().contains("out.bin"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from(["xor", "-k", "cli-key", "--chunk-size", "32"]).unwrap();
        let config = XorConfig {
            filter: FilterSection {
                key: Some("file-key".to_string()),
            },
            output: OutputSection {
                hex: true,
                chunk_size: Some(64),
            },
        };
        let resolved = RunSettings::resolve(&cli, config).unwrap();
        assert_eq!(resolved.key.as_deref(), Some("cli-key"));
        assert_eq!(resolved.chunk_size, 32);
        assert!(resolved.hex);
        assert!(resolved.drain_options().trailing_newline);
    }

    #[test]
    fn test_config_fills_gaps() {
        let cli = Cli::try_parse_from(["xor", "-o", "out.txt", "-H"]).unwrap();
        let config = XorConfig {
            filter: FilterSection {
                key: Some("file-key".to_string()),
            },
            output: OutputSection::default(),
        };
        let resolved = RunSettings::resolve(&cli, config).unwrap();
        assert_eq!(resolved.key.as_deref(), Some("file-key"));
        assert_eq!(resolved.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(!resolved.drain_options().trailing_newline);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let cli = Cli::try_parse_from(["xor", "--chunk-size", "0"]).unwrap();
        let err = RunSettings::resolve(&cli, XorConfig::default()).unwrap_err();
        assert_eq!(exit_code_for(&err), exit_codes::INVALID_INPUT);
    }
}
