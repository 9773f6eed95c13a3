//! Chunked drain of a chain into a sink.

use std::fmt::Write as _;
use std::io::Write;

use tracing::debug;

use crate::chain::Chain;
use crate::error::{Result, XorError};

/// Default chunk size for [`drain`].
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// How drained bytes are written to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Render {
    /// Bytes as-is.
    #[default]
    Raw,
    /// Each byte as a `\xHH` escape, lowercase.
    Hex,
}

/// Options for [`drain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainOptions {
    pub render: Render,
    pub chunk_size: usize,
    /// Append a single newline after hex output.
    pub trailing_newline: bool,
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            render: Render::Raw,
            chunk_size: DEFAULT_CHUNK_SIZE,
            trailing_newline: false,
        }
    }
}

/// Counters from a completed drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainStats {
    /// Bytes read from the chain.
    pub bytes_in: u64,
    /// Bytes written to the sink.
    pub bytes_out: u64,
    /// Number of positive reads.
    pub chunks: u64,
}

/// Render `bytes` as `\xHH` escapes.
///
/// # Examples
///
/// ```
/// use xorpipe_core::pipeline::render_hex;
///
/// assert_eq!(render_hex(&[0x40, 0x40, 0x42]), r"\x40\x40\x42");
/// ```
pub fn render_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for byte in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "\\x{:02x}", byte);
    }
    out
}

/// Read `chain` in chunks and write the result to `sink`.
///
/// A full chunk triggers another read. A short positive read is written and
/// ends the drain, as does a zero read. Read and write errors abort the
/// drain. The sink is flushed before returning.
///
/// # Errors
///
/// Returns `XorError::Config` for a zero chunk size, and any error from the
/// chain or the sink.
pub fn drain<W: Write + ?Sized>(
    chain: &mut Chain,
    sink: &mut W,
    options: &DrainOptions,
) -> Result<DrainStats> {
    if options.chunk_size == 0 {
        return Err(XorError::Config(
            "Chunk size must be greater than zero".to_string(),
        ));
    }

    let mut stats = DrainStats::default();
    let mut buffer = vec![0u8; options.chunk_size];

    loop {
        let bytes = chain.read(&mut buffer)?;
        if bytes == 0 {
            break;
        }
        stats.bytes_in += bytes as u64;
        stats.chunks += 1;

        let chunk = &buffer[..bytes];
        match options.render {
            Render::Raw => {
                sink.write_all(chunk)?;
                stats.bytes_out += bytes as u64;
            }
            Render::Hex => {
                let text = render_hex(chunk);
                sink.write_all(text.as_bytes())?;
                stats.bytes_out += text.len() as u64;
            }
        }

        if bytes != buffer.len() {
            break;
        }
    }

    if options.render == Render::Hex && options.trailing_newline {
        sink.write_all(b"\n")?;
        stats.bytes_out += 1;
    }
    sink.flush()?;

    debug!(
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        chunks = stats.chunks,
        "drain complete"
    );
    Ok(stats)
}
