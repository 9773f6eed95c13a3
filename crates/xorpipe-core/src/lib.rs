//! # xorpipe Core
//!
//! Core library for xorpipe - a composable streaming XOR filter.
//!
//! This crate provides the stage abstraction, the XOR filter, terminal I/O
//! stages and the chunked drain loop, independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **stage**: The `Stage` trait every link in a chain implements
//! - **chain**: Head-to-tail assembly of stages
//! - **filter**: The repeating-key XOR filter
//! - **io**: Terminal stages over files, readers, writers and memory
//! - **key**: Non-empty key material and the built-in default
//! - **escape**: Backslash escape decoding for user-supplied keys
//! - **pipeline**: Chunked drain of a chain into a sink
//!
//! XOR with a repeating key is not encryption. It provides no
//! confidentiality, integrity or diffusion.

pub mod chain;
pub mod error;
pub mod escape;
pub mod filter;
pub mod io;
pub mod key;
pub mod pipeline;
pub mod stage;

pub use chain::Chain;
pub use error::{Result, XorError};
pub use filter::XorFilter;
pub use key::{Key, DEFAULT_KEY};
pub use pipeline::{drain, DrainOptions, DrainStats, Render};
pub use stage::{Control, Filter, Reply, Stage};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
