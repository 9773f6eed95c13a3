//! Stage trait definition.
//!
//! A `Stage` is one link in a chain of byte streams. Terminal stages (files,
//! stdin, memory buffers) perform the actual I/O; filter stages transform
//! bytes and delegate to the stage below them. Control commands a stage does
//! not understand are forwarded down the chain, which lets a filter be
//! interposed without reimplementing unrelated operations.

use crate::error::{Result, XorError};
use crate::key::Key;

/// Out-of-band commands passed down a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Restart from the beginning of the stream.
    ///
    /// Filters zero their position; seekable terminals rewind.
    Reset,

    /// Flush any buffered output.
    Flush,

    /// Query whether the terminal stage has reached end of stream.
    Eof,

    /// Replace a filter's key.
    ///
    /// Changing the key mid-stream without a `Reset` misaligns the key
    /// cycle; that is the caller's responsibility.
    SetKey(Key),

    /// Application-defined command, forwarded verbatim.
    Custom { command: u32, arg: i64 },
}

impl Control {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Control::Reset => "reset",
            Control::Flush => "flush",
            Control::Eof => "eof",
            Control::SetKey(_) => "set-key",
            Control::Custom { .. } => "custom",
        }
    }
}

/// Result of a control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The command was handled.
    Done,
    /// Answer to a query command.
    Flag(bool),
    /// No stage in the chain handled the command.
    Unsupported,
}

/// Stream stage interface.
///
/// Implementations must:
/// - Return `Ok(0)` from `read` only at end of stream (or for an empty buffer)
/// - Report short writes as-is instead of retrying internally
/// - Forward control commands they do not handle
pub trait Stage: Send {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Read up to `buf.len()` bytes into `buf`.
    ///
    /// Returns the number of bytes produced, `0` at end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write bytes from `buf`.
    ///
    /// Returns the number of bytes accepted, which may be less than
    /// `buf.len()`.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Handle an out-of-band command.
    fn control(&mut self, cmd: Control) -> Result<Reply>;

    /// Create an independent copy of this stage and everything below it.
    ///
    /// # Errors
    ///
    /// Returns `XorError::Unsupported` for stages that cannot be duplicated.
    fn duplicate(&self) -> Result<Box<dyn Stage>> {
        Err(XorError::unsupported(self.name(), "duplicate"))
    }
}

/// A stage that delegates to a downstream stage.
pub trait Filter: Stage {
    /// Attach `next` below this filter, returning any stage that was
    /// previously attached.
    fn attach(&mut self, next: Box<dyn Stage>) -> Option<Box<dyn Stage>>;

    /// Detach and return the downstream stage.
    fn detach(&mut self) -> Option<Box<dyn Stage>>;
}
