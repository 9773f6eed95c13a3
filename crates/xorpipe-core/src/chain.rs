//! Chain assembly.
//!
//! A `Chain` owns the head of a stack of stages. Pushing a filter attaches
//! the current head below it, so each filter owns the stage it delegates to
//! and dropping the head releases the whole stack.

use std::io;

use tracing::{debug, warn};

use crate::error::{Result, XorError};
use crate::stage::{Control, Filter, Reply, Stage};

/// An ordered stack of stages, read and written through its head.
pub struct Chain {
    head: Option<Box<dyn Stage>>,
    depth: usize,
}

impl Chain {
    /// Start a chain with a terminal stage.
    pub fn new(source: Box<dyn Stage>) -> Self {
        debug!(stage = source.name(), "chain created");
        Self {
            head: Some(source),
            depth: 1,
        }
    }

    /// Attach the current head below `filter` and make `filter` the head.
    pub fn push<F: Filter + 'static>(mut self, mut filter: F) -> Self {
        if let Some(head) = self.head.take() {
            if let Some(previous) = filter.attach(head) {
                warn!(
                    stage = previous.name(),
                    "dropping stage already attached to pushed filter"
                );
            }
        }
        debug!(stage = filter.name(), depth = self.depth + 1, "stage pushed");
        self.head = Some(Box::new(filter));
        self.depth += 1;
        self
    }

    /// Number of stages in the chain.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Name of the head stage.
    pub fn head_name(&self) -> Option<&'static str> {
        self.head.as_ref().map(|head| head.name())
    }

    fn head_mut(&mut self) -> Result<&mut Box<dyn Stage>> {
        self.head.as_mut().ok_or(XorError::Closed)
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.head_mut()?.read(buf)
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.head_mut()?.write(buf)
    }

    pub fn control(&mut self, cmd: Control) -> Result<Reply> {
        debug!(command = cmd.name(), "control");
        self.head_mut()?.control(cmd)
    }

    /// Duplicate every stage in the chain.
    ///
    /// Filters in the copy share their keys with the original and start at
    /// position zero.
    pub fn duplicate(&self) -> Result<Chain> {
        let head = self.head.as_ref().ok_or(XorError::Closed)?;
        Ok(Chain {
            head: Some(head.duplicate()?),
            depth: self.depth,
        })
    }

    /// Release every stage. Further operations fail with `XorError::Closed`.
    pub fn close(&mut self) {
        if self.head.take().is_some() {
            debug!(depth = self.depth, "chain closed");
        }
        self.depth = 0;
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("head", &self.head_name())
            .field("depth", &self.depth)
            .finish()
    }
}

impl io::Read for Chain {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Chain::read(self, buf)?)
    }
}

impl io::Write for Chain {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Chain::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Chain::control(self, Control::Flush)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::XorFilter;
    use crate::io::MemoryStage;
    use crate::key::Key;
    use std::io::{Read, Write};

    fn key(bytes: &[u8]) -> Key {
        Key::new(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_push_makes_filter_head() {
        let chain = Chain::new(Box::new(MemoryStage::new())).push(XorFilter::new());
        assert_eq!(chain.depth(), 2);
        assert_eq!(chain.head_name(), Some("xor"));
    }

    #[test]
    fn test_read_through_chain() {
        let mut chain = Chain::new(Box::new(MemoryStage::from_bytes(vec![0x01, 0x02, 0x03])))
            .push(XorFilter::with_key(key(b"AB")));
        let mut out = Vec::new();
        chain.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![0x40, 0x40, 0x42]);
    }

    #[test]
    fn test_write_then_read_back_round_trips() {
        let mut chain =
            Chain::new(Box::new(MemoryStage::new())).push(XorFilter::with_key(key(b"pw")));
        chain.write_all(b"plain text").unwrap();
        chain.flush().unwrap();

        // Rewinds the memory stage and the filter position together.
        chain.control(Control::Reset).unwrap();
        let mut out = Vec::new();
        chain.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"plain text");
    }

    #[test]
    fn test_set_key_through_chain() {
        let mut chain = Chain::new(Box::new(MemoryStage::from_bytes(vec![0u8; 4])))
            .push(XorFilter::new());
        assert_eq!(
            chain.control(Control::SetKey(key(b"wxyz"))).unwrap(),
            Reply::Done
        );
        let mut out = Vec::new();
        chain.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"wxyz");
    }

    #[test]
    fn test_duplicate_chain_is_independent() {
        let chain = Chain::new(Box::new(MemoryStage::from_bytes(b"abcdef".to_vec())))
            .push(XorFilter::with_key(key(b"k")));
        let mut copy = chain.duplicate().unwrap();
        let mut original = chain;

        let mut a = Vec::new();
        let mut b = Vec::new();
        original.read_to_end(&mut a).unwrap();
        copy.read_to_end(&mut b).unwrap();
        assert_eq!(a, b);
        assert_eq!(copy.depth(), 2);
    }

    #[test]
    fn test_closed_chain_errors() {
        let mut chain = Chain::new(Box::new(MemoryStage::new()));
        chain.close();
        chain.close();
        assert!(matches!(chain.read(&mut [0u8; 1]), Err(XorError::Closed)));
        assert!(chain.duplicate().is_err());
    }
}
