//! Repeating-key XOR filter.
//!
//! `XorFilter` XORs every byte passing through it with the key byte at the
//! current cyclic position and advances the position by one per byte. Writes
//! are encoded and forwarded to the downstream stage; reads pull from the
//! downstream stage and are decoded in place in the caller's buffer.
//!
//! Since XOR is its own inverse, encoding and decoding are the same
//! operation. Encoding then decoding a byte range with the same key and the
//! same starting position is the identity, however the calls are chunked.

use tracing::debug;

use crate::error::Result;
use crate::key::Key;
use crate::stage::{Control, Filter, Reply, Stage};

/// Stateful XOR transform stage.
///
/// A filter is *active* from creation until [`XorFilter::destroy`], after
/// which every transform is a no-op returning `0`.
pub struct XorFilter {
    key: Option<Key>,
    /// Offset into the key cycle, always `< key.len()`.
    position: usize,
    next: Option<Box<dyn Stage>>,
    /// Encode buffer for writes, reused across calls.
    scratch: Vec<u8>,
}

impl XorFilter {
    /// Create an active filter with the built-in default key.
    pub fn new() -> Self {
        Self::with_key(Key::default())
    }

    /// Create an active filter with `key`.
    pub fn with_key(key: Key) -> Self {
        Self {
            key: Some(key),
            position: 0,
            next: None,
            scratch: Vec::new(),
        }
    }

    /// Current offset into the key cycle.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The active key, or `None` once destroyed.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Whether the filter has a key and will transform bytes.
    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }

    /// Release the key and the downstream stage.
    ///
    /// Calling this more than once is a no-op.
    pub fn destroy(&mut self) {
        if self.key.take().is_some() {
            debug!("xor filter destroyed");
        }
        self.position = 0;
        self.next = None;
        self.scratch = Vec::new();
    }

    /// XOR `buf` in place starting at the current position, then advance.
    fn apply(key: &Key, position: &mut usize, buf: &mut [u8]) {
        let len = key.len();
        let mut pos = *position;
        for byte in buf.iter_mut() {
            *byte ^= key.byte_at(pos);
            pos += 1;
            if pos == len {
                pos = 0;
            }
        }
        *position = pos;
    }

    fn advance(&mut self, count: usize) {
        if let Some(key) = &self.key {
            self.position = (self.position + count % key.len()) % key.len();
        }
    }
}

impl Default for XorFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for XorFilter {
    fn name(&self) -> &'static str {
        "xor"
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let (Some(key), Some(next)) = (self.key.as_ref(), self.next.as_mut()) else {
            return Ok(0);
        };

        self.scratch.clear();
        self.scratch.extend_from_slice(buf);
        let mut position = self.position;
        Self::apply(key, &mut position, &mut self.scratch);

        let accepted = next.write(&self.scratch)?;
        if accepted < buf.len() {
            debug!(requested = buf.len(), accepted, "short write downstream");
        }
        // Only bytes the downstream stage took consume key positions, so a
        // retry of the remainder stays aligned.
        self.advance(accepted.min(buf.len()));
        Ok(accepted)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let (Some(key), Some(next)) = (self.key.as_ref(), self.next.as_mut()) else {
            return Ok(0);
        };

        let bytes = next.read(buf)?;
        let bytes = bytes.min(buf.len());
        Self::apply(key, &mut self.position, &mut buf[..bytes]);
        Ok(bytes)
    }

    fn control(&mut self, cmd: Control) -> Result<Reply> {
        let handled = match &cmd {
            Control::Reset => {
                self.position = 0;
                true
            }
            // A destroyed filter stays inactive; the command still goes down.
            Control::SetKey(key) if self.key.is_some() => {
                self.position %= key.len();
                self.key = Some(key.clone());
                debug!(key_len = key.len(), "xor key replaced");
                true
            }
            _ => false,
        };

        let reply = match self.next.as_mut() {
            Some(next) => next.control(cmd)?,
            None => Reply::Unsupported,
        };

        if handled && reply == Reply::Unsupported {
            Ok(Reply::Done)
        } else {
            Ok(reply)
        }
    }

    fn duplicate(&self) -> Result<Box<dyn Stage>> {
        let next = match &self.next {
            Some(next) => Some(next.duplicate()?),
            None => None,
        };
        Ok(Box::new(XorFilter {
            key: self.key.clone(),
            position: 0,
            next,
            scratch: Vec::new(),
        }))
    }
}

impl Filter for XorFilter {
    fn attach(&mut self, next: Box<dyn Stage>) -> Option<Box<dyn Stage>> {
        self.next.replace(next)
    }

    fn detach(&mut self) -> Option<Box<dyn Stage>> {
        self.next.take()
    }
}

impl std::fmt::Debug for XorFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XorFilter")
            .field("key", &self.key)
            .field("position", &self.position)
            .field("next", &self.next.as_ref().map(|next| next.name()))
            .finish()
    }
}
