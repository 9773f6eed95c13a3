//! Key material for the XOR filter.
//!
//! A `Key` is a non-empty byte sequence used cyclically. Keys are reference
//! counted so a duplicated filter shares the buffer of the original, and the
//! bytes are zeroized once the last holder drops them.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::error::{Result, XorError};

/// Built-in key used when none is configured.
pub static DEFAULT_KEY: &[u8] = b"s3cr3t";

/// A non-empty XOR key.
#[derive(Clone)]
pub struct Key {
    bytes: Arc<Zeroizing<Vec<u8>>>,
}

#[allow(clippy::len_without_is_empty)]
impl Key {
    /// Create a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `XorError::Config` if `bytes` is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.is_empty() {
            return Err(XorError::Config("Key cannot be empty".to_string()));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
        })
    }

    /// Get the raw key bytes.
    ///
    /// Avoid storing or logging this value.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes in one key cycle. Always at least 1.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Key byte for a stream position, wrapping around the key length.
    pub fn byte_at(&self, position: usize) -> u8 {
        self.bytes[position % self.bytes.len()]
    }

    /// Whether two keys share the same underlying buffer.
    pub fn shares_buffer(&self, other: &Key) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl Default for Key {
    fn default() -> Self {
        Self {
            bytes: Arc::new(Zeroizing::new(DEFAULT_KEY.to_vec())),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Key {}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
