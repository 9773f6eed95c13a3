//! Backslash escape decoding for user-supplied keys.
//!
//! Supported escapes are `\b`, `\f`, `\n`, `\r`, `\t` and `\xHH`. Any other
//! escaped byte, including `\` itself, is emitted literally. A trailing lone
//! backslash is dropped.

use crate::error::{Result, XorError};
use crate::key::Key;

/// Decode backslash escapes in `raw` into an owned byte buffer.
///
/// # Errors
///
/// Returns `XorError::Config` if a `\x` escape is not followed by exactly two
/// hexadecimal digits.
///
/// # Examples
///
/// ```
/// use xorpipe_core::escape::decode_key;
///
/// assert_eq!(decode_key(r"a\nb").unwrap(), vec![0x61, 0x0a, 0x62]);
/// assert_eq!(decode_key(r"\x41\x42").unwrap(), b"AB".to_vec());
/// assert!(decode_key(r"\x4").is_err());
/// ```
pub fn decode_key(raw: &str) -> Result<Vec<u8>> {
    let input = raw.as_bytes();
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let byte = input[i];
        i += 1;
        if byte != b'\\' {
            out.push(byte);
            continue;
        }

        let Some(&escaped) = input.get(i) else {
            // Trailing lone backslash.
            break;
        };
        i += 1;

        match escaped {
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'x' => {
                let high = input.get(i).copied().and_then(hex_value);
                let low = input.get(i + 1).copied().and_then(hex_value);
                match (high, low) {
                    (Some(high), Some(low)) => out.push((high << 4) | low),
                    _ => {
                        return Err(XorError::Config(format!(
                            "Incomplete \\x escape at offset {} (expected two hex digits)",
                            i - 2
                        )))
                    }
                }
                i += 2;
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Decode `raw` and wrap the result in a [`Key`].
///
/// # Errors
///
/// Returns `XorError::Config` if decoding fails or produces no bytes.
pub fn parse_key(raw: &str) -> Result<Key> {
    let bytes = decode_key(raw)?;
    if bytes.is_empty() {
        return Err(XorError::Config(format!(
            "Key {:?} decodes to zero bytes",
            raw
        )));
    }
    Key::new(bytes)
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}
