//! Path-segment encoding understood by the ARE server
//!
//! Each UTF-16 code unit of a segment is written as its decimal value
//! followed by [`DELIMITER`]. The result never contains `/`, `?`, `#` or
//! `%`, so any string can be placed in a single path segment.
//!
//! ```
//! use are_rest_core::encoding::{decode, encode};
//!
//! assert_eq!(encode("AB"), "65-66-");
//! assert_eq!(decode("65-66-").unwrap(), "AB");
//! ```

use crate::{Error, Result};
use std::fmt::Write;

/// Separator written after every code unit
pub const DELIMITER: char = '-';

/// Encode `text` into the server's path-segment format
pub fn encode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len() * 4);
    for unit in text.encode_utf16() {
        // Writing into a String cannot fail
        let _ = write!(encoded, "{}{}", unit, DELIMITER);
    }
    encoded
}

/// Decode a token produced by [`encode`]
///
/// # Errors
///
/// Returns `Error::InvalidEncoding` when the token is missing its trailing
/// delimiter, contains a chunk that is not a 16-bit decimal number, or
/// describes an unpaired surrogate.
pub fn decode(token: &str) -> Result<String> {
    if token.is_empty() {
        return Ok(String::new());
    }

    let body = token.strip_suffix(DELIMITER).ok_or_else(|| {
        Error::InvalidEncoding(format!("'{}' does not end with '{}'", token, DELIMITER))
    })?;

    let units = body
        .split(DELIMITER)
        .map(|chunk| {
            if chunk.is_empty() || !chunk.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::InvalidEncoding(format!(
                    "'{}' is not a code unit",
                    chunk
                )));
            }
            chunk.parse::<u16>().map_err(|e| {
                Error::InvalidEncoding(format!("'{}' is not a code unit: {}", chunk, e))
            })
        })
        .collect::<Result<Vec<u16>>>()?;

    String::from_utf16(&units).map_err(|e| Error::InvalidEncoding(e.to_string()))
}
