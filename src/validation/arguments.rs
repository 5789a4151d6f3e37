//! Identifier validation for inbound operations.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

/// Upper bound on identifier length.
pub const MAX_IDENTIFIER_LEN: usize = 256;

lazy_static! {
    /// Printable text without control characters
    static ref IDENTIFIER_PATTERN: Regex = Regex::new(r"^[^\p{Cc}]+$").unwrap();
}

/// Check a named identifier argument and return it trimmed.
///
/// Rejects empty, whitespace-only, over-long or control-character values.
pub fn validate_identifier<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidArguments(format!("'{}' must not be empty", name)));
    }
    if trimmed.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(Error::InvalidArguments(format!(
            "'{}' exceeds {} characters",
            name, MAX_IDENTIFIER_LEN
        )));
    }
    if !IDENTIFIER_PATTERN.is_match(trimmed) {
        return Err(Error::InvalidArguments(format!(
            "'{}' contains control characters",
            name
        )));
    }

    Ok(trimmed)
}

/// Validate an optional identifier; `None` passes through.
pub fn validate_optional<'a>(name: &str, value: Option<&'a str>) -> Result<Option<&'a str>> {
    value.map(|v| validate_identifier(name, v)).transpose()
}
