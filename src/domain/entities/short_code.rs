//! Short code value type.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::LazyLock;

use crate::error::AppError;

/// Base62 alphabet used for generated codes.
pub const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const MIN_LENGTH: usize = 6;
pub const MAX_LENGTH: usize = 8;

static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]{6,8}$").expect("short code regex is valid"));

/// A 6–8 character base62 identifier for a stored URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Parses a code received from a client or read from storage.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the code has the wrong length or
    /// contains characters outside the base62 alphabet.
    pub fn parse(code: &str) -> Result<Self, AppError> {
        if SHORT_CODE_REGEX.is_match(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(AppError::bad_request(
                "Short code must be 6-8 base62 characters",
                json!({ "code": code }),
            ))
        }
    }

    /// Wraps a code produced by a trusted generator without re-checking it.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_base62_codes() {
        assert!(ShortCode::parse("abc123").is_ok());
        assert!(ShortCode::parse("AbC12xYz").is_ok());
        assert!(ShortCode::parse("0000000").is_ok());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(ShortCode::parse("abc12").is_err());
        assert!(ShortCode::parse("doesnotexist").is_err());
        assert!(ShortCode::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_base62() {
        assert!(ShortCode::parse("abc-12").is_err());
        assert!(ShortCode::parse("abc_12").is_err());
        assert!(ShortCode::parse("ab c12").is_err());
    }

    #[test]
    fn test_alphabet_is_base62() {
        assert_eq!(ALPHABET.len(), 62);
        assert!(ALPHABET.iter().all(|c| c.is_ascii_alphanumeric()));
    }
}
