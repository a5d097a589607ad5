//! Multipart boundary generation.

use rand::Rng;
use std::fmt;
use std::fmt::Write as _;

/// Prefix of every generated boundary.
///
/// `=_` never occurs in Base64 output, so encoded parts cannot contain a
/// delimiter line.
pub const BOUNDARY_PREFIX: &str = "=_speakmail_";

/// Random bytes behind each boundary.
const ENTROPY_BYTES: usize = 24;

/// Delimiter token separating the parts of a multipart message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    /// Generates a fresh random boundary.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; ENTROPY_BYTES];
        rand::thread_rng().fill(&mut bytes[..]);

        let mut token = String::with_capacity(BOUNDARY_PREFIX.len() + ENTROPY_BYTES * 2);
        token.push_str(BOUNDARY_PREFIX);
        for byte in bytes {
            let _ = write!(token, "{byte:02x}");
        }
        Self(token)
    }

    /// Generates a boundary that does not occur anywhere in `content`.
    #[must_use]
    pub fn generate_avoiding(content: &[&[u8]]) -> Self {
        loop {
            let candidate = Self::generate();
            if !content.iter().any(|c| candidate.occurs_in(c)) {
                return candidate;
            }
        }
    }

    /// Wraps a caller-chosen token.
    ///
    /// Used for reproducible output; the caller is responsible for
    /// uniqueness.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `--token` delimiter line (without line break).
    #[must_use]
    pub fn delimiter(&self) -> String {
        format!("--{}", self.0)
    }

    /// Returns the `--token--` closing delimiter (without line break).
    #[must_use]
    pub fn close_delimiter(&self) -> String {
        format!("--{}--", self.0)
    }

    /// Returns true if the token appears as a substring of `content`.
    #[must_use]
    pub fn occurs_in(&self, content: &[u8]) -> bool {
        let needle = self.0.as_bytes();
        !needle.is_empty() && content.windows(needle.len()).any(|w| w == needle)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
