//! MIME header handling.

use crate::encoding::decode_rfc2047;
use crate::error::Result;
use std::fmt;

/// Ordered collection of email headers.
///
/// Names keep the spelling they were added with; lookups are
/// case-insensitive. Insertion order is the serialization order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets the first value for a header, decoding RFC 2047 encoded-words.
    ///
    /// # Errors
    ///
    /// Returns an error if an encoded-word is malformed.
    pub fn get_decoded(&self, name: &str) -> Result<Option<String>> {
        self.get(name).map(decode_rfc2047).transpose()
    }

    /// Parses a header block.
    ///
    /// Continuation lines (leading space or tab) are unfolded into the
    /// previous header. Parsing stops at the first empty line.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }
            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value);
        }

        headers
    }
}

impl fmt::Display for Headers {
    /// Writes each header as `Name: value` followed by CRLF.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_add_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert!(headers.get("subject").is_none());
    }

    #[test]
    fn test_headers_display_preserves_order() {
        let mut headers = Headers::new();
        headers.add("To", "x@example.com");
        headers.add("Subject", "Your file");
        headers.add("MIME-Version", "1.0");

        assert_eq!(
            headers.to_string(),
            "To: x@example.com\r\nSubject: Your file\r\nMIME-Version: 1.0\r\n"
        );
    }

    #[test]
    fn test_headers_parse_unfolds() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: =?utf-8?B?SMOpbGxv?=\r\n",
            " =?utf-8?B?IHRoZXJl?=\r\n",
            "Content-Type: text/plain;\r\n",
            "\tcharset=utf-8\r\n",
            "\r\n",
            "Body: not a header\r\n"
        );

        let headers = Headers::parse(text);
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("To"), Some("recipient@example.com"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(
            headers.get_decoded("Subject").unwrap().as_deref(),
            Some("Héllo there")
        );
        assert!(headers.get("Body").is_none());
    }
}
