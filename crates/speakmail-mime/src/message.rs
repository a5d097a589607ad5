//! Reading MIME messages back into headers and parts.

use crate::content_type::{ContentType, parse_parameters};
use crate::encoding::{decode_base64, decode_quoted_printable, decode_rfc2231};
use crate::error::{Error, Result};
use crate::header::Headers;
use std::fmt;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }

    /// Decodes `body` according to this encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid for the encoding.
    pub fn decode(self, body: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Base64 => decode_base64(&String::from_utf8_lossy(body)),
            Self::QuotedPrintable => decode_quoted_printable(body),
            Self::SevenBit | Self::EightBit | Self::Binary => Ok(body.to_vec()),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// MIME message part.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body (raw, still transfer-encoded).
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Splits raw part bytes into headers and body.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        let (head, body) = split_head(raw);
        Self::new(Headers::parse(&String::from_utf8_lossy(head)), body.to_vec())
    }

    /// Gets the content type, defaulting to `text/plain`.
    ///
    /// # Errors
    ///
    /// Returns an error if content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        content_type_of(&self.headers)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        transfer_encoding_of(&self.headers)
    }

    /// Returns the file name from `Content-Disposition`, if any.
    ///
    /// An RFC 2231 `filename*` takes precedence over plain `filename`.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        let disposition = self.headers.get("content-disposition")?;
        let (_, params) = disposition.split_once(';')?;
        let params = parse_parameters(params);
        let find = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        find("filename*")
            .and_then(decode_rfc2231)
            .or_else(|| find("filename").map(str::to_string))
    }

    /// Returns true if the part is marked as an attachment.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.headers
            .get("content-disposition")
            .is_some_and(|d| d.trim_start().to_lowercase().starts_with("attachment"))
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        self.transfer_encoding().decode(&self.body)
    }

    /// Gets the decoded body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn body_text(&self) -> Result<String> {
        String::from_utf8(self.decode_body()?).map_err(Into::into)
    }
}

/// Parsed MIME message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Message headers.
    pub headers: Headers,
    /// Message parts (empty for single-part messages).
    pub parts: Vec<Part>,
    /// Body for single-part messages.
    pub body: Option<Vec<u8>>,
}

impl Message {
    /// Parses a raw message.
    ///
    /// `multipart/*` bodies are split on their declared boundary; the
    /// line break before each delimiter belongs to the delimiter, so part
    /// bodies come back byte-for-byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is invalid, the boundary is
    /// missing, or the multipart structure is not closed.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let (head, body) = split_head(raw);
        let headers = Headers::parse(&String::from_utf8_lossy(head));
        let content_type = content_type_of(&headers)?;

        if !content_type.is_multipart() {
            return Ok(Self {
                headers,
                parts: Vec::new(),
                body: Some(body.to_vec()),
            });
        }

        let boundary = content_type.boundary().ok_or(Error::MissingBoundary)?;
        let parts = split_multipart(body, boundary)?
            .into_iter()
            .map(Part::parse)
            .collect();

        Ok(Self {
            headers,
            parts,
            body: None,
        })
    }

    /// Gets the content type.
    ///
    /// # Errors
    ///
    /// Returns an error if content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        content_type_of(&self.headers)
    }

    /// Checks if this is a multipart message.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.body.is_none()
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get("to")
    }

    /// Gets the Subject header, decoding RFC 2047 encoded-words.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed.
    pub fn subject(&self) -> Result<Option<String>> {
        self.headers.get_decoded("subject")
    }

    /// Gets the body as text for single-part messages.
    ///
    /// # Errors
    ///
    /// Returns an error if this is a multipart message or decoding fails.
    pub fn body_text(&self) -> Result<String> {
        let body = self.body.as_ref().ok_or_else(|| {
            Error::InvalidMultipart("Use parts for multipart messages".to_string())
        })?;
        let decoded = transfer_encoding_of(&self.headers).decode(body)?;
        String::from_utf8(decoded).map_err(Into::into)
    }

    /// Finds the first text/plain part in a multipart message.
    ///
    /// # Errors
    ///
    /// Returns an error if no text part is found or decoding fails.
    pub fn text_part(&self) -> Result<String> {
        for part in &self.parts {
            let ct = part.content_type()?;
            if ct.is_text() && ct.sub_type == "plain" && !part.is_attachment() {
                return part.body_text();
            }
        }

        Err(Error::Parse("No text/plain part found".to_string()))
    }

    /// Returns the parts marked as attachments.
    pub fn attachments(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_attachment())
    }
}

fn content_type_of(headers: &Headers) -> Result<ContentType> {
    headers
        .get("content-type")
        .map_or_else(|| Ok(ContentType::text_plain()), ContentType::parse)
}

fn transfer_encoding_of(headers: &Headers) -> TransferEncoding {
    headers
        .get("content-transfer-encoding")
        .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
}

/// Splits at the first empty line into (header block, body).
fn split_head(raw: &[u8]) -> (&[u8], &[u8]) {
    if raw.starts_with(b"\r\n") {
        return (&[], &raw[2..]);
    }
    if raw.starts_with(b"\n") {
        return (&[], &raw[1..]);
    }
    if let Some(i) = find(raw, b"\r\n\r\n", 0) {
        return (&raw[..i + 2], &raw[i + 4..]);
    }
    if let Some(i) = find(raw, b"\n\n", 0) {
        return (&raw[..i + 1], &raw[i + 2..]);
    }
    (raw, &[])
}

/// Returns the raw bytes of each part between delimiter lines.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<&'a [u8]>> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();

    let mut parts = Vec::new();
    let mut current = find_delimiter(body, delimiter, 0)
        .ok_or_else(|| Error::InvalidMultipart("No opening delimiter".to_string()))?;

    loop {
        let after = current + delimiter.len();
        if body[after..].starts_with(b"--") {
            return Ok(parts);
        }

        let content_start = find(body, b"\n", after).map_or(body.len(), |i| i + 1);
        let next = find_delimiter(body, delimiter, content_start)
            .ok_or_else(|| Error::InvalidMultipart("Missing closing delimiter".to_string()))?;

        let mut content_end = next;
        if body[..content_end].ends_with(b"\r\n") {
            content_end -= 2;
        } else if body[..content_end].ends_with(b"\n") {
            content_end -= 1;
        }

        parts.push(&body[content_start..content_end.max(content_start)]);
        current = next;
    }
}

/// Finds a delimiter at the start of a line, followed by `--`, whitespace,
/// or end of line.
fn find_delimiter(body: &[u8], delimiter: &[u8], from: usize) -> Option<usize> {
    let mut start = from;
    while let Some(i) = find(body, delimiter, start) {
        let at_line_start = i == 0 || body[i - 1] == b'\n';
        let rest = &body[i + delimiter.len()..];
        let terminated = rest.is_empty()
            || rest.starts_with(b"--")
            || matches!(rest[0], b'\r' | b'\n' | b' ' | b'\t');
        if at_line_start && terminated {
            return Some(i);
        }
        start = i + 1;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}
