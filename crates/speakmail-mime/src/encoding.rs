//! MIME encoding and decoding utilities.
//!
//! Supports Base64 (RFC 2045), Quoted-Printable decoding, RFC 2047
//! header encoding and RFC 2231 parameter values.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Maximum encoded line length for Base64 bodies (RFC 2045 section 6.8).
pub const MAX_LINE_LENGTH: usize = 76;

/// Longest run of raw bytes placed in a single RFC 2047 encoded-word.
///
/// `=?utf-8?B?` + 60 Base64 chars + `?=` stays within the 75 character
/// limit of RFC 2047 section 2.
const ENCODED_WORD_CHUNK: usize = 45;

/// Encodes data as Base64 on a single line.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64, wrapped at [`MAX_LINE_LENGTH`] with CRLF.
///
/// The final line carries no trailing line break.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2);

    // Base64 output is pure ASCII, so byte chunks are valid str slices.
    for (i, line) in encoded.as_bytes().chunks(MAX_LINE_LENGTH).enumerate() {
        if i > 0 {
            wrapped.push_str("\r\n");
        }
        wrapped.push_str(&String::from_utf8_lossy(line));
    }

    wrapped
}

/// Decodes Base64 data, ignoring embedded whitespace and line breaks.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Decodes Quoted-Printable bytes (RFC 2045).
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        if byte != b'=' {
            result.push(byte);
            i += 1;
            continue;
        }

        // Soft line break
        match data.get(i + 1..) {
            Some([b'\r', b'\n', ..]) => {
                i += 3;
                continue;
            }
            Some([b'\n', ..]) => {
                i += 2;
                continue;
            }
            _ => {}
        }

        let hex = data
            .get(i + 1..i + 3)
            .ok_or_else(|| Error::InvalidEncoding("Incomplete escape sequence".to_string()))?;
        let hex = std::str::from_utf8(hex)
            .map_err(|_| Error::InvalidEncoding("Non-ASCII escape sequence".to_string()))?;
        let value = u8::from_str_radix(hex, 16)
            .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
        result.push(value);
        i += 3;
    }

    Ok(result)
}

/// Returns true if `text` can be placed in a header without encoding.
#[must_use]
pub fn is_header_safe(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) && !text.contains("=?")
}

/// Encodes a header value using RFC 2047 `B` encoding when needed.
///
/// ASCII text is returned unchanged. Longer values are split into several
/// encoded-words separated by folding whitespace (`CRLF SP`), each cut on a
/// character boundary.
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    if is_header_safe(text) {
        return text.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in text.chars() {
        if chunk.len() + ch.len_utf8() > ENCODED_WORD_CHUNK {
            words.push(format!("=?{charset}?B?{}?=", encode_base64(chunk.as_bytes())));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(format!("=?{charset}?B?{}?=", encode_base64(chunk.as_bytes())));
    }

    words.join("\r\n ")
}

/// Decodes an RFC 2047 encoded header value.
///
/// Plain words pass through; whitespace between two adjacent encoded-words
/// is dropped as the RFC requires.
///
/// # Errors
///
/// Returns an error if an encoded-word is malformed.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    if !text.contains("=?") {
        return Ok(text.to_string());
    }

    let mut result = String::new();
    let mut previous_encoded = false;

    for (i, word) in text.split_whitespace().enumerate() {
        let encoded = word.starts_with("=?") && word.ends_with("?=") && word.len() > 4;
        if i > 0 && !(encoded && previous_encoded) {
            result.push(' ');
        }
        if encoded {
            result.push_str(&decode_encoded_word(word)?);
        } else {
            result.push_str(word);
        }
        previous_encoded = encoded;
    }

    Ok(result)
}

/// Decodes a single `=?charset?encoding?text?=` word.
fn decode_encoded_word(word: &str) -> Result<String> {
    let inner = &word[2..word.len() - 2];
    let parts: Vec<&str> = inner.split('?').collect();

    if parts.len() != 3 {
        return Err(Error::InvalidEncoding(
            "Invalid RFC 2047 format".to_string(),
        ));
    }

    let encoding = parts[1].to_uppercase();
    let encoded_text = parts[2];

    let bytes = match encoding.as_str() {
        "B" => decode_base64(encoded_text)?,
        "Q" => decode_quoted_printable(encoded_text.replace('_', " ").as_bytes())?,
        _ => {
            return Err(Error::InvalidEncoding(format!(
                "Unknown encoding: {encoding}"
            )));
        }
    };

    String::from_utf8(bytes).map_err(Into::into)
}

/// Encodes a parameter value as an RFC 2231 extended value, `utf-8''...`.
///
/// Bytes outside the `attr-char` set are percent-encoded.
#[must_use]
pub fn encode_rfc2231(text: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(text.len() * 3 + 7);
    out.push_str("utf-8''");
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(byte >> 4)]));
            out.push(char::from(HEX[usize::from(byte & 0x0F)]));
        }
    }
    out
}

/// Decodes an RFC 2231 extended value (`charset'language'text`).
///
/// Returns `None` for charsets other than UTF-8 and US-ASCII, or for a
/// malformed escape.
#[must_use]
pub fn decode_rfc2231(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    parts.next()?;
    let encoded = parts.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return None;
    }

    let mut bytes = Vec::with_capacity(encoded.len());
    let mut input = encoded.bytes();
    while let Some(byte) = input.next() {
        if byte == b'%' {
            let high = char::from(input.next()?).to_digit(16)?;
            let low = char::from(input.next()?).to_digit(16)?;
            bytes.push(u8::try_from(high * 16 + low).ok()?);
        } else {
            bytes.push(byte);
        }
    }

    String::from_utf8(bytes).ok()
}
