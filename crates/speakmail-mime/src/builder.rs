//! Serialization of an [`Email`] into RFC 5322 / MIME bytes.

use crate::boundary::Boundary;
use crate::content_type::ContentType;
use crate::email::{Attachment, Email};
use crate::encoding::{encode_base64_wrapped, encode_rfc2047, encode_rfc2231, is_header_safe};
use crate::error::ValidationError;
use crate::header::Headers;
use crate::message::TransferEncoding;

const CRLF: &[u8] = b"\r\n";

/// Turns an [`Email`] into a transmittable MIME byte sequence.
///
/// Header order is fixed: `From`, `To`, `Subject`, `MIME-Version`,
/// `Content-Type`. A message without attachments is a single `text/plain`
/// part; with attachments it becomes `multipart/mixed` holding the text part
/// followed by one Base64 part per attachment, in insertion order. Base64
/// payloads are wrapped at 76 columns. Every line ends in CRLF except the
/// body text, which is written verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageBuilder;

impl MessageBuilder {
    /// Serializes `email` with a freshly generated boundary.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the recipient, subject, or an
    /// attachment name is malformed. Attachment content never causes an
    /// error.
    pub fn serialize(email: &Email) -> Result<Vec<u8>, ValidationError> {
        email.validate()?;
        let boundary = Boundary::generate_avoiding(&[email.body().as_bytes()]);
        Ok(Self::write(email, &boundary))
    }

    /// Serializes `email` using the given boundary.
    ///
    /// Intended for reproducible output in tests.
    ///
    /// # Errors
    ///
    /// Same as [`MessageBuilder::serialize`], plus an error if the boundary
    /// occurs inside the body text.
    pub fn serialize_with_boundary(
        email: &Email,
        boundary: &Boundary,
    ) -> Result<Vec<u8>, ValidationError> {
        email.validate()?;
        if boundary.as_str().is_empty() || boundary.occurs_in(email.body().as_bytes()) {
            return Err(ValidationError::new(
                "boundary",
                "boundary is empty or occurs in the body",
            ));
        }
        Ok(Self::write(email, boundary))
    }

    fn write(email: &Email, boundary: &Boundary) -> Vec<u8> {
        let mut headers = Headers::new();
        headers.add("From", email.from().to_header_value());
        headers.add("To", email.to());
        headers.add("Subject", encode_rfc2047(email.subject(), "utf-8"));
        headers.add("MIME-Version", "1.0");

        let mut out = Vec::with_capacity(estimate_size(email));

        if !email.has_attachments() {
            add_text_headers(&mut headers);
            out.extend_from_slice(headers.to_string().as_bytes());
            out.extend_from_slice(CRLF);
            out.extend_from_slice(email.body().as_bytes());
            return out;
        }

        headers.add(
            "Content-Type",
            ContentType::multipart_mixed(boundary.as_str()).to_string(),
        );
        out.extend_from_slice(headers.to_string().as_bytes());
        out.extend_from_slice(CRLF);

        // Text part
        let mut part = Headers::new();
        add_text_headers(&mut part);
        write_delimiter(&mut out, boundary);
        out.extend_from_slice(part.to_string().as_bytes());
        out.extend_from_slice(CRLF);
        out.extend_from_slice(email.body().as_bytes());
        out.extend_from_slice(CRLF);

        for attachment in email.attachments() {
            write_delimiter(&mut out, boundary);
            out.extend_from_slice(attachment_headers(attachment).to_string().as_bytes());
            out.extend_from_slice(CRLF);
            out.extend_from_slice(encode_base64_wrapped(&attachment.data).as_bytes());
            out.extend_from_slice(CRLF);
        }

        out.extend_from_slice(boundary.close_delimiter().as_bytes());
        out.extend_from_slice(CRLF);
        out
    }
}

fn add_text_headers(headers: &mut Headers) {
    headers.add("Content-Type", ContentType::text_plain().to_string());
    headers.add(
        "Content-Transfer-Encoding",
        TransferEncoding::EightBit.to_string(),
    );
}

fn attachment_headers(attachment: &Attachment) -> Headers {
    let disposition = if is_header_safe(&attachment.name) {
        format!("attachment; filename=\"{}\"", attachment.name)
    } else {
        // ASCII fallback for readers without RFC 2231 support.
        let fallback: String = attachment
            .name
            .chars()
            .map(|c| if c.is_ascii() { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{fallback}\"; filename*={}",
            encode_rfc2231(&attachment.name)
        )
    };

    let mut headers = Headers::new();
    headers.add("Content-Type", attachment.content_type.to_string());
    headers.add(
        "Content-Transfer-Encoding",
        TransferEncoding::Base64.to_string(),
    );
    headers.add("Content-Disposition", disposition);
    headers
}

fn write_delimiter(out: &mut Vec<u8>, boundary: &Boundary) {
    out.extend_from_slice(boundary.delimiter().as_bytes());
    out.extend_from_slice(CRLF);
}

fn estimate_size(email: &Email) -> usize {
    let attachments: usize = email
        .attachments()
        .iter()
        .map(|a| a.data.len() * 4 / 3 + a.data.len() / 57 * 2 + 256)
        .sum();
    512 + email.body().len() + attachments
}
