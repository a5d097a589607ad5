//! Outgoing message data model.

use crate::content_type::ContentType;
use crate::encoding::{encode_rfc2047, is_header_safe};
use crate::error::ValidationError;
use std::fmt;

/// Validates an e-mail address (basic `local@domain` syntax).
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` if the address is empty,
/// does not have exactly one `@` with non-empty sides, or contains
/// whitespace, control characters, or angle brackets.
pub fn validate_address(field: &'static str, addr: &str) -> Result<(), ValidationError> {
    if addr.is_empty() {
        return Err(ValidationError::new(field, "address cannot be empty"));
    }

    if addr
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | ','))
    {
        return Err(ValidationError::new(
            field,
            format!("address contains forbidden characters: {addr:?}"),
        ));
    }

    let Some((local, domain)) = addr.split_once('@') else {
        return Err(ValidationError::new(field, "address must contain @"));
    };

    if domain.contains('@') {
        return Err(ValidationError::new(field, "address must have exactly one @"));
    }

    if local.is_empty() || domain.is_empty() {
        return Err(ValidationError::new(
            field,
            "local and domain parts cannot be empty",
        ));
    }

    Ok(())
}

/// Display name plus address, as shown in the `From` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    name: Option<String>,
    address: String,
}

impl Mailbox {
    /// Creates a mailbox with just an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn new(address: impl Into<String>) -> Result<Self, ValidationError> {
        let address = address.into();
        validate_address("from", &address)?;
        Ok(Self {
            name: None,
            address,
        })
    }

    /// Creates a mailbox with a display name and address.
    ///
    /// An empty name is treated as no name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the name contains a
    /// line break.
    pub fn with_name(
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.contains(['\r', '\n']) {
            return Err(ValidationError::new(
                "from",
                "display name contains a line break",
            ));
        }

        let mut mailbox = Self::new(address)?;
        if !name.trim().is_empty() {
            mailbox.name = Some(name.trim().to_string());
        }
        Ok(mailbox)
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Formats the mailbox for a header: `Name <addr>`, `"Q, Name" <addr>`,
    /// an RFC 2047 encoded name, or the bare address.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let Some(name) = &self.name else {
            return self.address.clone();
        };

        let display = if !is_header_safe(name) {
            encode_rfc2047(name, "utf-8")
        } else if name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || "!#$%&'*+-/=?^_`{|}~".contains(c))
        {
            name.clone()
        } else {
            format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
        };

        format!("{display} <{}>", self.address)
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

/// A named binary attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Display-only file name (no path components).
    pub name: String,
    /// MIME type of the payload.
    pub content_type: ContentType,
    /// Raw content.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment with the default `audio/mpeg` type.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::with_type(name, ContentType::default(), data)
    }

    /// Creates an attachment with an explicit content type.
    #[must_use]
    pub fn with_type(
        name: impl Into<String>,
        content_type: ContentType,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Checks that the name is usable as a `filename` parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains a path separator,
    /// a control character, or a double quote.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("attachment", "file name cannot be empty"));
        }
        if self.name.contains(['/', '\\']) {
            return Err(ValidationError::new(
                "attachment",
                format!("file name {:?} contains a path separator", self.name),
            ));
        }
        if self.name.contains(|c: char| c.is_control() || c == '"') {
            return Err(ValidationError::new(
                "attachment",
                format!("file name {:?} contains forbidden characters", self.name),
            ));
        }
        Ok(())
    }
}

/// A single outbound message, mutable until it is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    from: Mailbox,
    to: String,
    subject: String,
    body: String,
    attachments: Vec<Attachment>,
}

impl Email {
    /// Creates a message without attachments.
    ///
    /// Fields are checked when the message is serialized, not here.
    #[must_use]
    pub fn new(
        from: Mailbox,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }

    /// Attaches `data` under `name` with the default `audio/mpeg` type.
    ///
    /// Attaching a name that is already present replaces the earlier entry
    /// in place: the last write wins and the message still carries a single
    /// part for that name.
    pub fn attach(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> &mut Self {
        self.push_attachment(Attachment::new(name, data))
    }

    /// Attaches `data` under `name` with an explicit content type.
    ///
    /// Same replacement rule as [`Email::attach`].
    pub fn attach_with_type(
        &mut self,
        name: impl Into<String>,
        content_type: ContentType,
        data: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.push_attachment(Attachment::with_type(name, content_type, data))
    }

    fn push_attachment(&mut self, attachment: Attachment) -> &mut Self {
        match self
            .attachments
            .iter_mut()
            .find(|existing| existing.name == attachment.name)
        {
            Some(existing) => *existing = attachment,
            None => self.attachments.push(attachment),
        }
        self
    }

    /// Returns the sender mailbox.
    #[must_use]
    pub const fn from(&self) -> &Mailbox {
        &self.from
    }

    /// Returns the recipient address.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the plain-text body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the attachments in insertion order.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns true if the message carries at least one attachment.
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Checks recipient, subject and attachment names.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.to.is_empty() {
            return Err(ValidationError::new("to", "recipient cannot be empty"));
        }
        validate_address("to", &self.to)?;

        if self.subject.trim().is_empty() {
            return Err(ValidationError::new("subject", "subject cannot be empty"));
        }
        if self.subject.contains(['\r', '\n']) {
            return Err(ValidationError::new(
                "subject",
                "subject contains a line break",
            ));
        }

        self.attachments.iter().try_for_each(Attachment::validate)
    }
}
