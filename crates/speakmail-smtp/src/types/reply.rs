//! SMTP reply types.

use std::fmt;

use crate::error::Error;

/// Coarse outcome of a reply, from the first digit of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyClass {
    /// 2xx: the command completed.
    Completed,
    /// 3xx: the server waits for more input (`DATA`, `AUTH`).
    Intermediate,
    /// 4xx: try again later.
    Transient,
    /// 5xx: do not repeat as is.
    Permanent,
    /// Anything outside 2xx-5xx.
    Unknown,
}

/// Three-digit SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220 Service ready.
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Closing transmission channel.
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded.
    pub const AUTH_SUCCEEDED: Self = Self(235);
    /// 250 Requested action completed.
    pub const OK: Self = Self(250);
    /// 334 Send the next authentication response.
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input.
    pub const START_DATA: Self = Self(354);
    /// 421 Service not available.
    pub const SERVICE_UNAVAILABLE: Self = Self(421);
    /// 535 Authentication credentials invalid.
    pub const AUTH_FAILED: Self = Self(535);
    /// 550 Mailbox unavailable.
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);
    /// 554 Transaction failed.
    pub const TRANSACTION_FAILED: Self = Self(554);

    /// Creates a reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Classifies the code.
    #[must_use]
    pub const fn class(self) -> ReplyClass {
        match self.0 / 100 {
            2 => ReplyClass::Completed,
            3 => ReplyClass::Intermediate,
            4 => ReplyClass::Transient,
            5 => ReplyClass::Permanent,
            _ => ReplyClass::Unknown,
        }
    }

    /// Returns true for 2xx codes.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.class(), ReplyClass::Completed)
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A complete (possibly multi-line) reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code shared by all lines.
    pub code: ReplyCode,
    /// Text of each line, without the code and separator.
    pub message: Vec<String>,
}

impl Reply {
    /// Creates a reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec is not const-compatible
    pub fn new(code: ReplyCode, message: Vec<String>) -> Self {
        Self { code, message }
    }

    /// Returns true for 2xx replies.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the RFC 3463 enhanced status code (`5.7.8`) leading the
    /// first line, if the server sent one.
    #[must_use]
    pub fn enhanced_status(&self) -> Option<&str> {
        let first = self.message.first()?.split_whitespace().next()?;
        let mut parts = first.split('.');
        let valid = parts.next().is_some_and(|c| matches!(c, "2" | "4" | "5"))
            && parts.by_ref().take(2).filter(|p| is_status_digits(p)).count() == 2
            && parts.next().is_none();
        valid.then_some(first)
    }

    /// Returns the text of all lines joined with spaces.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Converts the reply into an [`Error::SmtpError`].
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::smtp_error(self.code.as_u16(), self.message_text())
    }
}

fn is_status_digits(part: &str) -> bool {
    (1..=3).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
}
