//! Error types for composing and delivering mail.

use std::fmt;

use speakmail_mime::ValidationError;
use thiserror::Error;

/// Errors returned by [`Sender`](crate::Sender) and [`Transport`](crate::Transport).
#[derive(Debug, Error)]
pub enum Error {
    /// The message was rejected before any network I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The SMTP exchange failed.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The sender configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Step of the SMTP exchange in which a delivery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// TCP connect, TLS handshake, greeting, EHLO and STARTTLS.
    Connect,
    /// AUTH with the configured credentials.
    Authenticate,
    /// `MAIL FROM` and `RCPT TO`.
    Envelope,
    /// `DATA` up to the server's final reply.
    Data,
}

impl Phase {
    /// Returns the lowercase phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Authenticate => "authenticate",
            Self::Envelope => "envelope",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong inside a [`Phase`].
#[derive(Debug, Error)]
pub enum Cause {
    /// Network, TLS or protocol failure, or a server rejection.
    #[error("{0}")]
    Smtp(#[from] speakmail_smtp::Error),

    /// The exchange did not finish within the configured timeout.
    #[error("timed out")]
    TimedOut,

    /// The caller cancelled the send.
    #[error("cancelled")]
    Cancelled,
}

/// A failed delivery attempt, tagged with the phase it failed in.
#[derive(Debug, Error)]
#[error("delivery failed during {phase}: {cause}")]
pub struct DeliveryError {
    /// Phase in progress when the failure happened.
    pub phase: Phase,
    /// Underlying cause.
    pub cause: Cause,
}

impl DeliveryError {
    /// Creates a delivery error.
    #[must_use]
    pub const fn new(phase: Phase, cause: Cause) -> Self {
        Self { phase, cause }
    }

    /// Wraps an SMTP client error.
    #[must_use]
    pub fn smtp(phase: Phase, err: speakmail_smtp::Error) -> Self {
        Self::new(phase, Cause::Smtp(err))
    }

    /// Returns the server reply code, if the server rejected the exchange.
    #[must_use]
    pub const fn reply_code(&self) -> Option<u16> {
        match &self.cause {
            Cause::Smtp(err) => err.reply_code(),
            Cause::TimedOut | Cause::Cancelled => None,
        }
    }
}
