//! Mail-sending identity.

use std::future::Future;

use speakmail_mime::{Email, Mailbox};

use crate::config::SenderConfig;
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Longest accepted delivery timeout, one day.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// A configured sender: server credentials plus the `From` mailbox.
///
/// Built once from a [`SenderConfig`] and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Sender {
    config: SenderConfig,
    mailbox: Mailbox,
}

impl Sender {
    /// Creates a sender, checking the address and server settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the address or display name is
    /// invalid, or [`Error::Config`] if the server settings are unusable:
    /// empty host, port 0, a timeout of 0 or above [`MAX_TIMEOUT_SECS`], or
    /// a HELO name that is empty or holds whitespace or control characters.
    pub fn new(config: SenderConfig) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(Error::Config("SMTP host is empty".into()));
        }
        if config.port == 0 {
            return Err(Error::Config("SMTP port cannot be 0".into()));
        }
        if config.timeout_secs == 0 {
            return Err(Error::Config("delivery timeout cannot be 0".into()));
        }
        if config.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(Error::Config(format!(
                "delivery timeout of {}s exceeds {MAX_TIMEOUT_SECS}s",
                config.timeout_secs
            )));
        }
        if config.helo_name.is_empty()
            || config
                .helo_name
                .contains(|c: char| c.is_whitespace() || c.is_control())
        {
            return Err(Error::Config(format!(
                "invalid HELO name {:?}",
                config.helo_name
            )));
        }

        let mailbox = Mailbox::with_name(&config.display_name, &config.address)?;
        Ok(Self { config, mailbox })
    }

    /// Returns the configuration the sender was built from.
    #[must_use]
    pub const fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Returns the `From` mailbox.
    #[must_use]
    pub const fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Returns the sender address (also the envelope-from).
    #[must_use]
    pub fn address(&self) -> &str {
        self.mailbox.address()
    }

    /// Starts a new message from this sender.
    #[must_use]
    pub fn new_email(
        &self,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Email {
        Email::new(self.mailbox.clone(), to, subject, body)
    }

    /// Serializes and delivers `email`. See [`Transport::send`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] or [`Error::Delivery`].
    pub async fn send(&self, email: Email) -> Result<()> {
        Transport::send(self, email).await
    }

    /// Like [`Sender::send`], but gives up when `signal` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] or [`Error::Delivery`].
    pub async fn send_cancellable<F>(&self, email: Email, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        Transport::send_cancellable(self, email, signal).await
    }
}
