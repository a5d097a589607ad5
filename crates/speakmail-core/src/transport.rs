//! SMTP delivery of a composed message.
//!
//! A delivery is one attempt over one connection: connect, authenticate,
//! envelope, data. Failures carry the [`Phase`] they happened in. Nothing is
//! retried.

use std::future::Future;

use speakmail_mime::{Email, MessageBuilder, ValidationError};
use speakmail_smtp::connection::{connect, connect_tls};
use speakmail_smtp::{Address, Authenticated, Client};
use tokio::time::{Instant, timeout_at};

use crate::config::{Security, SenderConfig};
use crate::error::{Cause, DeliveryError, Phase, Result};
use crate::sender::Sender;

/// Delivers messages over SMTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transport;

impl Transport {
    /// Serializes `email` and delivers it with `sender`'s credentials.
    ///
    /// The message is validated before any network I/O. The returned future
    /// resolves once the server has accepted or rejected the message, or when
    /// the configured timeout expires; the timeout covers the whole exchange.
    /// A failing `QUIT` after acceptance is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) for an
    /// invalid message and [`Error::Delivery`](crate::Error::Delivery) when
    /// the exchange fails.
    pub async fn send(sender: &Sender, email: Email) -> Result<()> {
        let message = MessageBuilder::serialize(&email)?;
        let from = envelope_address("from", sender.address())?;
        let to = envelope_address("to", email.to())?;

        let config = sender.config();
        let deadline = Instant::now() + config.timeout();
        let mut phase = Phase::Connect;

        let outcome = timeout_at(deadline, deliver(config, from, to, &message, &mut phase)).await;
        let client = match outcome {
            Ok(Ok(client)) => client,
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                tracing::debug!(%phase, "delivery timed out");
                return Err(DeliveryError::new(phase, Cause::TimedOut).into());
            }
        };

        tracing::info!(
            to = email.to(),
            bytes = message.len(),
            attachments = email.attachments().len(),
            "message accepted"
        );

        match timeout_at(deadline, client.quit()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!(error = %err, "QUIT failed after acceptance"),
            Err(_) => tracing::debug!("QUIT timed out after acceptance"),
        }

        Ok(())
    }

    /// Like [`Transport::send`], but aborts as soon as `signal` resolves.
    ///
    /// A cancelled send reports phase [`Phase::Data`] with cause
    /// [`Cause::Cancelled`], whatever step was in progress.
    ///
    /// # Errors
    ///
    /// As [`Transport::send`], plus the cancellation error.
    pub async fn send_cancellable<F>(sender: &Sender, email: Email, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            result = Self::send(sender, email) => result,
            () = signal => {
                tracing::debug!("delivery cancelled");
                Err(DeliveryError::new(Phase::Data, Cause::Cancelled).into())
            }
        }
    }
}

fn envelope_address(
    field: &'static str,
    addr: &str,
) -> std::result::Result<Address, ValidationError> {
    Address::new(addr).map_err(|err| ValidationError::new(field, err.to_string()))
}

/// Runs the SMTP exchange up to the server's verdict on the message.
///
/// `phase` is kept current so a caller that drops this future on timeout
/// knows where it stopped.
async fn deliver(
    config: &SenderConfig,
    from: Address,
    to: Address,
    message: &[u8],
    phase: &mut Phase,
) -> std::result::Result<Client<Authenticated>, DeliveryError> {
    *phase = Phase::Connect;
    let stream = match config.security {
        Security::Tls => connect_tls(&config.host, config.port).await,
        Security::StartTls | Security::None => connect(&config.host, config.port).await,
    }
    .map_err(|e| DeliveryError::smtp(Phase::Connect, e))?;

    let client = Client::from_stream(stream)
        .await
        .map_err(|e| DeliveryError::smtp(Phase::Connect, e))?;
    let mut client = client
        .ehlo(&config.helo_name)
        .await
        .map_err(|e| DeliveryError::smtp(Phase::Connect, e))?;
    if config.security == Security::StartTls {
        client = client
            .starttls(&config.host, &config.helo_name)
            .await
            .map_err(|e| DeliveryError::smtp(Phase::Connect, e))?;
    }
    tracing::debug!(host = %config.host, port = config.port, "connected");

    *phase = Phase::Authenticate;
    let client = client
        .auth_plain(&config.username, &config.password)
        .await
        .map_err(|e| DeliveryError::smtp(Phase::Authenticate, e))?;

    *phase = Phase::Envelope;
    let client = client
        .mail_from(from, Some(message.len()))
        .await
        .map_err(|e| DeliveryError::smtp(Phase::Envelope, e))?;
    let client = client
        .rcpt_to(to)
        .await
        .map_err(|e| DeliveryError::smtp(Phase::Envelope, e))?;

    *phase = Phase::Data;
    let client = client
        .data()
        .await
        .map_err(|e| DeliveryError::smtp(Phase::Data, e))?;
    client
        .send_message(message)
        .await
        .map_err(|e| DeliveryError::smtp(Phase::Data, e))
}
