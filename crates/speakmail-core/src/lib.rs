//! # speakmail-core
//!
//! Sends one composed message from one configured identity.
//!
//! A [`Sender`] is built once from an explicit [`SenderConfig`]. It hands out
//! fresh [`Email`]s, and [`Sender::send`] serializes them with
//! [`MessageBuilder`](speakmail_mime::MessageBuilder) and delivers them with
//! [`Transport`]:
//!
//! ```no_run
//! use speakmail_core::{Security, Sender, SenderConfig};
//!
//! # async fn run() -> speakmail_core::Result<()> {
//! let sender = Sender::new(SenderConfig {
//!     host: "smtp.example.com".into(),
//!     port: 587,
//!     security: Security::StartTls,
//!     username: "me@example.com".into(),
//!     password: "app-password".into(),
//!     display_name: "Speak Mail".into(),
//!     address: "me@example.com".into(),
//!     ..SenderConfig::default()
//! })?;
//!
//! let mut email = sender.new_email("you@example.com", "Your Audio File", "Here it is");
//! email.attach("response.mp3", vec![0xFF, 0xFB, 0x90]);
//! sender.send(email).await
//! # }
//! ```
//!
//! Validation failures surface before any connection is made. Delivery
//! failures carry the [`Phase`] of the SMTP exchange they happened in.

#![forbid(unsafe_code)]

mod config;
mod error;
mod sender;
mod transport;

pub use config::{Security, SenderConfig};
pub use error::{Cause, DeliveryError, Error, Phase, Result};
pub use sender::{MAX_TIMEOUT_SECS, Sender};
pub use speakmail_mime::{
    Attachment, ContentType, Email, Mailbox, ValidationError, validate_address,
};
pub use transport::Transport;
