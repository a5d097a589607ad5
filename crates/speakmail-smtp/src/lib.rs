//! # speakmail-smtp
//!
//! Async SMTP submission client (RFC 5321) for delivering one message to
//! one recipient.
//!
//! ## Features
//!
//! - **Type-state connection management**: the compiler rejects commands
//!   issued out of order
//! - **TLS**: implicit TLS (port 465) and STARTTLS, via rustls
//! - **Authentication**: AUTH PLAIN, with or without an initial response
//! - **Extensions**: 8BITMIME and SIZE are used when advertised
//!
//! ## Quick Start
//!
//! ```ignore
//! use speakmail_smtp::{Address, Client};
//! use speakmail_smtp::connection::connect;
//!
//! #[tokio::main]
//! async fn main() -> speakmail_smtp::Result<()> {
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("localhost").await?;
//!     let client = client.starttls("smtp.example.com", "localhost").await?;
//!     let client = client.auth_plain("user@example.com", "password").await?;
//!
//!     let message = b"Subject: Test\r\n\r\nHello, World!\r\n";
//!     let client = client
//!         .mail_from(Address::new("sender@example.com")?, Some(message.len()))
//!         .await?;
//!     let client = client.rcpt_to(Address::new("recipient@example.com")?).await?;
//!     let client = client.data().await?.send_message(message).await?;
//!
//!     client.quit().await
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! Connected ── auth_plain() ──→ Authenticated ── mail_from() ──→ MailTransaction
//!                                     ↑                                │
//!                               send_message()                     rcpt_to()
//!                                     │                                ↓
//!                                   Data ←────────── data() ──── RecipientAdded
//! ```

#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
    SmtpConnection, SmtpStream,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyClass, ReplyCode};
