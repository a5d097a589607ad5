//! # speakmail-mime
//!
//! MIME composition for outgoing speakmail messages.
//!
//! ## Features
//!
//! - **Data model**: [`Email`], [`Mailbox`] and [`Attachment`] with
//!   validation that runs before any bytes are produced
//! - **Serialization**: [`MessageBuilder`] emits `text/plain` or
//!   `multipart/mixed` messages with Base64 attachments
//! - **Encoding/Decoding**: Base64, Quoted-Printable decoding, RFC 2047
//!   header encoding
//! - **Reading**: [`Message::parse`] splits a message back into parts, which
//!   is how the builder's output is verified
//!
//! ## Quick Start
//!
//! ```
//! use speakmail_mime::{Email, Mailbox, Message, MessageBuilder};
//!
//! let from = Mailbox::with_name("Speak Mail", "bot@example.com")?;
//! let mut email = Email::new(from, "x@example.com", "Your file", "done");
//! email.attach("out.mp3", vec![0x00, 0xFF, 0x10]);
//!
//! let bytes = MessageBuilder::serialize(&email)?;
//!
//! let parsed = Message::parse(&bytes)?;
//! assert_eq!(parsed.parts.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Header injection
//!
//! A subject, display name, or recipient containing CR or LF is rejected
//! with a [`ValidationError`]; nothing is silently stripped.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod boundary;
mod builder;
mod content_type;
mod email;
mod error;
mod header;
mod message;

pub mod encoding;

pub use boundary::{BOUNDARY_PREFIX, Boundary};
pub use builder::MessageBuilder;
pub use content_type::ContentType;
pub use email::{Attachment, Email, Mailbox, validate_address};
pub use error::{Error, Result, ValidationError};
pub use header::Headers;
pub use message::{Message, Part, TransferEncoding};
