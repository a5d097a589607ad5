//! SMTP commands and their wire form.

use std::fmt;

use crate::types::{Address, AuthMechanism};

/// A client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `EHLO <domain>`
    Ehlo {
        /// Name the client announces.
        hostname: String,
    },
    /// `STARTTLS`
    StartTls,
    /// `AUTH <mechanism> [initial-response]`
    Auth {
        /// SASL mechanism.
        mechanism: AuthMechanism,
        /// Base64 initial response (RFC 4954 section 4).
        initial_response: Option<String>,
    },
    /// `MAIL FROM:<path> [BODY=8BITMIME] [SIZE=n]`
    MailFrom {
        /// Reverse path.
        from: Address,
        /// Declare an 8-bit body.
        eight_bit: bool,
        /// Declared message size in bytes.
        size: Option<usize>,
    },
    /// `RCPT TO:<path>`
    RcptTo {
        /// Forward path.
        to: Address,
    },
    /// `DATA`
    Data,
    /// `QUIT`
    Quit,
}

impl Command {
    /// Returns the command verb. Never includes arguments, so it is safe to
    /// log even for `AUTH`.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Ehlo { .. } => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::Auth { .. } => "AUTH",
            Self::MailFrom { .. } => "MAIL FROM",
            Self::RcptTo { .. } => "RCPT TO",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        }
    }

    /// Returns the command line, CRLF included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        format!("{self}\r\n").into_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo { hostname } => write!(f, "EHLO {hostname}"),
            Self::Auth {
                mechanism,
                initial_response,
            } => {
                write!(f, "AUTH {}", mechanism.as_str())?;
                match initial_response {
                    Some(response) => write!(f, " {response}"),
                    None => Ok(()),
                }
            }
            Self::MailFrom {
                from,
                eight_bit,
                size,
            } => {
                write!(f, "MAIL FROM:<{}>", from.as_str())?;
                if *eight_bit {
                    f.write_str(" BODY=8BITMIME")?;
                }
                match size {
                    Some(size) => write!(f, " SIZE={size}"),
                    None => Ok(()),
                }
            }
            Self::RcptTo { to } => write!(f, "RCPT TO:<{}>", to.as_str()),
            Self::StartTls | Self::Data | Self::Quit => f.write_str(self.verb()),
        }
    }
}
