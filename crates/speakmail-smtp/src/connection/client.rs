//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Reply, ReplyCode};
use base64::Engine;
use std::marker::PhantomData;

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

/// Connection trait for all states.
pub trait SmtpConnection {
    /// Returns the server information.
    fn server_info(&self) -> &ServerInfo;
}

impl<S> SmtpConnection for Client<S> {
    fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(greeting.into_error());
        }

        // Extract hostname from greeting (first word after code)
        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!(server = %hostname, "received SMTP greeting");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .expect_success(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?;
        self.server_info.set_extensions(reply.message.iter());
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not supported or if the upgrade fails.
    pub async fn starttls(mut self, hostname: &str, client_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.expect_success(Command::StartTls).await?;
        self.stream = self.stream.upgrade_to_tls(hostname).await?;
        tracing::debug!(hostname, "upgraded connection to TLS");

        // Capabilities may differ once the channel is encrypted.
        self.ehlo(client_hostname).await
    }

    /// Authenticates using the PLAIN mechanism.
    ///
    /// The credentials go out as a SASL initial response; a server that
    /// answers `334` instead receives them on the next line.
    ///
    /// # Errors
    ///
    /// Returns an error if the server advertises AUTH without PLAIN, or if
    /// authentication fails.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        let mechanisms = self.server_info.auth_mechanisms();
        if !mechanisms.is_empty() && !mechanisms.contains(&AuthMechanism::Plain) {
            let offered: Vec<&str> = mechanisms.iter().map(AuthMechanism::as_str).collect();
            return Err(Error::NotSupported(format!(
                "AUTH PLAIN (server offers {})",
                offered.join(", ")
            )));
        }

        // Build PLAIN response: \0username\0password
        let credentials = format!("\0{username}\0{password}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());

        let mut reply = self
            .send_command(Command::Auth {
                mechanism: AuthMechanism::Plain,
                initial_response: Some(encoded.clone()),
            })
            .await?;

        if reply.code == ReplyCode::AUTH_CONTINUE {
            self.stream.write_all(encoded.as_bytes()).await?;
            self.stream.write_all(b"\r\n").await?;
            self.stream.flush().await?;
            reply = read_reply(&mut self.stream).await?;
        }

        if !reply.is_success() {
            return Err(reply.into_error());
        }
        tracing::debug!(username, "authenticated");

        Ok(self.transition())
    }
}

impl Client<Authenticated> {
    /// Starts a mail transaction.
    ///
    /// `size` is announced with the SIZE parameter when the server supports
    /// it, and checked against the advertised limit first. BODY=8BITMIME is
    /// added when the server supports it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`] if `size` exceeds the server limit,
    /// or an error if the MAIL FROM command fails.
    pub async fn mail_from(
        mut self,
        from: Address,
        size: Option<usize>,
    ) -> Result<Client<MailTransaction>> {
        let limit = self.server_info.max_message_size();
        if let (Some(size), Some(limit)) = (size, limit) {
            if limit > 0 && size > limit {
                return Err(Error::MessageTooLarge { size, limit });
            }
        }

        let cmd = Command::MailFrom {
            from,
            eight_bit: self.server_info.supports_8bitmime(),
            size: size.filter(|_| self.server_info.supports_size()),
        };
        self.expect_success(cmd).await?;

        Ok(self.transition())
    }
}

impl Client<MailTransaction> {
    /// Adds the recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded>> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self.transition())
    }
}

impl Client<RecipientAdded> {
    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error if the DATA command fails.
    pub async fn data(mut self) -> Result<Client<Data>> {
        let reply = self.send_command(Command::Data).await?;

        if reply.code != ReplyCode::START_DATA {
            return Err(reply.into_error());
        }

        Ok(self.transition())
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, lines starting with `.` are
    /// dot-stuffed, and the terminating `.` line is added. Returns once the
    /// server has accepted the message.
    ///
    /// # Errors
    ///
    /// Returns an error if sending the message fails or server rejects it.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Authenticated>> {
        let payload = encode_data(message);
        self.stream.write_all(&payload).await?;
        self.stream.flush().await?;

        let reply = read_reply(&mut self.stream).await?;
        tracing::debug!(code = %reply.code, bytes = payload.len(), "message data sent");

        if !reply.is_success() {
            return Err(reply.into_error());
        }

        Ok(self.transition())
    }
}

// Common implementation for all states
impl<S> Client<S> {
    fn transition<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        tracing::debug!(command = cmd.verb(), "smtp >");
        self.stream.write_all(&cmd.serialize()).await?;
        self.stream.flush().await?;
        let reply = read_reply(&mut self.stream).await?;
        tracing::debug!(code = %reply.code, status = reply.enhanced_status(), "smtp <");
        Ok(reply)
    }

    async fn expect_success(&mut self, cmd: Command) -> Result<Reply> {
        let reply = self.send_command(cmd).await?;
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(reply.into_error())
        }
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;

        if !reply.is_success() {
            return Err(reply.into_error());
        }

        Ok(())
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        lines.push(line);

        if is_last {
            break;
        }
    }

    parse_reply(&lines)
}

/// Prepares message bytes for the DATA phase.
///
/// CRLF, bare LF and bare CR all end a line and go out as CRLF.
fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(message.len() + message.len() / 64 + 5);
    let mut at_line_start = true;

    let mut bytes = message.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        match byte {
            b'\r' | b'\n' => {
                if byte == b'\r' && bytes.peek() == Some(&b'\n') {
                    bytes.next();
                }
                payload.extend_from_slice(b"\r\n");
                at_line_start = true;
            }
            _ => {
                // Byte-stuff lines starting with '.'
                if at_line_start && byte == b'.' {
                    payload.push(b'.');
                }
                payload.push(byte);
                at_line_start = false;
            }
        }
    }

    if !at_line_start || payload.is_empty() {
        payload.extend_from_slice(b"\r\n");
    }

    // Terminating sequence
    payload.extend_from_slice(b".\r\n");
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_data_normalizes_line_endings() {
        assert_eq!(encode_data(b"a\nb\r\nc"), b"a\r\nb\r\nc\r\n.\r\n");
    }

    #[test]
    fn test_encode_data_trailing_newline() {
        assert_eq!(encode_data(b"a\r\n"), b"a\r\n.\r\n");
        assert_eq!(encode_data(b"a\n\n"), b"a\r\n\r\n.\r\n");
    }

    #[test]
    fn test_encode_data_bare_cr() {
        assert_eq!(encode_data(b"a\rb\r"), b"a\r\nb\r\n.\r\n");
        assert_eq!(encode_data(b"a\r\r\nb"), b"a\r\n\r\nb\r\n.\r\n");
        assert_eq!(encode_data(b"x\r.y"), b"x\r\n..y\r\n.\r\n");
    }

    #[test]
    fn test_encode_data_dot_stuffing() {
        assert_eq!(encode_data(b".hidden\r\n..two"), b"..hidden\r\n...two\r\n.\r\n");
    }

    #[test]
    fn test_encode_data_empty() {
        assert_eq!(encode_data(b""), b"\r\n.\r\n");
    }
}
