//! Configuration resolved from the process environment.
//!
//! Values are looked up once at startup, after the `.env` file has been
//! loaded, and passed down explicitly.

use speakmail_core::{Error, Security, Sender, SenderConfig, validate_address};

/// Settings for the speech API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechConfig {
    /// Bearer token.
    pub api_key: String,
    /// API root override.
    pub base_url: Option<String>,
    /// Model override.
    pub model: Option<String>,
}

impl SpeechConfig {
    /// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_TTS_MODEL`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API key is missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        Ok(Self {
            api_key: required(&lookup, "OPENAI_API_KEY")?,
            base_url: optional(&lookup, "OPENAI_BASE_URL"),
            model: optional(&lookup, "OPENAI_TTS_MODEL"),
        })
    }
}

/// Settings for delivering the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// Sending identity and server.
    pub sender: SenderConfig,
    /// Where the audio goes.
    pub recipient: String,
}

impl MailConfig {
    /// Reads the `APP_*` variables and `MY_EMAIL`.
    ///
    /// The port defaults from the security mode; the security mode defaults
    /// to implicit TLS on port 465 and STARTTLS on any other port. The
    /// sender address defaults to the username.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing or malformed
    /// variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let host = required(&lookup, "APP_EMAIL_SERVER")?;
        let username = required(&lookup, "APP_EMAIL_USERNAME")?;
        let password = required(&lookup, "APP_EMAIL_PASSWORD")?;
        let recipient = required(&lookup, "MY_EMAIL")?;

        let port = optional(&lookup, "APP_EMAIL_PORT")
            .map(|v| parse_number::<u16>("APP_EMAIL_PORT", &v))
            .transpose()?;
        let security = match optional(&lookup, "APP_EMAIL_SECURITY") {
            Some(value) => value
                .parse::<Security>()
                .map_err(|e| Error::Config(format!("APP_EMAIL_SECURITY: {e}")))?,
            None if port.is_none_or(|p| p == Security::Tls.default_port()) => Security::Tls,
            None => Security::StartTls,
        };

        let mut sender = SenderConfig {
            port: port.unwrap_or_else(|| security.default_port()),
            security,
            address: optional(&lookup, "APP_EMAIL_ADDRESS").unwrap_or_else(|| username.clone()),
            display_name: optional(&lookup, "APP_NAME").unwrap_or_default(),
            host,
            username,
            password,
            ..SenderConfig::default()
        };
        if let Some(secs) = optional(&lookup, "APP_SMTP_TIMEOUT") {
            sender.timeout_secs = parse_number("APP_SMTP_TIMEOUT", &secs)?;
        }

        Ok(Self { sender, recipient })
    }

    /// Builds the [`Sender`] and checks the recipient address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed sender or recipient
    /// address, or [`Error::Config`] for unusable server settings.
    pub fn into_sender(self) -> Result<(Sender, String), Error> {
        let sender = Sender::new(self.sender)?;
        validate_address("to", &self.recipient)?;
        Ok((sender, self.recipient))
    }
}

/// Looks a variable up in the process environment.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, Error> {
    optional(lookup, name).ok_or_else(|| Error::Config(format!("{name} is not set")))
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{name} is not a valid number: {value:?}")))
}
