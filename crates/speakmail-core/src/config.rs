//! Sender configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Security/encryption mode for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Default submission port for the security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 25,
            Self::StartTls => 587,
            Self::Tls => 465,
        }
    }
}

impl FromStr for Security {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" | "ssl" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "none" | "plain" => Ok(Self::None),
            other => Err(Error::Config(format!(
                "unknown security mode {other:?} (expected tls, starttls or none)"
            ))),
        }
    }
}

fn default_helo_name() -> String {
    "localhost".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Everything needed to send mail as one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Connection security.
    #[serde(default)]
    pub security: Security,
    /// Username for AUTH PLAIN.
    pub username: String,
    /// Password for AUTH PLAIN.
    pub password: String,
    /// Display name for the `From` header.
    #[serde(default)]
    pub display_name: String,
    /// Sender address, used in the `From` header and as envelope-from.
    pub address: String,
    /// Name announced with EHLO.
    #[serde(default = "default_helo_name")]
    pub helo_name: String,
    /// Upper bound for a whole delivery, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: Security::default().default_port(),
            security: Security::default(),
            username: String::new(),
            password: String::new(),
            display_name: String::new(),
            address: String::new(),
            helo_name: default_helo_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SenderConfig {
    /// Returns the delivery timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
