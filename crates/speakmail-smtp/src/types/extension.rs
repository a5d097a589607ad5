//! EHLO extension keywords.

/// A service extension advertised in the EHLO reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS (RFC 3207).
    StartTls,
    /// AUTH with the offered SASL mechanisms (RFC 4954).
    Auth(Vec<AuthMechanism>),
    /// SIZE with the optional byte limit (RFC 1870).
    Size(Option<usize>),
    /// 8BITMIME (RFC 6152).
    EightBitMime,
    /// PIPELINING (RFC 2920).
    Pipelining,
    /// SMTPUTF8 (RFC 6531).
    SmtpUtf8,
    /// ENHANCEDSTATUSCODES (RFC 2034).
    EnhancedStatusCodes,
    /// Any other keyword, uppercased, parameters dropped.
    Other(String),
}

impl Extension {
    /// Parses one line of an EHLO reply (without the code).
    ///
    /// The pre-standard `AUTH=` form is accepted.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (keyword, params) = line
            .split_once([' ', '='])
            .unwrap_or((line, ""));

        match keyword.to_ascii_uppercase().as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => Self::Auth(
                params
                    .split_whitespace()
                    .map(AuthMechanism::parse)
                    .collect(),
            ),
            "SIZE" => Self::Size(params.trim().parse().ok()),
            "8BITMIME" => Self::EightBitMime,
            "PIPELINING" => Self::Pipelining,
            "SMTPUTF8" => Self::SmtpUtf8,
            "ENHANCEDSTATUSCODES" => Self::EnhancedStatusCodes,
            other => Self::Other(other.to_string()),
        }
    }
}

/// SASL mechanism name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN (RFC 4616), the only one this client speaks.
    Plain,
    /// LOGIN.
    Login,
    /// `XOAUTH2`.
    XOAuth2,
    /// Anything else, uppercased.
    Other(String),
}

impl AuthMechanism {
    /// Parses a mechanism name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PLAIN" => Self::Plain,
            "LOGIN" => Self::Login,
            "XOAUTH2" => Self::XOAuth2,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the mechanism name as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::XOAuth2 => "XOAUTH2",
            Self::Other(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(Extension::parse("starttls"), Extension::StartTls);
        assert_eq!(Extension::parse("8BITMIME"), Extension::EightBitMime);
        assert_eq!(Extension::parse("PIPELINING"), Extension::Pipelining);
        assert_eq!(Extension::parse("SMTPUTF8"), Extension::SmtpUtf8);
        assert_eq!(
            Extension::parse("ENHANCEDSTATUSCODES"),
            Extension::EnhancedStatusCodes
        );
        assert_eq!(
            Extension::parse("DSN"),
            Extension::Other("DSN".to_string())
        );
        assert_eq!(
            Extension::parse("x-custom arg"),
            Extension::Other("X-CUSTOM".to_string())
        );
    }

    #[test]
    fn test_parse_auth() {
        assert_eq!(
            Extension::parse("AUTH PLAIN login CRAM-MD5"),
            Extension::Auth(vec![
                AuthMechanism::Plain,
                AuthMechanism::Login,
                AuthMechanism::Other("CRAM-MD5".to_string()),
            ])
        );
        assert_eq!(
            Extension::parse("AUTH=LOGIN PLAIN"),
            Extension::Auth(vec![AuthMechanism::Login, AuthMechanism::Plain])
        );
        assert_eq!(Extension::parse("AUTH"), Extension::Auth(Vec::new()));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(
            Extension::parse("SIZE 35882577"),
            Extension::Size(Some(35_882_577))
        );
        assert_eq!(Extension::parse("SIZE"), Extension::Size(None));
        assert_eq!(Extension::parse("SIZE lots"), Extension::Size(None));
    }

    #[test]
    fn test_mechanism_names() {
        assert_eq!(AuthMechanism::parse("xoauth2"), AuthMechanism::XOAuth2);
        assert_eq!(AuthMechanism::Plain.as_str(), "PLAIN");
        assert_eq!(AuthMechanism::parse("gssapi").as_str(), "GSSAPI");
    }
}
