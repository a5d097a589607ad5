//! Text-to-speech HTTP client.

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default speech model.
pub const DEFAULT_MODEL: &str = "tts-1";

/// Errors from the speech API.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("speech API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, usually a JSON error object.
        body: String,
    },

    /// Nothing to synthesize.
    #[error("input text is empty")]
    EmptyInput,
}

/// Voice the text is read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    /// Neutral and balanced.
    #[default]
    Alloy,
    /// Warm, measured.
    Echo,
    /// Expressive, British.
    Fable,
    /// Deep.
    Onyx,
    /// Bright.
    Nova,
    /// Soft.
    Shimmer,
}

impl Voice {
    /// Returns the name the API expects.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: Voice,
}

/// Client for the `/audio/speech` endpoint.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl SpeechClient {
    /// Creates a client for the default endpoint and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Points the client at another API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Uses another speech model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/speech", self.base_url)
    }

    /// Synthesizes `text` and returns the MP3 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::EmptyInput`] for blank text, [`TtsError::Status`]
    /// for a non-2xx response, or [`TtsError::Http`] if the request fails.
    pub async fn synthesize(&self, text: &str, voice: Voice) -> Result<Vec<u8>, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyInput);
        }

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice,
        };
        tracing::debug!(model = %self.model, %voice, chars = text.len(), "requesting speech");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TtsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), "received speech");
        Ok(audio.to_vec())
    }
}
