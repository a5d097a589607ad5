//! `speakmail` - read a text file aloud and e-mail the recording.
//!
//! Reads the text, sends it to a text-to-speech API, saves the MP3 and mails
//! it to the configured recipient.

#![forbid(unsafe_code)]

mod config;
mod tts;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{MailConfig, SpeechConfig, env_lookup};
use tts::{SpeechClient, Voice};

/// Turn a text file into speech and e-mail the MP3.
#[derive(Debug, Parser)]
#[command(name = "speakmail", version, about)]
struct Args {
    /// Text file to read aloud.
    #[arg(short, long)]
    file: PathBuf,

    /// Voice the text is read in.
    #[arg(short, long, value_enum, default_value_t = Voice::default())]
    voice: Voice,

    /// Where to save the MP3; its file name is used for the attachment.
    #[arg(short, long, default_value = "response.mp3")]
    output: PathBuf,

    /// Subject of the e-mail.
    #[arg(long, default_value = "Your Audio File")]
    subject: String,

    /// Body of the e-mail.
    #[arg(long, default_value = "Here it is - Great job!")]
    body: String,

    /// Environment file to load before reading configuration.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Only save the MP3, do not send it.
    #[arg(long)]
    no_send: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speakmail=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // reqwest and the SMTP client share one rustls; pick its provider once.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let args = Args::parse();
    load_env_file(args.env_file.as_deref())?;

    let speech = SpeechConfig::from_lookup(env_lookup)?;
    // Resolve and check mail settings before spending an API call on the audio.
    let mail = if args.no_send {
        None
    } else {
        let config = MailConfig::from_lookup(env_lookup)?;
        Some(config.into_sender().context("invalid mail configuration")?)
    };

    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("could not read {}", args.file.display()))?;

    let mut client = SpeechClient::new(speech.api_key);
    if let Some(base_url) = speech.base_url {
        client = client.with_base_url(base_url);
    }
    if let Some(model) = speech.model {
        client = client.with_model(model);
    }
    let audio = client
        .synthesize(&text, args.voice)
        .await
        .context("text-to-speech request failed")?;

    tokio::fs::write(&args.output, &audio)
        .await
        .with_context(|| format!("could not write {}", args.output.display()))?;
    info!(path = %args.output.display(), bytes = audio.len(), voice = %args.voice, "saved audio");

    let Some((sender, recipient)) = mail else {
        return Ok(());
    };

    let mut email = sender.new_email(recipient, args.subject, args.body);
    email.attach(attachment_name(&args.output), audio);

    sender
        .send_cancellable(email, interrupted())
        .await
        .context("could not send the e-mail")?;
    info!("email sent");

    Ok(())
}

/// Loads `path`, or `.env` in the working directory when none is given.
///
/// An explicit file must exist; the default one is optional.
fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("could not load {}", path.display()))?;
        }
        None => match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
            Err(err) if err.not_found() => tracing::debug!("no .env file"),
            Err(err) => return Err(err).context("could not load .env"),
        },
    }
    Ok(())
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "response.mp3".to_string(), |name| name.to_string_lossy().into_owned())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
