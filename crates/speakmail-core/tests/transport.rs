//! Delivery tests against a scripted SMTP server on the loopback interface.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use speakmail_core::{Cause, Error, Phase, Security, Sender, SenderConfig};
use speakmail_mime::Message;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Expected client line prefix and the reply to send back.
///
/// `"."` collects message data up to the terminating dot line before
/// replying. An empty reply means the server goes quiet and holds the
/// connection open.
type Step = (&'static str, &'static str);

const EHLO: Step = ("EHLO speakmail.test", "250-mock.test\r\n250 AUTH PLAIN\r\n");
const AUTH: Step = ("AUTH PLAIN", "235 2.7.0 Accepted\r\n");
const MAIL: Step = ("MAIL FROM:", "250 OK\r\n");
const RCPT: Step = ("RCPT TO:", "250 OK\r\n");
const DATA: Step = ("DATA", "354 End data with <CR><LF>.<CR><LF>\r\n");

async fn scripted_server(steps: Vec<Step>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut received = Vec::new();

        write.write_all(b"220 mock.test ESMTP\r\n").await.unwrap();
        for (expect, reply) in steps {
            if expect == "." {
                while let Some(line) = lines.next_line().await.unwrap() {
                    let done = line == ".";
                    received.push(line);
                    if done {
                        break;
                    }
                }
            } else {
                let Some(line) = lines.next_line().await.unwrap() else {
                    break;
                };
                assert!(line.starts_with(expect), "expected {expect:?}, got {line:?}");
                received.push(line);
            }

            if reply.is_empty() {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            write.write_all(reply.as_bytes()).await.unwrap();
        }
        received
    });

    (port, handle)
}

fn sender(port: u16) -> Sender {
    Sender::new(SenderConfig {
        host: "127.0.0.1".into(),
        port,
        security: Security::None,
        username: "me@example.com".into(),
        password: "secret".into(),
        display_name: "Speak Mail".into(),
        address: "me@example.com".into(),
        helo_name: "speakmail.test".into(),
        timeout_secs: 1,
    })
    .unwrap()
}

fn delivery_failure(result: speakmail_core::Result<()>) -> (Phase, Cause) {
    match result {
        Err(Error::Delivery(err)) => (err.phase, err.cause),
        other => panic!("expected a delivery error, got {other:?}"),
    }
}

/// Reassembles the DATA lines (without the final dot) into message bytes.
fn message_bytes(data_lines: &[String]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for line in &data_lines[..data_lines.len() - 1] {
        let line = line.strip_prefix('.').unwrap_or(line);
        bytes.extend_from_slice(line.as_bytes());
        bytes.extend_from_slice(b"\r\n");
    }
    bytes
}

#[tokio::test]
async fn test_delivers_message_with_attachment() {
    let (port, server) = scripted_server(vec![
        EHLO,
        AUTH,
        MAIL,
        RCPT,
        DATA,
        (".", "250 2.0.0 Queued as 42\r\n"),
        ("QUIT", "221 Bye\r\n"),
    ])
    .await;

    let sender = sender(port);
    let mut email = sender.new_email("you@example.com", "Your Audio File", "Here it is");
    email.attach("response.mp3", vec![0xFF, 0xFB, 0x90, 0x00]);
    sender.send(email).await.unwrap();

    let received = server.await.unwrap();
    assert_eq!(received[0], "EHLO speakmail.test");
    assert_eq!(received[2], "MAIL FROM:<me@example.com>");
    assert_eq!(received[3], "RCPT TO:<you@example.com>");
    assert_eq!(received[4], "DATA");
    assert_eq!(received.last().unwrap(), "QUIT");

    let data = &received[5..received.len() - 1];
    let message = Message::parse(&message_bytes(data)).unwrap();
    assert_eq!(message.from(), Some("Speak Mail <me@example.com>"));
    assert_eq!(message.to(), Some("you@example.com"));
    assert_eq!(message.subject().unwrap().as_deref(), Some("Your Audio File"));
    assert_eq!(message.text_part().unwrap(), "Here it is");

    let attachments: Vec<_> = message.attachments().collect();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].filename().as_deref(), Some("response.mp3"));
    assert_eq!(
        attachments[0].decode_body().unwrap(),
        [0xFF_u8, 0xFB, 0x90, 0x00]
    );
}

#[tokio::test]
async fn test_quit_failure_after_acceptance_is_ignored() {
    let (port, server) = scripted_server(vec![
        EHLO,
        AUTH,
        MAIL,
        RCPT,
        DATA,
        (".", "250 OK\r\n"),
        ("QUIT", "500 What?\r\n"),
    ])
    .await;

    let sender = sender(port);
    let email = sender.new_email("you@example.com", "Hi", "Body");
    sender.send(email).await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_auth_rejection_is_authenticate_phase() {
    let (port, _server) =
        scripted_server(vec![EHLO, ("AUTH PLAIN", "535 5.7.8 Bad credentials\r\n")]).await;

    let sender = sender(port);
    let email = sender.new_email("you@example.com", "Hi", "Body");
    let (phase, cause) = delivery_failure(sender.send(email).await);

    assert_eq!(phase, Phase::Authenticate);
    match cause {
        Cause::Smtp(err) => assert_eq!(err.reply_code(), Some(535)),
        other => panic!("unexpected cause: {other:?}"),
    }
}

#[tokio::test]
async fn test_recipient_rejection_is_envelope_phase() {
    let (port, _server) = scripted_server(vec![
        EHLO,
        AUTH,
        MAIL,
        ("RCPT TO:", "550 5.1.1 No such user\r\n"),
    ])
    .await;

    let sender = sender(port);
    let email = sender.new_email("nobody@example.com", "Hi", "Body");
    let (phase, cause) = delivery_failure(sender.send(email).await);

    assert_eq!(phase, Phase::Envelope);
    assert!(matches!(cause, Cause::Smtp(_)));
}

#[tokio::test]
async fn test_rejection_after_data_is_data_phase() {
    let (port, _server) = scripted_server(vec![
        EHLO,
        AUTH,
        MAIL,
        RCPT,
        DATA,
        (".", "554 5.6.0 Message rejected\r\n"),
    ])
    .await;

    let sender = sender(port);
    let email = sender.new_email("you@example.com", "Hi", "Body");
    let (phase, cause) = delivery_failure(sender.send(email).await);

    assert_eq!(phase, Phase::Data);
    match cause {
        Cause::Smtp(err) => assert!(err.is_permanent()),
        other => panic!("unexpected cause: {other:?}"),
    }
}

#[tokio::test]
async fn test_refused_connection_is_connect_phase() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let sender = sender(port);
    let email = sender.new_email("you@example.com", "Hi", "Body");
    let (phase, cause) = delivery_failure(sender.send(email).await);

    assert_eq!(phase, Phase::Connect);
    assert!(matches!(cause, Cause::Smtp(_)));
}

#[tokio::test]
async fn test_silent_server_times_out_in_connect_phase() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let _server = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let sender = sender(port);
    let email = sender.new_email("you@example.com", "Hi", "Body");
    let started = tokio::time::Instant::now();
    let (phase, cause) = delivery_failure(sender.send(email).await);

    assert_eq!(phase, Phase::Connect);
    assert!(matches!(cause, Cause::TimedOut));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_stall_after_data_times_out_in_data_phase() {
    let (port, _server) = scripted_server(vec![EHLO, AUTH, MAIL, RCPT, DATA, (".", "")]).await;

    let sender = sender(port);
    let email = sender.new_email("you@example.com", "Hi", "Body");
    let (phase, cause) = delivery_failure(sender.send(email).await);

    assert_eq!(phase, Phase::Data);
    assert!(matches!(cause, Cause::TimedOut));
}

#[tokio::test]
async fn test_cancellation_reports_data_phase() {
    let (port, _server) = scripted_server(vec![EHLO, AUTH, MAIL, RCPT, DATA, (".", "")]).await;

    let sender = sender(port);
    let email = sender.new_email("you@example.com", "Hi", "Body");
    let signal = tokio::time::sleep(Duration::from_millis(200));
    let (phase, cause) = delivery_failure(sender.send_cancellable(email, signal).await);

    assert_eq!(phase, Phase::Data);
    assert!(matches!(cause, Cause::Cancelled));
}

#[tokio::test]
async fn test_invalid_message_fails_before_connecting() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let sender = sender(port);
    let email = sender.new_email("you@example.com", "Line\r\nBreak", "Body");
    match sender.send(email).await {
        Err(Error::Validation(err)) => assert_eq!(err.field, "subject"),
        other => panic!("expected a validation error, got {other:?}"),
    }

    let accepted = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
    assert!(accepted.is_err(), "no connection should have been made");
}
