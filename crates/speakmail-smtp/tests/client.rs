//! Integration tests for the SMTP client.
//!
//! Each test runs a scripted server on a loopback socket and drives the
//! client through a real TCP connection.

#![allow(clippy::unwrap_used)]

use speakmail_smtp::connection::connect;
use speakmail_smtp::{Address, Client, Error, SmtpConnection};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Expected client line prefix and the reply to send back.
///
/// An expected prefix of `"."` reads message data up to the terminating
/// dot line before replying.
type Step = (&'static str, &'static str);

/// Starts a server that greets, then plays `steps` in order.
///
/// Resolves to every line the client sent. The connection closes once the
/// script is exhausted.
async fn scripted_server(
    greeting: &'static str,
    steps: Vec<Step>,
) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut received = Vec::new();

        write.write_all(greeting.as_bytes()).await.unwrap();
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
                let line = lines.next_line().await.unwrap().unwrap_or_default();
                assert!(line.starts_with(expect), "expected {expect:?}, got {line:?}");
                received.push(line);
            }
            write.write_all(reply.as_bytes()).await.unwrap();
        }
        received
    });

    (port, handle)
}

const EHLO_REPLY: &str =
    "250-mock.test greets you\r\n250-8BITMIME\r\n250-SIZE 1000\r\n250 AUTH PLAIN LOGIN\r\n";

#[tokio::test]
async fn test_full_transaction() {
    let (port, server) = scripted_server(
        "220 mock.test ESMTP\r\n",
        vec![
            ("EHLO localhost", EHLO_REPLY),
            ("AUTH PLAIN ", "235 2.7.0 Accepted\r\n"),
            ("MAIL FROM:", "250 OK\r\n"),
            ("RCPT TO:", "250 OK\r\n"),
            ("DATA", "354 Go ahead\r\n"),
            (".", "250 2.0.0 Queued\r\n"),
            ("QUIT", "221 Bye\r\n"),
        ],
    )
    .await;

    let message = b"Subject: hi\r\n\r\n.leading dot\nbare lf\r\n";

    let client = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap();
    assert_eq!(client.server_info().hostname, "mock.test");

    let client = client.ehlo("localhost").await.unwrap();
    assert!(client.server_info().supports_8bitmime());
    assert_eq!(client.server_info().max_message_size(), Some(1000));

    let client = client.auth_plain("user", "pass").await.unwrap();
    let client = client
        .mail_from(Address::new("me@example.com").unwrap(), Some(message.len()))
        .await
        .unwrap();
    let client = client
        .rcpt_to(Address::new("you@example.com").unwrap())
        .await
        .unwrap();
    let client = client.data().await.unwrap();
    let client = client.send_message(message).await.unwrap();
    client.quit().await.unwrap();

    let received = server.await.unwrap();
    assert_eq!(received[1], "AUTH PLAIN AHVzZXIAcGFzcw==");
    assert_eq!(
        received[2],
        format!(
            "MAIL FROM:<me@example.com> BODY=8BITMIME SIZE={}",
            message.len()
        )
    );
    assert_eq!(received[3], "RCPT TO:<you@example.com>");
    assert_eq!(
        received[5..10],
        ["Subject: hi", "", "..leading dot", "bare lf", "."]
    );
    assert_eq!(received[10], "QUIT");
}

#[tokio::test]
async fn test_plain_server_gets_bare_mail_from() {
    let (port, server) = scripted_server(
        "220 mock.test\r\n",
        vec![
            ("EHLO", "250 mock.test\r\n"),
            ("AUTH PLAIN", "235 OK\r\n"),
            ("MAIL FROM:", "250 OK\r\n"),
        ],
    )
    .await;

    let client = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap();
    let client = client.ehlo("localhost").await.unwrap();
    assert!(client.server_info().auth_mechanisms().is_empty());
    let client = client.auth_plain("user", "pass").await.unwrap();
    client
        .mail_from(Address::new("me@example.com").unwrap(), Some(42))
        .await
        .unwrap();

    let received = server.await.unwrap();
    assert_eq!(received[2], "MAIL FROM:<me@example.com>");
}

#[tokio::test]
async fn test_auth_plain_continuation() {
    let (port, server) = scripted_server(
        "220 mock.test\r\n",
        vec![
            ("EHLO", EHLO_REPLY),
            ("AUTH PLAIN", "334 \r\n"),
            ("AHVzZXIAcGFzcw==", "235 OK\r\n"),
        ],
    )
    .await;

    let client = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap();
    let client = client.ehlo("localhost").await.unwrap();
    client.auth_plain("user", "pass").await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_auth_rejected() {
    let (port, _server) = scripted_server(
        "220 mock.test\r\n",
        vec![
            ("EHLO", EHLO_REPLY),
            ("AUTH PLAIN", "535 5.7.8 Bad credentials\r\n"),
        ],
    )
    .await;

    let client = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap();
    let client = client.ehlo("localhost").await.unwrap();
    let err = client.auth_plain("user", "wrong").await.unwrap_err();
    assert_eq!(err.reply_code(), Some(535));
    assert!(err.is_permanent());
}

#[tokio::test]
async fn test_auth_plain_not_offered() {
    let (port, _server) = scripted_server(
        "220 mock.test\r\n",
        vec![("EHLO", "250-mock.test\r\n250 AUTH LOGIN\r\n")],
    )
    .await;

    let client = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap();
    let client = client.ehlo("localhost").await.unwrap();
    let err = client.auth_plain("user", "pass").await.unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
}

#[tokio::test]
async fn test_recipient_rejected() {
    let (port, _server) = scripted_server(
        "220 mock.test\r\n",
        vec![
            ("EHLO", EHLO_REPLY),
            ("AUTH PLAIN", "235 OK\r\n"),
            ("MAIL FROM:", "250 OK\r\n"),
            ("RCPT TO:", "550 5.1.1 No such user\r\n"),
        ],
    )
    .await;

    let client = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap();
    let client = client.ehlo("localhost").await.unwrap();
    let client = client.auth_plain("user", "pass").await.unwrap();
    let client = client
        .mail_from(Address::new("me@example.com").unwrap(), None)
        .await
        .unwrap();
    let err = client
        .rcpt_to(Address::new("nobody@example.com").unwrap())
        .await
        .unwrap_err();

    match err {
        Error::SmtpError { code, message } => {
            assert_eq!(code, 550);
            assert!(message.contains("No such user"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_message_too_large_checked_before_sending() {
    let (port, server) = scripted_server(
        "220 mock.test\r\n",
        vec![("EHLO", EHLO_REPLY), ("AUTH PLAIN", "235 OK\r\n")],
    )
    .await;

    let client = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap();
    let client = client.ehlo("localhost").await.unwrap();
    let client = client.auth_plain("user", "pass").await.unwrap();
    let err = client
        .mail_from(Address::new("me@example.com").unwrap(), Some(5000))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::MessageTooLarge {
            size: 5000,
            limit: 1000
        }
    ));
    assert_eq!(server.await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_greeting_rejected() {
    let (port, _server) = scripted_server("554 No service\r\n", vec![]).await;

    let err = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.reply_code(), Some(554));
}

#[tokio::test]
async fn test_server_hangs_up() {
    let (port, _server) = scripted_server("220 mock.test\r\n", vec![("EHLO", "")]).await;

    let client = Client::from_stream(connect("127.0.0.1", port).await.unwrap())
        .await
        .unwrap();
    let err = client.ehlo("localhost").await.unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed));
}
