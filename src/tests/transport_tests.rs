//! tests/transport_tests.rs
//! Clasificación de errores SMTP contra un relay local con guion fijo.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_rt::test;
    use lettre::{AsyncSmtpTransport, Tokio1Executor};
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::TcpListener,
    };

    use crate::logger::init_test_logger;
    use crate::models::contact_model::Contact;
    use crate::models::template_model::EmailTemplate;
    use crate::services::composer_service::{compose, OutboundMessage};
    use crate::services::transport_service::{MailSession, SendOutcome, SmtpSession};
    use crate::tests::support::sender_settings;

    /// Relay en 127.0.0.1: saluda y responde cada línea recibida con la
    /// siguiente del guion (después, `221`).
    async fn scripted_relay(replies: Vec<&'static str>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = socket.into_split();
            let mut lines = BufReader::new(read_half).lines();
            let mut replies = replies.into_iter();

            write_half.write_all(b"220 relay.test ESMTP\r\n").await.unwrap();
            while let Ok(Some(_line)) = lines.next_line().await {
                let reply = replies.next().unwrap_or("221 bye\r\n");
                if write_half.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
        });

        port
    }

    fn session_to(port: u16) -> SmtpSession {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("127.0.0.1")
            .port(port)
            .timeout(Some(Duration::from_secs(2)))
            .build();
        SmtpSession::new(transport, format!("127.0.0.1:{port}"))
    }

    fn message() -> OutboundMessage {
        compose(
            &EmailTemplate::new("Hello", "Hi {name}"),
            &Contact::new("Ann", "ann@example.com"),
            &[],
            &sender_settings(),
        )
        .unwrap()
    }

    #[test]
    async fn unparseable_reply_ends_the_session() {
        init_test_logger();
        let port = scripted_relay(vec!["this is not smtp\r\n"]).await;
        let mut session = session_to(port);

        let outcome = session.send(&message()).await;

        assert!(
            matches!(outcome, SendOutcome::ConnectionLost(_)),
            "got {outcome:?}"
        );
        session.close().await;
    }

    #[test]
    async fn mailbox_refusal_only_rejects_that_message() {
        init_test_logger();
        let port = scripted_relay(vec![
            "250 relay.test\r\n",
            "550 5.1.1 mailbox unavailable\r\n",
        ])
        .await;
        let mut session = session_to(port);

        let outcome = session.send(&message()).await;

        assert!(
            matches!(outcome, SendOutcome::Rejected(_)),
            "got {outcome:?}"
        );
        session.close().await;
    }

    #[test]
    async fn send_after_close_is_connection_lost() {
        init_test_logger();
        let mut session = session_to(9);
        session.close().await;
        session.close().await;

        let outcome = session.send(&message()).await;

        assert!(matches!(outcome, SendOutcome::ConnectionLost(_)));
    }
}
