//! tests/support.rs
//! Fakes de transporte y de autenticación.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    models::{contact_model::Contact, email_model::SenderSettings},
    services::{
        auth_service::{AuthError, IdentityVerifier},
        composer_service::OutboundMessage,
        transport_service::{MailConnector, MailSession, SendOutcome, TransportError},
    },
};

pub fn sender_settings() -> SenderSettings {
    SenderSettings {
        host: "smtp.acme.test".to_string(),
        port: 587,
        user: "sender@acme.test".to_string(),
        password: "secret".to_string(),
        display_name: "Acme Sender".to_string(),
    }
}

pub fn contacts(n: usize) -> Vec<Contact> {
    (0..n)
        .map(|i| Contact::new(format!("Contact {i}"), format!("contact{i}@example.com")))
        .collect()
}

/// Conector con resultados programados por número de intento (0-based).
#[derive(Clone, Default)]
pub struct FakeConnector {
    fail_open: bool,
    panic_on: Option<usize>,
    script: HashMap<usize, SendOutcome>,
    default_outcome: Option<SendOutcome>,
    pub recipients: Arc<Mutex<Vec<String>>>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    pub fn always(mut self, outcome: SendOutcome) -> Self {
        self.default_outcome = Some(outcome);
        self
    }

    pub fn on_attempt(mut self, attempt: usize, outcome: SendOutcome) -> Self {
        self.script.insert(attempt, outcome);
        self
    }

    pub fn panic_on_attempt(mut self, attempt: usize) -> Self {
        self.panic_on = Some(attempt);
        self
    }

    pub fn recipients(&self) -> Vec<String> {
        self.recipients.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailConnector for FakeConnector {
    async fn open(
        &self,
        settings: &SenderSettings,
    ) -> Result<Box<dyn MailSession>, TransportError> {
        if self.fail_open {
            return Err(TransportError::Unavailable {
                host: settings.host.clone(),
                port: settings.port,
            });
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            attempt: 0,
            connector: self.clone(),
            closed: false,
        }))
    }
}

struct FakeSession {
    attempt: usize,
    connector: FakeConnector,
    closed: bool,
}

#[async_trait]
impl MailSession for FakeSession {
    async fn send(&mut self, message: &OutboundMessage) -> SendOutcome {
        let attempt = self.attempt;
        self.attempt += 1;
        self.connector
            .recipients
            .lock()
            .unwrap()
            .push(message.recipient.clone());

        if self.connector.panic_on == Some(attempt) {
            panic!("fake session exploded on attempt {attempt}");
        }

        self.connector
            .script
            .get(&attempt)
            .or(self.connector.default_outcome.as_ref())
            .cloned()
            .unwrap_or(SendOutcome::Delivered)
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.connector.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Cuando la sesión se suelta sin `close` (panic) también cuenta como cerrada.
impl Drop for FakeSession {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            self.connector.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// "Bearer token-<user>" -> "<user>"
pub struct FakeVerifier;

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        token
            .strip_prefix("token-")
            .filter(|user| !user.is_empty())
            .map(str::to_string)
            .ok_or(AuthError::InvalidToken)
    }
}
