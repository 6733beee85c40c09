//! services/transport_service.rs
//! Sesión SMTP por campaña: una conexión autenticada (STARTTLS) que se reusa
//! para todos los envíos y se cierra al terminar, pase lo que pase.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    transport::smtp::{authentication::Credentials, Error as SmtpError, PoolConfig},
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};

use crate::{models::email_model::SenderSettings, services::composer_service::OutboundMessage};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid SMTP relay '{host}': {source}")]
    InvalidRelay { host: String, source: SmtpError },
    #[error("Could not connect/authenticate to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        source: SmtpError,
    },
    #[error("SMTP relay {host}:{port} is not answering")]
    Unavailable { host: String, port: u16 },
}

/// Resultado de un envío. `send` nunca falla: el orquestador decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// El relay rechazó este mensaje; la sesión sigue viva.
    Rejected(String),
    /// Se cayó la conexión (red, TLS, timeout); la sesión no sirve más.
    ConnectionLost(String),
}

#[async_trait]
pub trait MailSession: Send {
    async fn send(&mut self, message: &OutboundMessage) -> SendOutcome;

    /// Idempotente.
    async fn close(&mut self);
}

#[async_trait]
pub trait MailConnector: Send + Sync {
    /// Conecta, negocia STARTTLS y autentica. Un error aquí es fatal para la campaña.
    async fn open(&self, settings: &SenderSettings)
        -> Result<Box<dyn MailSession>, TransportError>;
}

#[derive(Debug, Clone)]
pub struct SmtpConnector {
    timeout: Duration,
}

impl SmtpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl MailConnector for SmtpConnector {
    async fn open(
        &self,
        settings: &SenderSettings,
    ) -> Result<Box<dyn MailSession>, TransportError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|source| TransportError::InvalidRelay {
                host: settings.host.clone(),
                source,
            })?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(self.timeout))
            // Una sola conexión por campaña
            .pool_config(PoolConfig::new().max_size(1))
            .build();

        match transport.test_connection().await {
            Ok(true) => {
                log::info!(
                    "(smtp) Sesión abierta con {}:{} como {}",
                    settings.host,
                    settings.port,
                    settings.user
                );
                Ok(Box::new(SmtpSession::new(
                    transport,
                    format!("{}:{}", settings.host, settings.port),
                )))
            }
            Ok(false) => Err(TransportError::Unavailable {
                host: settings.host.clone(),
                port: settings.port,
            }),
            Err(source) => Err(TransportError::Connect {
                host: settings.host.clone(),
                port: settings.port,
                source,
            }),
        }
    }
}

/// Al soltar el transporte lettre cierra (QUIT) la conexión del pool,
/// así que también queda cerrada si la tarea hace panic.
pub struct SmtpSession {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    relay: String,
}

impl SmtpSession {
    pub fn new(transport: AsyncSmtpTransport<Tokio1Executor>, relay: String) -> Self {
        Self {
            transport: Some(transport),
            relay,
        }
    }
}

#[async_trait]
impl MailSession for SmtpSession {
    async fn send(&mut self, message: &OutboundMessage) -> SendOutcome {
        let Some(transport) = self.transport.as_ref() else {
            return SendOutcome::ConnectionLost(format!("session to {} already closed", self.relay));
        };

        match transport.send(message.message.clone()).await {
            Ok(_) => SendOutcome::Delivered,
            // El orquestador loguea el rechazo
            Err(e) if is_recipient_level(&e) => SendOutcome::Rejected(e.to_string()),
            Err(e) => {
                log::error!(
                    "(smtp) Conexión perdida con {} enviando a {}: {}",
                    self.relay,
                    message.recipient,
                    e
                );
                SendOutcome::ConnectionLost(e.to_string())
            }
        }
    }

    async fn close(&mut self) {
        if self.transport.take().is_some() {
            log::info!("(smtp) Sesión con {} cerrada", self.relay);
        }
    }
}

/// Respuestas 4xx/5xx y errores del lado cliente afectan solo a ese mensaje.
/// Una respuesta que no se puede parsear deja el stream desincronizado.
fn is_recipient_level(e: &SmtpError) -> bool {
    e.is_permanent() || e.is_transient() || e.is_client()
}
