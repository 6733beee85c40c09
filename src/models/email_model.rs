use serde::{Deserialize, Serialize};

use crate::models::{contact_model::Contact, template_model::EmailTemplate};

pub const DEFAULT_EMAIL_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_EMAIL_PORT: u16 = 587;
pub const DEFAULT_EMAIL_DISPLAY_NAME: &str = "Bulk Email Sender";

/// Adjunto tal como llega por HTTP: contenido en base64.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Adjunto ya decodificado, listo para el composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Credenciales SMTP e identidad del remitente de una campaña.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub display_name: String,
}

impl SenderSettings {
    /// Devuelve el primer campo vacío, si hay alguno.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.host.trim().is_empty() {
            Some("email_host")
        } else if self.port == 0 {
            Some("email_port")
        } else if self.user.trim().is_empty() {
            Some("email_user")
        } else if self.password.is_empty() {
            Some("email_password")
        } else if self.display_name.trim().is_empty() {
            Some("email_display_name")
        } else {
            None
        }
    }
}

/// Fila de `email_settings`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailSettingsRecord {
    pub id: String,
    pub user_id: String,
    pub email_host: String,
    pub email_port: i64,
    pub email_user: String,
    pub email_password: String,
    pub email_display_name: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl EmailSettingsRecord {
    pub fn to_sender_settings(&self) -> SenderSettings {
        SenderSettings {
            host: self.email_host.clone(),
            port: u16::try_from(self.email_port).unwrap_or(0),
            user: self.email_user.clone(),
            password: self.email_password.clone(),
            display_name: self.email_display_name.clone(),
        }
    }

    /// Nunca exponemos la contraseña.
    pub fn to_response(&self) -> EmailSettingsResponse {
        EmailSettingsResponse {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            email_host: self.email_host.clone(),
            email_port: self.email_port,
            email_user: self.email_user.clone(),
            email_display_name: self.email_display_name.clone(),
            is_active: self.is_active,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Body de POST /api/email-settings y /api/email-settings/test
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettingsRequest {
    pub email_host: Option<String>,
    pub email_port: Option<u16>,
    pub email_user: Option<String>,
    pub email_password: Option<String>,
    pub email_display_name: Option<String>,
}

impl EmailSettingsRequest {
    /// Aplica los valores por defecto. `None` si falta usuario o contraseña.
    pub fn into_sender_settings(self) -> Option<SenderSettings> {
        let user = self.email_user.filter(|u| !u.trim().is_empty())?;
        let password = self.email_password.filter(|p| !p.is_empty())?;

        Some(SenderSettings {
            host: self
                .email_host
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EMAIL_HOST.to_string()),
            port: self.email_port.unwrap_or(DEFAULT_EMAIL_PORT),
            user,
            password,
            display_name: self
                .email_display_name
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EMAIL_DISPLAY_NAME.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailSettingsResponse {
    pub id: String,
    pub user_id: String,
    pub email_host: String,
    pub email_port: i64,
    pub email_user: String,
    pub email_display_name: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Body de POST /api/send-emails
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailsRequest {
    pub contacts: Vec<Contact>,
    pub template: EmailTemplate,
    #[serde(default)]
    pub attachments: Vec<EmailAttachment>,
    /// Opcional: si no viene, se genera uno.
    #[serde(default)]
    pub campaign_id: Option<String>,
}

impl SendEmailsRequest {
    /// Primer contacto con email inválido, si hay alguno.
    pub fn first_invalid_contact(&self) -> Option<&Contact> {
        self.contacts.iter().find(|c| !c.has_valid_email())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendEmailsResponse {
    pub message: String,
    pub campaign_id: String,
    pub status: String,
    pub total_contacts: usize,
}
