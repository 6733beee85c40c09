//! models/template_model.rs
//! Plantillas: la que viaja con cada envío y la que se guarda en DB.

use serde::{Deserialize, Serialize};

use crate::models::email_model::EmailAttachment;

/// Plantilla usada por una campaña. El `body` admite `{name}`, `{email}`,
/// `{company}` y `{jobTitle}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

impl EmailTemplate {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Fila de `email_templates`. Los adjuntos se guardan como JSON.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemplateRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub attachments: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body de POST/PUT /api/templates
#[derive(Debug, Clone, Deserialize)]
pub struct SaveTemplateRequest {
    pub name: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<EmailAttachment>,
    pub created_at: String,
    pub updated_at: String,
}

impl TemplateRecord {
    pub fn into_response(self) -> TemplateResponse {
        // Una columna corrupta no debe tumbar el listado entero
        let attachments = serde_json::from_str(&self.attachments).unwrap_or_else(|e| {
            log::warn!("Adjuntos ilegibles en plantilla {}: {}", self.id, e);
            Vec::new()
        });

        TemplateResponse {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            subject: self.subject,
            body: self.body,
            attachments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
