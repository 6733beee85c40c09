//! services/template_service.rs
//! CRUD de plantillas guardadas, siempre acotado al usuario dueño.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::template_model::{SaveTemplateRequest, TemplateRecord};

#[derive(Debug, Clone)]
pub struct TemplateService {
    db_pool: Pool<Sqlite>,
}

impl TemplateService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        Self { db_pool }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<TemplateRecord>> {
        sqlx::query_as::<_, TemplateRecord>(
            r#"
            SELECT id, user_id, name, subject, body, attachments, created_at, updated_at
            FROM email_templates
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to fetch templates")
    }

    pub async fn get(&self, user_id: &str, template_id: &str) -> Result<Option<TemplateRecord>> {
        sqlx::query_as::<_, TemplateRecord>(
            r#"
            SELECT id, user_id, name, subject, body, attachments, created_at, updated_at
            FROM email_templates
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(template_id)
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to fetch template")
    }

    pub async fn create(&self, user_id: &str, req: &SaveTemplateRequest) -> Result<TemplateRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let attachments =
            serde_json::to_string(&req.attachments).context("Failed to serialize attachments")?;

        sqlx::query(
            r#"
            INSERT INTO email_templates (
                id, user_id, name, subject, body, attachments, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&req.name)
        .bind(&req.subject)
        .bind(&req.body)
        .bind(&attachments)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Failed to create template")?;

        Ok(TemplateRecord {
            id,
            user_id: user_id.to_string(),
            name: req.name.clone(),
            subject: req.subject.clone(),
            body: req.body.clone(),
            attachments,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// `None` si la plantilla no existe o es de otro usuario.
    pub async fn update(
        &self,
        user_id: &str,
        template_id: &str,
        req: &SaveTemplateRequest,
    ) -> Result<Option<TemplateRecord>> {
        let now = Utc::now().to_rfc3339();
        let attachments =
            serde_json::to_string(&req.attachments).context("Failed to serialize attachments")?;

        let result = sqlx::query(
            r#"
            UPDATE email_templates
            SET name = ?1, subject = ?2, body = ?3, attachments = ?4, updated_at = ?5
            WHERE id = ?6 AND user_id = ?7
            "#,
        )
        .bind(&req.name)
        .bind(&req.subject)
        .bind(&req.body)
        .bind(&attachments)
        .bind(&now)
        .bind(template_id)
        .bind(user_id)
        .execute(&self.db_pool)
        .await
        .context("Failed to update template")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(user_id, template_id).await
    }

    /// `false` si no había nada que borrar.
    pub async fn delete(&self, user_id: &str, template_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = ?1 AND user_id = ?2")
            .bind(template_id)
            .bind(user_id)
            .execute(&self.db_pool)
            .await
            .context("Failed to delete template")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self, user_id: &str) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM email_templates WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(&self.db_pool)
                .await
                .context("Failed to count templates")?;
        Ok(count)
    }
}
