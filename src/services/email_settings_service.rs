//! services/email_settings_service.rs
//! Configuración SMTP por usuario (tabla `email_settings`).

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::email_model::{EmailSettingsRecord, SenderSettings};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, email_host, email_port, email_user, email_password,
           email_display_name, is_active, created_at, updated_at
    FROM email_settings
"#;

#[derive(Debug, Clone)]
pub struct EmailSettingsService {
    db_pool: Pool<Sqlite>,
}

impl EmailSettingsService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        Self { db_pool }
    }

    /// Configuración activa del usuario, si tiene.
    pub async fn get_active(&self, user_id: &str) -> Result<Option<EmailSettingsRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE user_id = ?1 AND is_active = 1");
        sqlx::query_as::<_, EmailSettingsRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to fetch email settings")
    }

    /// Es lo único que el envío de campañas necesita de la persistencia.
    pub async fn sender_settings(&self, user_id: &str) -> Result<Option<SenderSettings>> {
        Ok(self
            .get_active(user_id)
            .await?
            .map(|record| record.to_sender_settings()))
    }

    /// Crea o reemplaza la configuración del usuario.
    pub async fn upsert(
        &self,
        user_id: &str,
        settings: &SenderSettings,
    ) -> Result<EmailSettingsRecord> {
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO email_settings (
                id, user_id, email_host, email_port, email_user, email_password,
                email_display_name, is_active, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
            ON CONFLICT(user_id) DO UPDATE SET
                email_host = excluded.email_host,
                email_port = excluded.email_port,
                email_user = excluded.email_user,
                email_password = excluded.email_password,
                email_display_name = excluded.email_display_name,
                is_active = 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&settings.host)
        .bind(i64::from(settings.port))
        .bind(&settings.user)
        .bind(&settings.password)
        .bind(&settings.display_name)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Failed to save email settings")?;

        self.get_active(user_id)
            .await?
            .context("Email settings missing right after saving them")
    }
}
