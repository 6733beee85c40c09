//! services/campaign_service.rs
//! Espejo durable de las campañas (tabla `campaigns`). El progreso en vivo
//! está en `CampaignTracker`; aquí solo se guarda el alta y el resultado final.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::campaign_model::{CampaignProgress, CampaignRecord, CampaignStatus};

const RECENT_CAMPAIGNS: i64 = 5;

#[derive(Debug, Clone)]
pub struct CampaignService {
    db_pool: Pool<Sqlite>,
}

impl CampaignService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        Self { db_pool }
    }

    pub async fn create(
        &self,
        campaign_id: &str,
        user_id: &str,
        subject: &str,
        total: u64,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, user_id, subject, status, total, sent, failed, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?6)
            "#,
        )
        .bind(campaign_id)
        .bind(user_id)
        .bind(subject)
        .bind(CampaignStatus::Pending.as_str())
        .bind(total as i64)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Failed to insert campaign")?;
        Ok(())
    }

    /// Si ya hay una fila con ese id (de cualquier usuario).
    pub async fn exists(&self, campaign_id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM campaigns WHERE id = ?1")
            .bind(campaign_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Failed to look up campaign")?;
        Ok(row.is_some())
    }

    /// Guarda el estado final. Solo toca la fila de `user_id`; devuelve `false`
    /// si no había fila suya con ese id.
    pub async fn record_result(&self, user_id: &str, progress: &CampaignProgress) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = ?1, sent = ?2, failed = ?3, updated_at = ?4
            WHERE id = ?5 AND user_id = ?6
            "#,
        )
        .bind(progress.status.as_str())
        .bind(progress.sent as i64)
        .bind(progress.failed as i64)
        .bind(&now)
        .bind(&progress.campaign_id)
        .bind(user_id)
        .execute(&self.db_pool)
        .await
        .context("Failed to update campaign result")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<CampaignRecord>> {
        self.list_limited(user_id, -1).await
    }

    pub async fn recent(&self, user_id: &str) -> Result<Vec<CampaignRecord>> {
        self.list_limited(user_id, RECENT_CAMPAIGNS).await
    }

    // LIMIT -1 en SQLite = sin límite
    async fn list_limited(&self, user_id: &str, limit: i64) -> Result<Vec<CampaignRecord>> {
        sqlx::query_as::<_, CampaignRecord>(
            r#"
            SELECT id, user_id, subject, status, total, sent, failed, created_at, updated_at
            FROM campaigns
            WHERE user_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to fetch campaigns")
    }

    /// (campañas, enviados, fallidos)
    pub async fn totals(&self, user_id: &str) -> Result<(i64, i64, i64)> {
        sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(sent), 0), COALESCE(SUM(failed), 0)
            FROM campaigns
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db_pool)
        .await
        .context("Failed to compute campaign totals")
    }
}
