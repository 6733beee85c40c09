use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Pending,
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl CampaignStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CampaignStatus::Completed | CampaignStatus::CompletedWithErrors | CampaignStatus::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Pending => "pending",
            CampaignStatus::Running => "running",
            CampaignStatus::Completed => "completed",
            CampaignStatus::CompletedWithErrors => "completed_with_errors",
            CampaignStatus::Failed => "failed",
        }
    }
}

/// Estado en memoria de una campaña. Es lo que devuelve
/// GET /api/campaigns/{id}/status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignProgress {
    pub campaign_id: String,
    pub status: CampaignStatus,
    pub total: u64,
    pub sent: u64,
    pub failed: u64,
    pub progress: f64,
    pub created_at: DateTime<Utc>,
}

impl CampaignProgress {
    pub fn new(campaign_id: impl Into<String>, total: u64) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            status: CampaignStatus::Pending,
            total,
            sent: 0,
            failed: 0,
            progress: 0.0,
            created_at: Utc::now(),
        }
    }
}

/// `(sent + failed) / total * 100`. Con `total == 0` no hay nada pendiente.
pub fn progress_percent(sent: u64, failed: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let pct = (sent + failed) as f64 / total as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

/// Merge parcial para `CampaignTracker::update`; `None` deja el campo como está.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignUpdate {
    pub sent: Option<u64>,
    pub failed: Option<u64>,
    pub status: Option<CampaignStatus>,
    pub progress: Option<f64>,
}

impl CampaignUpdate {
    pub fn status(status: CampaignStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn counts(sent: u64, failed: u64, progress: f64) -> Self {
        Self {
            sent: Some(sent),
            failed: Some(failed),
            progress: Some(progress),
            status: None,
        }
    }
}

/// Fila de `campaigns` (espejo durable del resultado final).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CampaignRecord {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub status: String,
    pub total: i64,
    pub sent: i64,
    pub failed: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_campaigns: i64,
    pub total_emails_sent: i64,
    pub total_emails_failed: i64,
    pub recent_campaigns: Vec<CampaignRecord>,
    pub templates_count: i64,
    pub has_email_settings: bool,
}
