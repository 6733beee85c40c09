//! services/campaign_tracker.rs
//! Tabla en memoria campaign_id -> progreso. Un escritor (la tarea de envío)
//! y cualquier cantidad de lectores (consultas de estado).
//!
//! No hay desalojo: las entradas viven hasta que el proceso reinicia.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::models::campaign_model::{CampaignProgress, CampaignStatus, CampaignUpdate};

#[derive(Debug, Clone)]
struct TrackedCampaign {
    owner: Option<String>,
    progress: CampaignProgress,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignTracker {
    campaigns: Arc<RwLock<HashMap<String, TrackedCampaign>>>,
}

impl CampaignTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crea la entrada en `pending`. Si el id ya existe no hace nada y devuelve `false`.
    pub fn create(&self, campaign_id: &str, total: u64) -> bool {
        self.insert(campaign_id, None, total)
    }

    /// Igual que `create`, registrando además el usuario dueño de la campaña.
    pub fn create_owned(&self, campaign_id: &str, owner: &str, total: u64) -> bool {
        self.insert(campaign_id, Some(owner.to_string()), total)
    }

    fn insert(&self, campaign_id: &str, owner: Option<String>, total: u64) -> bool {
        let mut campaigns = self.write();
        if campaigns.contains_key(campaign_id) {
            log::warn!("Campaign {} already tracked, create ignored", campaign_id);
            return false;
        }
        campaigns.insert(
            campaign_id.to_string(),
            TrackedCampaign {
                owner,
                progress: CampaignProgress::new(campaign_id, total),
            },
        );
        log::info!("Created campaign {} with {} emails", campaign_id, total);
        true
    }

    /// Merge parcial. Ignora ids desconocidos y campañas ya terminadas; una
    /// actualización que rompa `sent + failed <= total` o baje un contador se
    /// descarta completa.
    pub fn update(&self, campaign_id: &str, update: CampaignUpdate) {
        let mut campaigns = self.write();
        let Some(entry) = campaigns.get_mut(campaign_id) else {
            log::debug!("update on unknown campaign {}", campaign_id);
            return;
        };
        let current = &mut entry.progress;

        if current.status.is_terminal() {
            log::warn!(
                "Campaign {} is already {}, update ignored",
                campaign_id,
                current.status.as_str()
            );
            return;
        }

        let sent = update.sent.unwrap_or(current.sent);
        let failed = update.failed.unwrap_or(current.failed);
        if sent < current.sent || failed < current.failed || sent + failed > current.total {
            log::warn!(
                "Campaign {}: rejected update sent={} failed={} (current sent={} failed={} total={})",
                campaign_id,
                sent,
                failed,
                current.sent,
                current.failed,
                current.total
            );
            return;
        }

        current.sent = sent;
        current.failed = failed;
        if let Some(progress) = update.progress {
            // Nunca retrocede
            current.progress = progress.clamp(0.0, 100.0).max(current.progress);
        }
        if let Some(status) = update.status {
            current.status = status;
        }

        log::debug!("Updated campaign {}: {:?}", campaign_id, current);
    }

    /// Cierre normal: `completed`, progreso 100 y los contadores finales
    /// sobrescriben lo que hubiera.
    pub fn complete(&self, campaign_id: &str, sent: u64, failed: u64) {
        self.finish(campaign_id, CampaignStatus::Completed, sent, failed);
    }

    /// Cierre con fallos parciales: `completed_with_errors`, progreso 100.
    pub fn complete_with_errors(&self, campaign_id: &str, sent: u64, failed: u64) {
        self.finish(campaign_id, CampaignStatus::CompletedWithErrors, sent, failed);
    }

    fn finish(&self, campaign_id: &str, status: CampaignStatus, sent: u64, failed: u64) {
        let mut campaigns = self.write();
        let Some(entry) = campaigns.get_mut(campaign_id) else {
            return;
        };
        let current = &mut entry.progress;
        if current.status.is_terminal() {
            log::warn!(
                "Campaign {} is already {}, {} ignored",
                campaign_id,
                current.status.as_str(),
                status.as_str()
            );
            return;
        }

        let sent = sent.min(current.total);
        current.sent = sent;
        current.failed = failed.min(current.total - sent);
        current.progress = 100.0;
        current.status = status;

        log::info!(
            "Campaign {} {}: {} sent, {} failed",
            campaign_id,
            status.as_str(),
            current.sent,
            current.failed
        );
    }

    /// Error fatal: `failed`, conservando contadores y progreso alcanzados.
    pub fn fail(&self, campaign_id: &str) {
        let mut campaigns = self.write();
        let Some(entry) = campaigns.get_mut(campaign_id) else {
            return;
        };
        let current = &mut entry.progress;
        if current.status.is_terminal() {
            return;
        }
        current.status = CampaignStatus::Failed;
        log::error!(
            "Campaign {} failed at {:.1}% ({} sent, {} failed)",
            campaign_id,
            current.progress,
            current.sent,
            current.failed
        );
    }

    pub fn get(&self, campaign_id: &str) -> Option<CampaignProgress> {
        self.read().get(campaign_id).map(|c| c.progress.clone())
    }

    pub fn owner_of(&self, campaign_id: &str) -> Option<String> {
        self.read().get(campaign_id).and_then(|c| c.owner.clone())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Ninguna operación deja el mapa a medio escribir, así que un lock
    // envenenado se puede seguir usando.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, TrackedCampaign>> {
        self.campaigns.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, TrackedCampaign>> {
        self.campaigns.write().unwrap_or_else(PoisonError::into_inner)
    }
}
