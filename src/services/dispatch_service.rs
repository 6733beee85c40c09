//! services/dispatch_service.rs
//! Orquestador de campañas: pending -> running -> completed |
//! completed_with_errors | failed.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use crate::{
    models::{
        campaign_model::{progress_percent, CampaignProgress, CampaignStatus, CampaignUpdate},
        contact_model::Contact,
        email_model::{EmailAttachment, SenderSettings},
        template_model::EmailTemplate,
    },
    services::{
        campaign_tracker::CampaignTracker,
        composer_service,
        transport_service::{MailConnector, SendOutcome},
    },
};

/// Todo lo necesario para correr una campaña.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub campaign_id: String,
    /// Usuario que la inició, si aplica.
    pub owner: Option<String>,
    pub contacts: Vec<Contact>,
    pub template: EmailTemplate,
    pub sender: SenderSettings,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Email settings are incomplete: missing {0}")]
    IncompleteSettings(&'static str),
    #[error("Campaign {0} was already started")]
    DuplicateCampaign(String),
    #[error("Campaign {0} is not tracked")]
    Untracked(String),
}

#[derive(Clone)]
pub struct DispatchService {
    tracker: CampaignTracker,
    connector: Arc<dyn MailConnector>,
    pacing: Duration,
}

impl DispatchService {
    pub fn new(tracker: CampaignTracker, connector: Arc<dyn MailConnector>, pacing: Duration) -> Self {
        Self {
            tracker,
            connector,
            pacing,
        }
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &CampaignTracker {
        &self.tracker
    }

    /// Verifica precondiciones y registra la campaña en el tracker. Si la
    /// configuración del remitente está incompleta el tracker no se toca.
    pub fn prepare(&self, campaign: &Campaign) -> Result<(), DispatchError> {
        if let Some(field) = campaign.sender.missing_field() {
            return Err(DispatchError::IncompleteSettings(field));
        }

        let total = campaign.contacts.len() as u64;
        let created = match &campaign.owner {
            Some(owner) => self
                .tracker
                .create_owned(&campaign.campaign_id, owner, total),
            None => self.tracker.create(&campaign.campaign_id, total),
        };
        if !created {
            return Err(DispatchError::DuplicateCampaign(campaign.campaign_id.clone()));
        }
        Ok(())
    }

    /// Corre la campaña completa y devuelve el estado final.
    pub async fn start(&self, campaign: Campaign) -> Result<CampaignProgress, DispatchError> {
        self.prepare(&campaign)?;
        let campaign_id = campaign.campaign_id.clone();
        self.execute(campaign).await;
        self.tracker
            .get(&campaign_id)
            .ok_or(DispatchError::Untracked(campaign_id))
    }

    /// Registra la campaña y la corre en segundo plano. Un supervisor espera la
    /// tarea: si hace panic, la campaña igual termina en `failed`. El handle
    /// devuelve el estado final.
    pub fn spawn(
        &self,
        campaign: Campaign,
    ) -> Result<JoinHandle<Option<CampaignProgress>>, DispatchError> {
        self.prepare(&campaign)?;

        let campaign_id = campaign.campaign_id.clone();
        let worker = self.clone();
        let task = tokio::spawn(async move { worker.execute(campaign).await });

        let tracker = self.tracker.clone();
        Ok(tokio::spawn(async move {
            if let Err(e) = task.await {
                log::error!(
                    "(dispatch) La tarea de la campaña {} terminó de forma anómala: {}",
                    campaign_id,
                    e
                );
                tracker.fail(&campaign_id);
            }
            tracker.get(&campaign_id)
        }))
    }

    async fn execute(&self, campaign: Campaign) {
        let campaign_id = campaign.campaign_id.as_str();
        let total = campaign.contacts.len() as u64;

        if campaign.contacts.is_empty() {
            log::info!("(dispatch) Campaña {} sin contactos, nada que enviar", campaign_id);
            self.tracker.complete(campaign_id, 0, 0);
            return;
        }

        log::info!(
            "(dispatch) Iniciando campaña {} para {} contactos",
            campaign_id,
            total
        );
        self.tracker.update(
            campaign_id,
            CampaignUpdate {
                status: Some(CampaignStatus::Running),
                progress: Some(0.0),
                ..Default::default()
            },
        );

        let attachments = composer_service::decode_attachments(&campaign.attachments);

        let mut session = match self.connector.open(&campaign.sender).await {
            Ok(session) => session,
            Err(e) => {
                log::error!("(dispatch) Campaña {}: {}", campaign_id, e);
                self.tracker.fail(campaign_id);
                return;
            }
        };

        let mut sent = 0u64;
        let mut failed = 0u64;
        let mut connection_lost = None;

        for (index, contact) in campaign.contacts.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let outcome = match composer_service::compose(
                &campaign.template,
                contact,
                &attachments,
                &campaign.sender,
            ) {
                Ok(message) => session.send(&message).await,
                Err(e) => SendOutcome::Rejected(e.to_string()),
            };

            match outcome {
                SendOutcome::Delivered => sent += 1,
                SendOutcome::Rejected(reason) => {
                    log::warn!(
                        "(dispatch) Campaña {}: falló el envío a {}: {}",
                        campaign_id,
                        contact.email,
                        reason
                    );
                    failed += 1;
                }
                SendOutcome::ConnectionLost(reason) => {
                    failed += 1;
                    connection_lost = Some(reason);
                }
            }

            self.tracker.update(
                campaign_id,
                CampaignUpdate::counts(sent, failed, progress_percent(sent, failed, total)),
            );

            if connection_lost.is_some() {
                break;
            }
        }

        session.close().await;

        match connection_lost {
            Some(reason) => {
                log::error!(
                    "(dispatch) Campaña {} abortada tras {} de {} contactos: {}",
                    campaign_id,
                    sent + failed,
                    total,
                    reason
                );
                self.tracker.fail(campaign_id);
            }
            None if failed == 0 => self.tracker.complete(campaign_id, sent, failed),
            None => self.tracker.complete_with_errors(campaign_id, sent, failed),
        }
    }
}
