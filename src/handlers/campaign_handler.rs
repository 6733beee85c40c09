//! handlers/campaign_handler.rs
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};

use crate::{
    handlers::{auth_handler::authenticate, error_response, internal_error},
    models::{
        campaign_model::{CampaignStatus, DashboardStats},
        email_model::{SendEmailsRequest, SendEmailsResponse},
    },
    services::{
        auth_service::IdentityVerifier,
        campaign_service::CampaignService,
        campaign_tracker::CampaignTracker,
        dispatch_service::{Campaign, DispatchError, DispatchService},
        email_settings_service::EmailSettingsService,
        template_service::TemplateService,
    },
};

/// POST /api/send-emails
///
/// Responde de inmediato con el `campaign_id`; el envío corre en segundo plano
/// y el resultado se consulta en `/api/campaigns/{id}/status`.
pub async fn send_emails_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    dispatch_service: web::Data<DispatchService>,
    settings_service: web::Data<EmailSettingsService>,
    campaign_service: web::Data<CampaignService>,
    body: web::Json<SendEmailsRequest>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };
    let send_req = body.into_inner();

    if let Some(contact) = send_req.first_invalid_contact() {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid email address: '{}'", contact.email),
        );
    }

    let sender = match settings_service.sender_settings(&user_id).await {
        Ok(Some(sender)) => sender,
        Ok(None) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Please configure your email settings first",
            )
        }
        Err(e) => return internal_error("Failed to fetch email settings", e),
    };

    let campaign_id = campaign_key(&user_id, send_req.campaign_id.as_deref());
    match campaign_service.exists(&campaign_id).await {
        Ok(false) => {}
        Ok(true) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                DispatchError::DuplicateCampaign(campaign_id).to_string(),
            )
        }
        Err(e) => return internal_error("Failed to look up campaign", e),
    }
    let total_contacts = send_req.contacts.len();
    let subject = send_req.template.subject.clone();

    let campaign = Campaign {
        campaign_id: campaign_id.clone(),
        owner: Some(user_id.clone()),
        contacts: send_req.contacts,
        template: send_req.template,
        sender,
        attachments: send_req.attachments,
    };

    let handle = match dispatch_service.spawn(campaign) {
        Ok(handle) => handle,
        Err(e @ (DispatchError::IncompleteSettings(_) | DispatchError::DuplicateCampaign(_))) => {
            return error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => return internal_error("Failed to start campaign", e.into()),
    };

    // Espejo en DB: best-effort, nunca afecta al tracker. Sin fila propia no
    // hay nada que actualizar al final.
    match campaign_service
        .create(&campaign_id, &user_id, &subject, total_contacts as u64)
        .await
    {
        Ok(()) => {
            let campaign_service = campaign_service.get_ref().clone();
            let owner = user_id.clone();
            tokio::spawn(async move {
                let Ok(Some(progress)) = handle.await else {
                    return;
                };
                match campaign_service.record_result(&owner, &progress).await {
                    Ok(true) => {}
                    Ok(false) => log::warn!(
                        "Campaign {} has no row for {}, final status not stored",
                        progress.campaign_id,
                        owner
                    ),
                    Err(e) => log::warn!(
                        "Could not store final status of campaign {}: {:?}",
                        progress.campaign_id,
                        e
                    ),
                }
            });
        }
        Err(e) => log::warn!("Could not store campaign {} in database: {:?}", campaign_id, e),
    }

    HttpResponse::Ok().json(SendEmailsResponse {
        message: "Email campaign started".to_string(),
        campaign_id,
        status: CampaignStatus::Pending.as_str().to_string(),
        total_contacts,
    })
}

/// Los ids que manda el cliente van prefijados con su usuario, así dos usuarios
/// pueden usar el mismo id sin pisarse. Sin id se genera uno.
fn campaign_key(user_id: &str, requested: Option<&str>) -> String {
    match requested.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("{user_id}:{id}"),
        None => format!("campaign_{}", uuid::Uuid::new_v4()),
    }
}

/// GET /api/campaigns/{id}/status
pub async fn campaign_status_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    tracker: web::Data<CampaignTracker>,
    path: web::Path<String>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };
    let campaign_id = path.into_inner();

    let Some(progress) = tracker.get(&campaign_id) else {
        return error_response(StatusCode::NOT_FOUND, "Campaign not found");
    };
    if let Some(owner) = tracker.owner_of(&campaign_id) {
        if owner != user_id {
            return error_response(StatusCode::FORBIDDEN, "Unauthorized");
        }
    }

    HttpResponse::Ok().json(progress)
}

/// GET /api/campaigns
pub async fn list_campaigns_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    campaign_service: web::Data<CampaignService>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    match campaign_service.list(&user_id).await {
        Ok(campaigns) => HttpResponse::Ok().json(serde_json::json!({ "campaigns": campaigns })),
        Err(e) => internal_error("Failed to fetch campaigns", e),
    }
}

/// GET /api/dashboard/stats
pub async fn dashboard_stats_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    campaign_service: web::Data<CampaignService>,
    template_service: web::Data<TemplateService>,
    settings_service: web::Data<EmailSettingsService>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    let stats = async {
        let (total_campaigns, total_emails_sent, total_emails_failed) =
            campaign_service.totals(&user_id).await?;
        Ok::<_, anyhow::Error>(DashboardStats {
            total_campaigns,
            total_emails_sent,
            total_emails_failed,
            recent_campaigns: campaign_service.recent(&user_id).await?,
            templates_count: template_service.count(&user_id).await?,
            has_email_settings: settings_service.get_active(&user_id).await?.is_some(),
        })
    }
    .await;

    match stats {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => internal_error("Failed to fetch dashboard stats", e),
    }
}
