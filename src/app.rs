//! app.rs
use std::{sync::Arc, time::Duration};

use actix_web::{error::InternalError, http::StatusCode, web};
use sqlx::{Pool, Sqlite};

use crate::{
    handlers::{
        auth_handler, campaign_handler, email_settings_handler, error_response, template_handler,
    },
    services::{
        auth_service::IdentityVerifier, campaign_service::CampaignService,
        campaign_tracker::CampaignTracker, dispatch_service::DispatchService,
        email_settings_service::EmailSettingsService, template_service::TemplateService,
        transport_service::MailConnector,
    },
};

/// Adjuntos en base64 dentro del JSON
const JSON_LIMIT: usize = 25 * 1024 * 1024;

/// Servicios compartidos por todos los workers. El tracker es el mismo
/// (Arc interno) para la tarea de envío y para las consultas de estado.
#[derive(Clone)]
pub struct AppServices {
    pub tracker: CampaignTracker,
    pub dispatch_service: DispatchService,
    pub settings_service: EmailSettingsService,
    pub template_service: TemplateService,
    pub campaign_service: CampaignService,
    pub connector: Arc<dyn MailConnector>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppServices {
    pub fn new(
        db_pool: Pool<Sqlite>,
        connector: Arc<dyn MailConnector>,
        verifier: Arc<dyn IdentityVerifier>,
        dispatch_pacing: Duration,
    ) -> Self {
        let tracker = CampaignTracker::new();
        let dispatch_service =
            DispatchService::new(tracker.clone(), connector.clone(), dispatch_pacing);

        Self {
            tracker,
            dispatch_service,
            settings_service: EmailSettingsService::new(db_pool.clone()),
            template_service: TemplateService::new(db_pool.clone()),
            campaign_service: CampaignService::new(db_pool),
            connector,
            verifier,
        }
    }
}

pub fn init_app(cfg: &mut web::ServiceConfig, services: &AppServices) {
    let json_config = web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            let resp = error_response(StatusCode::BAD_REQUEST, err.to_string());
            InternalError::from_response(err, resp).into()
        });

    cfg.app_data(json_config)
        .app_data(web::Data::new(services.tracker.clone()))
        .app_data(web::Data::new(services.dispatch_service.clone()))
        .app_data(web::Data::new(services.settings_service.clone()))
        .app_data(web::Data::new(services.template_service.clone()))
        .app_data(web::Data::new(services.campaign_service.clone()))
        .app_data(web::Data::from(services.connector.clone()))
        .app_data(web::Data::from(services.verifier.clone()))
        .route("/", web::get().to(auth_handler::root_endpoint))
        .service(
            web::scope("/api")
                .route("/test-auth", web::get().to(auth_handler::test_auth_endpoint))
                .route(
                    "/send-emails",
                    web::post().to(campaign_handler::send_emails_endpoint),
                )
                .route(
                    "/campaigns",
                    web::get().to(campaign_handler::list_campaigns_endpoint),
                )
                .route(
                    "/campaigns/{id}/status",
                    web::get().to(campaign_handler::campaign_status_endpoint),
                )
                .route(
                    "/dashboard/stats",
                    web::get().to(campaign_handler::dashboard_stats_endpoint),
                )
                .service(
                    web::scope("/templates")
                        .route("", web::get().to(template_handler::list_templates_endpoint))
                        .route("", web::post().to(template_handler::create_template_endpoint))
                        .route(
                            "/{id}",
                            web::put().to(template_handler::update_template_endpoint),
                        )
                        .route(
                            "/{id}",
                            web::delete().to(template_handler::delete_template_endpoint),
                        ),
                )
                .service(
                    web::scope("/email-settings")
                        .route(
                            "",
                            web::get().to(email_settings_handler::get_settings_endpoint),
                        )
                        .route(
                            "",
                            web::post().to(email_settings_handler::save_settings_endpoint),
                        )
                        .route(
                            "/test",
                            web::post().to(email_settings_handler::test_settings_endpoint),
                        ),
                ),
        );
}
