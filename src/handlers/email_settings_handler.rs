//! handlers/email_settings_handler.rs
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::{
    handlers::{auth_handler::authenticate, error_response, internal_error},
    models::{
        contact_model::Contact, email_model::EmailSettingsRequest, template_model::EmailTemplate,
    },
    services::{
        auth_service::IdentityVerifier,
        composer_service,
        email_settings_service::EmailSettingsService,
        transport_service::{MailConnector, SendOutcome},
    },
};

const TEST_SUBJECT: &str = "Email Settings Test";
const TEST_BODY: &str =
    "This is a test email to verify your email settings are working correctly.";

/// GET /api/email-settings
pub async fn get_settings_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    settings_service: web::Data<EmailSettingsService>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    match settings_service.get_active(&user_id).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record.to_response()),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No email settings found"),
        Err(e) => internal_error("Failed to fetch email settings", e),
    }
}

/// POST /api/email-settings
pub async fn save_settings_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    settings_service: web::Data<EmailSettingsService>,
    body: web::Json<EmailSettingsRequest>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    let Some(settings) = body.into_inner().into_sender_settings() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Email user and password are required",
        );
    };

    match settings_service.upsert(&user_id, &settings).await {
        Ok(record) => HttpResponse::Ok().json(record.to_response()),
        Err(e) => internal_error("Failed to save email settings", e),
    }
}

/// POST /api/email-settings/test
///
/// Abre una sesión con la configuración recibida y se manda un correo a sí mismo.
pub async fn test_settings_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    connector: web::Data<dyn MailConnector>,
    body: web::Json<EmailSettingsRequest>,
) -> HttpResponse {
    if let Err(resp) = authenticate(&req, verifier.get_ref()).await {
        return resp;
    }

    let Some(settings) = body.into_inner().into_sender_settings() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Email user and password are required",
        );
    };

    let template = EmailTemplate::new(TEST_SUBJECT, TEST_BODY);
    let myself = Contact::new(settings.display_name.clone(), settings.user.clone());
    let message = match composer_service::compose(&template, &myself, &[], &settings) {
        Ok(message) => message,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Email settings test failed: {e}"),
            )
        }
    };

    let mut session = match connector.open(&settings).await {
        Ok(session) => session,
        Err(e) => {
            log::error!("Email settings test failed: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Email settings test failed: {e}"),
            );
        }
    };
    let outcome = session.send(&message).await;
    session.close().await;

    match outcome {
        SendOutcome::Delivered => {
            HttpResponse::Ok().json(json!({ "message": "Email settings test successful" }))
        }
        SendOutcome::Rejected(reason) | SendOutcome::ConnectionLost(reason) => error_response(
            StatusCode::BAD_REQUEST,
            format!("Email settings test failed: {reason}"),
        ),
    }
}
