//! handlers/template_handler.rs
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::{
    handlers::{auth_handler::authenticate, error_response, internal_error},
    models::template_model::{SaveTemplateRequest, TemplateResponse},
    services::{auth_service::IdentityVerifier, template_service::TemplateService},
};

/// GET /api/templates
pub async fn list_templates_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    template_service: web::Data<TemplateService>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    match template_service.list(&user_id).await {
        Ok(records) => {
            let templates: Vec<TemplateResponse> =
                records.into_iter().map(|r| r.into_response()).collect();
            HttpResponse::Ok().json(json!({ "templates": templates }))
        }
        Err(e) => internal_error("Failed to fetch templates", e),
    }
}

/// POST /api/templates
pub async fn create_template_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    template_service: web::Data<TemplateService>,
    body: web::Json<SaveTemplateRequest>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };

    match template_service.create(&user_id, &body).await {
        Ok(record) => HttpResponse::Created().json(record.into_response()),
        Err(e) => internal_error("Failed to create template", e),
    }
}

/// PUT /api/templates/{id}
pub async fn update_template_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    template_service: web::Data<TemplateService>,
    path: web::Path<String>,
    body: web::Json<SaveTemplateRequest>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };
    let template_id = path.into_inner();

    match template_service.update(&user_id, &template_id, &body).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record.into_response()),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Template not found"),
        Err(e) => internal_error("Failed to update template", e),
    }
}

/// DELETE /api/templates/{id}
pub async fn delete_template_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
    template_service: web::Data<TemplateService>,
    path: web::Path<String>,
) -> HttpResponse {
    let user_id = match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => user_id,
        Err(resp) => return resp,
    };
    let template_id = path.into_inner();

    match template_service.delete(&user_id, &template_id).await {
        Ok(true) => HttpResponse::Ok().json(json!({ "message": "Template deleted successfully" })),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Template not found"),
        Err(e) => internal_error("Failed to delete template", e),
    }
}
