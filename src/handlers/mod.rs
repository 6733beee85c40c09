//! handlers/mod.rs
//! Handlers HTTP y utilidades comunes (auth, respuestas de error).

pub mod auth_handler;
pub mod campaign_handler;
pub mod email_settings_handler;
pub mod template_handler;

use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

/// `{"error": "..."}` con el status dado.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message.into() }))
}

pub fn internal_error(context: &str, e: anyhow::Error) -> HttpResponse {
    log::error!("{}: {:?}", context, e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
}
