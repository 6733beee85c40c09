//! handlers/auth_handler.rs
use actix_web::{http::header, http::StatusCode, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::{
    handlers::error_response,
    services::auth_service::{bearer_token, AuthError, IdentityVerifier},
};

/// Resuelve el usuario del request o devuelve directamente la respuesta 401.
pub async fn authenticate(
    req: &HttpRequest,
    verifier: &dyn IdentityVerifier,
) -> Result<String, HttpResponse> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let result = match bearer_token(header_value) {
        Ok(token) => verifier.verify(token).await,
        Err(e) => Err(e),
    };

    result.map_err(|e| {
        if let AuthError::Provider(_) = e {
            log::error!("Authentication error: {}", e);
        }
        error_response(StatusCode::UNAUTHORIZED, "Invalid authentication")
    })
}

/// GET /
pub async fn root_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Bulk Email Sender API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /api/test-auth
pub async fn test_auth_endpoint(
    req: HttpRequest,
    verifier: web::Data<dyn IdentityVerifier>,
) -> HttpResponse {
    match authenticate(&req, verifier.get_ref()).await {
        Ok(user_id) => HttpResponse::Ok().json(json!({
            "message": "Authentication successful",
            "user_id": user_id
        })),
        Err(resp) => resp,
    }
}
