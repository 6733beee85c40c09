//! services/auth_service.rs
//! Verificación del bearer token contra Supabase Auth.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No valid authorization header")]
    MissingToken,
    #[error("Invalid authentication credentials")]
    InvalidToken,
    #[error("Auth provider unavailable: {0}")]
    Provider(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Devuelve el id del usuario dueño del token.
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
}

#[derive(Clone)]
pub struct SupabaseAuthService {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseAuthService {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseAuthService {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let resp = self
            .http_client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let body_txt = resp.text().await.unwrap_or_default();
            log::error!("(auth) Supabase respondió {}: {}", status, body_txt);
            return Err(AuthError::Provider(format!("status {status}")));
        }

        let user = resp
            .json::<SupabaseUser>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;
        if user.id.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(user.id)
    }
}

/// Extrae el token de un header `Authorization: Bearer <token>`.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AuthError> {
    header_value
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}
