//! config/app_config.rs
//! Configuración global del servicio, leída de variables de entorno (.env incluido).

use std::time::Duration;

/// Configuración global, con valores por defecto
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database_path: String,
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,
    /// Pausa entre envíos dentro de una misma campaña
    pub dispatch_pacing: Duration,
    /// Timeout del cliente SMTP (connect/auth/comandos)
    pub smtp_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 5022,
            database_path: "data/bulk_mailer.db".to_string(),
            supabase_url: None,
            supabase_service_key: None,
            dispatch_pacing: Duration::from_millis(100),
            smtp_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        AppConfig {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_env("PORT").unwrap_or(defaults.port),
            database_path: std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            supabase_url: non_empty_env("SUPABASE_URL"),
            supabase_service_key: non_empty_env("SUPABASE_SERVICE_ROLE_KEY"),
            dispatch_pacing: parse_env("DISPATCH_PACING_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.dispatch_pacing),
            smtp_timeout: parse_env("SMTP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.smtp_timeout),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = non_empty_env(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Valor inválido para {}='{}', usando el valor por defecto", key, raw);
            None
        }
    }
}
