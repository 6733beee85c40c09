use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;

use crate::app::AppServices;
use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::auth_service::{IdentityVerifier, SupabaseAuthService};
use crate::services::transport_service::{MailConnector, SmtpConnector};

mod app;
mod config;
mod database;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env();

    let (Some(supabase_url), Some(supabase_key)) = (
        config.supabase_url.as_deref(),
        config.supabase_service_key.as_deref(),
    ) else {
        anyhow::bail!("SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY must be set");
    };
    let verifier: Arc<dyn IdentityVerifier> =
        Arc::new(SupabaseAuthService::new(supabase_url, supabase_key));

    let db_pool = database::setup_database(&config.database_path).await?;

    let connector: Arc<dyn MailConnector> = Arc::new(SmtpConnector::new(config.smtp_timeout));
    let services = AppServices::new(db_pool, connector, verifier, config.dispatch_pacing);

    log::info!("Levantando servidor en {}:{}", config.bind_addr, config.port);
    HttpServer::new(move || App::new().configure(|cfg| app::init_app(cfg, &services)))
        .bind((config.bind_addr.as_str(), config.port))
        .context("No se pudo abrir el puerto")?
        .run()
        .await
        .context("El servidor terminó con error")
}
