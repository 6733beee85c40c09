//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod auth_service;
pub mod campaign_service;
pub mod campaign_tracker;
pub mod composer_service;
pub mod dispatch_service;
pub mod email_settings_service;
pub mod personalization_service;
pub mod template_service;
pub mod transport_service;
