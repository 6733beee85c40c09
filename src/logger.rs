//! logger.rs
//! Logger del servicio (env_logger). Nivel por RUST_LOG, "info" si no está.

pub fn init_logger() {
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_env))
        // sqlx loguea cada query en info
        .filter_module("sqlx::query", log::LevelFilter::Warn)
        .format_timestamp_secs()
        .init();
}

/// Para tests: no falla si ya se inicializó en otro test.
#[cfg(test)]
pub fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
