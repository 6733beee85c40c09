//! database.rs
//! Pool SQLite y migraciones.

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

pub async fn setup_database(database_path: &str) -> Result<Pool<Sqlite>> {
    let db_path = std::env::current_dir()
        .context("No se pudo obtener el current_dir")?
        .join(database_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("No se pudo crear directorio {:?}", parent))?;
    }

    log::info!("Conectando a SQLite en {}", db_path.to_string_lossy());

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let db_pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    run_migrations(&db_pool).await?;
    Ok(db_pool)
}

pub async fn run_migrations(db_pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(db_pool)
        .await
        .context("Failed to run migrations")?;
    Ok(())
}

/// Base en memoria para tests; una sola conexión para que todas vean las mismas tablas.
#[cfg(test)]
pub async fn memory_database() -> Result<Pool<Sqlite>> {
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&db_pool).await?;
    Ok(db_pool)
}
