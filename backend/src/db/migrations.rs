use anyhow::Result;
use sqlx::PgPool;

/// Applies the embedded `backend/migrations` scripts not yet recorded in the database.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database schema is up to date");
    Ok(())
}
