use anyhow::Result;
use clap::Parser;
use petmeet::constants::WIPEABLE_TABLES;
use petmeet::db::{get_db_pool, DatabaseConfig};
use petmeet::utils::init_logging;
use sqlx::PgPool;
use std::env;
use tracing::{error, info, warn};

/// Deletes every row from the application tables of a development database.
#[derive(Debug, Parser)]
#[command(name = "wipe-tables")]
struct Args {
    /// Confirm that you want to wipe all tables (required)
    #[arg(long)]
    confirm_wipe: bool,

    /// Only print row counts, don't delete anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut db_config = DatabaseConfig::from_env()?;
    // Use DATABASE_PUBLIC_URL if available (for remote access), otherwise DATABASE_URL
    if let Ok(public_url) = env::var("DATABASE_PUBLIC_URL") {
        info!("Using DATABASE_PUBLIC_URL");
        db_config.database_url = public_url;
    }
    db_config.max_connections = 1;
    let pool = get_db_pool(&db_config).await?;

    for table in WIPEABLE_TABLES {
        info!("{}: {} rows", table, count_rows(&pool, table).await?);
    }

    if args.dry_run {
        info!("Dry run, nothing was deleted.");
        return Ok(());
    }
    if !args.confirm_wipe {
        warn!("Wipe not confirmed. Use --confirm-wipe to delete all rows.");
        return Ok(());
    }

    let deleted = wipe_tables(&pool).await?;
    info!("Deleted {} rows across {} tables", deleted, WIPEABLE_TABLES.len());

    for table in WIPEABLE_TABLES {
        let remaining = count_rows(&pool, table).await?;
        if remaining != 0 {
            error!("{} rows still remain in {}", remaining, table);
        }
    }

    Ok(())
}

async fn count_rows(pool: &PgPool, table: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Children before parents, all in one transaction.
async fn wipe_tables(pool: &PgPool) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut deleted = 0;

    for table in WIPEABLE_TABLES {
        let result = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
        info!("Wiped {} rows from {}", result.rows_affected(), table);
        deleted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(deleted)
}
