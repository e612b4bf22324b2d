use crate::models::{NewSchedule, Schedule};
use anyhow::Result;
use sqlx::{PgExecutor, PgPool};

const SCHEDULE_COLUMNS: &str = "id, user_id, schedule_name, walk_date, walk_time, walk_place, status, \
                                created_at, updated_at";

pub async fn create_schedule<'e>(executor: impl PgExecutor<'e>, entry: &NewSchedule) -> Result<Schedule> {
    let schedule = sqlx::query_as::<_, Schedule>(&format!(
        r#"
        INSERT INTO schedules (user_id, schedule_name, walk_date, walk_time, walk_place, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {SCHEDULE_COLUMNS}
        "#
    ))
    .bind(entry.user_id)
    .bind(&entry.schedule_name)
    .bind(entry.walk_date)
    .bind(entry.walk_time)
    .bind(&entry.walk_place)
    .bind(entry.status.as_str())
    .fetch_one(executor)
    .await?;

    Ok(schedule)
}

/// Writes all entries or none of them.
pub async fn create_schedules(pool: &PgPool, entries: &[NewSchedule]) -> Result<Vec<Schedule>> {
    let mut tx = pool.begin().await?;

    let mut saved = Vec::with_capacity(entries.len());
    for entry in entries {
        saved.push(create_schedule(&mut *tx, entry).await?);
    }

    tx.commit().await?;
    Ok(saved)
}

pub async fn get_schedules_by_user<'e>(executor: impl PgExecutor<'e>, user_id: i64) -> Result<Vec<Schedule>> {
    let schedules = sqlx::query_as::<_, Schedule>(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE user_id = $1 ORDER BY walk_date, walk_time, id"
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(schedules)
}

/// Oldest entry with this name for the user; names are not unique.
pub async fn get_schedule_by_name<'e>(
    executor: impl PgExecutor<'e>,
    user_id: i64,
    schedule_name: &str,
) -> Result<Option<Schedule>> {
    let schedule = sqlx::query_as::<_, Schedule>(&format!(
        r#"
        SELECT {SCHEDULE_COLUMNS}
        FROM schedules
        WHERE user_id = $1 AND schedule_name = $2
        ORDER BY id
        LIMIT 1
        "#
    ))
    .bind(user_id)
    .bind(schedule_name)
    .fetch_optional(executor)
    .await?;

    Ok(schedule)
}
