use crate::models::{MatchingRoom, ParticipantStatus, RoomForm, RoomParticipant};
use anyhow::Result;
use sqlx::{PgConnection, PgExecutor};

const ROOM_COLUMNS: &str = "id, host_id, title, description, place, meeting_date, meeting_time, \
                            max_participants, image_url, created_at, updated_at";

const PARTICIPANT_COLUMNS: &str = "id, room_id, user_id, pet_id, status, created_at, updated_at";

// Room operations

/// All rooms, most recently created first.
pub async fn list_rooms<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<MatchingRoom>> {
    let rooms = sqlx::query_as::<_, MatchingRoom>(&format!(
        "SELECT {ROOM_COLUMNS} FROM matching_rooms ORDER BY id DESC"
    ))
    .fetch_all(executor)
    .await?;

    Ok(rooms)
}

/// Rooms whose title, place or any participating pet's type contains `query`
/// (case-insensitive), most recently created first.
pub async fn search_rooms<'e>(executor: impl PgExecutor<'e>, query: &str) -> Result<Vec<MatchingRoom>> {
    let pattern = format!("%{}%", escape_like(query));

    let rooms = sqlx::query_as::<_, MatchingRoom>(&format!(
        r#"
        SELECT {ROOM_COLUMNS}
        FROM matching_rooms r
        WHERE r.title ILIKE $1 ESCAPE '\'
           OR r.place ILIKE $1 ESCAPE '\'
           OR EXISTS (
                SELECT 1
                FROM room_participants rp
                JOIN pets p ON p.id = rp.pet_id
                WHERE rp.room_id = r.id AND p.pet_type ILIKE $1 ESCAPE '\'
           )
        ORDER BY r.id DESC
        "#
    ))
    .bind(pattern)
    .fetch_all(executor)
    .await?;

    Ok(rooms)
}

/// Every room title, room place and participating pet type, one string per row.
pub async fn keyword_sources<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<String>> {
    let sources = sqlx::query_scalar::<_, String>(
        r#"
        SELECT title FROM matching_rooms
        UNION ALL
        SELECT place FROM matching_rooms
        UNION ALL
        SELECT p.pet_type
        FROM room_participants rp
        JOIN pets p ON p.id = rp.pet_id
        "#
    )
    .fetch_all(executor)
    .await?;

    Ok(sources)
}

pub async fn get_room<'e>(executor: impl PgExecutor<'e>, room_id: i64) -> Result<Option<MatchingRoom>> {
    let room = sqlx::query_as::<_, MatchingRoom>(&format!(
        "SELECT {ROOM_COLUMNS} FROM matching_rooms WHERE id = $1"
    ))
    .bind(room_id)
    .fetch_optional(executor)
    .await?;

    Ok(room)
}

/// Same as [`get_room`] but takes a row lock held until the surrounding
/// transaction ends, serialising concurrent workflow changes on one room.
pub async fn lock_room(conn: &mut PgConnection, room_id: i64) -> Result<Option<MatchingRoom>> {
    let room = sqlx::query_as::<_, MatchingRoom>(&format!(
        "SELECT {ROOM_COLUMNS} FROM matching_rooms WHERE id = $1 FOR UPDATE"
    ))
    .bind(room_id)
    .fetch_optional(conn)
    .await?;

    Ok(room)
}

pub async fn insert_room<'e>(executor: impl PgExecutor<'e>, host_id: i64, form: &RoomForm) -> Result<MatchingRoom> {
    let room = sqlx::query_as::<_, MatchingRoom>(&format!(
        r#"
        INSERT INTO matching_rooms
            (host_id, title, description, place, meeting_date, meeting_time, max_participants, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ROOM_COLUMNS}
        "#
    ))
    .bind(host_id)
    .bind(&form.title)
    .bind(&form.description)
    .bind(&form.place)
    .bind(form.meeting_date)
    .bind(form.meeting_time)
    .bind(form.max_participants)
    .bind(&form.image_url)
    .fetch_one(executor)
    .await?;

    Ok(room)
}

pub async fn update_room_details<'e>(executor: impl PgExecutor<'e>, room_id: i64, form: &RoomForm) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE matching_rooms
        SET title = $2,
            description = $3,
            place = $4,
            meeting_date = $5,
            meeting_time = $6,
            max_participants = $7,
            image_url = $8,
            updated_at = NOW()
        WHERE id = $1
        "#
    )
    .bind(room_id)
    .bind(&form.title)
    .bind(&form.description)
    .bind(&form.place)
    .bind(form.meeting_date)
    .bind(form.meeting_time)
    .bind(form.max_participants)
    .bind(&form.image_url)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn delete_room<'e>(executor: impl PgExecutor<'e>, room_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM matching_rooms WHERE id = $1")
        .bind(room_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// Participant operations

/// Participation rows of a room in insertion order.
pub async fn get_participants<'e>(executor: impl PgExecutor<'e>, room_id: i64) -> Result<Vec<RoomParticipant>> {
    let participants = sqlx::query_as::<_, RoomParticipant>(&format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM room_participants WHERE room_id = $1 ORDER BY id"
    ))
    .bind(room_id)
    .fetch_all(executor)
    .await?;

    Ok(participants)
}

/// Inserts one row per pet, keeping the order of `pet_ids`.
pub async fn insert_participants<'e>(
    executor: impl PgExecutor<'e>,
    room_id: i64,
    user_id: i64,
    pet_ids: &[i64],
    status: ParticipantStatus,
) -> Result<u64> {
    if pet_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO room_participants (room_id, user_id, pet_id, status)
        SELECT $1, $2, t.pet_id, $4
        FROM UNNEST($3::BIGINT[]) WITH ORDINALITY AS t(pet_id, ord)
        ORDER BY t.ord
        "#
    )
    .bind(room_id)
    .bind(user_id)
    .bind(pet_ids)
    .bind(status.as_str())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn set_participant_status<'e>(
    executor: impl PgExecutor<'e>,
    room_id: i64,
    user_id: i64,
    status: ParticipantStatus,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE room_participants
        SET status = $3, updated_at = NOW()
        WHERE room_id = $1 AND user_id = $2
        "#
    )
    .bind(room_id)
    .bind(user_id)
    .bind(status.as_str())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_participants_of_user<'e>(executor: impl PgExecutor<'e>, room_id: i64, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM room_participants WHERE room_id = $1 AND user_id = $2")
        .bind(room_id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_participants_of_room<'e>(executor: impl PgExecutor<'e>, room_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM room_participants WHERE room_id = $1")
        .bind(room_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Escapes `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("park"), "park");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
