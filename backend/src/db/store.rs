use anyhow::Result;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

use crate::db::{pets, rooms, schedules, users};
use crate::error::AppError;
use crate::models::{
    MatchingRoom, NewSchedule, ParticipantEntry, ParticipantStatus, Pet, RoomAggregate, RoomForm,
    Schedule, User, UserSummary,
};
use crate::services::store::{MatchingStore, RoomChange};

/// Postgres-backed [`MatchingStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn apply_change(conn: &mut PgConnection, room_id: i64, change: RoomChange) -> Result<()> {
    match change {
        RoomChange::UpdateDetails(form) => {
            rooms::update_room_details(&mut *conn, room_id, &form).await?;
        }
        RoomChange::RemoveUserRows { user_id } => {
            let removed = rooms::delete_participants_of_user(&mut *conn, room_id, user_id).await?;
            tracing::debug!("Removed {} rows of user {} from room {}", removed, user_id, room_id);
        }
        RoomChange::InsertRows { user_id, pet_ids, status } => {
            rooms::insert_participants(&mut *conn, room_id, user_id, &pet_ids, status).await?;
        }
        RoomChange::SetStatus { user_id, status } => {
            rooms::set_participant_status(&mut *conn, room_id, user_id, status).await?;
        }
        RoomChange::DeleteRoom => {
            let removed = rooms::delete_participants_of_room(&mut *conn, room_id).await?;
            rooms::delete_room(&mut *conn, room_id).await?;
            tracing::debug!("Deleted room {} with {} participant rows", room_id, removed);
        }
    }
    Ok(())
}

impl MatchingStore for PgStore {
    async fn list_rooms(&self) -> Result<Vec<MatchingRoom>> {
        rooms::list_rooms(&self.pool).await
    }

    async fn search_rooms(&self, query: &str) -> Result<Vec<MatchingRoom>> {
        rooms::search_rooms(&self.pool, query).await
    }

    async fn keyword_sources(&self) -> Result<Vec<String>> {
        rooms::keyword_sources(&self.pool).await
    }

    async fn get_room(&self, room_id: i64) -> Result<Option<MatchingRoom>> {
        rooms::get_room(&self.pool, room_id).await
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        users::get_user_by_id(&self.pool, user_id).await
    }

    async fn find_pets(&self, pet_ids: &[i64]) -> Result<Vec<Pet>> {
        pets::get_pets_by_ids(&self.pool, pet_ids).await
    }

    async fn participant_entries(&self, room_id: i64) -> Result<Vec<ParticipantEntry>> {
        let participants = rooms::get_participants(&self.pool, room_id).await?;
        if participants.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<i64> = participants.iter().map(|p| p.user_id).collect();
        let pet_ids: Vec<i64> = participants.iter().map(|p| p.pet_id).collect();

        let user_map: HashMap<i64, UserSummary> = users::get_users_by_ids(&self.pool, &user_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();
        let pet_map: HashMap<i64, Pet> = pets::get_pets_by_ids(&self.pool, &pet_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut entries = Vec::with_capacity(participants.len());
        for participant in participants {
            let user = user_map.get(&participant.user_id).cloned().ok_or_else(|| {
                anyhow::anyhow!("participant {} references missing user {}", participant.id, participant.user_id)
            })?;
            let pet = pet_map.get(&participant.pet_id).cloned().ok_or_else(|| {
                anyhow::anyhow!("participant {} references missing pet {}", participant.id, participant.pet_id)
            })?;
            entries.push(ParticipantEntry { participant, user, pet });
        }

        Ok(entries)
    }

    async fn create_room(&self, host_id: i64, form: &RoomForm) -> Result<MatchingRoom> {
        let mut tx = self.pool.begin().await?;

        let room = rooms::insert_room(&mut *tx, host_id, form).await?;
        rooms::insert_participants(&mut *tx, room.id, host_id, &form.pet_ids, ParticipantStatus::Accepted).await?;

        tx.commit().await?;
        Ok(room)
    }

    async fn modify_room<F>(&self, room_id: i64, decide: F) -> Result<(), AppError>
    where
        F: FnOnce(&RoomAggregate) -> Result<Vec<RoomChange>, AppError> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let room = rooms::lock_room(&mut tx, room_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Matching room not found (id: {})", room_id)))?;
        let participants = rooms::get_participants(&mut *tx, room_id).await?;
        let aggregate = RoomAggregate { room, participants };

        // Dropping `tx` on an early return rolls back and releases the lock.
        let changes = decide(&aggregate)?;
        for change in changes {
            apply_change(&mut tx, room_id, change).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn insert_schedules(&self, entries: Vec<NewSchedule>) -> Result<Vec<Schedule>> {
        schedules::create_schedules(&self.pool, &entries).await
    }

    async fn schedules_for_user(&self, user_id: i64) -> Result<Vec<Schedule>> {
        schedules::get_schedules_by_user(&self.pool, user_id).await
    }

    async fn find_schedule(&self, user_id: i64, schedule_name: &str) -> Result<Option<Schedule>> {
        schedules::get_schedule_by_name(&self.pool, user_id, schedule_name).await
    }
}
