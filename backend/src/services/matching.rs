use crate::constants::MIN_MAX_PARTICIPANTS;
use crate::error::{AppError, AppResult};
use crate::models::{
    Identity, MatchingRoom, ParticipantEntry, ParticipantStatus, RoomAggregate, RoomForm, User,
    UserPets, UserSummary,
};
use crate::services::dto::{self, RoomDetail, RoomView};
use crate::services::keywords;
use crate::services::store::{MatchingStore, RoomChange};

/// Matching-room lifecycle and the participant approval workflow.
///
/// Stateless between calls: the caller's identity is passed into every
/// operation and all state lives in the store.
#[derive(Debug, Clone)]
pub struct MatchingService<S> {
    store: S,
}

fn room_not_found(room_id: i64) -> AppError {
    AppError::NotFound(format!("Matching room not found (id: {})", room_id))
}

fn user_not_found(user_id: i64) -> AppError {
    AppError::NotFound(format!("User not found (id: {})", user_id))
}

fn ensure_host(room: &RoomAggregate, user_id: i64, message: &str) -> AppResult<()> {
    if room.is_host(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

/// Admitting one more distinct user must keep the accepted count within capacity.
fn ensure_capacity(accepted_users: i64, max_participants: i64, message: &str) -> AppResult<()> {
    if accepted_users + 1 > max_participants {
        Err(AppError::InvalidState(message.to_string()))
    } else {
        Ok(())
    }
}

fn validate_form(form: &RoomForm) -> AppResult<()> {
    let blank = [
        ("title", &form.title),
        ("description", &form.description),
        ("place", &form.place),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty());

    if let Some((field, _)) = blank {
        return Err(AppError::Validation(format!("The {} is required", field)));
    }
    if form.max_participants < MIN_MAX_PARTICIPANTS {
        return Err(AppError::Validation(format!(
            "Max participants must be at least {}",
            MIN_MAX_PARTICIPANTS
        )));
    }
    Ok(())
}

/// Drops repeated ids, keeping the first occurrence.
fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

impl<S: MatchingStore> MatchingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // Reads

    /// All rooms, most recently created first.
    pub async fn list_rooms(&self) -> AppResult<Vec<RoomView>> {
        let rooms = self.store.list_rooms().await?;
        self.views(rooms).await
    }

    /// Rooms whose title, place or pet types mention `query`; a blank query lists everything.
    pub async fn search_rooms(&self, query: &str) -> AppResult<Vec<RoomView>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_rooms().await;
        }

        let rooms = self.store.search_rooms(query).await?;
        tracing::debug!("Search {:?} matched {} rooms", query, rooms.len());
        self.views(rooms).await
    }

    pub async fn top_keywords(&self, limit: usize) -> AppResult<Vec<String>> {
        let sources = self.store.keyword_sources().await?;
        Ok(keywords::top_keywords(&sources, limit))
    }

    pub async fn get_room(&self, room_id: i64) -> AppResult<MatchingRoom> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or_else(|| room_not_found(room_id))
    }

    pub async fn get_room_view(&self, room_id: i64) -> AppResult<RoomView> {
        let room = self.get_room(room_id).await?;
        let entries = self.store.participant_entries(room_id).await?;
        self.view(&room, &entries).await
    }

    /// Everything a room page needs, from the point of view of `viewer`.
    pub async fn room_detail(&self, room_id: i64, viewer: &Identity) -> AppResult<RoomDetail> {
        let room = self.get_room(room_id).await?;
        let entries = self.store.participant_entries(room_id).await?;

        Ok(RoomDetail {
            room: self.view(&room, &entries).await?,
            pending: dto::group_by_user(&entries, ParticipantStatus::Pending),
            accepted: dto::group_by_user(&entries, ParticipantStatus::Accepted),
            is_host: room.host_id == viewer.user_id,
            has_applied: dto::has_applied(&entries, viewer.user_id),
        })
    }

    pub async fn get_participants(&self, room_id: i64) -> AppResult<Vec<ParticipantEntry>> {
        self.get_room(room_id).await?;
        Ok(self.store.participant_entries(room_id).await?)
    }

    pub fn filter_by_status(entries: &[ParticipantEntry], status: ParticipantStatus) -> Vec<ParticipantEntry> {
        dto::filter_by_status(entries, status)
    }

    /// Distinct accepted users (host included when the host entered pets).
    pub async fn get_accepted_users(&self, room_id: i64) -> AppResult<Vec<UserSummary>> {
        let entries = self.get_participants(room_id).await?;
        Ok(dto::accepted_users(&entries))
    }

    pub async fn pending_user_pets(&self, room_id: i64) -> AppResult<Vec<UserPets>> {
        let entries = self.get_participants(room_id).await?;
        Ok(dto::group_by_user(&entries, ParticipantStatus::Pending))
    }

    pub async fn accepted_user_pets(&self, room_id: i64) -> AppResult<Vec<UserPets>> {
        let entries = self.get_participants(room_id).await?;
        Ok(dto::group_by_user(&entries, ParticipantStatus::Accepted))
    }

    pub async fn has_user_applied(&self, room_id: i64, user_id: i64) -> AppResult<bool> {
        let entries = self.get_participants(room_id).await?;
        Ok(dto::has_applied(&entries, user_id))
    }

    // Room lifecycle

    pub async fn create_room(&self, host: &Identity, mut form: RoomForm) -> AppResult<MatchingRoom> {
        validate_form(&form)?;
        form.pet_ids = dedup_ids(&form.pet_ids);
        self.ensure_user(host.user_id).await?;
        self.ensure_pets(&form.pet_ids).await?;

        let room = self.store.create_room(host.user_id, &form).await?;
        tracing::info!(
            "Created room {} for host {} with {} pets",
            room.id,
            host.user_id,
            form.pet_ids.len()
        );
        Ok(room)
    }

    /// Overwrites the room's fields and rebuilds the host's own rows from
    /// `form.pet_ids`. Rows of other users are left as they are.
    pub async fn update_room(&self, host: &Identity, room_id: i64, mut form: RoomForm) -> AppResult<()> {
        let host_id = host.user_id;

        // Non-hosts are refused before the payload is looked at
        if self.get_room(room_id).await?.host_id != host_id {
            return Err(AppError::Forbidden("Only the host can edit this room".to_string()));
        }
        validate_form(&form)?;
        form.pet_ids = dedup_ids(&form.pet_ids);
        self.ensure_pets(&form.pet_ids).await?;

        self.store
            .modify_room(room_id, move |room| {
                ensure_host(room, host_id, "Only the host can edit this room")?;

                let other_accepted = room
                    .accepted_user_ids()
                    .into_iter()
                    .filter(|id| *id != host_id)
                    .count() as i64;
                let host_counted = if form.pet_ids.is_empty() { 0 } else { 1 };
                if other_accepted + host_counted > form.max_participants {
                    return Err(AppError::InvalidState(format!(
                        "Max participants can not be lower than the {} participants already accepted",
                        other_accepted + host_counted
                    )));
                }

                let pet_ids = form.pet_ids.clone();
                Ok(vec![
                    RoomChange::UpdateDetails(form),
                    RoomChange::RemoveUserRows { user_id: host_id },
                    RoomChange::InsertRows {
                        user_id: host_id,
                        pet_ids,
                        status: ParticipantStatus::Accepted,
                    },
                ])
            })
            .await?;

        tracing::info!("Updated room {} by host {}", room_id, host_id);
        Ok(())
    }

    /// Deletes the room and every participation row it owns, atomically.
    pub async fn delete_room(&self, host: &Identity, room_id: i64) -> AppResult<()> {
        let host_id = host.user_id;
        self.store
            .modify_room(room_id, move |room| {
                ensure_host(room, host_id, "Only the host can delete this room")?;
                Ok(vec![RoomChange::DeleteRoom])
            })
            .await?;

        tracing::info!("Deleted room {} by host {}", room_id, host_id);
        Ok(())
    }

    // Applications

    /// Enters the applicant's pets as pending rows.
    ///
    /// Refused when no pet is selected, when the user already holds a row in
    /// the room in any status, or when the room is already full.
    pub async fn apply_room(&self, room_id: i64, applicant: &Identity, pet_ids: &[i64]) -> AppResult<()> {
        tracing::info!(
            "Applying for room {} as user {} with pets {:?}",
            room_id,
            applicant.user_id,
            pet_ids
        );

        if pet_ids.is_empty() {
            return Err(AppError::InvalidState(
                "Select at least one pet to apply".to_string(),
            ));
        }
        let pet_ids = dedup_ids(pet_ids);
        let user_id = self.ensure_user(applicant.user_id).await?.id;
        self.ensure_pets(&pet_ids).await?;

        self.store
            .modify_room(room_id, move |room| {
                if !room.rows_of(user_id).is_empty() {
                    return Err(AppError::InvalidState(
                        "You have already applied to this room".to_string(),
                    ));
                }

                let accepted = room.accepted_user_count();
                tracing::debug!(
                    "Room {} has {} accepted of {} max",
                    room.room.id,
                    accepted,
                    room.room.max_participants
                );
                ensure_capacity(
                    accepted,
                    room.room.max_participants,
                    "The room has reached its maximum number of participants",
                )?;

                Ok(vec![RoomChange::InsertRows {
                    user_id,
                    pet_ids,
                    status: ParticipantStatus::Pending,
                }])
            })
            .await
    }

    /// Accepts every row the user holds in the room.
    pub async fn accept_participant(&self, host: &Identity, room_id: i64, user_id: i64) -> AppResult<()> {
        self.ensure_user(user_id).await?;

        let host_id = host.user_id;
        self.store
            .modify_room(room_id, move |room| {
                ensure_host(room, host_id, "Only the host can accept participants")?;

                let rows = room.rows_of(user_id);
                if rows.is_empty() {
                    return Err(AppError::NotFound("Application not found".to_string()));
                }
                ensure_capacity(
                    room.accepted_user_count(),
                    room.room.max_participants,
                    "Accepting would exceed the maximum number of participants",
                )?;
                if rows.iter().any(|r| r.status == ParticipantStatus::Accepted) {
                    return Err(AppError::InvalidState(
                        "This application has already been accepted".to_string(),
                    ));
                }

                Ok(vec![RoomChange::SetStatus {
                    user_id,
                    status: ParticipantStatus::Accepted,
                }])
            })
            .await?;

        tracing::info!("Accepted user {} into room {}", user_id, room_id);
        Ok(())
    }

    /// Rejects every row the user holds in the room, including accepted ones.
    pub async fn reject_participant(&self, host: &Identity, room_id: i64, user_id: i64) -> AppResult<()> {
        self.ensure_user(user_id).await?;

        let host_id = host.user_id;
        self.store
            .modify_room(room_id, move |room| {
                ensure_host(room, host_id, "Only the host can reject participants")?;

                let rows = room.rows_of(user_id);
                if rows.is_empty() {
                    return Err(AppError::NotFound("Application not found".to_string()));
                }
                if rows.iter().any(|r| r.status == ParticipantStatus::Rejected) {
                    return Err(AppError::InvalidState(
                        "This application has already been rejected".to_string(),
                    ));
                }

                Ok(vec![RoomChange::SetStatus {
                    user_id,
                    status: ParticipantStatus::Rejected,
                }])
            })
            .await?;

        tracing::info!("Rejected user {} from room {}", user_id, room_id);
        Ok(())
    }

    // Helpers

    async fn ensure_user(&self, user_id: i64) -> AppResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    async fn ensure_pets(&self, pet_ids: &[i64]) -> AppResult<()> {
        if pet_ids.is_empty() {
            return Ok(());
        }

        let found = self.store.find_pets(pet_ids).await?;
        if found.len() != pet_ids.len() {
            let missing: Vec<i64> = pet_ids
                .iter()
                .copied()
                .filter(|id| !found.iter().any(|p| p.id == *id))
                .collect();
            return Err(AppError::NotFound(format!("Some pets could not be found: {:?}", missing)));
        }
        Ok(())
    }

    async fn view(&self, room: &MatchingRoom, entries: &[ParticipantEntry]) -> AppResult<RoomView> {
        let host = self.ensure_user(room.host_id).await?;
        Ok(RoomView::from_entities(room, UserSummary::from(&host), entries))
    }

    async fn views(&self, rooms: Vec<MatchingRoom>) -> AppResult<Vec<RoomView>> {
        let mut views = Vec::with_capacity(rooms.len());
        for room in rooms {
            let entries = self.store.participant_entries(room.id).await?;
            views.push(self.view(&room, &entries).await?);
        }
        Ok(views)
    }
}
