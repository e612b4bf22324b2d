use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::constants::PET_TYPE_SEPARATOR;
use crate::models::{
    MatchingRoom, ParticipantEntry, ParticipantStatus, PetView, RoomForm, UserPets, UserSummary,
};

/// A room as presented to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomView {
    pub room_id: i64,
    pub title: String,
    pub description: String,
    pub place: String,
    pub meeting_date: NaiveDate,
    pub meeting_time: NaiveTime,
    pub max_participants: i64,
    pub image_url: Option<String>,
    pub host: UserSummary,
    /// Pets the host entered into the room.
    pub host_pet_ids: Vec<i64>,
    /// Every participating pet, any status, in entry order.
    pub pets: Vec<PetView>,
    /// Distinct pet types joined with ", ".
    pub pet_type: String,
    /// Distinct users with an accepted row, host included.
    pub current_participants: i64,
}

impl RoomView {
    pub fn from_entities(room: &MatchingRoom, host: UserSummary, entries: &[ParticipantEntry]) -> Self {
        let host_pet_ids = entries
            .iter()
            .filter(|e| e.participant.user_id == room.host_id)
            .map(|e| e.pet.id)
            .collect();

        let pets: Vec<PetView> = entries.iter().map(|e| PetView::from(&e.pet)).collect();

        let mut pet_types: Vec<&str> = Vec::new();
        for pet in &pets {
            if !pet_types.contains(&pet.pet_type.as_str()) {
                pet_types.push(&pet.pet_type);
            }
        }
        let pet_type = pet_types.join(PET_TYPE_SEPARATOR);

        let current_participants = accepted_users(entries).len() as i64;

        Self {
            room_id: room.id,
            title: room.title.clone(),
            description: room.description.clone(),
            place: room.place.clone(),
            meeting_date: room.meeting_date,
            meeting_time: room.meeting_time,
            max_participants: room.max_participants,
            image_url: room.image_url.clone(),
            host,
            host_pet_ids,
            pets,
            pet_type,
            current_participants,
        }
    }
}

/// Prefills an edit form from what the room currently shows.
impl From<&RoomView> for RoomForm {
    fn from(view: &RoomView) -> Self {
        Self {
            title: view.title.clone(),
            description: view.description.clone(),
            place: view.place.clone(),
            meeting_date: view.meeting_date,
            meeting_time: view.meeting_time,
            max_participants: view.max_participants,
            pet_ids: view.host_pet_ids.clone(),
            image_url: view.image_url.clone(),
        }
    }
}

/// Room page payload: the room plus applicants grouped by status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomDetail {
    pub room: RoomView,
    pub pending: Vec<UserPets>,
    pub accepted: Vec<UserPets>,
    pub is_host: bool,
    pub has_applied: bool,
}

pub fn filter_by_status(entries: &[ParticipantEntry], status: ParticipantStatus) -> Vec<ParticipantEntry> {
    entries
        .iter()
        .filter(|e| e.participant.status == status)
        .cloned()
        .collect()
}

/// Groups the entries with `status` by user, users and pets in first-seen order.
pub fn group_by_user(entries: &[ParticipantEntry], status: ParticipantStatus) -> Vec<UserPets> {
    let mut groups: Vec<UserPets> = Vec::new();
    for entry in entries.iter().filter(|e| e.participant.status == status) {
        match groups.iter_mut().find(|g| g.user.user_id == entry.user.user_id) {
            Some(group) => group.pets.push(entry.pet.clone()),
            None => groups.push(UserPets {
                user: entry.user.clone(),
                pets: vec![entry.pet.clone()],
            }),
        }
    }
    groups
}

/// Distinct users with an accepted row, first-seen order.
pub fn accepted_users(entries: &[ParticipantEntry]) -> Vec<UserSummary> {
    group_by_user(entries, ParticipantStatus::Accepted)
        .into_iter()
        .map(|g| g.user)
        .collect()
}

/// True when the user has a pending or accepted row among `entries`.
pub fn has_applied(entries: &[ParticipantEntry], user_id: i64) -> bool {
    entries.iter().any(|e| {
        e.participant.user_id == user_id
            && matches!(
                e.participant.status,
                ParticipantStatus::Pending | ParticipantStatus::Accepted
            )
    })
}
