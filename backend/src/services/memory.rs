//! In-memory [`MatchingStore`] for workflow tests.

use anyhow::{bail, Result};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::AppError;
use crate::models::{
    Audit, Gender, MatchingRoom, NewSchedule, ParticipantEntry, ParticipantStatus, Pet,
    RoomAggregate, RoomForm, RoomParticipant, Schedule, User, UserSummary,
};
use crate::services::store::{MatchingStore, RoomChange};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    pets: Vec<Pet>,
    rooms: Vec<MatchingRoom>,
    participants: Vec<RoomParticipant>,
    schedules: Vec<Schedule>,
    next_id: i64,
    fail_schedule_writes: bool,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_rows(&mut self, room_id: i64, user_id: i64, pet_ids: &[i64], status: ParticipantStatus) {
        for pet_id in pet_ids {
            let id = self.next_id();
            self.participants.push(RoomParticipant {
                id,
                room_id,
                user_id,
                pet_id: *pet_id,
                status,
                audit: Audit::now(),
            });
        }
    }

    fn apply(&mut self, room_id: i64, change: RoomChange) {
        match change {
            RoomChange::UpdateDetails(form) => {
                if let Some(room) = self.rooms.iter_mut().find(|r| r.id == room_id) {
                    room.title = form.title;
                    room.description = form.description;
                    room.place = form.place;
                    room.meeting_date = form.meeting_date;
                    room.meeting_time = form.meeting_time;
                    room.max_participants = form.max_participants;
                    room.image_url = form.image_url;
                    room.audit.touch();
                }
            }
            RoomChange::RemoveUserRows { user_id } => {
                self.participants
                    .retain(|p| !(p.room_id == room_id && p.user_id == user_id));
            }
            RoomChange::InsertRows { user_id, pet_ids, status } => {
                self.insert_rows(room_id, user_id, &pet_ids, status);
            }
            RoomChange::SetStatus { user_id, status } => {
                for p in self
                    .participants
                    .iter_mut()
                    .filter(|p| p.room_id == room_id && p.user_id == user_id)
                {
                    p.status = status;
                    p.audit.touch();
                }
            }
            RoomChange::DeleteRoom => {
                self.participants.retain(|p| p.room_id != room_id);
                self.rooms.retain(|r| r.id != room_id);
            }
        }
    }

    fn pet_types_of(&self, room_id: i64) -> impl Iterator<Item = &str> {
        self.participants
            .iter()
            .filter(move |p| p.room_id == room_id)
            .filter_map(move |p| self.pets.iter().find(|pet| pet.id == p.pet_id))
            .map(|pet| pet.pet_type.as_str())
    }
}

/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_user(&self, name: &str) -> User {
        let mut tables = self.lock();
        let user = User {
            id: tables.next_id(),
            email: format!("{}@example.com", name),
            password_hash: String::new(),
            name: name.to_string(),
            age: 30,
            gender: Gender::Female,
            address: "Seoul".to_string(),
            phone_number: "01012345678".to_string(),
            is_verified: false,
            audit: Audit::now(),
        };
        tables.users.push(user.clone());
        user
    }

    pub fn add_pet(&self, owner_id: i64, name: &str, pet_type: &str) -> Pet {
        let mut tables = self.lock();
        let pet = Pet {
            id: tables.next_id(),
            owner_id,
            name: name.to_string(),
            pet_type: pet_type.to_string(),
            age: 3,
            gender: Gender::Male,
            weight: 6.5,
            personality: "friendly".to_string(),
            is_default: false,
            profile_picture: None,
            audit: Audit::now(),
        };
        tables.pets.push(pet.clone());
        pet
    }

    pub fn participants(&self, room_id: i64) -> Vec<RoomParticipant> {
        self.lock()
            .participants
            .iter()
            .filter(|p| p.room_id == room_id)
            .cloned()
            .collect()
    }

    pub fn rows_of(&self, room_id: i64, user_id: i64) -> Vec<RoomParticipant> {
        self.participants(room_id)
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect()
    }

    pub fn schedules(&self) -> Vec<Schedule> {
        self.lock().schedules.clone()
    }

    /// Makes every following schedule write fail before anything is stored.
    pub fn fail_schedule_writes(&self) {
        self.lock().fail_schedule_writes = true;
    }
}

impl MatchingStore for MemoryStore {
    async fn list_rooms(&self) -> Result<Vec<MatchingRoom>> {
        let mut rooms = self.lock().rooms.clone();
        rooms.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rooms)
    }

    async fn search_rooms(&self, query: &str) -> Result<Vec<MatchingRoom>> {
        let needle = query.to_lowercase();
        let tables = self.lock();

        let mut rooms: Vec<MatchingRoom> = tables
            .rooms
            .iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.place.to_lowercase().contains(&needle)
                    || tables
                        .pet_types_of(r.id)
                        .any(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        rooms.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rooms)
    }

    async fn keyword_sources(&self) -> Result<Vec<String>> {
        let tables = self.lock();
        let mut sources: Vec<String> = tables.rooms.iter().map(|r| r.title.clone()).collect();
        sources.extend(tables.rooms.iter().map(|r| r.place.clone()));
        for room in &tables.rooms {
            sources.extend(tables.pet_types_of(room.id).map(str::to_string));
        }
        Ok(sources)
    }

    async fn get_room(&self, room_id: i64) -> Result<Option<MatchingRoom>> {
        Ok(self.lock().rooms.iter().find(|r| r.id == room_id).cloned())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_pets(&self, pet_ids: &[i64]) -> Result<Vec<Pet>> {
        Ok(self
            .lock()
            .pets
            .iter()
            .filter(|p| pet_ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn participant_entries(&self, room_id: i64) -> Result<Vec<ParticipantEntry>> {
        let tables = self.lock();
        let mut entries = Vec::new();
        for participant in tables.participants.iter().filter(|p| p.room_id == room_id) {
            let Some(user) = tables.users.iter().find(|u| u.id == participant.user_id) else {
                bail!("participant {} references missing user", participant.id);
            };
            let Some(pet) = tables.pets.iter().find(|p| p.id == participant.pet_id) else {
                bail!("participant {} references missing pet", participant.id);
            };
            entries.push(ParticipantEntry {
                participant: participant.clone(),
                user: UserSummary::from(user),
                pet: pet.clone(),
            });
        }
        Ok(entries)
    }

    async fn create_room(&self, host_id: i64, form: &RoomForm) -> Result<MatchingRoom> {
        let mut tables = self.lock();
        let room = MatchingRoom {
            id: tables.next_id(),
            host_id,
            title: form.title.clone(),
            description: form.description.clone(),
            place: form.place.clone(),
            meeting_date: form.meeting_date,
            meeting_time: form.meeting_time,
            max_participants: form.max_participants,
            image_url: form.image_url.clone(),
            audit: Audit::now(),
        };
        tables.rooms.push(room.clone());
        tables.insert_rows(room.id, host_id, &form.pet_ids, ParticipantStatus::Accepted);
        Ok(room)
    }

    async fn modify_room<F>(&self, room_id: i64, decide: F) -> Result<(), AppError>
    where
        F: FnOnce(&RoomAggregate) -> Result<Vec<RoomChange>, AppError> + Send,
    {
        let mut tables = self.lock();
        let room = tables
            .rooms
            .iter()
            .find(|r| r.id == room_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Matching room not found (id: {})", room_id)))?;
        let participants = tables
            .participants
            .iter()
            .filter(|p| p.room_id == room_id)
            .cloned()
            .collect();

        let changes = decide(&RoomAggregate { room, participants })?;
        for change in changes {
            tables.apply(room_id, change);
        }
        Ok(())
    }

    async fn insert_schedules(&self, entries: Vec<NewSchedule>) -> Result<Vec<Schedule>> {
        let mut tables = self.lock();
        if tables.fail_schedule_writes {
            bail!("schedule storage unavailable");
        }

        let mut saved = Vec::with_capacity(entries.len());
        for entry in entries {
            saved.push(Schedule {
                id: tables.next_id(),
                user_id: entry.user_id,
                schedule_name: entry.schedule_name,
                walk_date: entry.walk_date,
                walk_time: entry.walk_time,
                walk_place: entry.walk_place,
                status: entry.status,
                audit: Audit::now(),
            });
        }
        tables.schedules.extend(saved.iter().cloned());
        Ok(saved)
    }

    async fn schedules_for_user(&self, user_id: i64) -> Result<Vec<Schedule>> {
        let mut schedules: Vec<Schedule> = self
            .lock()
            .schedules
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        schedules.sort_by_key(|s| (s.walk_date, s.walk_time, s.id));
        Ok(schedules)
    }

    async fn find_schedule(&self, user_id: i64, schedule_name: &str) -> Result<Option<Schedule>> {
        Ok(self
            .lock()
            .schedules
            .iter()
            .find(|s| s.user_id == user_id && s.schedule_name == schedule_name)
            .cloned())
    }
}
