use anyhow::Result;
use std::future::Future;

use crate::error::AppError;
use crate::models::{
    MatchingRoom, NewSchedule, ParticipantEntry, ParticipantStatus, Pet, RoomAggregate, RoomForm,
    Schedule, User,
};

/// One write decided by the workflow against a loaded [`RoomAggregate`].
/// Changes are applied in order, all inside the transaction that loaded the
/// aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomChange {
    /// Overwrite the room's scalar fields (`pet_ids` is ignored).
    UpdateDetails(RoomForm),
    /// Delete every row the user holds in the room.
    RemoveUserRows { user_id: i64 },
    /// Insert one row per pet for the user.
    InsertRows {
        user_id: i64,
        pet_ids: Vec<i64>,
        status: ParticipantStatus,
    },
    /// Move every row the user holds in the room to `status`.
    SetStatus { user_id: i64, status: ParticipantStatus },
    /// Delete the room's participant rows, then the room.
    DeleteRoom,
}

/// Persistence seen by the matching workflow and the calendar.
///
/// Reads return plain data. Every mutation of an existing room goes through
/// [`MatchingStore::modify_room`], which loads the room and its participants
/// under a lock, lets `decide` validate and plan the writes, and applies the
/// plan atomically. Nothing is written when `decide` fails.
pub trait MatchingStore: Send + Sync {
    /// Most recently created first.
    fn list_rooms(&self) -> impl Future<Output = Result<Vec<MatchingRoom>>> + Send;

    /// Case-insensitive match on title, place or a participating pet's type.
    fn search_rooms(&self, query: &str) -> impl Future<Output = Result<Vec<MatchingRoom>>> + Send;

    /// Room titles, room places and participating pet types.
    fn keyword_sources(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn get_room(&self, room_id: i64) -> impl Future<Output = Result<Option<MatchingRoom>>> + Send;

    fn find_user(&self, user_id: i64) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Known pets among `pet_ids`; unknown ids are left out.
    fn find_pets(&self, pet_ids: &[i64]) -> impl Future<Output = Result<Vec<Pet>>> + Send;

    /// Participation rows of the room in insertion order, with user and pet.
    fn participant_entries(&self, room_id: i64) -> impl Future<Output = Result<Vec<ParticipantEntry>>> + Send;

    /// Inserts the room and an accepted row per `form.pet_ids` for the host.
    fn create_room(&self, host_id: i64, form: &RoomForm) -> impl Future<Output = Result<MatchingRoom>> + Send;

    fn modify_room<F>(&self, room_id: i64, decide: F) -> impl Future<Output = Result<(), AppError>> + Send
    where
        F: FnOnce(&RoomAggregate) -> Result<Vec<RoomChange>, AppError> + Send;

    /// Writes all entries or none of them.
    fn insert_schedules(&self, entries: Vec<NewSchedule>) -> impl Future<Output = Result<Vec<Schedule>>> + Send;

    fn schedules_for_user(&self, user_id: i64) -> impl Future<Output = Result<Vec<Schedule>>> + Send;

    fn find_schedule(
        &self,
        user_id: i64,
        schedule_name: &str,
    ) -> impl Future<Output = Result<Option<Schedule>>> + Send;
}
