pub mod audit;
pub mod pets;
pub mod rooms;
pub mod schedules;
pub mod users;

pub use audit::Audit;
pub use pets::{NewPet, Pet, PetView};
pub use rooms::{
    MatchingRoom, ParticipantEntry, ParticipantStatus, RoomAggregate, RoomForm, RoomParticipant,
    UserPets,
};
pub use schedules::{NewSchedule, Schedule, ScheduleStatus};
pub use users::{Gender, Identity, NewUser, User, UserSummary};

/// Raised when a stored or submitted string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
