use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::{Audit, ParseEnumError, Pet, UserSummary};
use crate::constants::DEFAULT_MAX_PARTICIPANTS;

/// Status of one (room, user, pet) participation row.
///
/// Rejecting twice is refused, and an applicant with a rejected row can not
/// apply to the same room again. The host may still accept a rejected
/// applicant while the room has space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ParticipantStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ParticipantStatus {
    /// Stable storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => "Pending",
            ParticipantStatus::Accepted => "Accepted",
            ParticipantStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ParticipantStatus::Pending),
            "Accepted" => Ok(ParticipantStatus::Accepted),
            "Rejected" => Ok(ParticipantStatus::Rejected),
            _ => Err(ParseEnumError {
                kind: "participant status",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ParticipantStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MatchingRoom {
    pub id: i64,
    pub host_id: i64,
    pub title: String,
    pub description: String,
    pub place: String,
    pub meeting_date: NaiveDate,
    pub meeting_time: NaiveTime,
    pub max_participants: i64,
    pub image_url: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RoomParticipant {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub pet_id: i64,
    #[sqlx(try_from = "String")]
    pub status: ParticipantStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

fn default_max_participants() -> i64 {
    DEFAULT_MAX_PARTICIPANTS
}

/// Room fields submitted by a host when creating or editing a room.
///
/// `pet_ids` are the host's own pets, entered as accepted participants.
/// `image_url` is an already-stored upload; bytes never reach the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomForm {
    pub title: String,
    pub description: String,
    pub place: String,
    pub meeting_date: NaiveDate,
    pub meeting_time: NaiveTime,
    #[serde(default = "default_max_participants")]
    pub max_participants: i64,
    #[serde(default)]
    pub pet_ids: Vec<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A room together with every participation row it owns, as read inside one
/// transaction.
#[derive(Debug, Clone)]
pub struct RoomAggregate {
    pub room: MatchingRoom,
    pub participants: Vec<RoomParticipant>,
}

impl RoomAggregate {
    pub fn is_host(&self, user_id: i64) -> bool {
        self.room.host_id == user_id
    }

    pub fn rows_of(&self, user_id: i64) -> Vec<&RoomParticipant> {
        self.participants
            .iter()
            .filter(|p| p.user_id == user_id)
            .collect()
    }

    /// Distinct users holding at least one accepted row, first-seen order.
    pub fn accepted_user_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        for p in &self.participants {
            if p.status == ParticipantStatus::Accepted && !ids.contains(&p.user_id) {
                ids.push(p.user_id);
            }
        }
        ids
    }

    pub fn accepted_user_count(&self) -> i64 {
        self.accepted_user_ids().len() as i64
    }
}

/// A participation row resolved with its user and pet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantEntry {
    pub participant: RoomParticipant,
    pub user: UserSummary,
    pub pet: Pet,
}

/// One applicant and the pets they entered, used for per-user listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPets {
    pub user: UserSummary,
    pub pets: Vec<Pet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: i64, user_id: i64, status: ParticipantStatus) -> RoomParticipant {
        RoomParticipant {
            id,
            room_id: 1,
            user_id,
            pet_id: id * 10,
            status,
            audit: Audit::now(),
        }
    }

    fn aggregate(participants: Vec<RoomParticipant>) -> RoomAggregate {
        RoomAggregate {
            room: MatchingRoom {
                id: 1,
                host_id: 7,
                title: "Morning Walk".to_string(),
                description: "Loop around the lake".to_string(),
                place: "Central Park".to_string(),
                meeting_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                meeting_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
                max_participants: 4,
                image_url: None,
                audit: Audit::now(),
            },
            participants,
        }
    }

    #[test]
    fn test_status_storage_form_is_stable() {
        for status in [
            ParticipantStatus::Pending,
            ParticipantStatus::Accepted,
            ParticipantStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ParticipantStatus>().unwrap(), status);
        }
        assert!("accepted".parse::<ParticipantStatus>().is_err());
    }

    #[test]
    fn test_accepted_count_is_distinct_users() {
        let room = aggregate(vec![
            participant(1, 7, ParticipantStatus::Accepted),
            participant(2, 7, ParticipantStatus::Accepted),
            participant(3, 8, ParticipantStatus::Accepted),
            participant(4, 9, ParticipantStatus::Pending),
            participant(5, 10, ParticipantStatus::Rejected),
        ]);

        assert_eq!(room.accepted_user_ids(), vec![7, 8]);
        assert_eq!(room.accepted_user_count(), 2);
        assert_eq!(room.rows_of(7).len(), 2);
        assert!(room.rows_of(11).is_empty());
        assert!(room.is_host(7));
    }

    #[test]
    fn test_room_form_defaults() {
        let form: RoomForm = serde_json::from_str(
            r#"{
                "title": "Walk",
                "description": "Evening walk",
                "place": "Riverside",
                "meeting_date": "2025-03-01",
                "meeting_time": "18:30:00"
            }"#,
        )
        .unwrap();

        assert_eq!(form.max_participants, DEFAULT_MAX_PARTICIPANTS);
        assert!(form.pet_ids.is_empty());
        assert!(form.image_url.is_none());
    }
}
