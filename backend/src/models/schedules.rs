use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::{Audit, ParseEnumError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum ScheduleStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "SCHEDULED",
            ScheduleStatus::Completed => "COMPLETED",
            ScheduleStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(ScheduleStatus::Scheduled),
            "COMPLETED" => Ok(ScheduleStatus::Completed),
            "CANCELLED" => Ok(ScheduleStatus::Cancelled),
            _ => Err(ParseEnumError {
                kind: "schedule status",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ScheduleStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A calendar entry materialised when a host confirms a meetup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: i64,
    pub user_id: i64,
    pub schedule_name: String,
    pub walk_date: NaiveDate,
    pub walk_time: NaiveTime,
    pub walk_place: String,
    #[sqlx(try_from = "String")]
    pub status: ScheduleStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub user_id: i64,
    pub schedule_name: String,
    pub walk_date: NaiveDate,
    pub walk_time: NaiveTime,
    pub walk_place: String,
    pub status: ScheduleStatus,
}
