pub mod pets;
pub mod rooms;
pub mod schedules;
pub mod session;
pub mod users;

use sqlx::PgPool;

use crate::db::PgStore;
use crate::services::{CalendarService, MatchingService};
use crate::utils::Config;

/// Shared by every handler; all members are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub matching: MatchingService<PgStore>,
    pub calendar: CalendarService<PgStore>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let matching = MatchingService::new(PgStore::new(pool.clone()));
        Self {
            calendar: CalendarService::new(matching.clone()),
            matching,
            pool,
            config,
        }
    }
}

pub use pets::{create_pet, get_pet, list_pets};
pub use rooms::{
    accept_participant, apply_room, create_room, delete_room, get_room, list_participants,
    list_rooms, reject_participant, top_keywords, update_room,
};
pub use schedules::{confirm_schedule, list_schedules};
pub use users::{login, logout, me, register};
