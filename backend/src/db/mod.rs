pub mod connection;
pub mod migrations;
pub mod pets;
pub mod rooms;
pub mod schedules;
pub mod store;
pub mod users;

pub use connection::{get_db_pool, DatabaseConfig};
pub use store::PgStore;
