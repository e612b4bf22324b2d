pub mod accounts;
pub mod calendar;
pub mod dto;
pub mod keywords;
pub mod matching;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use calendar::CalendarService;
pub use dto::{RoomDetail, RoomView};
pub use matching::MatchingService;
pub use store::{MatchingStore, RoomChange};
