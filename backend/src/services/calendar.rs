use crate::error::{AppError, AppResult};
use crate::models::{Identity, MatchingRoom, NewSchedule, Schedule, ScheduleStatus, UserSummary};
use crate::services::matching::MatchingService;
use crate::services::store::MatchingStore;

/// Turns a confirmed room into calendar entries for everyone attending.
#[derive(Debug, Clone)]
pub struct CalendarService<S> {
    matching: MatchingService<S>,
}

/// One entry for the host, then one per other accepted user. The host is
/// listed once even when they entered pets of their own.
pub fn schedule_entries(room: &MatchingRoom, accepted: &[UserSummary]) -> Vec<NewSchedule> {
    let attendees = std::iter::once(room.host_id).chain(
        accepted
            .iter()
            .map(|u| u.user_id)
            .filter(|id| *id != room.host_id),
    );

    attendees
        .map(|user_id| NewSchedule {
            user_id,
            schedule_name: room.title.clone(),
            walk_date: room.meeting_date,
            walk_time: room.meeting_time,
            walk_place: room.place.clone(),
            status: ScheduleStatus::Scheduled,
        })
        .collect()
}

impl<S: MatchingStore> CalendarService<S> {
    pub fn new(matching: MatchingService<S>) -> Self {
        Self { matching }
    }

    /// Writes the entries for `room_id` in one go. The attendee list is read
    /// at call time, so confirming twice writes a second set of entries.
    pub async fn confirm_schedule(&self, host: &Identity, room_id: i64) -> AppResult<Vec<Schedule>> {
        let room = self.matching.get_room(room_id).await?;
        if room.host_id != host.user_id {
            return Err(AppError::Forbidden(
                "Only the host can confirm this meetup".to_string(),
            ));
        }

        let accepted = self.matching.get_accepted_users(room_id).await?;
        let entries = schedule_entries(&room, &accepted);
        tracing::info!(
            "Confirming room {} for {} attendees",
            room_id,
            entries.len()
        );

        let saved = self
            .matching
            .store()
            .insert_schedules(entries)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save schedules for room {}: {:#}", room_id, e);
                AppError::Internal(e)
            })?;
        Ok(saved)
    }

    pub async fn schedules_for(&self, user: &Identity) -> AppResult<Vec<Schedule>> {
        Ok(self.matching.store().schedules_for_user(user.user_id).await?)
    }

    pub async fn find_schedule(&self, user: &Identity, schedule_name: &str) -> AppResult<Schedule> {
        self.matching
            .store()
            .find_schedule(user.user_id, schedule_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule not found: {}", schedule_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomForm;
    use crate::services::memory::MemoryStore;
    use chrono::{NaiveDate, NaiveTime};

    struct Fixture {
        store: MemoryStore,
        matching: MatchingService<MemoryStore>,
        calendar: CalendarService<MemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::default();
        let matching = MatchingService::new(store.clone());
        Fixture {
            calendar: CalendarService::new(matching.clone()),
            matching,
            store,
        }
    }

    fn walk(pet_ids: Vec<i64>) -> RoomForm {
        RoomForm {
            title: "Saturday Walk".to_string(),
            description: "Meet at the fountain".to_string(),
            place: "Han River Park".to_string(),
            meeting_date: NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
            meeting_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            max_participants: 4,
            pet_ids,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_confirm_creates_entry_per_attendee() {
        let fx = fixture();
        let host = fx.store.add_user("host");
        let host_pet = fx.store.add_pet(host.id, "Bori", "Dog");
        let host = Identity::new(host.id);
        let room = fx.matching.create_room(&host, walk(vec![host_pet.id])).await.unwrap();

        let mut accepted = Vec::new();
        for name in ["amy", "ben"] {
            let user = fx.store.add_user(name);
            let pet = fx.store.add_pet(user.id, name, "Dog");
            let guest = Identity::new(user.id);
            fx.matching.apply_room(room.id, &guest, &[pet.id]).await.unwrap();
            fx.matching.accept_participant(&host, room.id, user.id).await.unwrap();
            accepted.push(user.id);
        }
        let pending = fx.store.add_user("cho");
        let pending_pet = fx.store.add_pet(pending.id, "cho", "Cat");
        fx.matching
            .apply_room(room.id, &Identity::new(pending.id), &[pending_pet.id])
            .await
            .unwrap();

        let saved = fx.calendar.confirm_schedule(&host, room.id).await.unwrap();

        let users: Vec<i64> = saved.iter().map(|s| s.user_id).collect();
        assert_eq!(users, vec![host.user_id, accepted[0], accepted[1]]);
        for entry in &saved {
            assert_eq!(entry.schedule_name, "Saturday Walk");
            assert_eq!(entry.walk_place, "Han River Park");
            assert_eq!(entry.walk_date, NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
            assert_eq!(entry.status, ScheduleStatus::Scheduled);
        }

        let found = fx
            .calendar
            .find_schedule(&Identity::new(accepted[1]), "Saturday Walk")
            .await
            .unwrap();
        assert_eq!(found.walk_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert!(fx.calendar.schedules_for(&Identity::new(pending.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_host_without_pets_still_gets_entry() {
        let fx = fixture();
        let host = Identity::new(fx.store.add_user("host").id);
        let room = fx.matching.create_room(&host, walk(Vec::new())).await.unwrap();

        let saved = fx.calendar.confirm_schedule(&host, room.id).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].user_id, host.user_id);
    }

    #[tokio::test]
    async fn test_confirm_is_host_only() {
        let fx = fixture();
        let host = Identity::new(fx.store.add_user("host").id);
        let other = Identity::new(fx.store.add_user("amy").id);
        let room = fx.matching.create_room(&host, walk(Vec::new())).await.unwrap();

        assert!(matches!(
            fx.calendar.confirm_schedule(&other, room.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            fx.calendar.confirm_schedule(&host, 999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(fx.store.schedules().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_writes_nothing() {
        let fx = fixture();
        let host = Identity::new(fx.store.add_user("host").id);
        let room = fx.matching.create_room(&host, walk(Vec::new())).await.unwrap();
        fx.store.fail_schedule_writes();

        let err = fx.calendar.confirm_schedule(&host, room.id).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(fx.store.schedules().is_empty());
    }

    #[tokio::test]
    async fn test_find_schedule_missing() {
        let fx = fixture();
        let user = Identity::new(fx.store.add_user("amy").id);
        assert!(matches!(
            fx.calendar.find_schedule(&user, "Nothing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_schedule_entries_never_duplicate_host() {
        let room = MatchingRoom {
            id: 1,
            host_id: 7,
            title: "Walk".to_string(),
            description: "Loop".to_string(),
            place: "Park".to_string(),
            meeting_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            meeting_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            max_participants: 4,
            image_url: None,
            audit: crate::models::Audit::now(),
        };
        let user = |id: i64| UserSummary {
            user_id: id,
            name: format!("u{}", id),
            email: format!("u{}@example.com", id),
        };

        let entries = schedule_entries(&room, &[user(7), user(8), user(9)]);
        assert_eq!(
            entries.iter().map(|e| e.user_id).collect::<Vec<_>>(),
            vec![7, 8, 9]
        );
    }
}
