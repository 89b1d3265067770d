use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::recurrence::{Recurrence, RecurrenceError, ReminderZone};
use crate::reminder::{ReminderFireTime, ReminderKind, StoredReminder};
use crate::storage::{NewReminder, ReminderStorage};

/// Payload submitted by the reminder dialog.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub message: String,
    pub reminder_type: ReminderKind,
    #[serde(default)]
    pub reminder_time: String,
    #[serde(default)]
    pub reminder_day: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum CreateReminderError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),
    #[error("{0}")]
    Storage(anyhow::Error),
}

impl CreateReminderError {
    pub fn is_validation(&self) -> bool {
        match self {
            CreateReminderError::MissingField(_) => true,
            CreateReminderError::Recurrence(RecurrenceError::OutOfRange) => false,
            CreateReminderError::Recurrence(_) => true,
            CreateReminderError::Storage(_) => false,
        }
    }
}

impl ReminderRequest {
    /// Validates the request and computes its first fire time relative to `now`.
    pub fn resolve(
        self,
        zone: ReminderZone,
        now: DateTime<Utc>,
    ) -> Result<NewReminder, CreateReminderError> {
        require("phone_number", &self.phone_number)?;
        require("message", &self.message)?;
        require("reminder_time", &self.reminder_time)?;

        let fire_at: ReminderFireTime = self.reminder_time.parse()?;
        let recurrence = Recurrence::from_parts(self.reminder_type, self.reminder_day)?;
        let next_reminder = zone.next_fire(now, fire_at, recurrence)?;

        Ok(NewReminder {
            phone_number: self.phone_number,
            message: self.message,
            recurrence,
            fire_at,
            next_reminder,
            user_id: self.user_id.filter(|id| !id.is_empty()),
        })
    }
}

fn require(field: &'static str, value: &str) -> Result<(), CreateReminderError> {
    if value.trim().is_empty() {
        Err(CreateReminderError::MissingField(field))
    } else {
        Ok(())
    }
}

pub async fn create_reminder(
    storage: &dyn ReminderStorage,
    zone: ReminderZone,
    now: DateTime<Utc>,
    request: ReminderRequest,
) -> Result<StoredReminder, CreateReminderError> {
    let new_reminder = request.resolve(zone, now)?;
    let kind = new_reminder.recurrence.kind();
    let next_reminder = new_reminder.next_reminder;

    let reminder = storage
        .insert(new_reminder)
        .await
        .map_err(CreateReminderError::Storage)?;

    log::info!(
        "Created {} reminder {}, next at {}",
        kind,
        reminder.id_label(),
        next_reminder.to_rfc3339()
    );
    Ok(reminder)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::storage::InMemoryReminderStorage;

    struct FailingStorage;

    #[async_trait]
    impl ReminderStorage for FailingStorage {
        async fn insert(&self, _reminder: NewReminder) -> anyhow::Result<StoredReminder> {
            anyhow::bail!("duplicate key value violates unique constraint")
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn utc() -> ReminderZone {
        ReminderZone::Named(chrono_tz::UTC)
    }

    fn request(kind: ReminderKind, time: &str, day: Option<i64>) -> ReminderRequest {
        ReminderRequest {
            phone_number: "+1234567890".to_string(),
            message: "Take your medication".to_string(),
            reminder_type: kind,
            reminder_time: time.to_string(),
            reminder_day: day,
            user_id: Some("user-1".to_string()),
        }
    }

    #[test]
    fn resolves_daily_request() {
        let new_reminder = request(ReminderKind::Daily, "14:00", Some(9))
            .resolve(utc(), now())
            .unwrap();

        assert_eq!(new_reminder.recurrence, Recurrence::Daily);
        assert_eq!(new_reminder.reminder_day(), None);
        assert_eq!(
            new_reminder.next_reminder,
            Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap()
        );
        assert_eq!(new_reminder.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn empty_owner_is_unowned() {
        let mut req = request(ReminderKind::Daily, "14:00", None);
        req.user_id = Some(String::new());

        let new_reminder = req.resolve(utc(), now()).unwrap();

        assert_eq!(new_reminder.user_id, None);
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut missing_phone = request(ReminderKind::Daily, "14:00", None);
        missing_phone.phone_number = "  ".to_string();
        let mut missing_message = request(ReminderKind::Daily, "14:00", None);
        missing_message.message = String::new();
        let missing_time = request(ReminderKind::Daily, "", None);

        for (req, field) in [
            (missing_phone, "phone_number"),
            (missing_message, "message"),
            (missing_time, "reminder_time"),
        ] {
            let err = req.resolve(utc(), now()).unwrap_err();
            assert!(matches!(err, CreateReminderError::MissingField(f) if f == field));
            assert!(err.is_validation());
            assert_eq!(err.to_string(), format!("{field} is required"));
        }
    }

    #[test]
    fn malformed_time_and_day_are_validation_errors() {
        let bad_time = request(ReminderKind::Daily, "25:61", None)
            .resolve(utc(), now())
            .unwrap_err();
        let bad_day = request(ReminderKind::Monthly, "09:00", Some(31))
            .resolve(utc(), now())
            .unwrap_err();
        let no_day = request(ReminderKind::Monthly, "09:00", None)
            .resolve(utc(), now())
            .unwrap_err();

        assert!(matches!(
            bad_time,
            CreateReminderError::Recurrence(RecurrenceError::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            bad_day,
            CreateReminderError::Recurrence(RecurrenceError::InvalidDayOfMonth(31))
        ));
        assert!(matches!(
            no_day,
            CreateReminderError::Recurrence(RecurrenceError::MissingDayOfMonth)
        ));
        assert!(bad_time.is_validation() && bad_day.is_validation() && no_day.is_validation());
    }

    #[tokio::test]
    async fn create_persists_resolved_reminder() {
        let storage = InMemoryReminderStorage::new();
        let req = request(ReminderKind::Monthly, "09:00", Some(5));
        let now = Utc.with_ymd_and_hms(2024, 12, 20, 9, 0, 0).unwrap();

        let stored = create_reminder(&storage, utc(), now, req).await.unwrap();
        let reminder = stored.to_reminder().unwrap();

        assert_eq!(reminder.next_reminder, Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap());
        assert_eq!(reminder.reminder_day, Some(5));
        assert_eq!(storage.get(reminder.id).await, Some(reminder));
    }

    #[tokio::test]
    async fn storage_failure_is_surfaced_verbatim() {
        let req = request(ReminderKind::Daily, "14:00", None);

        let err = create_reminder(&FailingStorage, utc(), now(), req)
            .await
            .unwrap_err();

        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "duplicate key value violates unique constraint");
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_storage() {
        let storage = InMemoryReminderStorage::new();
        let req = request(ReminderKind::Daily, "abc", None);

        let result = create_reminder(&storage, utc(), now(), req).await;

        assert!(result.is_err());
        assert_eq!(storage.count().await, 0);
    }
}
