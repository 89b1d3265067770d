use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::reminder::{Reminder, ReminderId, StoredReminder};

use super::{NewReminder, ReminderStorage};

pub struct InMemoryReminderStorage {
    store: RwLock<HashMap<ReminderId, Reminder>>,
}

impl InMemoryReminderStorage {
    pub fn new() -> Self {
        InMemoryReminderStorage {
            store: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, id: ReminderId) -> Option<Reminder> {
        let store = self.store.read().await;
        store.get(&id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryReminderStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReminderStorage for InMemoryReminderStorage {
    async fn insert(&self, reminder: NewReminder) -> anyhow::Result<StoredReminder> {
        let reminder = reminder.into_reminder(Uuid::new_v4(), Utc::now());
        let stored = StoredReminder::try_from(&reminder)?;

        let mut store = self.store.write().await;
        log::debug!("Stored reminder {}", reminder.id);
        store.insert(reminder.id, reminder);

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::recurrence::Recurrence;
    use crate::reminder::ReminderKind;

    fn new_reminder(recurrence: Recurrence) -> NewReminder {
        NewReminder {
            phone_number: "+1234567890".to_string(),
            message: "Take your medication".to_string(),
            recurrence,
            fire_at: "09:00".parse().unwrap(),
            next_reminder: Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let storage = InMemoryReminderStorage::new();

        let first = storage.insert(new_reminder(Recurrence::Daily)).await.unwrap();
        let second = storage.insert(new_reminder(Recurrence::Daily)).await.unwrap();
        let first = first.to_reminder().unwrap();
        let second = second.to_reminder().unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(storage.count().await, 2);
        assert_eq!(storage.get(first.id).await, Some(first));
    }

    #[tokio::test]
    async fn insert_keeps_day_only_for_monthly() {
        let storage = InMemoryReminderStorage::new();
        let monthly = Recurrence::from_parts(ReminderKind::Monthly, Some(5)).unwrap();

        let daily = storage.insert(new_reminder(Recurrence::Daily)).await.unwrap();
        let monthly = storage.insert(new_reminder(monthly)).await.unwrap();
        let daily = daily.to_reminder().unwrap();
        let monthly = monthly.to_reminder().unwrap();

        assert_eq!(daily.reminder_type, ReminderKind::Daily);
        assert_eq!(daily.reminder_day, None);
        assert_eq!(monthly.reminder_type, ReminderKind::Monthly);
        assert_eq!(monthly.reminder_day, Some(5));
        assert_eq!(monthly.reminder_time, "09:00");
        assert!(monthly.created_at.is_some());
    }
}
