use chrono::{DateTime, Utc};

use crate::recurrence::Recurrence;
use crate::reminder::{Reminder, ReminderFireTime, ReminderId, UserId};

#[derive(Debug)]
pub struct NewReminder {
    pub phone_number: String,
    pub message: String,
    pub recurrence: Recurrence,
    pub fire_at: ReminderFireTime,
    pub next_reminder: DateTime<Utc>,
    pub user_id: Option<UserId>,
}

impl NewReminder {
    pub fn reminder_day(&self) -> Option<u32> {
        self.recurrence.day_of_month().map(|day| day.get())
    }

    pub(crate) fn into_reminder(self, id: ReminderId, created_at: DateTime<Utc>) -> Reminder {
        let reminder_day = self.reminder_day();
        Reminder {
            id,
            phone_number: self.phone_number,
            message: self.message,
            reminder_type: self.recurrence.kind(),
            reminder_time: self.fire_at.to_string(),
            reminder_day,
            next_reminder: self.next_reminder,
            user_id: self.user_id,
            created_at: Some(created_at),
        }
    }
}
