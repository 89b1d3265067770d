use std::fmt;

use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;

use crate::reminder::ReminderFireTime;

use super::{Recurrence, RecurrenceError, resolve_next_fire};

/// The zone reminder times of day are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderZone {
    /// The zone of the running process.
    Local,
    Named(Tz),
}

impl ReminderZone {
    pub fn next_fire(
        &self,
        now: DateTime<Utc>,
        fire_at: ReminderFireTime,
        recurrence: Recurrence,
    ) -> Result<DateTime<Utc>, RecurrenceError> {
        match self {
            ReminderZone::Local => {
                resolve_next_fire(&now.with_timezone(&Local), fire_at, recurrence)
                    .map(|next| next.with_timezone(&Utc))
            }
            ReminderZone::Named(tz) => {
                resolve_next_fire(&now.with_timezone(tz), fire_at, recurrence)
                    .map(|next| next.with_timezone(&Utc))
            }
        }
    }
}

impl fmt::Display for ReminderZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderZone::Local => f.write_str("local"),
            ReminderZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}
