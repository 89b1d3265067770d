use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::recurrence::RecurrenceError;

pub type ReminderId = Uuid;
pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Daily,
    Monthly,
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderKind::Daily => f.write_str("daily"),
            ReminderKind::Monthly => f.write_str("monthly"),
        }
    }
}

/// Wall-clock time of day a reminder fires at, truncated to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderFireTime(NaiveTime);

impl ReminderFireTime {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time =
            NaiveTime::from_hms_opt(inner.hour(), inner.minute(), 0).unwrap_or(inner);
        Self(normalized_time)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// Reads a time column as returned by a backend, which may carry seconds.
    pub fn from_column(raw: &str) -> Option<Self> {
        raw.parse().ok().or_else(|| {
            NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
                .ok()
                .map(Self::new)
        })
    }
}

impl FromStr for ReminderFireTime {
    type Err = RecurrenceError;

    /// Parses `HH:MM` in 24-hour form. A single-digit hour or minute is accepted.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || RecurrenceError::InvalidTimeFormat(raw.to_string());

        let (hours, minutes) = raw.trim().split_once(':').ok_or_else(invalid)?;
        let hours = parse_clock_component(hours, 23).ok_or_else(invalid)?;
        let minutes = parse_clock_component(minutes, 59).ok_or_else(invalid)?;

        NaiveTime::from_hms_opt(hours, minutes, 0)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for ReminderFireTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

fn parse_clock_component(raw: &str, max: u32) -> Option<u32> {
    if raw.is_empty() || raw.len() > 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    raw.parse().ok().filter(|value| *value <= max)
}

/// Day of the month a monthly reminder fires on. Capped at 28 so it exists in every month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOfMonth(u32);

impl DayOfMonth {
    pub const MAX: u32 = 28;

    pub fn new(day: i64) -> Result<Self, RecurrenceError> {
        match u32::try_from(day) {
            Ok(day) if (1..=Self::MAX).contains(&day) => Ok(Self(day)),
            _ => Err(RecurrenceError::InvalidDayOfMonth(day)),
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// A reminder as stored by the persistence backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub phone_number: String,
    pub message: String,
    pub reminder_type: ReminderKind,
    pub reminder_time: String,
    pub reminder_day: Option<u32>,
    pub next_reminder: DateTime<Utc>,
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A reminder row exactly as the backend returned it, including columns this service
/// never writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredReminder(Map<String, Value>);

impl StoredReminder {
    pub fn column(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn id_label(&self) -> String {
        match self.column("id") {
            Some(Value::String(id)) => id.clone(),
            Some(id) => id.to_string(),
            None => "<no id>".to_string(),
        }
    }

    /// Typed view of the row. Fails when the backend's column types differ from [`Reminder`].
    pub fn to_reminder(&self) -> serde_json::Result<Reminder> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    /// Rewrites `reminder_time` into `HH:MM` when the backend returned it with seconds.
    pub fn normalize_reminder_time(&mut self) {
        if let Some(Value::String(raw)) = self.0.get_mut("reminder_time") {
            if let Some(fire_at) = ReminderFireTime::from_column(raw) {
                *raw = fire_at.to_string();
            }
        }
    }
}

impl TryFrom<&Reminder> for StoredReminder {
    type Error = serde_json::Error;

    fn try_from(reminder: &Reminder) -> Result<Self, Self::Error> {
        match serde_json::to_value(reminder)? {
            Value::Object(columns) => Ok(Self(columns)),
            _ => Err(serde::ser::Error::custom("reminder is not a JSON object")),
        }
    }
}
