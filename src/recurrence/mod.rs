//! Resolution of the first instant a recurring reminder is due.
//!
//! The resolver is a pure function of the caller-supplied `now`; it never
//! reads the system clock. Time of day is interpreted in `now`'s time zone.

mod zone;

pub use zone::ReminderZone;

use chrono::{DateTime, Datelike, Days, MappedLocalTime, Months, NaiveDate, TimeDelta, TimeZone};
use thiserror::Error;

use crate::reminder::{DayOfMonth, ReminderFireTime, ReminderKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("invalid reminder time {0:?}, expected HH:MM in 24-hour form")]
    InvalidTimeFormat(String),
    #[error("reminder day must be between 1 and {max}, got {0}", max = DayOfMonth::MAX)]
    InvalidDayOfMonth(i64),
    #[error("reminder_day is required for monthly reminders")]
    MissingDayOfMonth,
    #[error("next reminder time is outside the supported date range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Monthly { day: DayOfMonth },
}

impl Recurrence {
    /// Builds a recurrence from wire-level parts. The day is ignored for daily reminders.
    pub fn from_parts(kind: ReminderKind, day: Option<i64>) -> Result<Self, RecurrenceError> {
        match kind {
            ReminderKind::Daily => Ok(Recurrence::Daily),
            ReminderKind::Monthly => {
                let day = day.ok_or(RecurrenceError::MissingDayOfMonth)?;
                Ok(Recurrence::Monthly {
                    day: DayOfMonth::new(day)?,
                })
            }
        }
    }

    pub fn kind(&self) -> ReminderKind {
        match self {
            Recurrence::Daily => ReminderKind::Daily,
            Recurrence::Monthly { .. } => ReminderKind::Monthly,
        }
    }

    pub fn day_of_month(&self) -> Option<DayOfMonth> {
        match self {
            Recurrence::Daily => None,
            Recurrence::Monthly { day } => Some(*day),
        }
    }
}

/// Computes the next instant at which a reminder should fire.
///
/// Daily reminders due at exactly `now` are pushed to tomorrow, while monthly
/// reminders due at exactly `now` stay in the current month.
pub fn resolve_next_fire<Tz: TimeZone>(
    now: &DateTime<Tz>,
    fire_at: ReminderFireTime,
    recurrence: Recurrence,
) -> Result<DateTime<Tz>, RecurrenceError> {
    let zone = now.timezone();
    let today = now.date_naive();

    match recurrence {
        Recurrence::Daily => {
            let candidate = at_local_time(&zone, today, fire_at)?;
            if candidate <= *now {
                let tomorrow = today
                    .checked_add_days(Days::new(1))
                    .ok_or(RecurrenceError::OutOfRange)?;
                at_local_time(&zone, tomorrow, fire_at)
            } else {
                Ok(candidate)
            }
        }
        Recurrence::Monthly { day } => {
            let this_month = today
                .with_day(day.get())
                .ok_or(RecurrenceError::OutOfRange)?;
            let candidate = at_local_time(&zone, this_month, fire_at)?;
            if candidate < *now {
                let next_month = this_month
                    .checked_add_months(Months::new(1))
                    .ok_or(RecurrenceError::OutOfRange)?;
                at_local_time(&zone, next_month, fire_at)
            } else {
                Ok(candidate)
            }
        }
    }
}

// Longest run of local time a zone has ever skipped, with margin.
const MAX_GAP_HOURS: i64 = 48;

// Ambiguous local times take the earlier instant. Times skipped by a DST gap or a
// zone change move forward in whole hours to the first local time that exists.
fn at_local_time<Tz: TimeZone>(
    zone: &Tz,
    date: NaiveDate,
    fire_at: ReminderFireTime,
) -> Result<DateTime<Tz>, RecurrenceError> {
    let local = date.and_time(fire_at.time());

    match zone.from_local_datetime(&local) {
        MappedLocalTime::Single(datetime) => Ok(datetime),
        MappedLocalTime::Ambiguous(earliest, _) => Ok(earliest),
        MappedLocalTime::None => (1..=MAX_GAP_HOURS)
            .find_map(|hours| {
                let shifted = local.checked_add_signed(TimeDelta::hours(hours))?;
                zone.from_local_datetime(&shifted).earliest()
            })
            .ok_or(RecurrenceError::OutOfRange),
    }
}
