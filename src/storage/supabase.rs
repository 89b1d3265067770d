use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::appsettings::SupabaseSettings;
use crate::reminder::{ReminderKind, StoredReminder};

use super::{NewReminder, ReminderStorage};

const REMINDERS_TABLE: &str = "reminders";

#[derive(Debug, Error)]
pub enum SupabaseStorageError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("insert into reminders returned no rows")]
    EmptyResponse,
}

/// Row shape written to the hosted `reminders` table.
#[derive(Debug, Serialize)]
struct ReminderRow<'a> {
    phone_number: &'a str,
    message: &'a str,
    reminder_type: ReminderKind,
    reminder_time: String,
    reminder_day: Option<u32>,
    next_reminder: DateTime<Utc>,
    user_id: Option<&'a str>,
}

impl<'a> From<&'a NewReminder> for ReminderRow<'a> {
    fn from(value: &'a NewReminder) -> Self {
        Self {
            phone_number: &value.phone_number,
            message: &value.message,
            reminder_type: value.recurrence.kind(),
            reminder_time: value.fire_at.to_string(),
            reminder_day: value.reminder_day(),
            next_reminder: value.next_reminder,
            user_id: value.user_id.as_deref(),
        }
    }
}

/// Stores reminders through the PostgREST interface of a Supabase project.
pub struct SupabaseReminderStorage {
    client: reqwest::Client,
    endpoint: String,
    anon_key: String,
}

impl SupabaseReminderStorage {
    pub fn new(settings: &SupabaseSettings) -> Result<Self, SupabaseStorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: table_endpoint(&settings.url),
            anon_key: settings.anon_key.clone(),
        })
    }

    async fn insert_row(
        &self,
        row: &ReminderRow<'_>,
    ) -> Result<StoredReminder, SupabaseStorageError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseStorageError::Rejected {
                status,
                message: error_message(status, &body),
            });
        }

        // The row is committed at this point, so its shape is passed through as-is.
        let rows: Vec<StoredReminder> = response.json().await?;
        let mut stored = rows
            .into_iter()
            .next()
            .ok_or(SupabaseStorageError::EmptyResponse)?;

        stored.normalize_reminder_time();
        Ok(stored)
    }
}

#[async_trait]
impl ReminderStorage for SupabaseReminderStorage {
    async fn insert(&self, reminder: NewReminder) -> anyhow::Result<StoredReminder> {
        let row = ReminderRow::from(&reminder);
        let stored = self.insert_row(&row).await.inspect_err(|err| {
            log::error!("Supabase rejected reminder insert: {err}");
        })?;

        Ok(stored)
    }
}

fn table_endpoint(base_url: &str) -> String {
    format!("{}/rest/v1/{REMINDERS_TABLE}", base_url.trim_end_matches('/'))
}

// PostgREST errors carry a `message` field; anything else is passed through as-is.
fn error_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string));

    match message {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status.to_string(),
    }
}
