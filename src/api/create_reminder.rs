use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::reminder::StoredReminder;
use crate::reminder_request::{ReminderRequest, create_reminder as create};

use super::{ApiError, AppState};

pub(super) async fn create_reminder(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReminderRequest>, JsonRejection>,
) -> Result<Json<StoredReminder>, ApiError> {
    let Json(request) = payload.inspect_err(|rejection| {
        log::warn!("Rejected reminder payload: {}", rejection.body_text());
    })?;

    let now = state.clock.now();
    let reminder = create(state.storage.as_ref(), state.zone, now, request)
        .await
        .map_err(ApiError::from)
        .inspect_err(|err| {
            log::warn!("Reminder creation failed with {}", err.status());
        })?;

    Ok(Json(reminder))
}
