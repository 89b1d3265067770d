use std::sync::Arc;

use anyhow::Context;

use companion_reminders::{
    api::{self, AppState},
    appsettings::AppSettings,
    clock::SystemClock,
    storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::new().context("Failed to load settings")?;
    let zone = settings.reminders.zone()?;
    let storage = storage::from_settings(&settings.storage)?;

    log::info!("Reminder times are read in the {zone} zone");

    let state = AppState::new(storage, zone, Arc::new(SystemClock));
    api::serve(&settings.server, state).await
}
