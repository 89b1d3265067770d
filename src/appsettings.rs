use std::env;

use anyhow::anyhow;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

use crate::recurrence::ReminderZone;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ReminderSettings {
    /// IANA zone reminder times are written in. Falls back to the process zone.
    pub timezone: Option<String>,
}

impl ReminderSettings {
    pub fn zone(&self) -> anyhow::Result<ReminderZone> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(ReminderZone::Local),
            Some(name) => name
                .parse()
                .map(ReminderZone::Named)
                .map_err(|err| anyhow!("invalid reminders.timezone {name:?}: {err}")),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Supabase,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub supabase: Option<SupabaseSettings>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub server: ServerSettings,
    #[serde(default)]
    pub reminders: ReminderSettings,
    pub storage: StorageSettings,
}

impl AppSettings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("storage.supabase.url", env::var("SUPABASE_URL").ok())?
            .set_override_option("storage.supabase.anon_key", env::var("SUPABASE_ANON_KEY").ok())?
            .build()?;

        settings.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("storage.backend", "memory")
    }
}
