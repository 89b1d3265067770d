mod in_memory;
mod model;
mod supabase;

pub use in_memory::InMemoryReminderStorage;
pub use model::NewReminder;
pub use supabase::{SupabaseReminderStorage, SupabaseStorageError};

use std::sync::Arc;

use async_trait::async_trait;

use crate::appsettings::{StorageBackend, StorageSettings};
use crate::reminder::StoredReminder;

/// Durable home of resolved reminders. Assigns ids and returns the row as stored.
#[async_trait]
pub trait ReminderStorage: Send + Sync {
    async fn insert(&self, reminder: NewReminder) -> anyhow::Result<StoredReminder>;
}

pub fn from_settings(settings: &StorageSettings) -> anyhow::Result<Arc<dyn ReminderStorage>> {
    match settings.backend {
        StorageBackend::Memory => {
            log::warn!("Using in-memory reminder storage, reminders will not survive a restart");
            Ok(Arc::new(InMemoryReminderStorage::new()))
        }
        StorageBackend::Supabase => {
            let Some(supabase) = &settings.supabase else {
                anyhow::bail!("storage.supabase settings are required for the supabase backend");
            };
            anyhow::ensure!(!supabase.url.is_empty(), "storage.supabase.url is not set");
            anyhow::ensure!(!supabase.anon_key.is_empty(), "storage.supabase.anon_key is not set");

            log::info!("Using Supabase reminder storage at {}", supabase.url);
            Ok(Arc::new(SupabaseReminderStorage::new(supabase)?))
        }
    }
}
