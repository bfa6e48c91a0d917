use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domains::reminder::Reminder;
use crate::error::Result;
use crate::interfaces::services::ReminderStoreService;
use crate::interfaces::storage::KeyValueStore;

#[derive(Default)]
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReminderStore {
    reminders: RwLock<Vec<Reminder>>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderStoreService for InMemoryReminderStore {
    async fn save(&self, reminder: &Reminder) -> Result<()> {
        self.reminders.write().await.push(reminder.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Reminder>> {
        Ok(self.reminders.read().await.clone())
    }
}
