use async_trait::async_trait;

use crate::domains::medical::{
    AyurvedicTips, Coordinates, Hospital, Lookup, MedicineInfo, Specialist,
};
use crate::domains::reminder::Reminder;
use crate::error::Result;

#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    async fn ask(&self, text: &str) -> Result<String>;
}

#[async_trait]
pub trait MedicineInfoService: Send + Sync {
    async fn lookup(&self, medicine_name: &str) -> Result<Lookup<MedicineInfo>>;
}

#[async_trait]
pub trait AyurvedicTipsService: Send + Sync {
    async fn lookup(&self, condition: &str) -> Result<Lookup<AyurvedicTips>>;
}

/// An empty list means no specialist of that type is known.
#[async_trait]
pub trait SpecialistDirectoryService: Send + Sync {
    async fn lookup(&self, specialist_type: &str) -> Result<Vec<Specialist>>;
}

#[async_trait]
pub trait HospitalLocatorService: Send + Sync {
    async fn lookup(&self, position: Coordinates) -> Result<Vec<Hospital>>;
}

/// Device position. `Ok(None)` when the capability is unavailable or the user
/// declined to share it.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Option<Coordinates>>;
}

#[async_trait]
pub trait ReminderStoreService: Send + Sync {
    async fn save(&self, reminder: &Reminder) -> Result<()>;
    async fn list(&self) -> Result<Vec<Reminder>>;
}
