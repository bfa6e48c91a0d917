use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::db;
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::{
    AyurvedicTipsService, ChatCompletionService, GeolocationProvider,
};
use crate::kv_store::SqliteKvStore;
use crate::providers::ayurveda::StaticAyurvedicTips;
use crate::providers::fda::FdaMedicineService;
use crate::providers::openai::OpenAiChatService;
use crate::providers::overpass::OverpassHospitalLocator;
use crate::providers::specialists::JsonSpecialistDirectory;
use crate::reminders::SqliteReminderStore;
use crate::services::session::{ChatSession, Collaborators};
use crate::tips::DailyTipRotation;

/// Stands in for the chat model when no API key is configured, so every other
/// path keeps working.
struct UnavailableChat;

#[async_trait]
impl ChatCompletionService for UnavailableChat {
    async fn ask(&self, _question: &str) -> Result<String> {
        Err(MedAssistError::Config(
            "no OpenAI API key configured".to_string(),
        ))
    }
}

/// Wires a session from `config`. Reminders and tip rotation share one SQLite
/// pool; previously stored reminders are loaded before returning.
pub async fn build_session(
    config: &Config,
    geolocation: Arc<dyn GeolocationProvider>,
) -> Result<ChatSession> {
    let sqlite_path = config.sqlite_path();
    let pool = db::open_pool(&sqlite_path).await?;

    let chat: Arc<dyn ChatCompletionService> = match OpenAiChatService::from_config(config) {
        Ok(service) => {
            info!(model = service.model(), "chat completions enabled");
            Arc::new(service)
        }
        Err(err) => {
            warn!(error = %err, "free-text questions will get the generic error reply");
            Arc::new(UnavailableChat)
        }
    };

    let ayurveda: Arc<dyn AyurvedicTipsService> = match config.ayurvedic_path() {
        Some(path) => Arc::new(StaticAyurvedicTips::from_file(path)?),
        None => Arc::new(StaticAyurvedicTips::bundled()?),
    };

    let specialists = match config.specialists_path() {
        Some(path) => JsonSpecialistDirectory::from_path(path),
        None => JsonSpecialistDirectory::bundled()?,
    };

    let hospitals = OverpassHospitalLocator::from_config(config)?;
    let radius_meters = hospitals.radius_meters();

    let services = Collaborators {
        chat,
        medicine: Arc::new(FdaMedicineService::from_config(config)?),
        ayurveda,
        specialists: Arc::new(specialists),
        hospitals: Arc::new(hospitals),
        geolocation,
        reminders: Arc::new(SqliteReminderStore::new(pool.clone())),
    };

    let tips = DailyTipRotation::new(config.daily_tips(), Arc::new(SqliteKvStore::new(pool)));
    let session = ChatSession::new(services, tips, radius_meters);

    match session.refresh_reminders().await {
        Ok(count) => info!(count, sqlite_path = %sqlite_path, "loaded stored reminders"),
        Err(err) => warn!(error = %err, "could not load stored reminders"),
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::domains::reminder::Reminder;
    use crate::providers::geolocation::NoGeolocation;
    use chrono::{TimeZone, Utc};

    fn config_at(path: &str) -> Config {
        Config {
            storage: Some(StorageConfig {
                sqlite_path: Some(path.to_string()),
            }),
            ..Config::convention_defaults()
        }
    }

    #[tokio::test]
    async fn stored_reminders_are_loaded_on_build() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("medassist.db");
        let config = config_at(&db_path.to_string_lossy());

        let session = build_session(&config, Arc::new(NoGeolocation))
            .await
            .expect("session");
        assert!(session.reminders().is_empty());
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let reminder = Reminder::new("Metformin", vec![at], Vec::new(), Some(30)).unwrap();
        session.submit_reminder(reminder.clone()).await.unwrap();

        let rebuilt = build_session(&config, Arc::new(NoGeolocation))
            .await
            .expect("rebuilt session");
        assert_eq!(rebuilt.reminders(), vec![reminder]);
    }

    #[tokio::test]
    async fn unavailable_chat_reports_missing_key() {
        let err = UnavailableChat.ask("hello").await.unwrap_err();
        assert!(matches!(err, MedAssistError::Config(_)));
    }
}
