use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domains::medical::Specialist;
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::SpecialistDirectoryService;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecialistData {
    #[serde(default)]
    pub specialists: HashMap<String, Vec<Specialist>>,
}

enum Source {
    File(PathBuf),
    Inline(SpecialistData),
}

/// Specialist directory backed by a `{"specialists": {"<type>": [...]}}`
/// document. File sources are re-read on every lookup so edits show up
/// without a restart.
pub struct JsonSpecialistDirectory {
    source: Source,
}

const BUNDLED_SPECIALISTS: &str = include_str!("../../data/specialists.json");

impl JsonSpecialistDirectory {
    /// The demo directory compiled into the binary.
    pub fn bundled() -> Result<Self> {
        let data = serde_json::from_str(BUNDLED_SPECIALISTS)?;
        Ok(Self::from_data(data))
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
        }
    }

    pub fn from_data(data: SpecialistData) -> Self {
        Self {
            source: Source::Inline(data),
        }
    }

    async fn load(&self) -> Result<SpecialistData> {
        match &self.source {
            Source::Inline(data) => Ok(data.clone()),
            Source::File(path) => {
                let path = path.clone();
                let raw = tokio::task::spawn_blocking(move || std::fs::read_to_string(&path))
                    .await
                    .map_err(|e| MedAssistError::Runtime(e.to_string()))?
                    .map_err(|e| {
                        MedAssistError::Storage(format!("failed to read specialists data: {e}"))
                    })?;
                serde_json::from_str(&raw).map_err(|e| {
                    MedAssistError::Serialization(format!(
                        "failed to parse specialists data: {e}"
                    ))
                })
            }
        }
    }
}

#[async_trait]
impl SpecialistDirectoryService for JsonSpecialistDirectory {
    async fn lookup(&self, specialist_type: &str) -> Result<Vec<Specialist>> {
        let key = specialist_type.trim().to_lowercase();
        if key.is_empty() {
            return Ok(Vec::new());
        }
        let mut data = self.load().await?;
        Ok(data.specialists.remove(&key).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_bundled_demo_file() {
        let directory = JsonSpecialistDirectory::from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/specialists.json"
        ));
        let cardiologists = directory.lookup("Cardiologist").await.unwrap();
        assert_eq!(cardiologists.len(), 2);
        assert!(directory.lookup("astrologer").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bundled_data_matches_the_shipped_file() {
        let directory = JsonSpecialistDirectory::bundled().unwrap();
        let dermatologists = directory.lookup(" dermatologist ").await.unwrap();
        assert_eq!(dermatologists.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let directory = JsonSpecialistDirectory::from_path("/nonexistent/specialists.json");
        assert!(directory.lookup("cardiologist").await.is_err());
    }
}
