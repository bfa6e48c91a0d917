use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domains::medical::{AyurvedicTips, Lookup};
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::AyurvedicTipsService;

const BUNDLED: &str = include_str!("../../data/ayurvedic.json");

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionEntry {
    pub condition: String,
    pub tips: Vec<String>,
    pub precautions: Vec<String>,
}

/// Canned ayurvedic tips keyed by condition name. Conditions keep file order
/// so the "available conditions" hint reads the same way every time.
pub struct StaticAyurvedicTips {
    entries: Vec<ConditionEntry>,
}

impl StaticAyurvedicTips {
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MedAssistError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<ConditionEntry> = serde_json::from_str(raw)?;
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<ConditionEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.condition = normalize(&entry.condition);
                entry
            })
            .collect();
        Self { entries }
    }

    pub fn conditions(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.condition.as_str())
            .collect()
    }
}

#[async_trait]
impl AyurvedicTipsService for StaticAyurvedicTips {
    async fn lookup(&self, condition: &str) -> Result<Lookup<AyurvedicTips>> {
        let key = normalize(condition);
        if key.is_empty() {
            return Ok(Lookup::NotFound("Please provide a condition".to_string()));
        }

        match self.entries.iter().find(|entry| entry.condition == key) {
            Some(entry) => Ok(Lookup::Found(AyurvedicTips {
                tips: entry.tips.clone(),
                precautions: entry.precautions.clone(),
            })),
            None => Ok(Lookup::NotFound(format!(
                "No tips found for \"{}\". Available conditions: {}",
                condition.trim(),
                self.conditions().join(", ")
            ))),
        }
    }
}

fn normalize(condition: &str) -> String {
    condition.trim().to_lowercase()
}
