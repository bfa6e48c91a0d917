use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{MedAssistError, Result};

pub const DEFAULT_SQLITE_PATH: &str = "./data/medassist.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FdaConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OverpassConfig {
    pub url: Option<String>,
    pub radius_meters: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DataConfig {
    pub specialists_path: Option<String>,
    pub ayurvedic_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub sqlite_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub openai: Option<OpenAiConfig>,
    pub fda: Option<FdaConfig>,
    pub overpass: Option<OverpassConfig>,
    pub data: Option<DataConfig>,
    pub storage: Option<StorageConfig>,
    pub server: Option<ServerConfig>,
    /// Replaces the bundled daily tip list when present and non-empty.
    pub tips: Option<Vec<String>>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            MedAssistError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| MedAssistError::Config(e.to_string()))
    }

    /// Loads `path` when it exists, otherwise falls back to convention defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) if Path::new(path).exists() => Self::from_file(path),
            Some(path) => {
                tracing::info!(path, "config file not found, using defaults");
                Ok(Self::convention_defaults())
            }
            None => Ok(Self::convention_defaults()),
        }
    }

    pub fn convention_defaults() -> Self {
        Self {
            openai: Some(OpenAiConfig {
                api_key: None,
                model: Some("gpt-4.1-mini".to_string()),
                base_url: Some("https://api.openai.com/v1".to_string()),
                system_prompt: None,
            }),
            fda: Some(FdaConfig {
                base_url: Some("https://api.fda.gov".to_string()),
                timeout_seconds: Some(10),
            }),
            overpass: Some(OverpassConfig {
                url: Some("https://overpass-api.de/api/interpreter".to_string()),
                radius_meters: Some(25_000),
                timeout_seconds: Some(30),
            }),
            data: Some(DataConfig {
                specialists_path: None,
                ayurvedic_path: None,
            }),
            storage: Some(StorageConfig {
                sqlite_path: Some(DEFAULT_SQLITE_PATH.to_string()),
            }),
            server: Some(ServerConfig {
                host: Some(DEFAULT_HOST.to_string()),
                port: Some(DEFAULT_PORT),
            }),
            tips: None,
        }
    }

    pub fn sqlite_path(&self) -> String {
        self.storage
            .as_ref()
            .and_then(|storage| storage.sqlite_path.as_deref())
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .unwrap_or(DEFAULT_SQLITE_PATH)
            .to_string()
    }

    /// The configured key wins over `OPENAI_API_KEY`.
    pub fn openai_api_key(&self) -> Option<String> {
        self.openai
            .as_ref()
            .and_then(|openai| openai.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                std::env::var("OPENAI_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }

    pub fn server_host(&self) -> String {
        self.server
            .as_ref()
            .and_then(|server| server.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|server| server.port)
            .unwrap_or(DEFAULT_PORT)
    }

    /// `None` selects the bundled demo directory.
    pub fn specialists_path(&self) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|data| data.specialists_path.clone())
    }

    pub fn ayurvedic_path(&self) -> Option<String> {
        self.data.as_ref().and_then(|data| data.ayurvedic_path.clone())
    }

    pub fn daily_tips(&self) -> Vec<String> {
        match &self.tips {
            Some(tips) if !tips.is_empty() => tips.clone(),
            _ => crate::tips::default_tips(),
        }
    }
}
