use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::domains::medical::{Lookup, MedicineInfo};
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::MedicineInfoService;

const DEFAULT_BASE_URL: &str = "https://api.fda.gov";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const UNAVAILABLE: &str = "Information not available.";

#[derive(Deserialize)]
struct LabelResponse {
    #[serde(default)]
    results: Vec<LabelResult>,
}

#[derive(Deserialize)]
struct LabelResult {
    description: Option<Value>,
    purpose: Option<Value>,
    dosage_and_administration: Option<Value>,
    warnings: Option<Value>,
}

/// Drug label lookups against the openFDA `drug/label` endpoint.
pub struct FdaMedicineService {
    client: reqwest::Client,
    base_url: String,
}

impl FdaMedicineService {
    pub fn new(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .build()
            .map_err(|e| MedAssistError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let fda = config.fda.clone().unwrap_or_default();
        Self::new(fda.base_url, fda.timeout_seconds.map(Duration::from_secs))
    }

    fn label_url(&self) -> String {
        format!("{}/drug/label.json", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MedicineInfoService for FdaMedicineService {
    async fn lookup(&self, medicine_name: &str) -> Result<Lookup<MedicineInfo>> {
        let medicine_name = medicine_name.trim();
        if medicine_name.is_empty() {
            return Ok(Lookup::NotFound(
                "Please provide a medicine name".to_string(),
            ));
        }

        let response = self
            .client
            .get(self.label_url())
            .query(&[("search", medicine_name)])
            .send()
            .await
            .map_err(|e| MedAssistError::Http(format!("FDA request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(medicine_name, "no FDA label match");
            return Ok(not_found(medicine_name));
        }
        if !status.is_success() {
            return Err(MedAssistError::Http(format!(
                "FDA lookup failed ({status})"
            )));
        }

        let body: LabelResponse = response
            .json()
            .await
            .map_err(|e| MedAssistError::Serialization(format!("FDA decode failed: {e}")))?;

        let Some(label) = body.results.into_iter().next() else {
            return Ok(not_found(medicine_name));
        };

        Ok(Lookup::Found(MedicineInfo {
            medicine_name: medicine_name.to_string(),
            description: first_or_default(label.description, "No description available."),
            purpose: first_or_default(label.purpose, "No purpose available."),
            dosage: first_or_default(
                label.dosage_and_administration,
                "No dosage information available.",
            ),
            precautions: first_or_default(label.warnings, "No precautions available."),
        }))
    }
}

fn not_found(medicine_name: &str) -> Lookup<MedicineInfo> {
    Lookup::NotFound(format!(
        "No information found for medicine: {medicine_name}"
    ))
}

/// Label sections arrive as arrays of paragraphs; the first one is enough.
fn first_or_default(value: Option<Value>, missing: &str) -> String {
    match value {
        None | Some(Value::Null) => missing.to_string(),
        Some(Value::String(text)) => text,
        Some(Value::Array(items)) => match items.into_iter().next() {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => UNAVAILABLE.to_string(),
        },
        Some(_) => UNAVAILABLE.to_string(),
    }
}
