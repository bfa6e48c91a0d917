use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::domains::medical::{Coordinates, Hospital};
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::HospitalLocatorService;

const DEFAULT_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_RADIUS_METERS: u32 = 25_000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: Option<OverpassTags>,
}

#[derive(Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct OverpassTags {
    name: Option<String>,
}

/// Hospital search through the OpenStreetMap Overpass API.
pub struct OverpassHospitalLocator {
    client: reqwest::Client,
    url: String,
    radius_meters: u32,
}

impl OverpassHospitalLocator {
    pub fn new(
        url: Option<String>,
        radius_meters: Option<u32>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .build()
            .map_err(|e| MedAssistError::Config(e.to_string()))?;
        Ok(Self {
            client,
            url: url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            radius_meters: radius_meters.unwrap_or(DEFAULT_RADIUS_METERS),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let overpass = config.overpass.clone().unwrap_or_default();
        Self::new(
            overpass.url,
            overpass.radius_meters,
            overpass.timeout_seconds.map(Duration::from_secs),
        )
    }

    pub fn radius_meters(&self) -> u32 {
        self.radius_meters
    }

    fn query(&self, position: Coordinates) -> String {
        let around = format!(
            "around:{},{},{}",
            self.radius_meters, position.latitude, position.longitude
        );
        format!(
            "[out:json];\n(\n  node[\"amenity\"=\"hospital\"]({around});\n  way[\"amenity\"=\"hospital\"]({around});\n  relation[\"amenity\"=\"hospital\"]({around});\n);\nout center;"
        )
    }
}

#[async_trait]
impl HospitalLocatorService for OverpassHospitalLocator {
    async fn lookup(&self, position: Coordinates) -> Result<Vec<Hospital>> {
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", self.query(position))])
            .send()
            .await
            .map_err(|e| MedAssistError::Http(format!("Overpass request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MedAssistError::Http(format!(
                "Overpass lookup failed ({status})"
            )));
        }

        let body: OverpassResponse = response.json().await.map_err(|e| {
            MedAssistError::Serialization(format!("Overpass decode failed: {e}"))
        })?;

        let hospitals: Vec<Hospital> = body.elements.into_iter().filter_map(to_hospital).collect();
        debug!(count = hospitals.len(), "overpass hospitals");
        Ok(hospitals)
    }
}

fn to_hospital(element: OverpassElement) -> Option<Hospital> {
    let (lat, lon) = match (&element.center, element.lat, element.lon) {
        (Some(center), _, _) => (center.lat, center.lon),
        (None, Some(lat), Some(lon)) => (lat, lon),
        _ => return None,
    };
    let name = element
        .tags
        .and_then(|tags| tags.name)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "Unnamed Hospital".to_string());
    Some(Hospital {
        name,
        maps_url: directions_url(lat, lon),
    })
}

pub fn directions_url(lat: f64, lon: f64) -> String {
    format!("https://www.google.com/maps/dir/?api=1&destination={lat},{lon}")
}
