use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domains::medical::Coordinates;
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::GeolocationProvider;

/// No positioning capability at all.
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self) -> Result<Option<Coordinates>> {
        Ok(None)
    }
}

/// Position fixed at startup, e.g. from the command line.
pub struct FixedGeolocation {
    position: Coordinates,
}

impl FixedGeolocation {
    pub fn new(position: Coordinates) -> Result<Self> {
        if !position.is_valid() {
            return Err(MedAssistError::Validation(format!(
                "coordinates out of range: {}, {}",
                position.latitude, position.longitude
            )));
        }
        Ok(Self { position })
    }
}

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self) -> Result<Option<Coordinates>> {
        Ok(Some(self.position))
    }
}

/// Last position reported by the client. Nothing reported reads as "not
/// shared".
#[derive(Default)]
pub struct ReportedGeolocation {
    position: RwLock<Option<Coordinates>>,
}

impl ReportedGeolocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn report(&self, position: Coordinates) -> Result<()> {
        if !position.is_valid() {
            return Err(MedAssistError::Validation(
                "latitude and longitude are out of range".to_string(),
            ));
        }
        *self.position.write().await = Some(position);
        Ok(())
    }

    pub async fn forget(&self) {
        *self.position.write().await = None;
    }
}

#[async_trait]
impl GeolocationProvider for ReportedGeolocation {
    async fn current_position(&self) -> Result<Option<Coordinates>> {
        Ok(*self.position.read().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reported_position_is_returned_until_forgotten() {
        let geo = ReportedGeolocation::new();
        assert_eq!(geo.current_position().await.unwrap(), None);

        geo.report(Coordinates::new(12.97, 77.59)).await.unwrap();
        assert_eq!(
            geo.current_position().await.unwrap(),
            Some(Coordinates::new(12.97, 77.59))
        );

        geo.forget().await;
        assert_eq!(geo.current_position().await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_out_of_range_positions() {
        let geo = ReportedGeolocation::new();
        assert!(geo.report(Coordinates::new(91.0, 0.0)).await.is_err());
        assert!(FixedGeolocation::new(Coordinates::new(0.0, 181.0)).is_err());
    }
}
