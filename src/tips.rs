use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::interfaces::storage::KeyValueStore;

pub const LAST_TIP_TIME_KEY: &str = "lastTipTime";
pub const CURRENT_TIP_INDEX_KEY: &str = "currentTipIndex";
pub const ROTATION_INTERVAL_MS: i64 = 12 * 60 * 60 * 1000;

const DEFAULT_TIPS: [&str; 10] = [
    "Stay hydrated by drinking at least 8 glasses of water daily.",
    "Include a variety of colorful fruits and vegetables in your diet.",
    "Aim for 30 minutes of moderate exercise most days of the week.",
    "Practice deep breathing exercises to reduce stress.",
    "Limit screen time before bedtime for better sleep.",
    "Take regular breaks when working on a computer to reduce eye strain.",
    "Wash your hands frequently to prevent the spread of germs.",
    "Practice good posture while sitting and standing.",
    "Get at least 7-8 hours of sleep each night.",
    "Include protein-rich foods in your diet for muscle health.",
];

pub fn default_tips() -> Vec<String> {
    DEFAULT_TIPS.iter().map(|tip| tip.to_string()).collect()
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RotationState {
    index: usize,
    last_rotation_ms: i64,
}

/// Rotates through a fixed tip list at most once per twelve hours. Index and
/// last rotation instant live in a [`KeyValueStore`] so the rotation survives
/// restarts. Storage failures are logged and the in-memory state carries on.
pub struct DailyTipRotation {
    tips: Vec<String>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<Option<RotationState>>,
}

impl DailyTipRotation {
    pub fn new(tips: Vec<String>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(tips, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        tips: Vec<String>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tips = if tips.is_empty() { default_tips() } else { tips };
        Self {
            tips,
            store,
            clock,
            state: Mutex::new(None),
        }
    }

    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    pub async fn daily_tip(&self) -> String {
        let now_ms = self.clock.now().timestamp_millis();
        let mut guard = self.state.lock().await;
        let mut state = match *guard {
            Some(state) => state,
            None => self.load().await,
        };

        if now_ms - state.last_rotation_ms >= ROTATION_INTERVAL_MS {
            state = RotationState {
                index: (state.index + 1) % self.tips.len(),
                last_rotation_ms: now_ms,
            };
            debug!(index = state.index, "rotated daily tip");
            self.persist(state).await;
        }
        *guard = Some(state);

        format!("Today's health tip: {}", self.tips[state.index])
    }

    async fn load(&self) -> RotationState {
        let index = self
            .read_number::<usize>(CURRENT_TIP_INDEX_KEY)
            .await
            .unwrap_or(0)
            % self.tips.len();
        let last_rotation_ms = self.read_number::<i64>(LAST_TIP_TIME_KEY).await.unwrap_or(0);
        RotationState {
            index,
            last_rotation_ms,
        }
    }

    async fn read_number<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(value) => value.and_then(|raw| raw.trim().parse().ok()),
            Err(err) => {
                warn!(key, error = %err, "failed to read tip rotation state");
                None
            }
        }
    }

    async fn persist(&self, state: RotationState) {
        if let Err(err) = self
            .store
            .set(LAST_TIP_TIME_KEY, &state.last_rotation_ms.to_string())
            .await
        {
            warn!(error = %err, "failed to persist last tip time");
        }
        if let Err(err) = self
            .store
            .set(CURRENT_TIP_INDEX_KEY, &state.index.to_string())
            .await
        {
            warn!(error = %err, "failed to persist tip index");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::memory::InMemoryKvStore;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex as StdMutex;

    struct ManualClock(StdMutex<DateTime<Utc>>);

    impl ManualClock {
        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn three_tips() -> Vec<String> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    #[tokio::test]
    async fn first_call_advances_past_index_zero() {
        let clock = Arc::new(ManualClock(StdMutex::new(
            Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap(),
        )));
        let rotation =
            DailyTipRotation::with_clock(three_tips(), Arc::new(InMemoryKvStore::new()), clock);
        assert_eq!(rotation.daily_tip().await, "Today's health tip: b");
    }

    #[tokio::test]
    async fn stable_within_window_then_wraps() {
        let clock = Arc::new(ManualClock(StdMutex::new(
            Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap(),
        )));
        let store = Arc::new(InMemoryKvStore::new());
        let rotation = DailyTipRotation::with_clock(three_tips(), store.clone(), clock.clone());

        assert_eq!(rotation.daily_tip().await, "Today's health tip: b");
        clock.advance(Duration::hours(11) + Duration::minutes(59));
        assert_eq!(rotation.daily_tip().await, "Today's health tip: b");

        clock.advance(Duration::minutes(1));
        assert_eq!(rotation.daily_tip().await, "Today's health tip: c");

        clock.advance(Duration::hours(12));
        assert_eq!(rotation.daily_tip().await, "Today's health tip: a");
        assert_eq!(
            store.get(CURRENT_TIP_INDEX_KEY).await.unwrap().as_deref(),
            Some("0")
        );
    }

    #[tokio::test]
    async fn resumes_from_persisted_state() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let store = Arc::new(InMemoryKvStore::new());
        store.set(CURRENT_TIP_INDEX_KEY, "2").await.unwrap();
        store
            .set(
                LAST_TIP_TIME_KEY,
                &(now.timestamp_millis() - 1000).to_string(),
            )
            .await
            .unwrap();

        let clock = Arc::new(ManualClock(StdMutex::new(now)));
        let rotation = DailyTipRotation::with_clock(three_tips(), store, clock);
        assert_eq!(rotation.daily_tip().await, "Today's health tip: c");
    }
}
