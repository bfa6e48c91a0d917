#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use medassist::domains::medical::{
    AyurvedicTips, Coordinates, Hospital, Lookup, MedicineInfo, Specialist,
};
use medassist::error::{MedAssistError, Result};
use medassist::interfaces::services::{
    AyurvedicTipsService, ChatCompletionService, GeolocationProvider, HospitalLocatorService,
    MedicineInfoService, SpecialistDirectoryService,
};
use medassist::providers::ayurveda::StaticAyurvedicTips;
use medassist::providers::geolocation::NoGeolocation;
use medassist::providers::memory::{InMemoryKvStore, InMemoryReminderStore};
use medassist::providers::overpass::DEFAULT_RADIUS_METERS;
use medassist::providers::specialists::JsonSpecialistDirectory;
use medassist::services::session::{ChatSession, Collaborators, WaitingProbe};
use medassist::tips::{default_tips, DailyTipRotation};

/// Chat model stub. Optionally blocks until released and records whether the
/// session reported "waiting" while the call was in flight.
#[derive(Default)]
pub struct StubChat {
    pub reply: Mutex<Option<String>>,
    pub questions: Mutex<Vec<String>>,
    pub gate: Option<Arc<Notify>>,
    pub probe: Mutex<Option<WaitingProbe>>,
    pub saw_waiting: AtomicBool,
}

impl StubChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Mutex::new(Some(reply.to_string())),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn gated(reply: &str, gate: Arc<Notify>) -> Self {
        Self {
            reply: Mutex::new(Some(reply.to_string())),
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn watch(&self, probe: WaitingProbe) {
        *self.probe.lock().unwrap() = Some(probe);
    }
}

#[async_trait]
impl ChatCompletionService for StubChat {
    async fn ask(&self, text: &str) -> Result<String> {
        self.questions.lock().unwrap().push(text.to_string());
        if let Some(probe) = self.probe.lock().unwrap().as_ref() {
            self.saw_waiting.store(probe.is_waiting(), Ordering::SeqCst);
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MedAssistError::Http("upstream unavailable".to_string()))
    }
}

pub struct StubMedicine {
    pub fail: bool,
}

#[async_trait]
impl MedicineInfoService for StubMedicine {
    async fn lookup(&self, medicine_name: &str) -> Result<Lookup<MedicineInfo>> {
        if self.fail {
            return Err(MedAssistError::Http("fda down".to_string()));
        }
        if medicine_name.eq_ignore_ascii_case("aspirin") {
            return Ok(Lookup::Found(MedicineInfo {
                medicine_name: medicine_name.to_string(),
                description: "Aspirin tablets".to_string(),
                purpose: "Pain reliever".to_string(),
                dosage: "1 tablet every 4 hours".to_string(),
                precautions: "Reye's syndrome".to_string(),
            }));
        }
        Ok(Lookup::NotFound(format!(
            "No information found for medicine: {medicine_name}"
        )))
    }
}

pub struct FailingAyurveda;

#[async_trait]
impl AyurvedicTipsService for FailingAyurveda {
    async fn lookup(&self, _condition: &str) -> Result<Lookup<AyurvedicTips>> {
        Err(MedAssistError::Storage("tips unavailable".to_string()))
    }
}

pub struct FailingSpecialists;

#[async_trait]
impl SpecialistDirectoryService for FailingSpecialists {
    async fn lookup(&self, _specialist_type: &str) -> Result<Vec<Specialist>> {
        Err(MedAssistError::Storage("directory unavailable".to_string()))
    }
}

/// Hospital locator stub. Counts calls and can be held until released.
#[derive(Default)]
pub struct StubHospitals {
    pub hospitals: Vec<Hospital>,
    pub fail: bool,
    pub gate: Option<Arc<Notify>>,
    pub calls: AtomicUsize,
}

impl StubHospitals {
    pub fn with(names: &[&str]) -> Self {
        Self {
            hospitals: names
                .iter()
                .enumerate()
                .map(|(i, name)| Hospital {
                    name: name.to_string(),
                    maps_url: format!("https://maps.example/{i}"),
                })
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl HospitalLocatorService for StubHospitals {
    async fn lookup(&self, _position: Coordinates) -> Result<Vec<Hospital>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(MedAssistError::Http("overpass down".to_string()));
        }
        Ok(self.hospitals.clone())
    }
}

pub struct FailingGeolocation;

#[async_trait]
impl GeolocationProvider for FailingGeolocation {
    async fn current_position(&self) -> Result<Option<Coordinates>> {
        Err(MedAssistError::Runtime("permission denied".to_string()))
    }
}

pub fn collaborators() -> Collaborators {
    Collaborators {
        chat: Arc::new(StubChat::replying("Drink fluids and rest.")),
        medicine: Arc::new(StubMedicine { fail: false }),
        ayurveda: Arc::new(StaticAyurvedicTips::bundled().expect("bundled tips")),
        specialists: Arc::new(JsonSpecialistDirectory::bundled().expect("bundled specialists")),
        hospitals: Arc::new(StubHospitals::default()),
        geolocation: Arc::new(NoGeolocation),
        reminders: Arc::new(InMemoryReminderStore::new()),
    }
}

pub fn session_with(services: Collaborators) -> ChatSession {
    session_with_radius(services, DEFAULT_RADIUS_METERS)
}

pub fn session_with_radius(services: Collaborators, radius_meters: u32) -> ChatSession {
    let tips = DailyTipRotation::new(default_tips(), Arc::new(InMemoryKvStore::new()));
    ChatSession::new(services, tips, radius_meters)
}

pub fn texts(session: &ChatSession) -> Vec<String> {
    session
        .messages()
        .into_iter()
        .map(|message| message.text)
        .collect()
}

/// Yields until the session reports an in-flight dispatch.
pub async fn until_waiting(session: &ChatSession) {
    for _ in 0..1000 {
        if session.is_waiting_for_response() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("session never started waiting");
}
