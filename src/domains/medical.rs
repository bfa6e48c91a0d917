use serde::{Deserialize, Serialize};

/// Result of a lookup that can legitimately come back empty. The not-found
/// message is written by the collaborator and shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound(String),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicineInfo {
    pub medicine_name: String,
    pub description: String,
    pub purpose: String,
    pub dosage: String,
    pub precautions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AyurvedicTips {
    pub tips: Vec<String>,
    pub precautions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialist {
    pub name: String,
    pub hospital: String,
    pub experience: String,
    pub contact: String,
    pub availability: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospital {
    pub name: String,
    pub maps_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmergencyContact {
    pub id: &'static str,
    pub name: &'static str,
    pub number: &'static str,
}

pub const EMERGENCY_CONTACTS: [EmergencyContact; 6] = [
    EmergencyContact {
        id: "ambulance",
        name: "Ambulance",
        number: "108",
    },
    EmergencyContact {
        id: "police",
        name: "Police",
        number: "100",
    },
    EmergencyContact {
        id: "fire",
        name: "Fire",
        number: "101",
    },
    EmergencyContact {
        id: "emergency",
        name: "Emergency",
        number: "112",
    },
    EmergencyContact {
        id: "women",
        name: "Women Helpline",
        number: "181",
    },
    EmergencyContact {
        id: "child",
        name: "Child Helpline",
        number: "1098",
    },
];
