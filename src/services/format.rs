//! Bot reply texts. Replies use light Markdown (bold headings, numbered
//! lists) which the HTTP surface renders to HTML.

use crate::domains::medical::{AyurvedicTips, Hospital, MedicineInfo, Specialist};

pub const AYURVEDIC_QUESTION: &str =
    "What health condition would you like ayurvedic tips for? (e.g., cough, cold, fever, headache)";
pub const SPECIALIST_QUESTION: &str =
    "I can help you find a doctor. Could you please specify what type of specialist you need?";
pub const MEDICINE_QUESTION: &str =
    "Please type the name of the medicine you want to know about. (only FDA approved)";
pub const LOCATING_HOSPITALS: &str = "Getting your location to find nearby hospitals...";
pub const OPENING_REMINDER: &str = "Opening medicine reminder setup...";
pub const EMERGENCY_ACK: &str =
    "Here are emergency numbers you can call for immediate assistance:";
pub const UNKNOWN_COMMAND: &str =
    "I'm not sure how to help with that specific request. Could you try another command or rephrase?";

pub const GENERIC_ERROR: &str = "Sorry, I encountered an error. Please try again.";
pub const MEDICINE_ERROR: &str =
    "Sorry, I encountered an error fetching medicine information. Please try again.";
pub const AYURVEDIC_ERROR: &str =
    "Sorry, I encountered an error fetching ayurvedic tips. Please try again.";
pub const SPECIALIST_ERROR: &str =
    "Sorry, I encountered an error fetching specialist information. Please try again.";
pub const HOSPITAL_ERROR: &str = "Error fetching nearby hospitals. Please try again.";

pub fn medicine_info(info: &MedicineInfo) -> String {
    format!(
        "Information about {}:\n\n**Description:**\n{}\n\n**Purpose:**\n{}\n\n**Dosage:**\n{}\n\n**Precautions:**\n{}",
        info.medicine_name, info.description, info.purpose, info.dosage, info.precautions
    )
}

pub fn ayurvedic_tips(condition: &str, tips: &AyurvedicTips) -> String {
    format!(
        "Here are some Ayurvedic tips for {condition}:\n\n**Tips -**\n{}\n\n**Precautions:**\n{}",
        numbered(&tips.tips),
        numbered(&tips.precautions)
    )
}

pub fn specialists(specialist_type: &str, specialists: &[Specialist]) -> String {
    if specialists.is_empty() {
        return format!("No specialists found for type: {specialist_type}");
    }
    let entries: Vec<String> = specialists
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            format!(
                "{}. Dr. {}\n   Hospital: {}\n   Experience: {}\n   Contact: {}\n   Availability: {}",
                i + 1,
                spec.name,
                spec.hospital,
                spec.experience,
                spec.contact,
                spec.availability
            )
        })
        .collect();
    format!(
        "**This is only demo data**\n\nHere are some {specialist_type} specialists:\n\n{}",
        entries.join("\n\n")
    )
}

/// Whole kilometres, rounded up; radii under a kilometre stay in metres.
fn radius_label(radius_meters: u32) -> String {
    if radius_meters < 1000 {
        format!("{radius_meters}m")
    } else {
        format!("{}km", radius_meters.div_ceil(1000))
    }
}

pub fn hospitals(hospitals: &[Hospital], radius_meters: u32) -> String {
    let radius = radius_label(radius_meters);
    if hospitals.is_empty() {
        return format!("No hospitals found within {radius} of your location.");
    }
    let entries: Vec<String> = hospitals
        .iter()
        .enumerate()
        .map(|(i, hospital)| {
            format!(
                "{}. {}\n   [Get Directions]({})",
                i + 1,
                hospital.name,
                hospital.maps_url
            )
        })
        .collect();
    format!(
        "Found {} hospitals within {radius} of your location:\n\n{}",
        hospitals.len(),
        entries.join("\n\n")
    )
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
