use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{MedAssistError, Result};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A medicine reminder as submitted by the reminder surface.
///
/// Either `number_of_days` is set (day-count mode, `days` empty) or `days`
/// lists at least one weekday (weekly mode). Never mutated once built; a
/// resubmission produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReminderDraft", into = "ReminderDraft")]
pub struct Reminder {
    medicine_name: String,
    times: Vec<DateTime<Utc>>,
    days: Vec<Weekday>,
    number_of_days: Option<u32>,
}

impl Reminder {
    pub fn new(
        medicine_name: impl Into<String>,
        times: Vec<DateTime<Utc>>,
        days: Vec<Weekday>,
        number_of_days: Option<u32>,
    ) -> Result<Self> {
        let medicine_name = medicine_name.into().trim().to_string();
        if medicine_name.is_empty() {
            return Err(MedAssistError::Validation(
                "medicine name is required".to_string(),
            ));
        }
        if times.is_empty() {
            return Err(MedAssistError::Validation(
                "at least one reminder time is required".to_string(),
            ));
        }

        let days = match number_of_days {
            Some(0) => {
                return Err(MedAssistError::Validation(
                    "number of days must be at least 1".to_string(),
                ))
            }
            Some(_) => Vec::new(),
            None => {
                let days: Vec<Weekday> = WEEK.into_iter().filter(|d| days.contains(d)).collect();
                if days.is_empty() {
                    return Err(MedAssistError::Validation(
                        "pick at least one weekday or a number of days".to_string(),
                    ));
                }
                days
            }
        };

        let mut times = times;
        times.sort();
        times.dedup();

        Ok(Self {
            medicine_name,
            times,
            days,
            number_of_days,
        })
    }

    pub fn medicine_name(&self) -> &str {
        &self.medicine_name
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    pub fn number_of_days(&self) -> Option<u32> {
        self.number_of_days
    }

    pub fn day_names(&self) -> Vec<&'static str> {
        self.days.iter().map(|day| weekday_name(*day)).collect()
    }

    /// Acknowledgement shown in the chat once the reminder has been stored.
    pub fn confirmation(&self) -> String {
        match self.number_of_days {
            Some(count) => format!(
                "Reminder set for {} for {count} days",
                self.medicine_name
            ),
            None => format!(
                "Reminder set for {} on {}",
                self.medicine_name,
                self.day_names().join(", ")
            ),
        }
    }
}

/// Wire shape of a reminder, matching what the reminder surface posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDraft {
    pub medicine: String,
    #[serde(default)]
    pub times: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub number_of_days: Option<u32>,
}

impl TryFrom<ReminderDraft> for Reminder {
    type Error = MedAssistError;

    fn try_from(draft: ReminderDraft) -> Result<Self> {
        let days = draft
            .days
            .iter()
            .map(|raw| parse_weekday(raw))
            .collect::<Result<Vec<_>>>()?;
        Reminder::new(draft.medicine, draft.times, days, draft.number_of_days)
    }
}

impl From<Reminder> for ReminderDraft {
    fn from(reminder: Reminder) -> Self {
        Self {
            days: reminder
                .day_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            medicine: reminder.medicine_name,
            times: reminder.times,
            number_of_days: reminder.number_of_days,
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn parse_weekday(raw: &str) -> Result<Weekday> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| MedAssistError::Validation(format!("unknown weekday: {raw}")))
}
