use chrono::{DateTime, Utc};
use serde::Serialize;

/// Text carried by the message that the rendering side swaps for the
/// structured emergency-contacts panel.
pub const EMERGENCY_NUMBERS_MARKER: &str = "EMERGENCY_NUMBERS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Per-session monotonic message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub is_emergency_numbers: bool,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

/// A message the dispatcher wants appended; the log assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub sender: Sender,
    pub is_emergency_numbers: bool,
}

impl OutgoingMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            is_emergency_numbers: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            is_emergency_numbers: false,
        }
    }

    pub fn emergency_numbers() -> Self {
        Self {
            text: EMERGENCY_NUMBERS_MARKER.to_string(),
            sender: Sender::Bot,
            is_emergency_numbers: true,
        }
    }
}
