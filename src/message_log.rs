use chrono::Utc;

use crate::domains::message::{Message, MessageId, OutgoingMessage};

pub const GREETING: &str = "Hello! I'm your medical assistant. How can I help you today?";

/// Append-only conversation record. The only other mutation is a wholesale
/// reset back to the greeting. Ids keep counting across resets.
#[derive(Debug)]
pub struct MessageLog {
    messages: Vec<Message>,
    next_id: u64,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    pub fn new() -> Self {
        let mut log = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        log.append(OutgoingMessage::bot(GREETING));
        log
    }

    pub fn append(&mut self, outgoing: OutgoingMessage) -> Message {
        let message = Message {
            id: MessageId::new(self.next_id),
            text: outgoing.text,
            sender: outgoing.sender,
            timestamp: Utc::now(),
            is_emergency_numbers: outgoing.is_emergency_numbers,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.append(OutgoingMessage::bot(GREETING));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
