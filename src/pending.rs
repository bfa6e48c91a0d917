use crate::prompt_fsm::{transition, PendingPrompt, PromptAction, PromptKind};

/// Holds at most one pending prompt. Setting overwrites, consuming clears.
#[derive(Debug, Default)]
pub struct PendingPromptTracker {
    current: PendingPrompt,
}

impl PendingPromptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PendingPrompt {
        self.current
    }

    pub fn set_pending(&mut self, kind: PromptKind) {
        let previous = self.current;
        self.current = self.apply(PromptAction::Ask(kind));
        if previous.is_pending() && previous != self.current {
            tracing::debug!(?previous, next = ?self.current, "pending prompt overwritten");
        }
    }

    /// Reads and clears the pending prompt in one step.
    pub fn consume(&mut self) -> PendingPrompt {
        let taken = self.current;
        self.current = self.apply(PromptAction::Reply);
        taken
    }

    pub fn clear(&mut self) {
        self.current = PendingPrompt::None;
    }

    fn apply(&self, action: PromptAction) -> PendingPrompt {
        transition(self.current, action).unwrap_or_else(|| {
            tracing::warn!(current = ?self.current, ?action, "rejected prompt transition");
            PendingPrompt::None
        })
    }
}
