use rust_fsm::*;
use serde::Serialize;

state_machine! {
    prompt_flow(Idle)

    Idle(AskMedicineName) => AwaitingMedicineName,
    Idle(AskAyurvedicCondition) => AwaitingAyurvedicCondition,
    Idle(AskSpecialistType) => AwaitingSpecialistType,
    Idle(Reply) => Idle,

    AwaitingMedicineName(AskMedicineName) => AwaitingMedicineName,
    AwaitingMedicineName(AskAyurvedicCondition) => AwaitingAyurvedicCondition,
    AwaitingMedicineName(AskSpecialistType) => AwaitingSpecialistType,
    AwaitingMedicineName(Reply) => Idle,

    AwaitingAyurvedicCondition(AskMedicineName) => AwaitingMedicineName,
    AwaitingAyurvedicCondition(AskAyurvedicCondition) => AwaitingAyurvedicCondition,
    AwaitingAyurvedicCondition(AskSpecialistType) => AwaitingSpecialistType,
    AwaitingAyurvedicCondition(Reply) => Idle,

    AwaitingSpecialistType(AskMedicineName) => AwaitingMedicineName,
    AwaitingSpecialistType(AskAyurvedicCondition) => AwaitingAyurvedicCondition,
    AwaitingSpecialistType(AskSpecialistType) => AwaitingSpecialistType,
    AwaitingSpecialistType(Reply) => Idle
}

/// The single outstanding clarifying question, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPrompt {
    #[default]
    None,
    AwaitingMedicineName,
    AwaitingAyurvedicCondition,
    AwaitingSpecialistType,
}

impl PendingPrompt {
    pub fn is_pending(self) -> bool {
        !matches!(self, PendingPrompt::None)
    }
}

/// What a clarifying question asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    MedicineName,
    AyurvedicCondition,
    SpecialistType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptAction {
    Ask(PromptKind),
    Reply,
}

fn hydrate(machine: &mut prompt_flow::StateMachine, state: PendingPrompt) -> Result<(), ()> {
    let input = match state {
        PendingPrompt::None => return Ok(()),
        PendingPrompt::AwaitingMedicineName => prompt_flow::Input::AskMedicineName,
        PendingPrompt::AwaitingAyurvedicCondition => prompt_flow::Input::AskAyurvedicCondition,
        PendingPrompt::AwaitingSpecialistType => prompt_flow::Input::AskSpecialistType,
    };
    machine.consume(&input).map_err(|_| ())?;
    Ok(())
}

fn expected_next_state(action: PromptAction) -> PendingPrompt {
    match action {
        PromptAction::Ask(PromptKind::MedicineName) => PendingPrompt::AwaitingMedicineName,
        PromptAction::Ask(PromptKind::AyurvedicCondition) => {
            PendingPrompt::AwaitingAyurvedicCondition
        }
        PromptAction::Ask(PromptKind::SpecialistType) => PendingPrompt::AwaitingSpecialistType,
        PromptAction::Reply => PendingPrompt::None,
    }
}

/// Validates `action` against the prompt flow and returns the next state.
/// Asking always overwrites; a reply always returns to `None`.
pub fn transition(current: PendingPrompt, action: PromptAction) -> Option<PendingPrompt> {
    let mut machine = prompt_flow::StateMachine::new();
    hydrate(&mut machine, current).ok()?;

    let input = match action {
        PromptAction::Ask(PromptKind::MedicineName) => prompt_flow::Input::AskMedicineName,
        PromptAction::Ask(PromptKind::AyurvedicCondition) => {
            prompt_flow::Input::AskAyurvedicCondition
        }
        PromptAction::Ask(PromptKind::SpecialistType) => prompt_flow::Input::AskSpecialistType,
        PromptAction::Reply => prompt_flow::Input::Reply,
    };

    machine.consume(&input).ok()?;
    Some(expected_next_state(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_then_reply_returns_to_idle() {
        let asked = transition(
            PendingPrompt::None,
            PromptAction::Ask(PromptKind::MedicineName),
        );
        assert_eq!(asked, Some(PendingPrompt::AwaitingMedicineName));
        assert_eq!(
            transition(PendingPrompt::AwaitingMedicineName, PromptAction::Reply),
            Some(PendingPrompt::None)
        );
    }

    #[test]
    fn second_question_overwrites_first() {
        assert_eq!(
            transition(
                PendingPrompt::AwaitingAyurvedicCondition,
                PromptAction::Ask(PromptKind::SpecialistType)
            ),
            Some(PendingPrompt::AwaitingSpecialistType)
        );
    }

    #[test]
    fn reply_without_question_stays_idle() {
        assert_eq!(
            transition(PendingPrompt::None, PromptAction::Reply),
            Some(PendingPrompt::None)
        );
    }
}
