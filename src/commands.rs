use serde::Serialize;

/// The closed set of quick commands offered by the chat surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickCommand {
    FindDoctor,
    NearbyHospital,
    AyurvedicTips,
    MedicineReminder,
    EmergencyHelp,
    MedicinePurpose,
    DailyHealthTip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub command: QuickCommand,
}

/// Display order matches the quick-command bar.
pub const COMMANDS: [CommandSpec; 7] = [
    CommandSpec {
        id: "doctor",
        label: "I need a doctor",
        icon: "user",
        command: QuickCommand::FindDoctor,
    },
    CommandSpec {
        id: "hospital",
        label: "Find a nearby hospital",
        icon: "hospital",
        command: QuickCommand::NearbyHospital,
    },
    CommandSpec {
        id: "ayurvedic",
        label: "Give me ayurvedic tips",
        icon: "leaf",
        command: QuickCommand::AyurvedicTips,
    },
    CommandSpec {
        id: "reminder",
        label: "Remind me to take medicine",
        icon: "clock",
        command: QuickCommand::MedicineReminder,
    },
    CommandSpec {
        id: "emergency",
        label: "Emergency help",
        icon: "alert-circle",
        command: QuickCommand::EmergencyHelp,
    },
    CommandSpec {
        id: "medicine",
        label: "What's this medicine for?",
        icon: "pill",
        command: QuickCommand::MedicinePurpose,
    },
    CommandSpec {
        id: "healthTip",
        label: "Daily health tip",
        icon: "heart",
        command: QuickCommand::DailyHealthTip,
    },
];

impl QuickCommand {
    pub fn spec(self) -> &'static CommandSpec {
        COMMANDS
            .iter()
            .find(|spec| spec.command == self)
            .unwrap_or(&COMMANDS[0])
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }
}

/// A command label resolved against the registry. Matching is exact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Known(QuickCommand),
    Unrecognized(String),
}

impl Command {
    pub fn parse(label: &str) -> Self {
        COMMANDS
            .iter()
            .find(|spec| spec.label == label)
            .map(|spec| Command::Known(spec.command))
            .unwrap_or_else(|| Command::Unrecognized(label.to_string()))
    }
}

pub fn by_id(id: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.id == id)
}
