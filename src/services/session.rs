use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::commands::{Command, QuickCommand};
use crate::domains::medical::Lookup;
use crate::domains::message::{Message, OutgoingMessage};
use crate::domains::reminder::Reminder;
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::{
    AyurvedicTipsService, ChatCompletionService, GeolocationProvider, HospitalLocatorService,
    MedicineInfoService, ReminderStoreService, SpecialistDirectoryService,
};
use crate::message_log::MessageLog;
use crate::pending::PendingPromptTracker;
use crate::prompt_fsm::{PendingPrompt, PromptKind};
use crate::services::format;
use crate::tips::DailyTipRotation;

/// Everything the dispatcher calls out to.
#[derive(Clone)]
pub struct Collaborators {
    pub chat: Arc<dyn ChatCompletionService>,
    pub medicine: Arc<dyn MedicineInfoService>,
    pub ayurveda: Arc<dyn AyurvedicTipsService>,
    pub specialists: Arc<dyn SpecialistDirectoryService>,
    pub hospitals: Arc<dyn HospitalLocatorService>,
    pub geolocation: Arc<dyn GeolocationProvider>,
    pub reminders: Arc<dyn ReminderStoreService>,
}

struct LogState {
    log: MessageLog,
    /// Bumped by every reset; background results from an older epoch are
    /// dropped.
    epoch: u64,
}

struct SessionInner {
    log: Mutex<LogState>,
    pending: Mutex<PendingPromptTracker>,
    waiting: Arc<AtomicBool>,
    reminder_form_open: AtomicBool,
    reminders: Mutex<Vec<Reminder>>,
    background: Mutex<Vec<JoinHandle<()>>>,
    updates: watch::Sender<Vec<Message>>,
    tips: DailyTipRotation,
    services: Collaborators,
    /// Used for the wording of the hospital reply only.
    hospital_radius_meters: u32,
}

/// One conversation: message log, pending prompt, waiting flag and the
/// collaborators used to answer. Cloning yields another handle to the same
/// conversation.
///
/// Dispatches are serialized by the waiting flag: while one is in flight,
/// [`ChatSession::handle_command`] and [`ChatSession::handle_user_message`]
/// return [`MedAssistError::Busy`] without touching any state.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

/// Read-only view of the waiting flag, for observers that must not hold the
/// session itself.
#[derive(Clone)]
pub struct WaitingProbe(Arc<AtomicBool>);

impl WaitingProbe {
    pub fn is_waiting(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct WaitingGuard {
    flag: Arc<AtomicBool>,
}

impl WaitingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MedAssistError::Busy)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for WaitingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl ChatSession {
    /// `hospital_radius_meters` only affects the wording of the hospital
    /// reply; the locator owns the actual search radius.
    pub fn new(
        services: Collaborators,
        tips: DailyTipRotation,
        hospital_radius_meters: u32,
    ) -> Self {
        let log = MessageLog::new();
        let (updates, _) = watch::channel(log.messages().to_vec());
        Self {
            inner: Arc::new(SessionInner {
                log: Mutex::new(LogState { log, epoch: 0 }),
                pending: Mutex::new(PendingPromptTracker::new()),
                waiting: Arc::new(AtomicBool::new(false)),
                reminder_form_open: AtomicBool::new(false),
                reminders: Mutex::new(Vec::new()),
                background: Mutex::new(Vec::new()),
                updates,
                tips,
                services,
                hospital_radius_meters,
            }),
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.inner.log).log.messages().to_vec()
    }

    /// Receives the full message list after every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.inner.updates.subscribe()
    }

    pub fn is_waiting_for_response(&self) -> bool {
        self.inner.waiting.load(Ordering::Acquire)
    }

    pub fn waiting_probe(&self) -> WaitingProbe {
        WaitingProbe(Arc::clone(&self.inner.waiting))
    }

    pub fn pending_prompt(&self) -> PendingPrompt {
        lock(&self.inner.pending).current()
    }

    pub fn reminders(&self) -> Vec<Reminder> {
        lock(&self.inner.reminders).clone()
    }

    pub fn is_reminder_form_open(&self) -> bool {
        self.inner.reminder_form_open.load(Ordering::Acquire)
    }

    pub fn close_reminder_form(&self) {
        self.inner.reminder_form_open.store(false, Ordering::Release);
    }

    pub fn tips(&self) -> &DailyTipRotation {
        &self.inner.tips
    }

    /// Replaces the log with the greeting and drops any pending prompt.
    /// In-flight background lookups keep running; their results are
    /// discarded.
    pub fn reset_messages(&self) {
        {
            let mut state = lock(&self.inner.log);
            state.log.reset();
            state.epoch += 1;
            self.inner.updates.send_replace(state.log.messages().to_vec());
        }
        lock(&self.inner.pending).clear();
        info!("conversation reset");
    }

    #[tracing::instrument(skip(self))]
    pub async fn handle_command(&self, label: &str) -> Result<()> {
        let _waiting = WaitingGuard::acquire(&self.inner.waiting)?;
        self.append(OutgoingMessage::user(label));

        match Command::parse(label) {
            Command::Known(command) => self.run_command(command).await,
            Command::Unrecognized(label) => {
                debug!(label = %label, "unrecognized command");
                self.append(OutgoingMessage::bot(format::UNKNOWN_COMMAND));
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, text), fields(len = text.len()))]
    pub async fn handle_user_message(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(MedAssistError::Validation("message is empty".to_string()));
        }
        let _waiting = WaitingGuard::acquire(&self.inner.waiting)?;
        let pending = lock(&self.inner.pending).consume();
        self.append(OutgoingMessage::user(text));

        let reply = match pending {
            PendingPrompt::AwaitingMedicineName => self.medicine_reply(text.trim()).await,
            PendingPrompt::AwaitingAyurvedicCondition => self.ayurvedic_reply(text.trim()).await,
            PendingPrompt::AwaitingSpecialistType => self.specialist_reply(text.trim()).await,
            PendingPrompt::None => self.chat_reply(text).await,
        };
        self.append(OutgoingMessage::bot(reply));
        Ok(())
    }

    /// Stores the reminder, then acknowledges it in the conversation.
    pub async fn submit_reminder(&self, reminder: Reminder) -> Result<()> {
        if let Err(err) = self.inner.services.reminders.save(&reminder).await {
            warn!(error = %err, medicine = reminder.medicine_name(), "failed to save reminder");
            return Err(err);
        }
        let confirmation = reminder.confirmation();
        lock(&self.inner.reminders).push(reminder);
        self.close_reminder_form();
        self.append(OutgoingMessage::bot(confirmation));
        Ok(())
    }

    /// Reloads the reminder list from the store.
    pub async fn refresh_reminders(&self) -> Result<usize> {
        let stored = self.inner.services.reminders.list().await?;
        let count = stored.len();
        *lock(&self.inner.reminders) = stored;
        Ok(count)
    }

    /// Waits for detached lookups started so far.
    pub async fn wait_for_background(&self) {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *lock(&self.inner.background));
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "background lookup panicked");
            }
        }
    }

    async fn run_command(&self, command: QuickCommand) {
        match command {
            QuickCommand::AyurvedicTips => {
                self.ask(PromptKind::AyurvedicCondition, format::AYURVEDIC_QUESTION)
            }
            QuickCommand::FindDoctor => {
                self.ask(PromptKind::SpecialistType, format::SPECIALIST_QUESTION)
            }
            QuickCommand::MedicinePurpose => {
                self.ask(PromptKind::MedicineName, format::MEDICINE_QUESTION)
            }
            QuickCommand::NearbyHospital => {
                self.append(OutgoingMessage::bot(format::LOCATING_HOSPITALS));
                self.spawn_hospital_lookup();
            }
            QuickCommand::MedicineReminder => {
                self.inner.reminder_form_open.store(true, Ordering::Release);
                self.append(OutgoingMessage::bot(format::OPENING_REMINDER));
            }
            QuickCommand::EmergencyHelp => {
                self.append(OutgoingMessage::bot(format::EMERGENCY_ACK));
                self.append(OutgoingMessage::emergency_numbers());
            }
            QuickCommand::DailyHealthTip => {
                let tip = self.inner.tips.daily_tip().await;
                self.append(OutgoingMessage::bot(tip));
            }
        }
    }

    fn ask(&self, kind: PromptKind, question: &str) {
        lock(&self.inner.pending).set_pending(kind);
        self.append(OutgoingMessage::bot(question));
    }

    async fn medicine_reply(&self, name: &str) -> String {
        match self.inner.services.medicine.lookup(name).await {
            Ok(Lookup::Found(info)) => format::medicine_info(&info),
            Ok(Lookup::NotFound(message)) => message,
            Err(err) => {
                warn!(error = %err, "medicine lookup failed");
                format::MEDICINE_ERROR.to_string()
            }
        }
    }

    async fn ayurvedic_reply(&self, condition: &str) -> String {
        match self.inner.services.ayurveda.lookup(condition).await {
            Ok(Lookup::Found(tips)) => format::ayurvedic_tips(condition, &tips),
            Ok(Lookup::NotFound(message)) => message,
            Err(err) => {
                warn!(error = %err, "ayurvedic lookup failed");
                format::AYURVEDIC_ERROR.to_string()
            }
        }
    }

    async fn specialist_reply(&self, specialist_type: &str) -> String {
        match self.inner.services.specialists.lookup(specialist_type).await {
            Ok(specialists) => format::specialists(specialist_type, &specialists),
            Err(err) => {
                warn!(error = %err, "specialist lookup failed");
                format::SPECIALIST_ERROR.to_string()
            }
        }
    }

    async fn chat_reply(&self, text: &str) -> String {
        match self.inner.services.chat.ask(text).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "chat completion failed");
                format::GENERIC_ERROR.to_string()
            }
        }
    }

    fn spawn_hospital_lookup(&self) {
        let epoch = lock(&self.inner.log).epoch;
        let session = self.clone();
        let handle = tokio::spawn(async move {
            session.locate_hospitals(epoch).await;
        });
        let mut background = lock(&self.inner.background);
        background.retain(|handle| !handle.is_finished());
        background.push(handle);
    }

    async fn locate_hospitals(&self, epoch: u64) {
        let position = match self.inner.services.geolocation.current_position().await {
            Ok(Some(position)) => position,
            Ok(None) => {
                debug!("location not available, skipping hospital search");
                return;
            }
            Err(err) => {
                debug!(error = %err, "location request failed, skipping hospital search");
                return;
            }
        };

        let text = match self.inner.services.hospitals.lookup(position).await {
            Ok(hospitals) => format::hospitals(&hospitals, self.inner.hospital_radius_meters),
            Err(err) => {
                warn!(error = %err, "hospital lookup failed");
                format::HOSPITAL_ERROR.to_string()
            }
        };

        if !self.append_in_epoch(epoch, OutgoingMessage::bot(text)) {
            debug!("dropping hospital results from before a reset");
        }
    }

    fn append(&self, message: OutgoingMessage) -> Message {
        let mut state = lock(&self.inner.log);
        let appended = state.log.append(message);
        self.inner.updates.send_replace(state.log.messages().to_vec());
        appended
    }

    fn append_in_epoch(&self, epoch: u64, message: OutgoingMessage) -> bool {
        let mut state = lock(&self.inner.log);
        if state.epoch != epoch {
            return false;
        }
        state.log.append(message);
        self.inner.updates.send_replace(state.log.messages().to_vec());
        true
    }
}
