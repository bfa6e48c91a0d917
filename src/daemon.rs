use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::commands::{self, CommandSpec, COMMANDS};
use crate::config::Config;
use crate::domains::medical::{Coordinates, EmergencyContact, EMERGENCY_CONTACTS};
use crate::domains::message::Message;
use crate::domains::reminder::{Reminder, ReminderDraft};
use crate::error::{MedAssistError, Result};
use crate::factory;
use crate::prompt_fsm::PendingPrompt;
use crate::providers::geolocation::ReportedGeolocation;
use crate::render;
use crate::services::session::ChatSession;

#[derive(Clone)]
pub struct AppState {
    pub session: ChatSession,
    /// Fed from the coordinates the browser sends with a command.
    pub geolocation: Arc<ReportedGeolocation>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct MessageView<'a> {
    #[serde(flatten)]
    message: &'a Message,
    html: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationResponse<'a> {
    messages: Vec<MessageView<'a>>,
    is_waiting_for_response: bool,
    pending_prompt: PendingPrompt,
    reminder_form_open: bool,
}

#[derive(Serialize)]
struct CommandsResponse {
    commands: &'static [CommandSpec],
}

#[derive(Serialize)]
struct RemindersResponse {
    reminders: Vec<ReminderDraft>,
}

#[derive(Serialize)]
struct EmergencyNumbersResponse {
    contacts: &'static [EmergencyContact],
}

/// Either the visible label or the short id of a quick command.
#[derive(Deserialize)]
struct CommandRequest {
    command: Option<String>,
    id: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Deserialize)]
struct MessageRequest {
    text: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/messages", get(messages))
        .route("/api/command", post(command))
        .route("/api/message", post(message))
        .route("/api/reset", post(reset))
        .route("/api/commands", get(list_commands))
        .route("/api/reminders", get(list_reminders).post(create_reminder))
        .route("/api/emergency-numbers", get(emergency_numbers))
        .route("/api/events", get(events))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn messages(State(state): State<AppState>) -> impl IntoResponse {
    conversation_response(&state.session)
}

async fn command(
    State(state): State<AppState>,
    Json(payload): Json<CommandRequest>,
) -> impl IntoResponse {
    let label = match (&payload.command, &payload.id) {
        (Some(label), _) => label.clone(),
        (None, Some(id)) => match commands::by_id(id) {
            Some(spec) => spec.label.to_string(),
            None => {
                return error_response(MedAssistError::Validation(format!(
                    "unknown command id: {id}"
                )))
            }
        },
        (None, None) => {
            return error_response(MedAssistError::Validation(
                "command or id is required".to_string(),
            ))
        }
    };

    if let (Some(latitude), Some(longitude)) = (payload.latitude, payload.longitude) {
        if let Err(err) = state
            .geolocation
            .report(Coordinates::new(latitude, longitude))
            .await
        {
            return error_response(err);
        }
    }

    match state.session.handle_command(&label).await {
        Ok(()) => conversation_response(&state.session),
        Err(err) => error_response(err),
    }
}

async fn message(
    State(state): State<AppState>,
    Json(payload): Json<MessageRequest>,
) -> impl IntoResponse {
    match state.session.handle_user_message(&payload.text).await {
        Ok(()) => conversation_response(&state.session),
        Err(err) => error_response(err),
    }
}

async fn reset(State(state): State<AppState>) -> impl IntoResponse {
    state.session.reset_messages();
    conversation_response(&state.session)
}

async fn list_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: &COMMANDS,
    })
}

async fn list_reminders(State(state): State<AppState>) -> Json<RemindersResponse> {
    Json(RemindersResponse {
        reminders: state
            .session
            .reminders()
            .into_iter()
            .map(ReminderDraft::from)
            .collect(),
    })
}

async fn create_reminder(
    State(state): State<AppState>,
    Json(draft): Json<ReminderDraft>,
) -> impl IntoResponse {
    let reminder = match Reminder::try_from(draft) {
        Ok(reminder) => reminder,
        Err(err) => return error_response(err),
    };
    match state.session.submit_reminder(reminder).await {
        Ok(()) => conversation_response(&state.session),
        Err(err) => error_response(err),
    }
}

async fn emergency_numbers() -> Json<EmergencyNumbersResponse> {
    Json(EmergencyNumbersResponse {
        contacts: &EMERGENCY_CONTACTS,
    })
}

/// Server-sent events: the current conversation first, then a fresh
/// snapshot after every change.
async fn events(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.clone();
    let mut updates = session.subscribe();

    let body = Body::from_stream(async_stream::stream! {
        loop {
            let messages = updates.borrow_and_update().clone();
            if let Some(frame) = sse_frame(&conversation(&session, &messages)) {
                yield Ok::<Bytes, Infallible>(frame);
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

fn sse_frame<T: Serialize>(value: &T) -> Option<Bytes> {
    match serde_json::to_string(value) {
        Ok(payload) => Some(Bytes::from(format!("data: {payload}\n\n"))),
        Err(err) => {
            tracing::warn!(error = %err, "skipping event frame that failed to serialize");
            None
        }
    }
}

fn conversation<'a>(session: &ChatSession, messages: &'a [Message]) -> ConversationResponse<'a> {
    ConversationResponse {
        messages: messages
            .iter()
            .map(|message| MessageView {
                message,
                html: render::message_html(message),
            })
            .collect(),
        is_waiting_for_response: session.is_waiting_for_response(),
        pending_prompt: session.pending_prompt(),
        reminder_form_open: session.is_reminder_form_open(),
    }
}

fn conversation_response(session: &ChatSession) -> Response {
    let messages = session.messages();
    (StatusCode::OK, Json(conversation(session, &messages))).into_response()
}

fn error_response(err: MedAssistError) -> Response {
    let status = match &err {
        MedAssistError::Busy => StatusCode::TOO_MANY_REQUESTS,
        MedAssistError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

pub async fn run(config: &Config, host: &str, port: u16) -> Result<()> {
    run_with_shutdown(config, host, port, std::future::pending::<()>()).await
}

pub async fn run_with_shutdown<F>(config: &Config, host: &str, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let geolocation = Arc::new(ReportedGeolocation::new());
    let session = factory::build_session(config, geolocation.clone()).await?;
    let app = build_router(AppState {
        session,
        geolocation,
    });

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MedAssistError::Runtime(e.to_string()))?;
    tracing::info!(addr = %addr, "medassist daemon listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| MedAssistError::Runtime(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[test]
    fn event_frames_wrap_json_in_a_data_line() {
        let frame = sse_frame(&HealthResponse {
            status: "ok".to_string(),
        })
        .unwrap();
        assert_eq!(&frame[..], b"data: {\"status\":\"ok\"}\n\n");
    }

    #[test]
    fn unserializable_snapshot_yields_no_frame() {
        assert!(sse_frame(&Unserializable).is_none());
    }
}
