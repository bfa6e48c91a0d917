use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::warn;

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};

use crate::config::Config;
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::ChatCompletionService;

const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a careful medical assistant in a chat widget. \
Answer general health questions briefly and in plain language. \
You do not diagnose; recommend seeing a doctor for anything serious and \
calling emergency services for emergencies.";

/// General questions answered by an OpenAI-compatible `/chat/completions`
/// endpoint.
#[derive(Clone)]
pub struct OpenAiChatService {
    model: String,
    api_key: String,
    base_url: String,
    system_prompt: String,
    client: reqwest::Client,
}

impl OpenAiChatService {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.openai_api_key().ok_or_else(|| {
            MedAssistError::Config(
                "missing OpenAI API key (openai.api_key or OPENAI_API_KEY)".to_string(),
            )
        })?;
        let openai = config.openai.clone().unwrap_or_default();
        let service = Self::new(api_key, openai.model, openai.base_url);
        Ok(match openai.system_prompt {
            Some(prompt) if !prompt.trim().is_empty() => service.with_system_prompt(prompt),
            _ => service,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, text: &str) -> Result<CreateChatCompletionRequest> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.system_prompt.clone())
            .build()
            .map_err(|e| MedAssistError::Runtime(e.to_string()))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(
                text.to_string(),
            ))
            .build()
            .map_err(|e| MedAssistError::Runtime(e.to_string()))?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(self.model.clone());
        builder.messages(vec![
            ChatCompletionRequestMessage::System(system),
            ChatCompletionRequestMessage::User(user),
        ]);
        builder
            .build()
            .map_err(|e| MedAssistError::Runtime(e.to_string()))
    }

    async fn raw_chat_completion(&self, request: &CreateChatCompletionRequest) -> Result<Value> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        for attempt in 0..3 {
            let response = self
                .client
                .post(url.clone())
                .bearer_auth(&self.api_key)
                .json(request)
                .send()
                .await
                .map_err(|e| {
                    MedAssistError::Http(format!("Chat completion transport failed: {e}"))
                })?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| MedAssistError::Http(format!("Chat completion read failed: {e}")))?;

            if status == StatusCode::OK {
                return serde_json::from_str(&body).map_err(|e| {
                    MedAssistError::Serialization(format!("Chat completion decode failed: {e}"))
                });
            }

            let retryable = status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
            if retryable && attempt < 2 {
                warn!(%status, attempt, "chat completion failed, retrying");
                tokio::time::sleep(Duration::from_millis(150 * (attempt + 1) as u64)).await;
                continue;
            }

            return Err(MedAssistError::Http(format!(
                "Chat completion failed ({status}): {body}"
            )));
        }

        Err(MedAssistError::Http(
            "Chat completion failed after retries".to_string(),
        ))
    }

    fn extract_text_from_value(response: &Value) -> Option<String> {
        response
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

#[async_trait]
impl ChatCompletionService for OpenAiChatService {
    async fn ask(&self, text: &str) -> Result<String> {
        let request = self.build_request(text)?;
        let response = self.raw_chat_completion(&request).await?;
        Self::extract_text_from_value(&response).ok_or_else(|| {
            MedAssistError::Serialization("Chat completion returned no text".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_choice_text() {
        let value = json!({"choices": [{"message": {"role": "assistant", "content": " Rest well. "}}]});
        assert_eq!(
            OpenAiChatService::extract_text_from_value(&value).as_deref(),
            Some("Rest well.")
        );
        assert_eq!(
            OpenAiChatService::extract_text_from_value(&json!({"choices": []})),
            None
        );
    }

    #[test]
    fn request_carries_system_and_user_messages() {
        let service = OpenAiChatService::new("key".to_string(), Some("m".to_string()), None)
            .with_system_prompt("be brief");
        let request = service.build_request("is coffee bad?").unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], json!("m"));
        assert_eq!(value["messages"][0]["role"], json!("system"));
        assert_eq!(value["messages"][1]["content"], json!("is coffee bad?"));
    }

    #[test]
    fn from_config_requires_a_key() {
        let config = Config {
            openai: Some(crate::config::OpenAiConfig {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            }),
            ..Config::default()
        };
        let service = OpenAiChatService::from_config(&config).unwrap();
        assert_eq!(service.model(), DEFAULT_MODEL);
    }
}
