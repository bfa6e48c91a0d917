use thiserror::Error;

#[derive(Debug, Error)]
pub enum MedAssistError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("still waiting for the previous response")]
    Busy,
}

pub use crate::Result;

impl From<serde_json::Error> for MedAssistError {
    fn from(err: serde_json::Error) -> Self {
        MedAssistError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for MedAssistError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MedAssistError::Serialization(err.to_string())
        } else {
            MedAssistError::Http(err.to_string())
        }
    }
}
