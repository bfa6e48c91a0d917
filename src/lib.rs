pub mod commands;
pub mod config;
pub mod daemon;
pub mod db;
pub mod domains;
pub mod error;
pub mod factory;
pub mod interfaces;
pub mod kv_store;
pub mod logging;
pub mod message_log;
pub mod pending;
pub mod prompt_fsm;
pub mod providers;
pub mod reminders;
pub mod render;
pub mod repl;
pub mod services;
pub mod tips;

pub type Result<T> = std::result::Result<T, error::MedAssistError>;
