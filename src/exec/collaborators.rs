use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::time::Duration;

use crate::error::CollaboratorError;

/// Uniform success payload from a collaborator call: a human-readable
/// message (spoken back verbatim) plus optional structured data.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

pub type CollabResult = Result<ActionOutcome, CollaboratorError>;

/// OS automation: process control, audio, file ops. May be slow; the
/// dispatcher wraps every call in a timeout.
#[async_trait]
pub trait Automation: Send + Sync {
    async fn launch_app(&self, name: &str) -> CollabResult;
    async fn close_app(&self, name: &str) -> CollabResult;
    async fn set_volume(&self, percent: u8) -> CollabResult;
    async fn move_file(&self, source: &str, destination: &str) -> CollabResult;
    async fn delete_file(&self, path: &str) -> CollabResult;
    async fn shutdown(&self) -> CollabResult;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, text: &str, due: Option<NaiveDateTime>) -> CollabResult;
    async fn list_tasks(&self) -> CollabResult;
    async fn complete_task(&self, name: &str) -> CollabResult;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create_note(&self, text: &str) -> CollabResult;
    async fn search_notes(&self, query: &str) -> CollabResult;
}

#[async_trait]
pub trait TimerService: Send + Sync {
    async fn set_timer(&self, duration: Duration) -> CollabResult;
}

#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn get_weather(&self, location: Option<&str>) -> CollabResult;
}

/// Conversational fallback. Returns the reply text to speak.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn chat_fallback(&self, text: &str) -> Result<String, CollaboratorError>;
}
