use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::CollaboratorError;

use super::collaborators::{ActionOutcome, CollabResult, NoteStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub text: String,
    pub created_at: NaiveDateTime,
}

/// Notes persisted the same way as tasks: one JSON file, full rewrite on
/// each mutation. Search is case-insensitive substring match.
pub struct FileNoteStore {
    path: PathBuf,
    notes: Mutex<Vec<Note>>,
}

impl FileNoteStore {
    pub fn load(path: PathBuf) -> Self {
        let notes = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            notes: Mutex::new(notes),
        }
    }

    async fn persist(&self, notes: &[Note]) -> Result<(), CollaboratorError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(notes)
            .map_err(|e| CollaboratorError::Backend(format!("note encoding failed: {}", e)))?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl NoteStore for FileNoteStore {
    async fn create_note(&self, text: &str) -> CollabResult {
        let mut notes = self.notes.lock().await;
        notes.push(Note {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: chrono::Local::now().naive_local(),
        });
        self.persist(&notes).await?;
        Ok(ActionOutcome::ok(format!("Noted: {}.", text)))
    }

    async fn search_notes(&self, query: &str) -> CollabResult {
        let notes = self.notes.lock().await;
        let needle = query.to_lowercase();
        let hits: Vec<&Note> = notes
            .iter()
            .filter(|n| n.text.to_lowercase().contains(&needle))
            .collect();
        if hits.is_empty() {
            return Ok(ActionOutcome::ok(format!(
                "I couldn't find any notes about {}.",
                query
            )));
        }
        let texts: Vec<String> = hits.iter().map(|n| n.text.clone()).collect();
        let spoken = format!(
            "I found {} {}: {}.",
            hits.len(),
            if hits.len() == 1 { "note" } else { "notes" },
            texts.join(". ")
        );
        Ok(ActionOutcome::with_data(
            spoken,
            serde_json::json!({ "notes": hits }),
        ))
    }
}
