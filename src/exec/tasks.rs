use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::CollaboratorError;

use super::collaborators::{ActionOutcome, CollabResult, TaskStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub due: Option<NaiveDateTime>,
    pub done: bool,
    pub created_at: NaiveDateTime,
}

/// Task list persisted as one JSON file. The whole list is held in memory
/// behind a mutex and rewritten on every mutation; task lists are small
/// enough that this is simpler than anything incremental.
pub struct FileTaskStore {
    path: PathBuf,
    tasks: Mutex<Vec<Task>>,
}

impl FileTaskStore {
    pub fn load(path: PathBuf) -> Self {
        let tasks = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            tasks: Mutex::new(tasks),
        }
    }

    async fn persist(&self, tasks: &[Task]) -> Result<(), CollaboratorError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(tasks)
            .map_err(|e| CollaboratorError::Backend(format!("task encoding failed: {}", e)))?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn create_task(&self, text: &str, due: Option<NaiveDateTime>) -> CollabResult {
        let mut tasks = self.tasks.lock().await;
        let task = Task {
            id: Uuid::new_v4(),
            text: text.to_string(),
            due,
            done: false,
            created_at: chrono::Local::now().naive_local(),
        };
        debug!(id = %task.id, "created task");
        tasks.push(task);
        self.persist(&tasks).await?;

        let spoken = match due {
            Some(when) => format!(
                "Added task: {}, due {}.",
                text,
                when.format("%A at %-I:%M %p")
            ),
            None => format!("Added task: {}.", text),
        };
        Ok(ActionOutcome::ok(spoken))
    }

    async fn list_tasks(&self) -> CollabResult {
        let tasks = self.tasks.lock().await;
        let open: Vec<&Task> = tasks.iter().filter(|t| !t.done).collect();
        if open.is_empty() {
            return Ok(ActionOutcome::ok("You have no open tasks."));
        }
        let names: Vec<String> = open.iter().map(|t| t.text.clone()).collect();
        let spoken = format!(
            "You have {} open {}: {}.",
            open.len(),
            if open.len() == 1 { "task" } else { "tasks" },
            names.join(", ")
        );
        Ok(ActionOutcome::with_data(
            spoken,
            serde_json::json!({ "tasks": open }),
        ))
    }

    async fn complete_task(&self, name: &str) -> CollabResult {
        let mut tasks = self.tasks.lock().await;
        let needle = name.to_lowercase();
        let task = tasks
            .iter_mut()
            .find(|t| !t.done && t.text.to_lowercase().contains(&needle))
            .ok_or_else(|| CollaboratorError::NotFound(format!("no open task matching {}", name)))?;
        task.done = true;
        let text = task.text.clone();
        self.persist(&tasks).await?;
        Ok(ActionOutcome::ok(format!("Marked {} as done.", text)))
    }
}
