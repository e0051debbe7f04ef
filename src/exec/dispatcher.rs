use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::{CollaboratorError, InternalError};
use crate::kernel::types::{ActionDescriptor, ResolutionResult};
use crate::nlu::catalog::IntentCategory;
use crate::nlu::extractor::EntitySet;

use super::collaborators::{
    ActionOutcome, Automation, ChatService, CollabResult, NoteStore, TaskStore, TimerService,
    WeatherService,
};

/// Upper-bound time budgets per collaborator family. A call that exceeds its
/// budget surfaces as a timeout failure result, never a hang.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutBudgets {
    pub automation: Duration,
    pub storage: Duration,
    pub network: Duration,
}

impl Default for TimeoutBudgets {
    fn default() -> Self {
        Self {
            automation: Duration::from_secs(5),
            storage: Duration::from_secs(2),
            network: Duration::from_secs(8),
        }
    }
}

/// Maps a gated descriptor to exactly one collaborator call and normalizes
/// every outcome (success, typed failure, timeout) into a
/// `ResolutionResult`. Holds no lock across collaborator calls; all shared
/// state lives behind the collaborators themselves.
pub struct Dispatcher {
    automation: Arc<dyn Automation>,
    tasks: Arc<dyn TaskStore>,
    notes: Arc<dyn NoteStore>,
    timers: Arc<dyn TimerService>,
    weather: Arc<dyn WeatherService>,
    chat: Arc<dyn ChatService>,
    budgets: TimeoutBudgets,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        automation: Arc<dyn Automation>,
        tasks: Arc<dyn TaskStore>,
        notes: Arc<dyn NoteStore>,
        timers: Arc<dyn TimerService>,
        weather: Arc<dyn WeatherService>,
        chat: Arc<dyn ChatService>,
        budgets: TimeoutBudgets,
    ) -> Self {
        Self {
            automation,
            tasks,
            notes,
            timers,
            weather,
            chat,
            budgets,
        }
    }

    /// Only called after the gate returned proceed (or after an explicit
    /// confirmation re-submitted a previously gated descriptor). A category
    /// with no mapping here is a broken routing invariant, reported as an
    /// internal error rather than swallowed.
    pub async fn dispatch(
        &self,
        descriptor: &ActionDescriptor,
    ) -> Result<ResolutionResult, InternalError> {
        use IntentCategory::*;

        let entities = &descriptor.entities;
        debug!(category = ?descriptor.category, "dispatching action");

        let result = match descriptor.category {
            VolumeControl => {
                let level = match req_number(entities, "level") {
                    Ok(n) => n.clamp(0.0, 100.0) as u8,
                    Err(e) => return Ok(failure(e)),
                };
                timed(self.budgets.automation, "automation", self.automation.set_volume(level))
                    .await
            }
            AppLaunch => match req_text(entities, "target_app") {
                Ok(name) => {
                    timed(self.budgets.automation, "automation", self.automation.launch_app(name))
                        .await
                }
                Err(e) => return Ok(failure(e)),
            },
            AppClose => match req_text(entities, "target_app") {
                Ok(name) => {
                    timed(self.budgets.automation, "automation", self.automation.close_app(name))
                        .await
                }
                Err(e) => return Ok(failure(e)),
            },
            FileMove => {
                let source = req_text(entities, "source_path");
                let dest = req_text(entities, "destination_path");
                match (source, dest) {
                    (Ok(source), Ok(dest)) => {
                        timed(
                            self.budgets.automation,
                            "automation",
                            self.automation.move_file(source, dest),
                        )
                        .await
                    }
                    (Err(e), _) | (_, Err(e)) => return Ok(failure(e)),
                }
            }
            FileDelete => match req_text(entities, "path") {
                Ok(path) => {
                    timed(self.budgets.automation, "automation", self.automation.delete_file(path))
                        .await
                }
                Err(e) => return Ok(failure(e)),
            },
            SystemShutdown => {
                timed(self.budgets.automation, "automation", self.automation.shutdown()).await
            }
            TaskCreate => match req_text(entities, "content") {
                Ok(content) => {
                    let due = entities.timestamp("when");
                    timed(self.budgets.storage, "task store", self.tasks.create_task(content, due))
                        .await
                }
                Err(e) => return Ok(failure(e)),
            },
            TaskList => timed(self.budgets.storage, "task store", self.tasks.list_tasks()).await,
            TaskComplete => match req_text(entities, "content") {
                Ok(name) => {
                    timed(self.budgets.storage, "task store", self.tasks.complete_task(name)).await
                }
                Err(e) => return Ok(failure(e)),
            },
            NoteCreate => match req_text(entities, "content") {
                Ok(content) => {
                    timed(self.budgets.storage, "note store", self.notes.create_note(content)).await
                }
                Err(e) => return Ok(failure(e)),
            },
            NoteSearch => match req_text(entities, "query") {
                Ok(query) => {
                    timed(self.budgets.storage, "note store", self.notes.search_notes(query)).await
                }
                Err(e) => return Ok(failure(e)),
            },
            TimerSet => match entities.duration_secs("duration_secs") {
                Some(secs) => {
                    timed(
                        self.budgets.storage,
                        "timer",
                        self.timers.set_timer(Duration::from_secs(secs)),
                    )
                    .await
                }
                None => {
                    return Ok(failure(CollaboratorError::InvalidArgument(
                        "no duration given".into(),
                    )))
                }
            },
            WeatherQuery => {
                let location = entities.text("location");
                timed(self.budgets.network, "weather", self.weather.get_weather(location)).await
            }
            ChatFallback => return Ok(self.fallback(entities.text("content").unwrap_or("")).await),
            Unknown => {
                error!("descriptor with unmapped category reached the dispatcher");
                return Err(InternalError::UnmappedCategory(descriptor.category));
            }
        };

        Ok(normalize(result))
    }

    /// The conversational path: raw text in, reply out. Errors degrade to a
    /// canned apology so the turn still yields spoken text.
    pub async fn fallback(&self, text: &str) -> ResolutionResult {
        let reply = tokio::time::timeout(self.budgets.network, self.chat.chat_fallback(text)).await;
        match reply {
            Ok(Ok(reply)) => ResolutionResult::fallback(reply),
            Ok(Err(e)) => {
                warn!("chat fallback failed: {}", e);
                ResolutionResult::fallback("Sorry, I can't think of an answer right now.")
            }
            Err(_) => {
                warn!("chat fallback timed out");
                ResolutionResult::fallback("Sorry, I can't think of an answer right now.")
            }
        }
    }
}

async fn timed<F>(budget: Duration, what: &'static str, fut: F) -> CollabResult
where
    F: Future<Output = CollabResult>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout(what)),
    }
}

fn normalize(result: CollabResult) -> ResolutionResult {
    match result {
        Ok(ActionOutcome { message, data }) => ResolutionResult::executed(message, data),
        Err(e) => failure(e),
    }
}

/// Collaborator faults become spoken failure results at this boundary; they
/// never propagate upward as errors. The outcome stays `Executed` because
/// dispatch was attempted; the `"success": false` payload is what marks the
/// attempt as failed.
fn failure(e: CollaboratorError) -> ResolutionResult {
    warn!("collaborator failure: {}", e);
    ResolutionResult::executed(
        format!("Sorry, {}.", e),
        Some(serde_json::json!({ "success": false, "error": e.to_string() })),
    )
}

fn req_text<'a>(entities: &'a EntitySet, slot: &str) -> Result<&'a str, CollaboratorError> {
    entities
        .text(slot)
        .ok_or_else(|| CollaboratorError::InvalidArgument(format!("missing {}", slot)))
}

fn req_number(entities: &EntitySet, slot: &str) -> Result<f64, CollaboratorError> {
    entities
        .number(slot)
        .ok_or_else(|| CollaboratorError::InvalidArgument(format!("missing {}", slot)))
}
