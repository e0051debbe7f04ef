use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use aria::config::CoreConfig;
use aria::error::CollaboratorError;
use aria::exec::collaborators::{
    ActionOutcome, Automation, ChatService, CollabResult, NoteStore, TaskStore, TimerService,
    WeatherService,
};
use aria::exec::dispatcher::{Dispatcher, TimeoutBudgets};
use aria::kernel::types::{Outcome, PendingAction, Utterance};
use aria::{Resolver, SecurityMode};

// ---- recording stubs --------------------------------------------------

#[derive(Default)]
struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

struct StubAutomation(Arc<CallLog>);

#[async_trait]
impl Automation for StubAutomation {
    async fn launch_app(&self, name: &str) -> CollabResult {
        self.0.record(format!("launch_app {}", name));
        Ok(ActionOutcome::ok(format!("Opening {}.", name)))
    }
    async fn close_app(&self, name: &str) -> CollabResult {
        self.0.record(format!("close_app {}", name));
        Ok(ActionOutcome::ok(format!("Closed {}.", name)))
    }
    async fn set_volume(&self, percent: u8) -> CollabResult {
        self.0.record(format!("set_volume {}", percent));
        Ok(ActionOutcome::ok(format!("Volume set to {} percent.", percent)))
    }
    async fn move_file(&self, source: &str, destination: &str) -> CollabResult {
        self.0.record(format!("move_file {} {}", source, destination));
        Ok(ActionOutcome::ok("Moved."))
    }
    async fn delete_file(&self, path: &str) -> CollabResult {
        self.0.record(format!("delete_file {}", path));
        Ok(ActionOutcome::ok(format!("Deleted {}.", path)))
    }
    async fn shutdown(&self) -> CollabResult {
        self.0.record("shutdown");
        Ok(ActionOutcome::ok("Shutting down."))
    }
}

struct StubTasks(Arc<CallLog>);

#[async_trait]
impl TaskStore for StubTasks {
    async fn create_task(&self, text: &str, due: Option<NaiveDateTime>) -> CollabResult {
        let due = due.map(|d| d.to_string()).unwrap_or_else(|| "none".into());
        self.0.record(format!("create_task {} due {}", text, due));
        Ok(ActionOutcome::ok(format!("Added task: {}.", text)))
    }
    async fn list_tasks(&self) -> CollabResult {
        self.0.record("list_tasks");
        Ok(ActionOutcome::ok("You have no open tasks."))
    }
    async fn complete_task(&self, name: &str) -> CollabResult {
        self.0.record(format!("complete_task {}", name));
        Ok(ActionOutcome::ok(format!("Marked {} as done.", name)))
    }
}

struct StubNotes(Arc<CallLog>);

#[async_trait]
impl NoteStore for StubNotes {
    async fn create_note(&self, text: &str) -> CollabResult {
        self.0.record(format!("create_note {}", text));
        Ok(ActionOutcome::ok(format!("Noted: {}.", text)))
    }
    async fn search_notes(&self, query: &str) -> CollabResult {
        self.0.record(format!("search_notes {}", query));
        Ok(ActionOutcome::ok("No notes found."))
    }
}

struct StubTimers(Arc<CallLog>);

#[async_trait]
impl TimerService for StubTimers {
    async fn set_timer(&self, duration: Duration) -> CollabResult {
        self.0.record(format!("set_timer {}", duration.as_secs()));
        Ok(ActionOutcome::ok("Timer set."))
    }
}

struct StubWeather(Arc<CallLog>);

#[async_trait]
impl WeatherService for StubWeather {
    async fn get_weather(&self, location: Option<&str>) -> CollabResult {
        self.0
            .record(format!("get_weather {}", location.unwrap_or("default")));
        Ok(ActionOutcome::ok("It's 20 degrees and sunny."))
    }
}

struct StubChat(Arc<CallLog>);

#[async_trait]
impl ChatService for StubChat {
    async fn chat_fallback(&self, text: &str) -> Result<String, CollaboratorError> {
        self.0.record(format!("chat {}", text));
        Ok("Stub reply.".to_string())
    }
}

/// Automation whose volume call sleeps well past any tiny test budget.
struct SlowAutomation(Arc<CallLog>);

#[async_trait]
impl Automation for SlowAutomation {
    async fn launch_app(&self, _name: &str) -> CollabResult {
        Ok(ActionOutcome::ok("Opening."))
    }
    async fn close_app(&self, _name: &str) -> CollabResult {
        Ok(ActionOutcome::ok("Closed."))
    }
    async fn set_volume(&self, percent: u8) -> CollabResult {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.0.record(format!("set_volume {}", percent));
        Ok(ActionOutcome::ok("Volume set."))
    }
    async fn move_file(&self, _source: &str, _destination: &str) -> CollabResult {
        Ok(ActionOutcome::ok("Moved."))
    }
    async fn delete_file(&self, _path: &str) -> CollabResult {
        Ok(ActionOutcome::ok("Deleted."))
    }
    async fn shutdown(&self) -> CollabResult {
        Ok(ActionOutcome::ok("Shutting down."))
    }
}

struct FailingChat;

#[async_trait]
impl ChatService for FailingChat {
    async fn chat_fallback(&self, _text: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Backend("server unreachable".into()))
    }
}

// ---- harness ----------------------------------------------------------

fn resolver_with_log() -> (Resolver, Arc<CallLog>) {
    let log = Arc::new(CallLog::default());
    let dispatcher = Dispatcher::new(
        Arc::new(StubAutomation(log.clone())),
        Arc::new(StubTasks(log.clone())),
        Arc::new(StubNotes(log.clone())),
        Arc::new(StubTimers(log.clone())),
        Arc::new(StubWeather(log.clone())),
        Arc::new(StubChat(log.clone())),
        TimeoutBudgets::default(),
    );
    let resolver = Resolver::new(&CoreConfig::default(), dispatcher);
    (resolver, log)
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 30)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

// ---- end-to-end cases -------------------------------------------------

#[tokio::test]
async fn test_volume_command_executes_in_trust_mode() {
    let (resolver, log) = resolver_with_log();
    let result = resolver
        .resolve(&Utterance::new("set volume to 50"), noon(), SecurityMode::Trust)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::Executed);
    assert!(
        result.spoken_text.contains("50"),
        "reply should echo the level: {}",
        result.spoken_text
    );
    assert_eq!(log.calls(), vec!["set_volume 50"], "exactly one side effect");
}

#[tokio::test]
async fn test_destructive_delete_is_refused_in_strict_mode() {
    let (resolver, log) = resolver_with_log();
    let result = resolver
        .resolve(&Utterance::new("delete all my files"), noon(), SecurityMode::Strict)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::Refused);
    assert!(log.calls().is_empty(), "refusal must have zero side effects");
}

#[tokio::test]
async fn test_restricted_action_asks_first_in_trust_mode() {
    let (resolver, log) = resolver_with_log();
    let result = resolver
        .resolve(&Utterance::new("delete report.pdf"), noon(), SecurityMode::Trust)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::NeedsConfirmation);
    assert!(result.pending.is_some(), "a resumable token must be issued");
    assert!(log.calls().is_empty(), "nothing runs before confirmation");

    // Approving resumes at the dispatch stage.
    let token = result.pending.unwrap();
    let confirmed = resolver.confirm(&token, true).await.expect("confirm");
    assert_eq!(confirmed.outcome, Outcome::Executed);
    assert_eq!(log.calls(), vec!["delete_file report.pdf"]);
}

#[tokio::test]
async fn test_restricted_action_runs_directly_in_full_mode() {
    let (resolver, log) = resolver_with_log();
    let result = resolver
        .resolve(&Utterance::new("delete all my files"), noon(), SecurityMode::Full)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::Executed);
    assert_eq!(log.calls(), vec!["delete_file all my files"]);
}

#[tokio::test]
async fn test_declined_confirmation_never_touches_a_collaborator() {
    let (resolver, log) = resolver_with_log();
    let result = resolver
        .resolve(&Utterance::new("close chrome"), noon(), SecurityMode::Strict)
        .await
        .expect("resolution must not error");
    assert_eq!(result.outcome, Outcome::NeedsConfirmation);

    let token = result.pending.expect("token must be present");
    let declined = resolver.confirm(&token, false).await.expect("confirm");
    assert_eq!(declined.outcome, Outcome::Refused);
    assert!(log.calls().is_empty(), "declining must run nothing");
}

#[tokio::test]
async fn test_corrupted_confirmation_token_is_refused() {
    let (resolver, log) = resolver_with_log();
    let token: PendingAction =
        serde_json::from_str("\"not a descriptor\"").expect("transparent token");

    let result = resolver.confirm(&token, true).await.expect("confirm");
    assert_eq!(result.outcome, Outcome::Refused);
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_gibberish_falls_through_to_chat() {
    let (resolver, log) = resolver_with_log();
    let result = resolver
        .resolve(&Utterance::new("florble wizzle snark"), noon(), SecurityMode::Strict)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::FallbackResponse);
    assert_eq!(result.spoken_text, "Stub reply.");
    assert_eq!(
        log.calls(),
        vec!["chat florble wizzle snark"],
        "the raw text goes to the conversational collaborator"
    );
}

#[tokio::test]
async fn test_chat_phrases_bypass_the_gate_entirely() {
    let (resolver, log) = resolver_with_log();
    let result = resolver
        .resolve(&Utterance::new("tell me a joke"), noon(), SecurityMode::Strict)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::FallbackResponse);
    assert_eq!(log.calls(), vec!["chat tell me a joke"]);
}

#[tokio::test]
async fn test_missing_entity_downgrades_to_clarification() {
    let (resolver, log) = resolver_with_log();
    // Confidently volume control, but no level present.
    let result = resolver
        .resolve(&Utterance::new("volume up"), noon(), SecurityMode::Full)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::ClarificationNeeded);
    assert!(log.calls().is_empty(), "clarification has no side effects");
    assert!(!result.spoken_text.is_empty(), "the question must be spoken");
}

#[tokio::test]
async fn test_timer_command_arms_the_timer() {
    let (resolver, log) = resolver_with_log();
    let result = resolver
        .resolve(
            &Utterance::new("set a timer for 10 minutes"),
            noon(),
            SecurityMode::Strict,
        )
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::Executed);
    assert_eq!(log.calls(), vec!["set_timer 600"]);
}

#[tokio::test]
async fn test_resolution_is_idempotent_for_identical_turns() {
    let (resolver, _) = resolver_with_log();
    let utterance = Utterance::new("set volume to 50");

    let a = resolver
        .resolve(&utterance, noon(), SecurityMode::Trust)
        .await
        .expect("first resolution");
    let b = resolver
        .resolve(&utterance, noon(), SecurityMode::Trust)
        .await
        .expect("second resolution");

    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.spoken_text, b.spoken_text);
}

#[tokio::test]
async fn test_slow_collaborator_surfaces_as_a_timeout_failure() {
    let log = Arc::new(CallLog::default());
    let dispatcher = Dispatcher::new(
        Arc::new(SlowAutomation(log.clone())),
        Arc::new(StubTasks(log.clone())),
        Arc::new(StubNotes(log.clone())),
        Arc::new(StubTimers(log.clone())),
        Arc::new(StubWeather(log.clone())),
        Arc::new(StubChat(log.clone())),
        TimeoutBudgets {
            automation: Duration::from_millis(10),
            storage: Duration::from_millis(10),
            network: Duration::from_millis(10),
        },
    );
    let resolver = Resolver::new(&CoreConfig::default(), dispatcher);

    // The budget, not the collaborator, bounds the turn.
    let result = tokio::time::timeout(
        Duration::from_secs(1),
        resolver.resolve(&Utterance::new("set volume to 50"), noon(), SecurityMode::Trust),
    )
    .await
    .expect("a slow collaborator must not hang the resolution")
    .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::Executed);
    assert!(
        result.spoken_text.contains("timed out"),
        "the failure must be spoken: {}",
        result.spoken_text
    );
    let payload = result.payload.expect("failure payload missing");
    assert_eq!(
        payload["success"], false,
        "a timed-out action must be marked unsuccessful"
    );
}

#[tokio::test]
async fn test_utterance_timestamp_overrides_the_ambient_clock() {
    let (resolver, log) = resolver_with_log();
    let utterance = Utterance {
        text: "remind me to stretch tomorrow".to_string(),
        timestamp: Some(noon()),
        prior_turn: None,
    };
    // Ambient clock far away from the utterance's own stamp.
    let ambient = NaiveDate::from_ymd_opt(2030, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let result = resolver
        .resolve(&utterance, ambient, SecurityMode::Strict)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::Executed);
    assert_eq!(
        log.calls(),
        vec!["create_task stretch due 2026-08-31 09:00:00"],
        "relative time must resolve against the utterance timestamp"
    );
}

#[tokio::test]
async fn test_prior_turn_entities_fill_missing_slots() {
    let (resolver, log) = resolver_with_log();
    // "set the volume" alone would clarify for a level; the follow-up
    // context supplies it.
    let utterance = Utterance {
        text: "set the volume".to_string(),
        timestamp: None,
        prior_turn: Some("50 percent".to_string()),
    };

    let result = resolver
        .resolve(&utterance, noon(), SecurityMode::Trust)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::Executed);
    assert_eq!(log.calls(), vec!["set_volume 50"]);
}

#[tokio::test]
async fn test_current_turn_entities_win_over_prior_turn() {
    let (resolver, log) = resolver_with_log();
    let utterance = Utterance {
        text: "set volume to 30".to_string(),
        timestamp: None,
        prior_turn: Some("set volume to 90".to_string()),
    };

    let result = resolver
        .resolve(&utterance, noon(), SecurityMode::Trust)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::Executed);
    assert_eq!(log.calls(), vec!["set_volume 30"], "the fresher turn wins");
}

#[tokio::test]
async fn test_chat_failure_degrades_to_an_apology() {
    let log = Arc::new(CallLog::default());
    let dispatcher = Dispatcher::new(
        Arc::new(StubAutomation(log.clone())),
        Arc::new(StubTasks(log.clone())),
        Arc::new(StubNotes(log.clone())),
        Arc::new(StubTimers(log.clone())),
        Arc::new(StubWeather(log.clone())),
        Arc::new(FailingChat),
        TimeoutBudgets::default(),
    );
    let resolver = Resolver::new(&CoreConfig::default(), dispatcher);

    let result = resolver
        .resolve(&Utterance::new("zxqv mumble"), noon(), SecurityMode::Strict)
        .await
        .expect("resolution must not error");

    assert_eq!(result.outcome, Outcome::FallbackResponse);
    assert!(
        result.spoken_text.starts_with("Sorry"),
        "a dead chat backend must still yield spoken text: {}",
        result.spoken_text
    );
}
