use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::config::CoreConfig;
use crate::error::InternalError;
use crate::exec::dispatcher::Dispatcher;
use crate::kernel::policy::{GateDecision, SecurityMode, TrustPolicy};
use crate::kernel::router::{ConfidenceRouter, Route};
use crate::kernel::types::{PendingAction, ResolutionResult, Utterance};
use crate::nlu::catalog::{Catalog, IntentCategory};
use crate::nlu::classifier::IntentClassifier;
use crate::nlu::extractor::EntityExtractor;

/// The full resolution pipeline: extract -> classify -> route -> gate ->
/// dispatch. Everything up to dispatch is pure decision logic over
/// read-only state, so concurrent resolutions share nothing mutable.
pub struct Resolver {
    catalog: Catalog,
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    router: ConfidenceRouter,
    policy: TrustPolicy,
    dispatcher: Dispatcher,
}

impl Resolver {
    pub fn new(config: &CoreConfig, dispatcher: Dispatcher) -> Self {
        let catalog = Catalog::builtin();
        let classifier = IntentClassifier::fit(&catalog);
        let policy = TrustPolicy::new(&catalog, config.tier_overrides.clone());
        Self {
            catalog,
            classifier,
            extractor: EntityExtractor::new(),
            router: ConfidenceRouter::new(config.high_confidence, config.low_confidence),
            policy,
            dispatcher,
        }
    }

    /// Resolve one utterance. The wall clock and security mode are passed in
    /// per call; the resolver caches neither. An utterance stamped by its
    /// surface overrides the ambient clock, so relative time expressions
    /// resolve against the moment the user actually spoke. The only error is
    /// the internal invariant violation from the dispatch stage.
    pub async fn resolve(
        &self,
        utterance: &Utterance,
        now: NaiveDateTime,
        mode: SecurityMode,
    ) -> Result<ResolutionResult, InternalError> {
        let now = utterance.timestamp.unwrap_or(now);
        let mut entities = self.extractor.extract(&utterance.text, now);

        // A follow-up turn may lean on the previous one ("that file", or a
        // bare "50" after being asked for a level). Prior-turn entities only
        // fill gaps; anything the current turn names wins.
        if let Some(prior) = &utterance.prior_turn {
            let prior_entities = self.extractor.extract(prior, now);
            for (slot, value) in prior_entities.iter() {
                if !entities.contains(slot) {
                    entities.insert(slot, value.clone());
                }
            }
        }

        let ranked = self.classifier.classify(&utterance.text);

        if let Some(top) = ranked.first() {
            debug!(
                category = ?top.category,
                confidence = top.confidence,
                entities = entities.len(),
                "classified utterance"
            );
        }

        match self.router.route(&self.catalog, &self.policy, &ranked, &entities) {
            Route::Fallback => Ok(self.dispatcher.fallback(&utterance.text).await),

            Route::Clarify {
                candidates,
                missing_slots,
            } => Ok(ResolutionResult::clarification(clarify_text(
                &candidates,
                &missing_slots,
            ))),

            Route::Execute(descriptor) => {
                match self.policy.evaluate(descriptor.tier, mode) {
                    GateDecision::Proceed => self.dispatcher.dispatch(&descriptor).await,
                    GateDecision::NeedsConfirmation => {
                        info!(category = ?descriptor.category, "action held for confirmation");
                        let spoken = format!(
                            "I can {}, but I need your go-ahead. Should I?",
                            describe(descriptor.category)
                        );
                        Ok(ResolutionResult::needs_confirmation(
                            spoken,
                            PendingAction::seal(&descriptor),
                        ))
                    }
                    GateDecision::Refused => {
                        info!(category = ?descriptor.category, "action refused by policy");
                        Ok(ResolutionResult::refused(format!(
                            "I won't {} while security is set to strict.",
                            describe(descriptor.category)
                        )))
                    }
                }
            }
        }
    }

    /// Re-entry point for a previously gated action. Approving re-enters at
    /// the dispatch stage; declining refuses without any collaborator call.
    pub async fn confirm(
        &self,
        token: &PendingAction,
        approve: bool,
    ) -> Result<ResolutionResult, InternalError> {
        if !approve {
            return Ok(ResolutionResult::refused("Okay, I won't."));
        }
        match token.open() {
            Ok(descriptor) => self.dispatcher.dispatch(&descriptor).await,
            Err(_) => Ok(ResolutionResult::refused(
                "I couldn't find that pending action anymore.",
            )),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

fn clarify_text(candidates: &[IntentCategory], missing_slots: &[&str]) -> String {
    if let Some(&category) = candidates.first() {
        if !missing_slots.is_empty() {
            return format!(
                "I think you want me to {}, but I still need {}.",
                describe(category),
                missing_slots
                    .iter()
                    .map(|s| describe_slot(s))
                    .collect::<Vec<_>>()
                    .join(" and ")
            );
        }
        if candidates.len() > 1 {
            return format!(
                "Did you want me to {} or {}?",
                describe(category),
                describe(candidates[1])
            );
        }
        return format!("Did you want me to {}?", describe(category));
    }
    "Could you say that another way?".to_string()
}

fn describe(category: IntentCategory) -> &'static str {
    use IntentCategory::*;
    match category {
        VolumeControl => "change the volume",
        AppLaunch => "open an application",
        AppClose => "close an application",
        FileMove => "move a file",
        FileDelete => "delete files",
        TaskCreate => "add a task",
        TaskList => "list your tasks",
        TaskComplete => "complete a task",
        NoteCreate => "take a note",
        NoteSearch => "search your notes",
        TimerSet => "set a timer",
        WeatherQuery => "check the weather",
        SystemShutdown => "shut the computer down",
        ChatFallback => "chat",
        Unknown => "do that",
    }
}

fn describe_slot(slot: &str) -> &'static str {
    match slot {
        "level" => "a volume level",
        "target_app" => "the application name",
        "source_path" => "which file to move",
        "destination_path" => "where to move it",
        "path" => "which file",
        "content" => "what it should say",
        "query" => "what to search for",
        "duration_secs" => "how long",
        _ => "a bit more detail",
    }
}
