use crate::kernel::policy::TrustPolicy;
use crate::kernel::types::ActionDescriptor;
use crate::nlu::catalog::{Catalog, IntentCategory};
use crate::nlu::classifier::ScoredIntent;
use crate::nlu::extractor::EntitySet;

/// Terminal branch chosen for one utterance.
#[derive(Debug, Clone)]
pub enum Route {
    /// Confident and complete: hand to the policy gate.
    Execute(ActionDescriptor),
    /// Ask the user before doing anything. No side effects on this branch.
    Clarify {
        candidates: Vec<IntentCategory>,
        missing_slots: Vec<&'static str>,
    },
    /// Hand the raw text to the conversational collaborator. Never touches
    /// the policy gate.
    Fallback,
}

/// Threshold-based branching between deterministic execution, clarification
/// and conversational fallback. Both thresholds are configuration inputs;
/// comparisons are inclusive (`>=`), so a score exactly at `high` executes
/// and a score exactly at `low` clarifies.
pub struct ConfidenceRouter {
    high: f32,
    low: f32,
}

impl ConfidenceRouter {
    pub fn new(high: f32, low: f32) -> Self {
        Self { high, low }
    }

    pub fn route(
        &self,
        catalog: &Catalog,
        policy: &TrustPolicy,
        ranked: &[ScoredIntent],
        entities: &EntitySet,
    ) -> Route {
        let top = match ranked.first() {
            Some(top) => *top,
            None => return Route::Fallback,
        };

        // The chat category short-circuits regardless of confidence.
        if catalog.is_fallback(top.category) || top.confidence < self.low {
            return Route::Fallback;
        }

        if top.confidence >= self.high {
            // Confidence alone is not sufficient: a winning category with a
            // required slot missing downgrades to clarification.
            let missing: Vec<&'static str> = catalog
                .required_slots(top.category)
                .iter()
                .copied()
                .filter(|slot| !entities.contains(slot))
                .collect();

            if missing.is_empty() {
                return Route::Execute(ActionDescriptor {
                    category: top.category,
                    entities: entities.clone(),
                    tier: policy.tier_for(top.category),
                });
            }
            return Route::Clarify {
                candidates: vec![top.category],
                missing_slots: missing,
            };
        }

        // Ambiguous band: name the top candidates, do nothing.
        let candidates = ranked
            .iter()
            .take(2)
            .filter(|s| !catalog.is_fallback(s.category))
            .map(|s| s.category)
            .collect();
        Route::Clarify {
            candidates,
            missing_slots: Vec::new(),
        }
    }
}
