use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::kernel::policy::RiskTier;
use crate::nlu::catalog::IntentCategory;
use crate::nlu::extractor::EntitySet;

/// One user turn. Immutable input value, discarded after resolution.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    pub timestamp: Option<NaiveDateTime>,
    /// Reference to a previous turn, for "that file" style context.
    pub prior_turn: Option<String>,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: None,
            prior_turn: None,
        }
    }
}

/// A fully resolved, gate-ready action. Ephemeral: built by the router,
/// consumed by the gate and dispatcher within one resolution cycle (or
/// serialized into a `PendingAction` token for a confirmation round-trip).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub category: IntentCategory,
    pub entities: EntitySet,
    pub tier: RiskTier,
}

/// Opaque confirmation token: the serialized descriptor. Holding the whole
/// descriptor in the token keeps the core stateless between the
/// needs_confirmation reply and the follow-up turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingAction(String);

impl PendingAction {
    pub fn seal(descriptor: &ActionDescriptor) -> Self {
        // Serializing a descriptor cannot fail: every field is plain data.
        Self(serde_json::to_string(descriptor).unwrap_or_default())
    }

    pub fn open(&self) -> Result<ActionDescriptor, serde_json::Error> {
        serde_json::from_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Dispatch was attempted. This covers collaborator failures too: the
    /// spoken text apologizes and the payload carries `"success": false`.
    /// Callers that need to distinguish a failed action from a successful
    /// one must read that flag, not the outcome kind.
    Executed,
    NeedsConfirmation,
    Refused,
    ClarificationNeeded,
    FallbackResponse,
}

/// The only value returned across the core boundary. Always carries a
/// non-empty `spoken_text`: the system never goes silent, even on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub outcome: Outcome,
    pub spoken_text: String,
    pub payload: Option<serde_json::Value>,
    pub pending: Option<PendingAction>,
}

impl ResolutionResult {
    pub fn executed(spoken: impl Into<String>, payload: Option<serde_json::Value>) -> Self {
        Self {
            outcome: Outcome::Executed,
            spoken_text: spoken.into(),
            payload,
            pending: None,
        }
    }

    pub fn needs_confirmation(spoken: impl Into<String>, pending: PendingAction) -> Self {
        Self {
            outcome: Outcome::NeedsConfirmation,
            spoken_text: spoken.into(),
            payload: None,
            pending: Some(pending),
        }
    }

    pub fn refused(spoken: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Refused,
            spoken_text: spoken.into(),
            payload: None,
            pending: None,
        }
    }

    pub fn clarification(spoken: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::ClarificationNeeded,
            spoken_text: spoken.into(),
            payload: None,
            pending: None,
        }
    }

    pub fn fallback(spoken: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::FallbackResponse,
            spoken_text: spoken.into(),
            payload: None,
            pending: None,
        }
    }
}
