//! Aria: a local command assistant core. Text goes in, one
//! `ResolutionResult` comes out. The pipeline is extract, classify, route,
//! gate, dispatch; only the dispatch stage touches the outside world, and it
//! does so through swappable collaborator traits.

pub mod config;
pub mod error;
pub mod exec;
pub mod kernel;
pub mod nlu;

pub use config::CoreConfig;
pub use kernel::policy::{GateDecision, RiskTier, SecurityMode};
pub use kernel::resolver::Resolver;
pub use kernel::types::{Outcome, PendingAction, ResolutionResult, Utterance};
