//! The decision core. Everything here is deterministic: given the same
//! utterance, clock and security mode, the same `ResolutionResult` comes
//! back. Side effects live on the other side of the dispatcher boundary.

pub mod policy;
pub mod resolver;
pub mod router;
pub mod types;
