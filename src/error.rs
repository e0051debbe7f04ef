use thiserror::Error;

use crate::nlu::catalog::IntentCategory;

/// Failures raised by collaborators and normalized at the dispatcher boundary.
/// These never escape as process faults: the dispatcher converts each one into
/// a spoken failure message.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Backend(String),
}

/// The lone fatal condition: a routed descriptor reached the dispatcher with
/// no mapping. The router guarantees this cannot happen for catalog
/// categories, so hitting it is a design-logic error, not a user mistake.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("no dispatch mapping for category {0:?}")]
    UnmappedCategory(IntentCategory),
}
