//! The effectful side: collaborator traits, the dispatcher that calls them,
//! and the concrete implementations used by the binary driver. Tests swap in
//! recording stubs at the trait seam.

pub mod chat;
pub mod collaborators;
pub mod dispatcher;
pub mod notes;
pub mod system;
pub mod tasks;
pub mod timers;
pub mod weather;
