//! Natural-language understanding: the static category catalog, the
//! bag-of-words intent classifier, and the entity extractor.
//!
//! Everything here is pure: the classifier parameters and catalog are fitted
//! once at startup and never mutated, and the extractor takes the wall clock
//! as an argument instead of reading it.

pub mod catalog;
pub mod classifier;
pub mod extractor;
