//! Translate worker.
//!
//! Stateless phrase-table translation served over NATS RPC. The lookup is a
//! fixed dictionary: whole phrases first, then word-by-word substitution.

pub mod dictionary;
pub mod handler;

pub use dictionary::{supported_languages, translate};
pub use handler::TranslateHandler;
