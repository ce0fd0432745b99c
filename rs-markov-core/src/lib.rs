//! Word-level Markov chain text library.
//!
//! This crate provides an online-learning n-gram model including:
//! - A prefix trie of token sequences with exact transition probabilities
//! - Incremental learning, one message at a time
//! - Weighted random sentence generation with a deterministic sampling order
//! - Corpus I/O helpers and the small chat helpers that sit next to the model
//!
//! Only the high-level API is exposed publicly. Trie internals stay
//! read-only to callers so counts and probabilities cannot drift apart.

/// Core Markov model and generation logic.
pub mod model;

/// Error type shared by the model and corpus helpers.
pub mod error;

/// Corpus I/O utilities (file loading, appending).
pub mod io;

/// Proficiency registry (who can help with what).
pub mod registry;

/// Canned spoiler sentences built from templates.
pub mod spoiler;

/// `$...$` formula extraction and render URL building.
pub mod formula;

pub use error::ModelError;
pub use model::markov_model::{Model, ModelStats};
