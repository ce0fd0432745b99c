//! Top-level module for the Markov chain.
//!
//! This module provides a word-level n-gram text model, including:
//! - Tokens with structural sentinels and window framing (`token`)
//! - The prefix trie holding counts and probabilities (`node`)
//! - Deterministically ordered weighted sampling (`sampler`)
//! - The learn/generate interface (`Model`)

/// Learn/generate interface over the trie.
///
/// Owns the root node and the fixed context length.
pub mod markov_model;

/// A single state of the trie.
///
/// Tracks children, observation counts and the derived probability.
pub mod node;

/// Weighted child selection by cumulative subtraction.
pub mod sampler;

/// Tokens, tokenization and sliding windows.
pub mod token;
