use std::io;

use thiserror::Error;

/// Errors reported by the Markov model.
///
/// Missing continuations are not errors: generation simply stops.
#[derive(Debug, Error)]
pub enum ModelError {
	/// The context length must be at least one token.
	#[error("degree must be >= 1, got {0}")]
	InvalidDegree(usize),

	/// Two models with different context lengths cannot be merged.
	#[error("degree mismatch: self={expected}, other={found}")]
	DegreeMismatch { expected: usize, found: usize },

	/// A node's `total_count` disagrees with the sum of its children's counts.
	/// This is an internal logic error and is not recoverable.
	#[error("invariant violated at {path}: total_count={total_count}, sum of children={children_sum}")]
	InvariantViolation {
		path: String,
		total_count: u64,
		children_sum: u64,
	},

	/// The corpus could not be read by a strict loader.
	#[error("corpus i/o failed: {0}")]
	Io(#[from] io::Error),
}
