use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{debug, warn};
use rand::Rng;
use serde::Serialize;

use super::node::TrieNode;
use super::sampler::{sample, Next};
use super::token::{frame, Token};
use crate::error::ModelError;
use crate::io::read_lines;

/// Hard cap on the number of words in a generated sentence.
///
/// The trie is acyclic but its content is not: `a b a b ...` can be walked
/// for as long as the dice allow.
pub const MAX_SENTENCE_TOKENS: usize = 256;

/// Word-level Markov model of a fixed degree.
///
/// The model owns a prefix trie whose paths are the token windows seen during
/// learning. A node reached by a context of up to `degree` tokens holds the
/// distribution of the next token.
///
/// # Responsibilities
/// - Learn sentences incrementally, keeping probabilities exact after every call
/// - Generate sentences by weighted random walk
/// - Build and merge partial models for fast corpus loading
///
/// # Concurrency
/// `learn` takes `&mut self` and `generate` takes `&self`: wrap the model in a
/// `RwLock` to serve concurrent callers. A reader never sees counts updated
/// without the matching probabilities.
#[derive(Clone, Debug)]
pub struct Model {
	/// Number of preceding tokens conditioning the next one (>= 1).
	degree: usize,
	root: TrieNode,
}

/// Size summary of a model.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ModelStats {
	pub degree: usize,
	/// Number of trie nodes, root included.
	pub nodes: usize,
	/// Number of distinct words seen.
	pub vocabulary: usize,
}

impl Model {
	/// Creates an empty model of order `degree`.
	///
	/// # Errors
	/// Returns `ModelError::InvalidDegree` if `degree == 0`.
	pub fn new(degree: usize) -> Result<Self, ModelError> {
		if degree == 0 {
			return Err(ModelError::InvalidDegree(degree));
		}
		Ok(Self { degree, root: TrieNode::new() })
	}

	/// Builds a model from a list of lines.
	///
	/// # Behavior
	/// - Splits the lines into chunks (based on CPU cores * factor).
	/// - Spawns threads to count each chunk into a partial model.
	/// - Merges all partial models and recomputes probabilities once.
	///
	/// # Notes
	/// - Counts are additive, so the result is identical to calling `learn`
	///   on every line in order.
	/// - Uses MPSC channels to collect models from threads.
	pub fn from_lines(degree: usize, lines: &[String]) -> Result<Self, ModelError> {
		let mut model = Self::new(degree)?;
		if lines.is_empty() {
			return Ok(model);
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lines.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				let mut partial_model = Model { degree, root: TrieNode::new() };
				for line in &chunk {
					partial_model.insert(line);
				}
				// The receiver only goes away if the caller is gone.
				let _ = tx.send(partial_model);
			});
		}
		drop(tx);

		for partial_model in rx.iter() {
			model.root.merge(&partial_model.root);
		}
		model.root.recompute_all();

		debug!("built degree {} model from {} lines", degree, lines.len());
		Ok(model)
	}

	/// Loads a newline-delimited corpus and learns every line.
	///
	/// # Errors
	/// Returns `ModelError::InvalidDegree` for `degree == 0`, and
	/// `ModelError::Io` if the corpus cannot be read.
	pub fn load_corpus<P: AsRef<Path>>(path: P, degree: usize) -> Result<Self, ModelError> {
		Self::new(degree)?;
		let lines = read_lines(path)?;
		Self::from_lines(degree, &lines)
	}

	/// Same as `load_corpus`, but a missing or unreadable corpus is not
	/// fatal: the model starts empty.
	///
	/// # Errors
	/// Only an invalid `degree` is reported.
	pub fn from_corpus<P: AsRef<Path>>(path: P, degree: usize) -> Result<Self, ModelError> {
		let path = path.as_ref();
		match Self::load_corpus(path, degree) {
			Err(ModelError::Io(e)) => {
				warn!("corpus {} unreadable ({e}), starting with an empty model", path.display());
				Self::new(degree)
			}
			other => other,
		}
	}

	pub fn degree(&self) -> usize {
		self.degree
	}

	/// Read-only access to the trie.
	pub fn root(&self) -> &TrieNode {
		&self.root
	}

	/// `true` until at least one window has been learned.
	pub fn is_empty(&self) -> bool {
		!self.root.has_children()
	}

	/// Learns one sentence.
	///
	/// Never fails: lines too short to fill a window are ignored.
	///
	/// # Notes
	/// Only the nodes whose `total_count` changed (the ones on a learned
	/// window's path) get their children's probabilities recomputed. Every
	/// other node's counts are untouched, so its probabilities stay exact.
	pub fn learn(&mut self, line: &str) {
		let windows = self.insert(line);
		if windows.is_empty() {
			debug!("nothing to learn from {line:?}");
			return;
		}
		for window in &windows {
			self.refresh_path(window);
		}
	}

	/// Counts every window of `line` into the trie, without touching probabilities.
	fn insert(&mut self, line: &str) -> Vec<Vec<Token>> {
		let windows = frame(line, self.degree);
		for window in &windows {
			let mut node = &mut self.root;
			for token in window {
				node = node.add_child(token);
			}
		}
		windows
	}

	fn refresh_path(&mut self, window: &[Token]) {
		let mut node = &mut self.root;
		for token in window {
			node.recompute_children();
			node = match node.child_mut(token) {
				Some(child) => child,
				None => return,
			};
		}
	}

	/// Generates a sentence using the thread-local RNG.
	///
	/// Returns an empty string if the model is empty.
	pub fn generate(&self) -> String {
		self.generate_with(&mut rand::rng())
	}

	/// Generates a sentence with the given random source.
	///
	/// # Behavior
	/// - The context starts as `[Start]` and keeps at most `degree` tokens.
	/// - Each step samples from the node reached by the whole context.
	/// - Stops on the end sentinel, on an unknown context, or after
	///   `MAX_SENTENCE_TOKENS` words.
	///
	/// With a seeded RNG the output is reproducible.
	pub fn generate_with<R: Rng>(&self, rng: &mut R) -> String {
		let mut context: VecDeque<Token> = VecDeque::with_capacity(self.degree + 1);
		context.push_back(Token::Start);
		let mut words: Vec<&str> = Vec::new();

		while words.len() < MAX_SENTENCE_TOKENS {
			let token = match sample(&self.root, &context, rng.random::<f64>()) {
				Next::Token(token) => token,
				Next::NoContinuation => break,
			};
			let Some(word) = token.as_word() else {
				break;
			};

			words.push(word);
			context.push_back(token.clone());
			if context.len() > self.degree {
				context.pop_front();
			}
		}

		words.join(" ")
	}

	/// Merges another model into this one.
	///
	/// # Errors
	/// Returns `ModelError::DegreeMismatch` if the degrees differ.
	pub fn merge(&mut self, other: &Self) -> Result<(), ModelError> {
		if self.degree != other.degree {
			return Err(ModelError::DegreeMismatch { expected: self.degree, found: other.degree });
		}
		self.root.merge(&other.root);
		self.root.recompute_all();
		Ok(())
	}

	/// Checks `total_count == Σ child.count` at every node.
	pub fn verify(&self) -> Result<(), ModelError> {
		self.root.verify()
	}

	pub fn stats(&self) -> ModelStats {
		let mut vocabulary = BTreeSet::new();
		collect_words(&self.root, &mut vocabulary);
		ModelStats {
			degree: self.degree,
			nodes: self.root.node_count(),
			vocabulary: vocabulary.len(),
		}
	}
}

fn collect_words<'a>(node: &'a TrieNode, words: &mut BTreeSet<&'a str>) {
	for (token, child) in node.children() {
		if let Some(word) = token.as_word() {
			words.insert(word);
		}
		collect_words(child, words);
	}
}
