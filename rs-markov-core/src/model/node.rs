use std::collections::BTreeMap;

use super::token::Token;
use crate::error::ModelError;

/// Represents a state in the Markov trie.
///
/// The path from the root to a node is a token sequence; the node's children
/// are every token observed right after that sequence during learning.
///
/// ## Invariants
/// - `total_count == Σ children[c].count`
/// - After recomputation, `children[c].probability == children[c].count / total_count`
/// - Nodes are never shared between parents and never deleted
#[derive(Clone, Debug, Default)]
pub struct TrieNode {
	/// Children keyed by the next token, iterated in `Token` order.
	children: BTreeMap<Token, TrieNode>,
	/// How many times this node was reached from its parent (0 for the root).
	count: u64,
	/// Sum of the children's counts.
	total_count: u64,
	/// Probability of being picked from the parent.
	probability: f64,
}

impl TrieNode {
	/// Creates an empty node.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn count(&self) -> u64 {
		self.count
	}

	pub fn total_count(&self) -> u64 {
		self.total_count
	}

	pub fn probability(&self) -> f64 {
		self.probability
	}

	/// Returns the child reached through `token`, if it was ever observed.
	pub fn child(&self, token: &Token) -> Option<&TrieNode> {
		self.children.get(token)
	}

	/// Iterates the children in sampling order.
	pub fn children(&self) -> impl Iterator<Item = (&Token, &TrieNode)> {
		self.children.iter()
	}

	pub fn has_children(&self) -> bool {
		!self.children.is_empty()
	}

	/// Follows `path` from this node.
	///
	/// Returns `None` as soon as one token of the path was never observed.
	pub fn descend<'a, I>(&self, path: I) -> Option<&TrieNode>
	where
		I: IntoIterator<Item = &'a Token>,
	{
		path.into_iter().try_fold(self, |node, token| node.child(token))
	}

	pub(crate) fn child_mut(&mut self, token: &Token) -> Option<&mut TrieNode> {
		self.children.get_mut(token)
	}

	/// Records one traversal toward `token` and returns the child.
	///
	/// - If the child already exists, its count is increased.
	/// - Otherwise, it is created with a count of 1.
	pub(crate) fn add_child(&mut self, token: &Token) -> &mut TrieNode {
		self.total_count += 1;
		let child = self.children.entry(token.clone()).or_default();
		child.count += 1;
		child
	}

	/// Recomputes the probabilities of the direct children only.
	pub(crate) fn recompute_children(&mut self) {
		let total = self.total_count;
		for child in self.children.values_mut() {
			child.probability = if total == 0 { 0.0 } else { child.count as f64 / total as f64 };
		}
	}

	/// Recomputes probabilities over the whole subtree.
	pub(crate) fn recompute_all(&mut self) {
		self.recompute_children();
		for child in self.children.values_mut() {
			child.recompute_all();
		}
	}

	/// Merges another subtree into this one by summing counts.
	///
	/// Probabilities are left stale; callers recompute afterwards.
	pub(crate) fn merge(&mut self, other: &Self) {
		self.count += other.count;
		self.total_count += other.total_count;
		for (token, other_child) in &other.children {
			match self.children.get_mut(token) {
				Some(existing) => existing.merge(other_child),
				None => {
					self.children.insert(token.clone(), other_child.clone());
				}
			}
		}
	}

	/// Number of nodes in this subtree, this node included.
	pub fn node_count(&self) -> usize {
		1 + self.children.values().map(TrieNode::node_count).sum::<usize>()
	}

	/// Checks the count invariant over the whole subtree.
	pub fn verify(&self) -> Result<(), ModelError> {
		self.verify_at(&mut Vec::new())
	}

	fn verify_at<'a>(&'a self, path: &mut Vec<&'a Token>) -> Result<(), ModelError> {
		let children_sum: u64 = self.children.values().map(|c| c.count).sum();
		if children_sum != self.total_count {
			return Err(ModelError::InvariantViolation {
				path: path.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
				total_count: self.total_count,
				children_sum,
			});
		}
		for (token, child) in &self.children {
			path.push(token);
			child.verify_at(path)?;
			path.pop();
		}
		Ok(())
	}
}
