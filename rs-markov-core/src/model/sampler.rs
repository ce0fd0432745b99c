use super::node::TrieNode;
use super::token::Token;

/// Outcome of a sampling step.
#[derive(Debug, PartialEq, Eq)]
pub enum Next<'a> {
	/// The token picked among the node's children.
	Token(&'a Token),
	/// The context was never observed, or the node has no children.
	NoContinuation,
}

/// Picks the next token from `node` using a uniform draw `r` in `[0, 1)`.
///
/// This method performs:
/// - an O(n) scan over the children, in `Token` order
/// - a cumulative subtraction of each child's probability from `r`
///
/// The first child that makes `r` negative wins. If rounding leaves `r`
/// non-negative after the last child, that last child is returned.
pub fn select_next(node: &TrieNode, mut r: f64) -> Next<'_> {
	let mut fallback = Next::NoContinuation;
	for (token, child) in node.children() {
		r -= child.probability();
		if r < 0.0 {
			return Next::Token(token);
		}
		fallback = Next::Token(token);
	}
	fallback
}

/// Looks up the node reached by `context` and samples from it.
///
/// An unknown context is a normal outcome and yields `NoContinuation`.
pub fn sample<'a, 'b, I>(root: &'a TrieNode, context: I, r: f64) -> Next<'a>
where
	I: IntoIterator<Item = &'b Token>,
{
	match root.descend(context) {
		Some(node) => select_next(node, r),
		None => Next::NoContinuation,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn word(w: &str) -> Token {
		Token::Word(w.to_owned())
	}

	fn node_with(weights: &[(&str, u32)]) -> TrieNode {
		let mut node = TrieNode::new();
		for (w, n) in weights {
			for _ in 0..*n {
				node.add_child(&word(w));
			}
		}
		node.recompute_children();
		node
	}

	#[test]
	fn cumulative_subtraction_in_token_order() {
		// Inserted out of order on purpose: sampling must follow `Token` order.
		let node = node_with(&[("c", 1), ("a", 2), ("b", 1)]);

		assert_eq!(select_next(&node, 0.0), Next::Token(&word("a")));
		assert_eq!(select_next(&node, 0.49), Next::Token(&word("a")));
		assert_eq!(select_next(&node, 0.5), Next::Token(&word("b")));
		assert_eq!(select_next(&node, 0.74), Next::Token(&word("b")));
		assert_eq!(select_next(&node, 0.75), Next::Token(&word("c")));
		assert_eq!(select_next(&node, 0.999), Next::Token(&word("c")));
	}

	#[test]
	fn rounding_falls_back_to_last_child() {
		let node = node_with(&[("a", 1), ("b", 1), ("c", 1)]);
		// r = 1.0 is outside the draw range; the last child still answers.
		assert_eq!(select_next(&node, 1.0), Next::Token(&word("c")));
	}

	#[test]
	fn empty_node_has_no_continuation() {
		assert_eq!(select_next(&TrieNode::new(), 0.3), Next::NoContinuation);
	}

	#[test]
	fn unknown_context_has_no_continuation() {
		let mut root = TrieNode::new();
		root.add_child(&Token::Start).add_child(&word("hi"));
		root.recompute_all();

		assert_eq!(sample(&root, &[Token::Start], 0.5), Next::Token(&word("hi")));
		assert_eq!(sample(&root, &[word("nope")], 0.5), Next::NoContinuation);
	}
}
