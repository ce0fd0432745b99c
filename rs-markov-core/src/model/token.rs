use std::fmt;

/// A single unit of learning and generation.
///
/// Sentinels are their own variants, so no user input can ever collide with
/// them. The derived order (`Start < End < Word`, words lexicographic) is the
/// order in which the sampler walks a node's children.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
	/// Marks the beginning of a sentence.
	Start,
	/// Marks the end of a sentence.
	End,
	/// An ordinary whitespace-delimited word.
	Word(String),
}

impl Token {
	/// Returns the word carried by this token, if any.
	pub fn as_word(&self) -> Option<&str> {
		match self {
			Token::Word(w) => Some(w.as_str()),
			_ => None,
		}
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Token::Start => f.write_str("<start>"),
			Token::End => f.write_str("<end>"),
			Token::Word(w) => f.write_str(w),
		}
	}
}

/// Splits a line on single spaces.
///
/// No trimming and no punctuation handling: `"a  b"` yields an empty word
/// between `a` and `b`. An empty line yields no tokens at all.
pub fn tokenize(line: &str) -> Vec<Token> {
	if line.is_empty() {
		return Vec::new();
	}
	line.split(' ').map(|w| Token::Word(w.to_owned())).collect()
}

/// Wraps the tokens of `line` with the sentinels and returns every window of
/// `degree + 1` consecutive tokens.
///
/// Returns no windows when the padded sequence is shorter than a window, or
/// when the line is empty.
pub fn frame(line: &str, degree: usize) -> Vec<Vec<Token>> {
	let words = tokenize(line);
	if words.is_empty() {
		return Vec::new();
	}

	let mut padded = Vec::with_capacity(words.len() + 2);
	padded.push(Token::Start);
	padded.extend(words);
	padded.push(Token::End);

	padded.windows(degree + 1).map(<[Token]>::to_vec).collect()
}
