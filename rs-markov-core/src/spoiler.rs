use rand::Rng;
use rand::seq::IndexedRandom;

/// One piece of a template: literal text or a placeholder naming a word list.
#[derive(Clone, Copy, Debug)]
enum Part {
	Text(&'static str),
	Pick(List),
}

#[derive(Clone, Copy, Debug)]
enum List {
	MysteriousThings,
	Participants,
	RevealThings,
	Secrets,
	Times,
}

impl List {
	fn words(self) -> &'static [&'static str] {
		match self {
			List::MysteriousThings => &[
				"Q", "Junpei's jacket", "Blick Winkel", "Carlos", "Eric", "Kyle", "Zero", "Gab",
				"Mila", "Diana", "Junpei", "Akane",
			],
			List::Participants => &["Q", "Mila", "Eric", "Diana", "Sigma", "Phi", "Carlos", "Junpei", "Akane"],
			List::RevealThings => &[
				"Q", "Mila", "Eric", "Diana", "Sigma", "Phi", "Carlos", "Junpei", "Akane", "Gab", "Zero",
				"Brother", "Left", "Quark", "Clover", "fake", "an AI", "non-existant",
			],
			List::Secrets => &[
				"They are actually Ace in disguise.",
				"They have time travelled backwards.",
				"They are really Carlos's little sister.",
				"They know about the Radical-6 outbreak.",
				"They are working with Zero.",
				"They actually don't exist.",
			],
			List::Times => &["Early in the game", "In the middle of the game", "In a bad end", "In the true end"],
		}
	}
}

const TEMPLATES: &[&[Part]] = &[
	&[
		Part::Pick(List::Times),
		Part::Text(", it is revealed that "),
		Part::Pick(List::MysteriousThings),
		Part::Text(" is actually "),
		Part::Pick(List::RevealThings),
	],
	&[
		Part::Pick(List::Participants),
		Part::Text(" is forced to kill "),
		Part::Pick(List::Participants),
		Part::Text(", regardless of the ending."),
	],
	&[
		Part::Pick(List::Times),
		Part::Text(", "),
		Part::Pick(List::Participants),
		Part::Text(" tells the others their big secret: "),
		Part::Pick(List::Secrets),
	],
];

/// Builds a random spoiler using the thread-local RNG.
pub fn random_spoiler() -> String {
	spoiler_with(&mut rand::rng())
}

/// Builds a spoiler: picks a template, then a random word for each placeholder.
pub fn spoiler_with<R: Rng>(rng: &mut R) -> String {
	let Some(template) = TEMPLATES.choose(rng) else {
		return String::new();
	};
	template
		.iter()
		.filter_map(|part| match part {
			Part::Text(text) => Some(*text),
			Part::Pick(list) => list.words().choose(rng).copied(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn spoilers_fill_every_placeholder() {
		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..50 {
			let spoiler = spoiler_with(&mut rng);
			assert!(
				spoiler.contains(", it is revealed that ")
					|| spoiler.contains(" is forced to kill ")
					|| spoiler.contains(" tells the others their big secret: "),
				"unexpected spoiler {spoiler:?}"
			);
			assert!(!spoiler.contains('%'));
		}
	}

	#[test]
	fn seeded_spoilers_are_reproducible() {
		let a = spoiler_with(&mut StdRng::seed_from_u64(9));
		let b = spoiler_with(&mut StdRng::seed_from_u64(9));
		assert_eq!(a, b);
	}
}
