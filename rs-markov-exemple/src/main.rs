use std::env;

use log::info;
use rs_markov_core::{formula, spoiler, Model};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();

	// Usage: rs-markov-exemple [corpus] [degree]
	let mut args = env::args().skip(1);
	let corpus = args.next();
	let degree: usize = match args.next() {
		Some(d) => d.parse()?,
		None => 2,
	};

	// Rebuild the model from the corpus (one message per line).
	// An explicit corpus must be readable; the default one may be missing
	let mut model = match &corpus {
		Some(path) => Model::load_corpus(path, degree)?,
		None => Model::from_corpus("./markov.txt", degree)?,
	};
	let stats = model.stats();
	info!("{} nodes, {} distinct words", stats.nodes, stats.vocabulary);

	// Zero is not a valid degree
	match Model::new(0) {
		Ok(_) => println!("Should not happen"),
		Err(e) => println!("Degree 0 is invalid: {e}"),
	}

	// Messages can also be learned one at a time
	if model.is_empty() {
		model.learn("the quick brown fox jumps over the lazy dog");
		model.learn("the lazy cat sleeps over the warm dog");
	}

	// Generate 10 sentences
	for i in 0..10 {
		println!("Generated sentence {}: {}", i + 1, model.generate());
	}

	println!("Spoiler: {}", spoiler::random_spoiler());
	for url in formula::render_urls("Euler says $e^{i\\pi} + 1 = 0$ !") {
		println!("Formula: {url}");
	}

	Ok(())
}
