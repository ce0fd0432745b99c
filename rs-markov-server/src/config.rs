use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Config file read when `MARKOV_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "markov.toml";

/// Server configuration.
///
/// Every field is optional in the TOML file; environment variables
/// (`MARKOV_CORPUS`, `MARKOV_DEGREE`, `MARKOV_HOST`, `MARKOV_PORT`) win over it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
	/// Newline-delimited corpus, read on startup and appended to on learn.
	pub corpus_path: PathBuf,
	/// Context length of the model.
	pub degree: usize,
	pub host: String,
	pub port: u16,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			corpus_path: PathBuf::from("./markov.txt"),
			degree: 2,
			host: "127.0.0.1".to_owned(),
			port: 5000,
		}
	}
}

impl Config {
	/// Loads the config file (if any), then applies environment overrides.
	pub fn load() -> Result<Self, String> {
		let path = env::var("MARKOV_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned());
		let mut config = Self::from_file(&path)?;
		config.apply_env(|key| env::var(key).ok())?;
		Ok(config)
	}

	/// Reads a TOML config file. A missing file yields the defaults.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
		let path = path.as_ref();
		if !path.exists() {
			return Ok(Self::default());
		}
		let contents = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
		Self::from_toml(&contents).map_err(|e| format!("Invalid config {}: {e}", path.display()))
	}

	pub fn from_toml(contents: &str) -> Result<Self, String> {
		toml::from_str(contents).map_err(|e| e.to_string())
	}

	/// Overrides fields from `lookup` (the process environment in production).
	fn apply_env<F>(&mut self, lookup: F) -> Result<(), String>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(corpus) = lookup("MARKOV_CORPUS") {
			self.corpus_path = PathBuf::from(corpus);
		}
		if let Some(degree) = lookup("MARKOV_DEGREE") {
			self.degree = degree
				.parse()
				.map_err(|_| format!("MARKOV_DEGREE must be a positive integer, got {degree:?}"))?;
		}
		if let Some(host) = lookup("MARKOV_HOST") {
			self.host = host;
		}
		if let Some(port) = lookup("MARKOV_PORT") {
			self.port = port.parse().map_err(|_| format!("MARKOV_PORT must be a port number, got {port:?}"))?;
		}
		Ok(())
	}
}
