use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Who registered for which proficiency.
///
/// Proficiency names are normalized (whitespace removed, lowercased), so
/// `"Linear Algebra"` and `"linearalgebra"` are the same entry. Users are
/// kept in registration order, without duplicates.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Registry {
	fields: HashMap<String, Vec<String>>,
}

/// Normalizes one proficiency name.
pub fn normalize_field(field: &str) -> String {
	field.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_lowercase).collect()
}

/// Splits a comma-separated list into normalized names, skipping blanks.
fn split_fields(list: &str) -> Vec<String> {
	list.split(',').map(normalize_field).filter(|f| !f.is_empty()).collect()
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `user` for every proficiency in the comma-separated `list`.
	///
	/// Returns the normalized names.
	pub fn register(&mut self, user: &str, list: &str) -> Vec<String> {
		let fields = split_fields(list);
		for field in &fields {
			let users = self.fields.entry(field.clone()).or_default();
			if !users.iter().any(|u| u == user) {
				users.push(user.to_owned());
			}
		}
		fields
	}

	/// Removes `user` from every proficiency in the comma-separated `list`.
	///
	/// Unknown proficiencies are ignored. Returns the normalized names.
	pub fn unregister(&mut self, user: &str, list: &str) -> Vec<String> {
		let fields = split_fields(list);
		for field in &fields {
			if let Some(users) = self.fields.get_mut(field) {
				users.retain(|u| u != user);
			}
		}
		fields
	}

	/// Proficiencies `user` registered for, sorted.
	pub fn proficiencies_of(&self, user: &str) -> Vec<String> {
		let mut found: Vec<String> = self
			.fields
			.iter()
			.filter(|(_, users)| users.iter().any(|u| u == user))
			.map(|(field, _)| field.clone())
			.collect();
		found.sort();
		found
	}

	/// Users registered for `field`, or `None` if nobody ever registered it.
	///
	/// An entry whose last user unregistered is still known and yields an
	/// empty slice.
	pub fn helpers_for(&self, field: &str) -> Option<&[String]> {
		self.fields.get(&normalize_field(field)).map(Vec::as_slice)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalization_strips_whitespace_and_case() {
		assert_eq!(normalize_field(" Linear  Algebra "), "linearalgebra");
		assert_eq!(split_fields("Rust, , C++ ,LaTeX"), vec!["rust", "c++", "latex"]);
	}

	#[test]
	fn register_is_idempotent() {
		let mut registry = Registry::new();
		assert_eq!(registry.register("@ann", "Rust, Topology"), vec!["rust", "topology"]);
		registry.register("@ann", "rust");
		registry.register("@bob", "RUST");

		assert_eq!(registry.helpers_for("Rust").unwrap(), ["@ann", "@bob"]);
		assert_eq!(registry.proficiencies_of("@ann"), vec!["rust", "topology"]);
	}

	#[test]
	fn unregister_keeps_other_users() {
		let mut registry = Registry::new();
		registry.register("@ann", "rust");
		registry.register("@bob", "rust");
		registry.unregister("@ann", "rust, unknown");

		assert_eq!(registry.helpers_for("rust").unwrap(), ["@bob"]);
		assert!(registry.proficiencies_of("@ann").is_empty());
		assert!(registry.helpers_for("unknown").is_none());
	}
}
