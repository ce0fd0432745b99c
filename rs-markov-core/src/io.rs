use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use log::warn;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - Invalid UTF-8 is replaced with `U+FFFD` instead of dropping the file
pub fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let filename = filename.as_ref();
	let bytes = fs::read(filename)?;
	let contents = String::from_utf8_lossy(&bytes);
	if let Cow::Owned(_) = contents {
		warn!("{} contains invalid UTF-8, replaced lossily", filename.display());
	}
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Strips trailing `\r`s so a line reads back exactly as it was written.
///
/// `append_line("x\r")` would store `x\r\n`, which `read_lines` returns as `x`.
pub fn normalize_line(line: &str) -> &str {
	line.trim_end_matches('\r')
}

/// Appends one line (plus `\n`) to a corpus file, creating it if needed.
pub fn append_line<P: AsRef<Path>>(filename: P, line: &str) -> io::Result<()> {
	let mut file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(filename)?;
	writeln!(file, "{line}")
}
