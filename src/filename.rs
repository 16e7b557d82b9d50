use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::message::MessageMetadata;

lazy_static! {
	static ref UNSAFE_CHARS: Regex = Regex::new(r"[^@._A-Za-z0-9\s-]").unwrap();
	static ref SEPARATOR_RUNS: Regex = Regex::new(r"[-\s]+").unwrap();
}

/// Builds the base name (without extension) of the CSV file for a message.
pub fn derive_base_name(meta: &MessageMetadata) -> String {
	let seed = match &meta.message_id {
		Some(message_id) => format!("{} - {}", meta.from, message_id),
		None => format!("{}-{}", meta.from, meta.date),
	};
	normalize(&seed)
}

/// Reduces a string to a lower-case ASCII token made of letters, digits and
/// `@._-`.
pub fn normalize(seed: &str) -> String {
	let ascii: String = seed.nfkd().filter(char::is_ascii).collect();
	let safe = UNSAFE_CHARS.replace_all(&ascii, "");
	let lowered = safe.trim().to_lowercase();
	SEPARATOR_RUNS.replace_all(&lowered, "-").into_owned()
}

/// Returns the first of `<base>.csv`, `<base>-1.csv`, `<base>-2.csv`, ... that
/// does not exist yet in `directory`.
pub fn resolve_path(directory: &Path, base_name: &str) -> PathBuf {
	let mut path = directory.join(format!("{}.csv", base_name));
	let mut duplicate = 0;
	while path.exists() {
		duplicate += 1;
		path = directory.join(format!("{}-{}.csv", base_name, duplicate));
	}
	path
}
