use anyhow::Result;
use regex::Regex;
use crate::transform::{EntryTransformation, KindSet};
use crate::tree::Named;

/// Rewrites mapped names matching a regular expression.
///
/// For every entry of the selected kinds whose mapped name is non-empty, the
/// pattern is matched against the whole mapped name; on a match, the name is
/// replaced by the substitution template expanded with the match's capture
/// groups (`$1`, `${name}`, …).
#[derive(Debug, Clone)]
pub struct RegexReplace {
	kinds: KindSet,
	pattern: String,
	regex: Regex,
	replacement: String,
}

impl RegexReplace {
	pub fn new(kinds: KindSet, pattern: &str, replacement: impl Into<String>) -> Result<RegexReplace> {
		// only a match of the whole mapped name counts
		let regex = Regex::new(&format!("\\A(?:{pattern})\\z"))?;

		Ok(RegexReplace {
			kinds,
			pattern: pattern.to_owned(),
			regex,
			replacement: replacement.into(),
		})
	}
}

impl EntryTransformation for RegexReplace {
	fn kinds(&self) -> KindSet {
		self.kinds
	}

	fn handle(&self, entry: &mut dyn Named) {
		let mapped = entry.names().mapped_name();
		if mapped.is_empty() {
			return;
		}

		if let Some(captures) = self.regex.captures(mapped) {
			let mut replaced = String::new();
			captures.expand(&self.replacement, &mut replaced);
			entry.names_mut().set_mapped_name(replaced);
		}
	}

	fn fingerprint(&self) -> String {
		format!("{}\0{}\0{}", self.kinds.id(), self.pattern, self.replacement)
	}
}
