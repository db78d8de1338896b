use std::fmt::{Debug, Formatter};
use crate::transform::{EntryTransformation, KindSet};
use crate::tree::Named;

/// Applies an arbitrary visitor to every entry of the selected kinds; no
/// identity matching takes place.
///
/// The description must be a stable representation of the visitor's effect:
/// it is the only part of the closure that enters the fingerprint, so two
/// pipelines are cache-equivalent exactly when their descriptions (and kind
/// sets) agree.
pub struct VisitEntries {
	kinds: KindSet,
	description: String,
	visitor: Box<dyn Fn(&mut dyn Named)>,
}

impl VisitEntries {
	pub fn new(kinds: KindSet, description: impl Into<String>, visitor: impl Fn(&mut dyn Named) + 'static) -> VisitEntries {
		VisitEntries {
			kinds,
			description: description.into(),
			visitor: Box::new(visitor),
		}
	}
}

impl EntryTransformation for VisitEntries {
	fn kinds(&self) -> KindSet {
		self.kinds
	}

	fn handle(&self, entry: &mut dyn Named) {
		(self.visitor)(entry);
	}

	fn fingerprint(&self) -> String {
		format!("visit\0{}\0{}", self.kinds.id(), self.description)
	}
}

impl Debug for VisitEntries {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VisitEntries")
			.field("kinds", &self.kinds)
			.field("description", &self.description)
			.finish_non_exhaustive()
	}
}
