use crate::transform::{EntryTransformation, KindSet};
use crate::tree::{EntryKind, Named};

/// Maps one symbol: every entry of the given kind whose intermediary name
/// equals a fixed string gets its mapped name overwritten.
///
/// An empty replacement unmaps the entry; see [`MapSymbol::unmap`].
#[derive(Debug, Clone)]
pub struct MapSymbol {
	kind: EntryKind,
	intermediary: String,
	mapped: String,
}

impl MapSymbol {
	pub fn new(kind: EntryKind, intermediary: impl Into<String>, mapped: impl Into<String>) -> MapSymbol {
		MapSymbol {
			kind,
			intermediary: intermediary.into(),
			mapped: mapped.into(),
		}
	}

	/// Clears the mapped name of the matching entries instead of setting one.
	pub fn unmap(kind: EntryKind, intermediary: impl Into<String>) -> MapSymbol {
		MapSymbol::new(kind, intermediary, "")
	}
}

impl EntryTransformation for MapSymbol {
	fn kinds(&self) -> KindSet {
		KindSet::single(self.kind)
	}

	fn handle(&self, entry: &mut dyn Named) {
		if entry.names().intermediary_name() == self.intermediary {
			entry.names_mut().set_mapped_name(self.mapped.clone());
		}
	}

	fn fingerprint(&self) -> String {
		format!("map\0{}\0{}\0{}", self.kinds().id(), self.intermediary, self.mapped)
	}
}
