//! Transformations: ordered edits applied to one mapping tree, each exposing
//! a deterministic fingerprint for cache-key composition by external callers.
//!
//! A [`Transformation`] edits a tree in place with exclusive access. Most
//! transformations only look at one entry at a time; those implement
//! [`EntryTransformation`] and get driven by the deterministic [`walk_mut`].
//! An ordered pipeline of transformations is a [`Transformations`].
//!
//! Two transformations are cache-equivalent iff their fingerprints are equal;
//! the engine itself never hashes anything, that's the caching layer's job.

mod map_symbol;
mod regex_replace;
mod visit;

pub use map_symbol::MapSymbol;
pub use regex_replace::RegexReplace;
pub use visit::VisitEntries;

use anyhow::{anyhow, Context, Result};
use log::debug;
use crate::tree::{EntryKind, Named};
use crate::tree::mappings::MappingTree;

/// A set of entry kinds, used to filter tree walks.
///
/// The backing bit encoding (class 1, method 2, field 4, parameter 8) is
/// exposed via [`KindSet::id`] since it takes part in fingerprints.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KindSet(u8);

impl KindSet {
	pub const ALL: KindSet = KindSet(0b1111);

	fn bit(kind: EntryKind) -> u8 {
		match kind {
			EntryKind::Class => 1,
			EntryKind::Method => 1 << 1,
			EntryKind::Field => 1 << 2,
			EntryKind::Parameter => 1 << 3,
		}
	}

	pub fn single(kind: EntryKind) -> KindSet {
		KindSet(KindSet::bit(kind))
	}

	pub fn of(kinds: &[EntryKind]) -> KindSet {
		KindSet(kinds.iter().fold(0, |acc, &kind| acc | KindSet::bit(kind)))
	}

	pub fn contains(self, kind: EntryKind) -> bool {
		self.0 & KindSet::bit(kind) != 0
	}

	pub fn id(self) -> u8 {
		self.0
	}
}

/// Visits the entries of the selected kinds in a fixed order: for each class
/// in tree order, the class itself, then each of its methods followed by that
/// method's parameters, then its fields.
pub fn walk(tree: &MappingTree, kinds: KindSet, mut f: impl FnMut(&dyn Named)) {
	let do_classes = kinds.contains(EntryKind::Class);
	let do_methods = kinds.contains(EntryKind::Method);
	let do_fields = kinds.contains(EntryKind::Field);
	let do_parameters = kinds.contains(EntryKind::Parameter);

	for class in tree.classes.values() {
		if do_classes {
			f(class);
		}
		if do_methods || do_parameters {
			for method in class.methods.values() {
				if do_methods {
					f(method);
				}
				if do_parameters {
					for parameter in method.parameters.values() {
						f(parameter);
					}
				}
			}
		}
		if do_fields {
			for field in class.fields.values() {
				f(field);
			}
		}
	}
}

/// Like [`walk`], but hands out mutable entries, for external-driven mutation
/// without a built-in transformation kind.
pub fn walk_mut(tree: &mut MappingTree, kinds: KindSet, mut f: impl FnMut(&mut dyn Named)) {
	let do_classes = kinds.contains(EntryKind::Class);
	let do_methods = kinds.contains(EntryKind::Method);
	let do_fields = kinds.contains(EntryKind::Field);
	let do_parameters = kinds.contains(EntryKind::Parameter);

	for class in tree.classes.values_mut() {
		if do_classes {
			f(class);
		}
		if do_methods || do_parameters {
			for method in class.methods.values_mut() {
				if do_methods {
					f(method);
				}
				if do_parameters {
					for parameter in method.parameters.values_mut() {
						f(parameter);
					}
				}
			}
		}
		if do_fields {
			for field in class.fields.values_mut() {
				f(field);
			}
		}
	}
}

/// An opaque edit of a mapping tree.
pub trait Transformation {
	/// Applies this edit to the tree. The edits of this crate are idempotent:
	/// applying one twice leaves the same tree as applying it once.
	fn apply(&self, tree: &mut MappingTree) -> Result<()>;

	/// A deterministic string summarizing this edit. Two transformations are
	/// cache-equivalent iff their fingerprints are equal.
	fn fingerprint(&self) -> String;
}

/// A [`Transformation`] that edits one entry at a time, driven by the
/// deterministic walk over its kind set.
pub trait EntryTransformation {
	fn kinds(&self) -> KindSet;

	fn handle(&self, entry: &mut dyn Named);

	fn fingerprint(&self) -> String;
}

impl<T: EntryTransformation> Transformation for T {
	fn apply(&self, tree: &mut MappingTree) -> Result<()> {
		walk_mut(tree, self.kinds(), |entry| self.handle(entry));
		Ok(())
	}

	fn fingerprint(&self) -> String {
		EntryTransformation::fingerprint(self)
	}
}

/// An ordered pipeline of transformations, run sequentially against one tree.
#[derive(Default)]
pub struct Transformations {
	transformations: Vec<Box<dyn Transformation>>,
}

impl Transformations {
	pub fn new() -> Transformations {
		Transformations::default()
	}

	pub fn add(&mut self, transformation: impl Transformation + 'static) {
		self.transformations.push(Box::new(transformation));
	}

	pub fn len(&self) -> usize {
		self.transformations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transformations.is_empty()
	}

	pub fn map_class(&mut self, intermediary: impl Into<String>, mapped: impl Into<String>) {
		self.add(MapSymbol::new(EntryKind::Class, intermediary, mapped));
	}

	pub fn map_method(&mut self, intermediary: impl Into<String>, mapped: impl Into<String>) {
		self.add(MapSymbol::new(EntryKind::Method, intermediary, mapped));
	}

	pub fn map_field(&mut self, intermediary: impl Into<String>, mapped: impl Into<String>) {
		self.add(MapSymbol::new(EntryKind::Field, intermediary, mapped));
	}

	pub fn unmap_class(&mut self, intermediary: impl Into<String>) {
		self.add(MapSymbol::unmap(EntryKind::Class, intermediary));
	}

	pub fn unmap_method(&mut self, intermediary: impl Into<String>) {
		self.add(MapSymbol::unmap(EntryKind::Method, intermediary));
	}

	pub fn unmap_field(&mut self, intermediary: impl Into<String>) {
		self.add(MapSymbol::unmap(EntryKind::Field, intermediary));
	}

	pub fn replace_regex(&mut self, kinds: KindSet, pattern: &str, replacement: impl Into<String>) -> Result<()> {
		self.add(RegexReplace::new(kinds, pattern, replacement)?);
		Ok(())
	}

	pub fn visit(&mut self, kinds: KindSet, description: impl Into<String>, visitor: impl Fn(&mut dyn Named) + 'static) {
		self.add(VisitEntries::new(kinds, description, visitor));
	}

	/// Runs every transformation against the tree, in order, each with
	/// exclusive access. No semantic validation of the resulting tree takes
	/// place; detecting e.g. duplicate mapped names is a downstream concern.
	pub fn apply(&self, tree: &mut MappingTree) -> Result<()> {
		for transformation in &self.transformations {
			debug!("applying transformation {:?}", transformation.fingerprint());
			transformation.apply(tree)
				.with_context(|| anyhow!("failed to apply transformation {:?}", transformation.fingerprint()))?;
		}
		Ok(())
	}

	/// The pipeline fingerprint: the members' fingerprints joined with `||||`.
	pub fn fingerprint(&self) -> String {
		self.transformations.iter()
			.map(|transformation| transformation.fingerprint())
			.collect::<Vec<_>>()
			.join("||||")
	}
}

/// Parses mappings (with format detection), applies the transformations, and
/// serializes the result in the hierarchical format.
pub fn modify(content: &str, transformations: &Transformations) -> Result<String> {
	let mut tree = crate::tiny_v2::read(content.as_bytes())?;
	transformations.apply(&mut tree)?;
	crate::tiny_v2::write_string(&tree)
}
