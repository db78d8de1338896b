use crate::tree::names::Names;

pub mod mappings;

/// The kind of an entry in a mapping tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntryKind {
	Class,
	Field,
	Method,
	Parameter,
}

/// An entry carrying one name per namespace and an optional comment.
///
/// Implemented by all four entry structs. Entries are plain data: anything
/// that needs namespace resolution or a cross-class lookup (such as viewing
/// a descriptor in a non-primary namespace) goes through the owning
/// [`MappingTree`][crate::tree::mappings::MappingTree].
pub trait Named {
	fn kind(&self) -> EntryKind;

	fn names(&self) -> &Names;
	fn names_mut(&mut self) -> &mut Names;

	fn comment(&self) -> Option<&str>;
	fn set_comment(&mut self, comment: Option<String>);
}

/// An entry that additionally stores a descriptor, held in the primary
/// namespace's encoding only.
///
/// Views in other namespaces are computed on demand, see
/// [`MappingTree::descriptor_of`][crate::tree::mappings::MappingTree::descriptor_of].
pub trait Descriptored: Named {
	fn descriptor(&self) -> &str;
	fn set_descriptor(&mut self, descriptor: String);
}

pub mod names {
	use std::fmt::{Debug, Formatter};
	use std::ops::Index;
	use anyhow::{bail, Error, Result};

	/// Describes a given namespace of a mapping tree.
	///
	/// This object exists to remove out of bounds checks. If this object was
	/// obtained from the tree it's used with (via [`Namespaces::get_namespace`]
	/// or [`Namespaces::namespace`]), no range checking is necessary.
	#[derive(Debug, Copy, Clone, PartialEq, Eq)]
	pub struct Namespace(pub(crate) usize);

	impl Namespace {
		/// The primary namespace, at index 0. Valid for every tree, since a
		/// tree always has at least one namespace.
		pub const PRIMARY: Namespace = Namespace(0);

		pub fn id(self) -> usize {
			self.0
		}
	}

	/// A struct storing the names of the namespaces.
	#[derive(Clone, PartialEq)]
	pub struct Namespaces {
		names: Vec<String>,
	}

	impl Namespaces {
		pub fn count(&self) -> usize {
			self.names.len()
		}

		pub fn names(&self) -> &[String] {
			&self.names
		}

		pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
			for (id, namespace) in self.names.iter().enumerate() {
				if namespace == name {
					return Ok(Namespace(id));
				}
			}
			bail!("cannot find namespace with name {name:?}, only got {self:?}");
		}

		pub fn namespace(&self, id: usize) -> Result<Namespace> {
			if id >= self.names.len() {
				bail!("cannot create namespace with id larger or equal to number of namespaces: {id} >= {}", self.names.len());
			}
			Ok(Namespace(id))
		}

		/// Returns an error if the names of `self` aren't the names given in the argument.
		/// This can be used to check that after reading mappings, you have the correct namespaces in them.
		pub fn check_that(&self, names: &[&str]) -> Result<()> {
			if self.names != names {
				bail!("expected namespaces {names:?}, got {self:?}");
			}
			Ok(())
		}

		pub(crate) fn reorder(&self, table: &[Namespace]) -> Namespaces {
			Namespaces {
				names: table.iter().map(|&namespace| self[namespace].clone()).collect(),
			}
		}
	}

	impl Index<Namespace> for Namespaces {
		type Output = String;

		fn index(&self, index: Namespace) -> &String {
			&self.names[index.0]
		}
	}

	impl Debug for Namespaces {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	impl TryFrom<Vec<String>> for Namespaces {
		type Error = Error;

		fn try_from(value: Vec<String>) -> Result<Namespaces> {
			if value.is_empty() {
				bail!("mappings must have at least one namespace");
			}
			if value.iter().any(|i| i.is_empty()) {
				bail!("found empty namespace name in {value:?}, every namespace name must be non-empty");
			}
			for (i, name) in value.iter().enumerate() {
				if value[..i].contains(name) {
					bail!("duplicate namespace name {name:?} in {value:?}");
				}
			}

			Ok(Namespaces { names: value })
		}
	}

	impl From<Namespaces> for Vec<String> {
		fn from(value: Namespaces) -> Vec<String> {
			value.names
		}
	}

	/// A struct storing the names of one entry, one slot per namespace.
	///
	/// An empty string means the entry has no name in that namespace. Lookup
	/// via [`Names::name`] walks the fallback chain; the raw accessors don't.
	#[derive(Clone, PartialEq, PartialOrd, Eq, Ord)]
	pub struct Names {
		names: Vec<String>,
	}

	impl Names {
		pub(crate) fn from_first_name(src: String, count: usize) -> Names {
			let mut names = vec![String::new(); count];
			names[0] = src;
			Names { names }
		}

		pub fn count(&self) -> usize {
			self.names.len()
		}

		pub fn names(&self) -> &[String] {
			&self.names
		}

		fn name_at(&self, index: usize) -> &str {
			let mut index = index.min(self.names.len() - 1);
			while self.names[index].is_empty() {
				if index == 0 {
					return "";
				}
				index -= 1;
			}
			&self.names[index]
		}

		/// The name in the given namespace, following the fallback chain:
		/// if the slot is empty, the nearest lower non-empty slot is used;
		/// an empty slot 0 doesn't fall back further and yields `""`.
		pub fn name(&self, namespace: Namespace) -> &str {
			self.name_at(namespace.0)
		}

		/// The slot value itself, without any fallback.
		pub fn raw_name(&self, namespace: Namespace) -> &str {
			&self.names[namespace.0]
		}

		pub fn set_name(&mut self, namespace: Namespace, name: impl Into<String>) {
			self.names[namespace.0] = name.into();
		}

		pub(crate) fn first_name(&self) -> &str {
			&self.names[0]
		}

		/// The name in the intermediary ("stable") namespace, at index 1,
		/// following the fallback chain.
		pub fn intermediary_name(&self) -> &str {
			self.name_at(1)
		}

		/// The name in the mapped namespace, the last one, following the
		/// fallback chain.
		pub fn mapped_name(&self) -> &str {
			self.name_at(self.names.len() - 1)
		}

		/// Overwrites the raw slot of the mapped (last) namespace. An empty
		/// string unmaps the entry.
		pub fn set_mapped_name(&mut self, name: impl Into<String>) {
			let last = self.names.len() - 1;
			self.names[last] = name.into();
		}
	}

	impl Debug for Names {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

}
