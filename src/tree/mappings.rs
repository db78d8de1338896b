use anyhow::Result;
use indexmap::IndexMap;
use crate::tree::{Descriptored, EntryKind, Named};
use crate::tree::names::{Names, Namespace, Namespaces};

/// The property key signalling that names and descriptors in the
/// hierarchical format are escaped.
pub const ESCAPED_NAMES_PROPERTY: &str = "escaped-names";

/// The header of a mapping tree: format version, namespaces and properties.
///
/// Owned exclusively by the tree. The namespace at index 0 is the *primary*
/// namespace, the identity source for all get-or-create operations and for
/// descriptor storage.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingMetadata {
	pub major_version: u32,
	pub minor_version: u32,
	pub namespaces: Namespaces,
	pub properties: IndexMap<String, Option<String>>,
}

impl MappingMetadata {
	pub fn new(major_version: u32, minor_version: u32, namespaces: Namespaces) -> MappingMetadata {
		MappingMetadata {
			major_version,
			minor_version,
			namespaces,
			properties: IndexMap::new(),
		}
	}

	/// A copy of this metadata with different namespaces, keeping the format
	/// version and the properties.
	pub fn with_namespaces(&self, namespaces: Namespaces) -> MappingMetadata {
		MappingMetadata {
			major_version: self.major_version,
			minor_version: self.minor_version,
			namespaces,
			properties: self.properties.clone(),
		}
	}

	pub fn escaped_names(&self) -> bool {
		self.properties.contains_key(ESCAPED_NAMES_PROPERTY)
	}
}

/// A mapping tree: classes with their members, each carrying one name per
/// namespace.
///
/// The classes are stored in insertion order, keyed by their primary-namespace
/// name; the map keeps the order and the primary-name index in lockstep on
/// every insert and remove. Renaming a raw slot 0 directly does *not* re-key
/// the entry; keeping identity keys intact after such edits is the caller's
/// responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingTree {
	pub metadata: MappingMetadata,
	pub classes: IndexMap<String, ClassEntry>,
}

impl MappingTree {
	pub fn new(metadata: MappingMetadata) -> MappingTree {
		MappingTree {
			metadata,
			classes: IndexMap::new(),
		}
	}

	pub fn namespace_count(&self) -> usize {
		self.metadata.namespaces.count()
	}

	pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
		self.metadata.namespaces.get_namespace(name)
	}

	/// Returns the class with the given primary-namespace name, inserting a
	/// fresh one (blank secondary names, no comment, no members) if there is
	/// none. Repeated calls with the same name return the same entry.
	pub fn get_or_create_class(&mut self, primary_name: &str) -> &mut ClassEntry {
		let count = self.metadata.namespaces.count();
		self.classes.entry(primary_name.to_owned())
			.or_insert_with(|| ClassEntry::new(Names::from_first_name(primary_name.to_owned(), count)))
	}
}

/// The identity key of a field or method within its class: the pair of
/// primary-namespace name and primary-namespace descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
	pub name: String,
	pub desc: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
	pub names: Names,
	pub comment: Option<String>,
	pub fields: IndexMap<MemberKey, FieldEntry>,
	pub methods: IndexMap<MemberKey, MethodEntry>,
}

impl ClassEntry {
	fn new(names: Names) -> ClassEntry {
		ClassEntry {
			names,
			comment: None,
			fields: IndexMap::new(),
			methods: IndexMap::new(),
		}
	}

	pub fn get_or_create_field(&mut self, primary_name: &str, primary_desc: &str) -> &mut FieldEntry {
		let count = self.names.count();
		let key = MemberKey { name: primary_name.to_owned(), desc: primary_desc.to_owned() };
		self.fields.entry(key)
			.or_insert_with(|| FieldEntry {
				desc: primary_desc.to_owned(),
				names: Names::from_first_name(primary_name.to_owned(), count),
				comment: None,
			})
	}

	pub fn get_or_create_method(&mut self, primary_name: &str, primary_desc: &str) -> &mut MethodEntry {
		let count = self.names.count();
		let key = MemberKey { name: primary_name.to_owned(), desc: primary_desc.to_owned() };
		self.methods.entry(key)
			.or_insert_with(|| MethodEntry {
				desc: primary_desc.to_owned(),
				names: Names::from_first_name(primary_name.to_owned(), count),
				comment: None,
				parameters: IndexMap::new(),
			})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
	pub desc: String,
	pub names: Names,
	pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry {
	pub desc: String,
	pub names: Names,
	pub comment: Option<String>,
	pub parameters: IndexMap<usize, ParameterEntry>,
}

impl MethodEntry {
	/// Returns the parameter with the given local variable slot, inserting a
	/// fresh one named `primary_name` in the primary namespace if there is
	/// none. The slot is the identity; an existing parameter keeps its names.
	pub fn get_or_create_parameter(&mut self, index: usize, primary_name: &str) -> &mut ParameterEntry {
		let count = self.names.count();
		self.parameters.entry(index)
			.or_insert_with(|| ParameterEntry {
				index,
				names: Names::from_first_name(primary_name.to_owned(), count),
				comment: None,
			})
	}
}

/// A parameter, identified by its local variable slot rather than a name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEntry {
	pub index: usize,
	pub names: Names,
	pub comment: Option<String>,
}

macro_rules! impl_named {
	($ty:ty, $kind:expr) => {
		impl Named for $ty {
			fn kind(&self) -> EntryKind {
				$kind
			}

			fn names(&self) -> &Names {
				&self.names
			}

			fn names_mut(&mut self) -> &mut Names {
				&mut self.names
			}

			fn comment(&self) -> Option<&str> {
				self.comment.as_deref()
			}

			fn set_comment(&mut self, comment: Option<String>) {
				self.comment = comment;
			}
		}
	};
}

impl_named!(ClassEntry, EntryKind::Class);
impl_named!(FieldEntry, EntryKind::Field);
impl_named!(MethodEntry, EntryKind::Method);
impl_named!(ParameterEntry, EntryKind::Parameter);

impl Descriptored for FieldEntry {
	fn descriptor(&self) -> &str {
		&self.desc
	}

	fn set_descriptor(&mut self, descriptor: String) {
		self.desc = descriptor;
	}
}

impl Descriptored for MethodEntry {
	fn descriptor(&self) -> &str {
		&self.desc
	}

	fn set_descriptor(&mut self, descriptor: String) {
		self.desc = descriptor;
	}
}
