//! Remapping of descriptors between the namespaces of a mapping tree.
//!
//! A descriptor is a compact type signature such as `(La/b/C;I)V`, where
//! class references appear as `L<binary name>;` tokens among primitive codes,
//! array markers and structural punctuation. Remapping substitutes the
//! embedded binary names and passes every other character through verbatim.
//!
//! Remapping is lenient: a token that doesn't resolve to any class of the
//! tree is kept unchanged. Only a structurally broken descriptor (a class
//! reference without its terminating `;`) is an error.

use anyhow::{bail, Result};
use crate::tree::Descriptored;
use crate::tree::mappings::MappingTree;
use crate::tree::names::Namespace;

/// Maps a descriptor to a new one, substituting every embedded binary class
/// name with the output of `map_class`. Returning `None` keeps a name as-is.
pub fn map_descriptor(descriptor: &str, mut map_class: impl FnMut(&str) -> Option<String>) -> Result<String> {
	let mut s = String::with_capacity(descriptor.len());

	let mut iter = descriptor.chars();

	while let Some(ch) = iter.next() {
		s.push(ch);

		if ch == 'L' {
			let mut class_name = String::new();
			let mut terminated = false;
			for ch in iter.by_ref() {
				if ch == ';' {
					terminated = true;
					break;
				}
				class_name.push(ch);
			}
			if !terminated {
				bail!("descriptor {descriptor:?} has a missing semicolon somewhere");
			}

			match map_class(&class_name) {
				Some(new_class_name) => s.push_str(&new_class_name),
				None => s.push_str(&class_name),
			}
			s.push(';');
		}
	}

	Ok(s)
}

impl MappingTree {
	/// Remaps a descriptor given in the primary namespace's encoding into the
	/// `target` namespace.
	///
	/// Class names resolve via the primary-name index; the target name is
	/// looked up with the fallback chain.
	pub fn remap_descriptor_from_primary(&self, descriptor: &str, target: Namespace) -> Result<String> {
		map_descriptor(descriptor, |name| {
			self.classes.get(name)
				.map(|class| class.names.name(target).to_owned())
		})
	}

	/// Remaps a descriptor given in the `source` namespace's encoding into the
	/// primary namespace.
	///
	/// This linearly scans all classes per embedded name. Trees are small and
	/// this direction is not latency-critical.
	pub fn remap_descriptor_to_primary(&self, descriptor: &str, source: Namespace) -> Result<String> {
		map_descriptor(descriptor, |name| {
			self.classes.values()
				.find(|class| class.names.raw_name(source) == name)
				.map(|class| class.names.first_name().to_owned())
		})
	}

	/// Remaps a descriptor from the `from` namespace into the `to` namespace,
	/// composing through the primary namespace unless `from` already is it.
	pub fn remap_descriptor(&self, descriptor: &str, from: Namespace, to: Namespace) -> Result<String> {
		if from == Namespace::PRIMARY {
			return self.remap_descriptor_from_primary(descriptor, to);
		}
		let primary = self.remap_descriptor_to_primary(descriptor, from)?;
		self.remap_descriptor_from_primary(&primary, to)
	}

	/// The descriptor of the given entry as seen from `namespace`: the stored
	/// descriptor for the primary namespace, a remapped view otherwise.
	pub fn descriptor_of(&self, entry: &dyn Descriptored, namespace: Namespace) -> Result<String> {
		if namespace == Namespace::PRIMARY {
			Ok(entry.descriptor().to_owned())
		} else {
			self.remap_descriptor_from_primary(entry.descriptor(), namespace)
		}
	}
}
