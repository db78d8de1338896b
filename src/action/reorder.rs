use anyhow::{anyhow, bail, Context, Result};
use crate::tree::mappings::MappingTree;
use crate::tree::names::{Names, Namespace};

impl MappingTree {
	#[allow(clippy::tabs_in_doc_comments)]
	/// Reorders the namespaces to the given order, returning a new tree.
	///
	/// The requested order may be any permutation of a subset of the current
	/// namespaces; its first element becomes the new primary namespace.
	/// Descriptors are remapped into the new primary namespace's encoding.
	/// Requesting the current order returns an independent copy.
	///
	/// # Example
	/// If you call this on a mapping like
	/// ```txt,ignore
	/// tiny	2	0	namespaceA	namespaceB	namespaceC
	/// c	A	B	C
	/// 	m	(LA;)V	a	b	c
	/// 	f	LA;	a	b	c
	/// ```
	/// with the given namespaces being `["namespaceC", "namespaceB", "namespaceA"]`, you get:
	/// ```txt,ignore
	/// tiny	2	0	namespaceC	namespaceB	namespaceA
	/// c	C	B	A
	/// 	m	(LC;)V	c	b	a
	/// 	f	LC;	c	b	a
	/// ```
	pub fn reorder(&self, namespaces: &[&str]) -> Result<MappingTree> {
		if namespaces == self.metadata.namespaces.names().iter().map(String::as_str).collect::<Vec<_>>() {
			return Ok(self.clone());
		}

		// at each position we have the namespace (and therefore the old index) to look to find the name
		let mut table = Vec::with_capacity(namespaces.len());
		for &name in namespaces {
			let namespace = self.get_namespace(name)
				.with_context(|| anyhow!("cannot reorder namespaces {:?} to {namespaces:?}", self.metadata.namespaces))?;
			if table.contains(&namespace) {
				bail!("cannot reorder namespaces {:?} to {namespaces:?}: {name:?} is requested twice", self.metadata.namespaces);
			}
			table.push(namespace);
		}
		if table.is_empty() {
			bail!("cannot reorder namespaces {:?} to an empty order", self.metadata.namespaces);
		}

		let old_primary = table[0];

		let mut tree = MappingTree::new(
			self.metadata.with_namespaces(self.metadata.namespaces.reorder(&table))
		);

		for class in self.classes.values() {
			let new_class = tree.get_or_create_class(class.names.name(old_primary));
			copy_names(&class.names, &mut new_class.names, &table);
			new_class.comment = class.comment.clone();

			for field in class.fields.values() {
				let desc = self.remap_descriptor_from_primary(&field.desc, old_primary)
					.with_context(|| anyhow!("failed to remap descriptor of field {:?}", field.names))?;
				let new_field = new_class.get_or_create_field(field.names.name(old_primary), &desc);
				copy_names(&field.names, &mut new_field.names, &table);
				new_field.comment = field.comment.clone();
			}

			for method in class.methods.values() {
				let desc = self.remap_descriptor_from_primary(&method.desc, old_primary)
					.with_context(|| anyhow!("failed to remap descriptor of method {:?}", method.names))?;
				let new_method = new_class.get_or_create_method(method.names.name(old_primary), &desc);
				copy_names(&method.names, &mut new_method.names, &table);
				new_method.comment = method.comment.clone();

				for parameter in method.parameters.values() {
					let new_parameter = new_method.get_or_create_parameter(parameter.index, parameter.names.name(old_primary));
					copy_names(&parameter.names, &mut new_parameter.names, &table);
					new_parameter.comment = parameter.comment.clone();
				}
			}
		}

		Ok(tree)
	}

	/// Removes the given namespaces, returning a new tree over the survivors
	/// in their current relative order.
	///
	/// Requesting a namespace the tree doesn't have is an error, raised
	/// before any work happens.
	pub fn remove_namespaces(&self, removed: &[&str]) -> Result<MappingTree> {
		for &name in removed {
			if !self.metadata.namespaces.names().iter().any(|x| x == name) {
				bail!("cannot remove {name:?} from tree with namespaces {:?}", self.metadata.namespaces);
			}
		}

		let survivors: Vec<&str> = self.metadata.namespaces.names().iter()
			.map(String::as_str)
			.filter(|name| !removed.contains(name))
			.collect();

		self.reorder(&survivors)
	}
}

/// Copies every non-primary destination slot from the source slot the table
/// points at, using the fallback chain. Slot 0 is the get-or-create key and
/// stays as-is.
fn copy_names(source: &Names, destination: &mut Names, table: &[Namespace]) {
	for (i, &namespace) in table.iter().enumerate().skip(1) {
		destination.set_name(Namespace(i), source.name(namespace));
	}
}
