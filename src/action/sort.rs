use crate::tree::mappings::MappingTree;
use crate::tree::names::Namespace;

impl MappingTree {
	/// Sorts the classes, and per class the fields, methods and parameters,
	/// by their name in the given namespace (following the fallback chain).
	///
	/// Members sharing a name are ordered by their primary descriptor, so the
	/// result is deterministic for any namespace. Sorting is in place and
	/// stable.
	pub fn sort_by_namespace(&mut self, namespace: Namespace) {
		self.classes.sort_by(|_, a, _, b| a.names.name(namespace).cmp(b.names.name(namespace)));

		for class in self.classes.values_mut() {
			class.fields.sort_by(|_, a, _, b| {
				a.names.name(namespace).cmp(b.names.name(namespace))
					.then_with(|| a.desc.cmp(&b.desc))
			});
			class.methods.sort_by(|_, a, _, b| {
				a.names.name(namespace).cmp(b.names.name(namespace))
					.then_with(|| a.desc.cmp(&b.desc))
			});

			for method in class.methods.values_mut() {
				method.parameters.sort_by(|_, a, _, b| a.names.name(namespace).cmp(b.names.name(namespace)));
			}
		}
	}
}
