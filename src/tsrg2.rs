//! Functions to read and write mappings in the flat "tsrg2" format.
//!
//! The format nests by leading tab count and separates columns by spaces.
//! It is lossy compared to the hierarchical format: it carries no comments,
//! no properties, no escaping, and no field descriptors. Method and field
//! lines at depth 1 are told apart by their column count alone.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use crate::tree::mappings::{MappingMetadata, MappingTree, MemberKey};
use crate::tree::names::{Names, Namespace, Namespaces};

/// Reads a `.tsrg` file (tsrg2), by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<MappingTree> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tsrg2 file", path.as_ref()))
}

/// Reads the tsrg2 format, from the given reader.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let string = "tsrg2 obf srg\na pkg/A\n\tfld field_1\n\tmth (La;)V method_1\n";
///
/// let mappings = stratum::tsrg2::read(string.as_bytes()).unwrap();
///
/// mappings.metadata.namespaces.check_that(&["obf", "srg"]).unwrap();
/// assert_eq!(mappings.classes.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<MappingTree> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.map(|(line_number, line)| -> Result<(usize, String)> {
			Ok((line_number + 1, line?))
		});

	let (_, header) = lines.next().context("no header line")??;
	let header_fields: Vec<&str> = header.split(' ').collect();
	if header_fields.first() != Some(&"tsrg2") {
		bail!("header must start with `tsrg2`, in line 1: {header:?}");
	}
	let namespaces: Namespaces = header_fields[1..].iter().map(|x| x.to_string()).collect::<Vec<_>>().try_into()
		.with_context(|| anyhow!("in line 1: {header:?}"))?;
	let namespace_count = namespaces.count();

	let mut tree = MappingTree::new(MappingMetadata::new(2, 0, namespaces));

	// identity keys of the most recently opened class and method
	let mut current_class: Option<String> = None;
	let mut current_method: Option<MemberKey> = None;

	for line in lines {
		let (line_number, line) = line?;
		read_line(&mut tree, &mut current_class, &mut current_method, namespace_count, &line)
			.with_context(|| anyhow!("in line {line_number}: {line:?}"))?;
	}

	Ok(tree)
}

fn read_line(
	tree: &mut MappingTree,
	current_class: &mut Option<String>,
	current_method: &mut Option<MemberKey>,
	namespace_count: usize,
	line: &str,
) -> Result<()> {
	let depth = line.chars().take_while(|&x| x == '\t').count();
	// tabs are one byte each, so the count indexes the string safely
	let fields: Vec<&str> = line[depth..].split(' ').collect();

	match depth {
		0 => {
			if fields.len() != namespace_count {
				bail!("wrong number of columns for a class: expected {namespace_count}, got {}", fields.len());
			}
			let class = tree.get_or_create_class(fields[0]);
			for (i, &name) in fields.iter().enumerate().skip(1) {
				class.names.set_name(Namespace(i), name);
			}
			*current_class = Some(fields[0].to_owned());
			*current_method = None;
		},
		1 => {
			let class_key = current_class.as_ref()
				.context("member record without a preceding class")?;
			let class = tree.classes.get_mut(class_key)
				.with_context(|| anyhow!("no entry for class {class_key:?}"))?;

			if fields.len() == namespace_count + 1 {
				// <name> <descriptor> <name per further namespace...>
				let method = class.get_or_create_method(fields[0], fields[1]);
				for (i, &name) in fields.iter().enumerate().skip(2) {
					method.names.set_name(Namespace(i - 1), name);
				}
				*current_method = Some(MemberKey { name: fields[0].to_owned(), desc: fields[1].to_owned() });
			} else if fields.len() == namespace_count {
				// fields carry no descriptor in this format
				let field = class.get_or_create_field(fields[0], "");
				for (i, &name) in fields.iter().enumerate().skip(1) {
					field.names.set_name(Namespace(i), name);
				}
				*current_method = None;
			} else {
				bail!("wrong number of columns for a member: expected {namespace_count} (field) or {} (method), got {}",
					namespace_count + 1, fields.len());
			}
		},
		2 => {
			if fields.first() == Some(&"static") {
				return Ok(());
			}

			let class_key = current_class.as_ref()
				.context("parameter record without a preceding class")?;
			let method_key = current_method.as_ref()
				.context("parameter record without a preceding method")?;

			if fields.len() != namespace_count + 1 {
				bail!("wrong number of columns for a parameter: expected {}, got {}", namespace_count + 1, fields.len());
			}
			let index: usize = fields[0].parse()
				.with_context(|| anyhow!("malformed local variable slot {:?}", fields[0]))?;

			let method = tree.classes.get_mut(class_key)
				.with_context(|| anyhow!("no entry for class {class_key:?}"))?
				.methods.get_mut(method_key)
				.with_context(|| anyhow!("no entry for method {method_key:?}"))?;

			let parameter = method.get_or_create_parameter(index, fields[1]);
			for (i, &name) in fields.iter().enumerate().skip(2) {
				parameter.names.set_name(Namespace(i - 1), name);
			}
		},
		depth => bail!("illegal nesting depth {depth}"),
	}

	Ok(())
}

/// Writes the given mappings into a `String`, in the tsrg2 format.
pub fn write_string(mappings: &MappingTree) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the tsrg2 format.
pub fn write_vec(mappings: &MappingTree) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

/// Writes the given mappings to the given writer, in the tsrg2 format.
///
/// Comments and field descriptors cannot be represented and are dropped;
/// method lines carry the raw primary descriptor as their second column.
pub fn write(mappings: &MappingTree, w: &mut impl Write) -> Result<()> {
	let mut w = BufWriter::new(w);
	let w = &mut w;

	write!(w, "tsrg2")?;
	for namespace in mappings.metadata.namespaces.names() {
		write!(w, " {namespace}")?;
	}
	writeln!(w)?;

	for class in mappings.classes.values() {
		write!(w, "{}", class.names.name(Namespace(0)))?;
		write_names(w, &class.names, 1)?;
		writeln!(w)?;

		for method in class.methods.values() {
			write!(w, "\t{} {}", method.names.name(Namespace(0)), method.desc)?;
			write_names(w, &method.names, 1)?;
			writeln!(w)?;

			for parameter in method.parameters.values() {
				write!(w, "\t\t{}", parameter.index)?;
				write_names(w, &parameter.names, 0)?;
				writeln!(w)?;
			}
		}

		for field in class.fields.values() {
			write!(w, "\t{}", field.names.name(Namespace(0)))?;
			write_names(w, &field.names, 1)?;
			writeln!(w)?;
		}
	}

	w.flush()?;

	Ok(())
}

fn write_names(w: &mut impl Write, names: &Names, from: usize) -> Result<()> {
	for i in from..names.count() {
		write!(w, " {}", names.name(Namespace(i)))?;
	}
	Ok(())
}
