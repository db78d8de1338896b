//! Functions to read and write mappings in the hierarchical "tiny" format.
//!
//! # Reading
//! You can read a `.tiny` file using the [`read_file`] method, by passing a path.
//! If you already have a [`Read`]er, you can use the [`read`] method.
//!
//! [`read`] detects the format from the header token: `tiny` headers are
//! parsed as the hierarchical format, `v1` headers as the legacy flat-per-record
//! variant (read-only compatibility input).
//!
//! It's recommended to check that the namespaces are indeed the ones expected.
//! See [`Namespaces::check_that`] for more info.
//!
//! # Writing
//! For writing there are the [`write`][fn@write] as well as the [`write_vec`] and
//! [`write_string`] methods.
//!
//! Writing keeps the tree order; no sorting takes place. Name cells are
//! written with the fallback-chain accessor, so an input where every slot is
//! filled explicitly round-trips bit for bit.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use log::debug;
use crate::tree::mappings::{ClassEntry, MappingMetadata, MappingTree, MemberKey, MethodEntry};
use crate::tree::names::{Names, Namespace, Namespaces};

/// Reads a `.tiny` file, by opening the file given by the path.
///
/// It's recommended to check that the namespaces are indeed the ones expected.
/// See [`Namespaces::check_that`] for more info.
pub fn read_file(path: impl AsRef<Path>) -> Result<MappingTree> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tiny file", path.as_ref()))
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads the hierarchical format (or, detected from the header, the legacy
/// flat variant), from the given reader.
///
/// It's recommended to check that the namespaces are indeed the ones expected.
/// See [`Namespaces::check_that`] for more info.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let string = "\
/// tiny	2	0	namespaceA	namespaceB	namespaceC
/// c	A	B	C
/// 	f	LA;	a	b	c
/// 	m	(LA;)V	a	b	c
/// ";
///
/// let mappings = stratum::tiny_v2::read(string.as_bytes()).unwrap();
///
/// mappings.metadata.namespaces.check_that(&["namespaceA", "namespaceB", "namespaceC"]).unwrap();
/// assert_eq!(mappings.classes.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<MappingTree> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.map(|(line_number, line)| -> Result<TinyLine> {
			Ok(TinyLine::new(line_number + 1, line?))
		});

	let header = lines.next().context("no header line")??;

	match header.fields.first().map(String::as_str) {
		Some("tiny") => read_hierarchical(header, lines),
		Some("v1") => read_legacy(header, lines),
		_ => bail!("unsupported mapping format, in line 1: {:?}", header.raw),
	}
}

#[derive(Debug)]
struct TinyLine {
	line_number: usize,
	indent: usize,
	fields: Vec<String>,
	raw: String,
}

impl TinyLine {
	fn new(line_number: usize, line: String) -> TinyLine {
		// tabs are one byte each, so the count indexes the string safely
		let indent = line.chars().take_while(|&x| x == '\t').count();
		let fields = line[indent..].split('\t').map(|x| x.to_owned()).collect();

		TinyLine {
			line_number,
			indent,
			fields,
			raw: line,
		}
	}
}

/// The record kinds of the hierarchical format.
///
/// The table of legal parents and exact column counts lives here, so it can
/// be exercised without going through a reader.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum RecordKind {
	Class,
	Field,
	Method,
	Parameter,
	LocalVariable,
	Comment,
}

impl RecordKind {
	fn from_tag(indent: usize, tag: &str) -> Result<RecordKind> {
		Ok(match tag {
			"c" if indent == 0 => RecordKind::Class,
			"c" => RecordKind::Comment,
			"f" => RecordKind::Field,
			"m" => RecordKind::Method,
			"p" => RecordKind::Parameter,
			"v" => RecordKind::LocalVariable,
			tag => bail!("unrecognized record tag {tag:?}"),
		})
	}

	/// The exact number of columns of this record, tag included, indent excluded.
	fn expected_columns(self, namespace_count: usize) -> usize {
		match self {
			RecordKind::Class => 1 + namespace_count,
			RecordKind::Field | RecordKind::Method => 2 + namespace_count,
			RecordKind::Parameter => 2 + namespace_count,
			RecordKind::LocalVariable => 4 + namespace_count,
			RecordKind::Comment => 2,
		}
	}

	fn allowed_under(self, parent: Option<RecordKind>) -> bool {
		match self {
			RecordKind::Class => parent.is_none(),
			RecordKind::Field | RecordKind::Method => parent == Some(RecordKind::Class),
			RecordKind::Parameter | RecordKind::LocalVariable => parent == Some(RecordKind::Method),
			RecordKind::Comment => matches!(
				parent,
				Some(RecordKind::Class | RecordKind::Field | RecordKind::Method | RecordKind::Parameter | RecordKind::LocalVariable)
			),
		}
	}
}

/// The entity a record opened, addressed by identity keys so comments on
/// deeper lines can find it again in the tree.
#[derive(Debug)]
enum Target {
	Class { class: String },
	Field { class: String, field: MemberKey },
	Method { class: String, method: MemberKey },
	Parameter { class: String, method: MemberKey, index: usize },
	LocalVariable,
	Comment,
}

#[derive(Debug)]
struct Frame {
	kind: RecordKind,
	target: Target,
}

fn read_hierarchical(header: TinyLine, lines: impl Iterator<Item=Result<TinyLine>>) -> Result<MappingTree> {
	if header.fields.len() < 4 {
		bail!("header must be `tiny <major> <minor> <namespaces...>` with at least one namespace, in line 1: {:?}", header.raw);
	}

	let major_version = header.fields[1].parse()
		.with_context(|| anyhow!("malformed major version {:?}, in line 1: {:?}", header.fields[1], header.raw))?;
	let minor_version = header.fields[2].parse()
		.with_context(|| anyhow!("malformed minor version {:?}, in line 1: {:?}", header.fields[2], header.raw))?;
	let namespaces: Namespaces = header.fields[3..].to_vec().try_into()
		.with_context(|| anyhow!("in line 1: {:?}", header.raw))?;
	let namespace_count = namespaces.count();

	let mut tree = MappingTree::new(MappingMetadata::new(major_version, minor_version, namespaces));

	let mut in_header = true;
	let mut escaped_names = false;
	let mut stack: Vec<Frame> = Vec::new();

	for line in lines {
		let line = line?;

		if in_header {
			if line.indent == 1 {
				read_property(&line, &mut tree.metadata.properties)
					.with_context(|| anyhow!("in line {}: {:?}", line.line_number, line.raw))?;
				continue;
			}
			if line.indent > 1 {
				bail!("invalid indent {} in header, in line {}: {:?}", line.indent, line.line_number, line.raw);
			}
			in_header = false;
			escaped_names = tree.metadata.escaped_names();
		}

		let line_number = line.line_number;
		let content = line.raw.clone();
		read_record(&mut tree, &mut stack, escaped_names, namespace_count, line)
			.with_context(|| anyhow!("in line {line_number}: {content:?}"))?;
	}

	Ok(tree)
}

fn read_property(line: &TinyLine, properties: &mut IndexMap<String, Option<String>>) -> Result<()> {
	match line.fields.as_slice() {
		[key] => properties.insert(key.clone(), None),
		[key, value] => properties.insert(key.clone(), Some(value.clone())),
		fields => bail!("wrong number of columns for a property: expected 1 or 2, got {}", fields.len()),
	};
	Ok(())
}

fn read_record(
	tree: &mut MappingTree,
	stack: &mut Vec<Frame>,
	escaped_names: bool,
	namespace_count: usize,
	line: TinyLine,
) -> Result<()> {
	if line.indent > stack.len() {
		bail!("illegal indent jump: expected an indent of at most {}, got {}", stack.len(), line.indent);
	}
	stack.truncate(line.indent);

	let tag = line.fields.first().map(String::as_str).unwrap_or_default();
	let kind = RecordKind::from_tag(line.indent, tag)?;

	let parent = stack.last().map(|frame| frame.kind);
	if !kind.allowed_under(parent) {
		match parent {
			Some(parent) => bail!("a {kind:?} record is not allowed under a {parent:?} record"),
			None => bail!("a {kind:?} record is not allowed at the top level"),
		}
	}

	let expected = kind.expected_columns(namespace_count);
	if line.fields.len() != expected {
		bail!("wrong number of columns for a {kind:?} record: expected {expected}, got {}", line.fields.len());
	}

	let target = match kind {
		RecordKind::Class => {
			let names = read_names(&line.fields[1..], escaped_names)?;
			let class = tree.get_or_create_class(&names[0]);
			set_secondary_names(&mut class.names, &names);
			Target::Class { class: names[0].clone() }
		},
		RecordKind::Field => {
			let class_key = parent_class(stack)?;
			let desc = unescape_opt(&line.fields[1], escaped_names)?;
			let names = read_names(&line.fields[2..], escaped_names)?;
			let class = class_entry(tree, &class_key)?;
			let field = class.get_or_create_field(&names[0], &desc);
			set_secondary_names(&mut field.names, &names);
			Target::Field { class: class_key, field: MemberKey { name: names[0].clone(), desc } }
		},
		RecordKind::Method => {
			let class_key = parent_class(stack)?;
			let desc = unescape_opt(&line.fields[1], escaped_names)?;
			let names = read_names(&line.fields[2..], escaped_names)?;
			let class = class_entry(tree, &class_key)?;
			let method = class.get_or_create_method(&names[0], &desc);
			set_secondary_names(&mut method.names, &names);
			Target::Method { class: class_key, method: MemberKey { name: names[0].clone(), desc } }
		},
		RecordKind::Parameter => {
			let (class_key, method_key) = parent_method(stack)?;
			let index: usize = line.fields[1].parse()
				.with_context(|| anyhow!("malformed local variable slot {:?}", line.fields[1]))?;
			let names = read_names(&line.fields[2..], escaped_names)?;
			let method = method_entry(tree, &class_key, &method_key)?;
			let parameter = method.get_or_create_parameter(index, &names[0]);
			set_secondary_names(&mut parameter.names, &names);
			Target::Parameter { class: class_key, method: method_key, index }
		},
		RecordKind::LocalVariable => {
			// recognized structurally, not retained
			parent_method(stack)?;
			for raw in &line.fields[1..=3] {
				let _: i64 = raw.parse()
					.with_context(|| anyhow!("malformed integer {raw:?} in local variable record"))?;
			}
			read_names(&line.fields[4..], escaped_names)?;
			Target::LocalVariable
		},
		RecordKind::Comment => {
			let comment = unescape(&line.fields[1])?;
			let parent = stack.last()
				.context("comment without anything to attach it to")?;
			attach_comment(tree, &parent.target, comment)?;
			Target::Comment
		},
	};

	stack.push(Frame { kind, target });

	Ok(())
}

fn read_names(fields: &[String], escaped_names: bool) -> Result<Vec<String>> {
	fields.iter()
		.map(|field| unescape_opt(field, escaped_names))
		.collect()
}

fn set_secondary_names(names: &mut Names, new: &[String]) {
	for (i, name) in new.iter().enumerate().skip(1) {
		names.set_name(Namespace(i), name.clone());
	}
}

fn parent_class(stack: &[Frame]) -> Result<String> {
	match stack.last().map(|frame| &frame.target) {
		Some(Target::Class { class }) => Ok(class.clone()),
		_ => bail!("record requires an enclosing class"),
	}
}

fn parent_method(stack: &[Frame]) -> Result<(String, MemberKey)> {
	match stack.last().map(|frame| &frame.target) {
		Some(Target::Method { class, method }) => Ok((class.clone(), method.clone())),
		_ => bail!("record requires an enclosing method"),
	}
}

fn class_entry<'a>(tree: &'a mut MappingTree, class: &str) -> Result<&'a mut ClassEntry> {
	tree.classes.get_mut(class)
		.with_context(|| anyhow!("no entry for class {class:?}"))
}

fn method_entry<'a>(tree: &'a mut MappingTree, class: &str, method: &MemberKey) -> Result<&'a mut MethodEntry> {
	class_entry(tree, class)?
		.methods.get_mut(method)
		.with_context(|| anyhow!("no entry for method {method:?} in class {class:?}"))
}

fn attach_comment(tree: &mut MappingTree, target: &Target, comment: String) -> Result<()> {
	let slot = match target {
		Target::Class { class } => &mut class_entry(tree, class)?.comment,
		Target::Field { class, field } => {
			&mut class_entry(tree, class)?
				.fields.get_mut(field)
				.with_context(|| anyhow!("no entry for field {field:?} in class {class:?}"))?
				.comment
		},
		Target::Method { class, method } => &mut method_entry(tree, class, method)?.comment,
		Target::Parameter { class, method, index } => {
			&mut method_entry(tree, class, method)?
				.parameters.get_mut(index)
				.with_context(|| anyhow!("no entry for parameter {index} of method {method:?}"))?
				.comment
		},
		// local variables aren't retained, their comments are dropped with them
		Target::LocalVariable => return Ok(()),
		Target::Comment => bail!("cannot attach a comment to a comment"),
	};

	if let Some(existing) = slot {
		bail!("only one comment is allowed, got {existing:?} and {comment:?}");
	}
	*slot = Some(comment);
	Ok(())
}

fn read_legacy(header: TinyLine, lines: impl Iterator<Item=Result<TinyLine>>) -> Result<MappingTree> {
	debug!("detected a v1 header, reading as legacy flat mappings");

	if header.fields.len() < 2 {
		bail!("v1 header must name at least one namespace, in line 1: {:?}", header.raw);
	}
	let namespaces: Namespaces = header.fields[1..].to_vec().try_into()
		.with_context(|| anyhow!("in line 1: {:?}", header.raw))?;

	let mut tree = MappingTree::new(MappingMetadata::new(1, 0, namespaces));

	// classes first, so that member records may reference classes declared
	// anywhere in the file
	let mut field_lines = Vec::new();
	let mut method_lines = Vec::new();

	for line in lines {
		let line = line?;
		if line.fields.len() < 2 {
			continue;
		}
		match line.fields[0].as_str() {
			"CLASS" => {
				let class = tree.get_or_create_class(&line.fields[1]);
				let count = class.names.count();
				for (i, name) in line.fields[2..].iter().enumerate() {
					if i + 1 >= count {
						break;
					}
					class.names.set_name(Namespace(i + 1), name.clone());
				}
			},
			"FIELD" => field_lines.push(line),
			"METHOD" => method_lines.push(line),
			_ => {},
		}
	}

	for line in field_lines {
		read_legacy_member(&mut tree, &line, true)?;
	}
	for line in method_lines {
		read_legacy_member(&mut tree, &line, false)?;
	}

	Ok(tree)
}

fn read_legacy_member(tree: &mut MappingTree, line: &TinyLine, is_field: bool) -> Result<()> {
	// FIELD/METHOD <owner class> <descriptor> <name per namespace...>
	let [_, owner, desc, names @ ..] = line.fields.as_slice() else {
		bail!("wrong number of columns for a member record, in line {}: {:?}", line.line_number, line.raw);
	};
	if names.is_empty() {
		bail!("member record without names, in line {}: {:?}", line.line_number, line.raw);
	}

	// synthesizes the owning class if it wasn't declared
	let class = tree.get_or_create_class(owner);
	let count = class.names.count();

	let member_names = if is_field {
		&mut class.get_or_create_field(&names[0], desc).names
	} else {
		&mut class.get_or_create_method(&names[0], desc).names
	};
	for (i, name) in names.iter().enumerate().skip(1) {
		if i >= count {
			break;
		}
		member_names.set_name(Namespace(i), name.clone());
	}

	Ok(())
}

fn unescape_opt(string: &str, escaped_names: bool) -> Result<String> {
	if escaped_names {
		unescape(string)
	} else {
		Ok(string.to_owned())
	}
}

fn unescape(string: &str) -> Result<String> {
	if !string.contains('\\') {
		return Ok(string.to_owned());
	}

	let mut ret = String::with_capacity(string.len());
	let mut chars = string.chars();
	while let Some(ch) = chars.next() {
		if ch == '\\' {
			let escape = chars.next()
				.context("incomplete escape sequence at the end")?;
			ret.push(match escape {
				'\\' => '\\',
				'n' => '\n',
				'r' => '\r',
				'0' => '\0',
				't' => '\t',
				escape => bail!("invalid escape character: \\{escape}"),
			});
		} else {
			ret.push(ch);
		}
	}
	Ok(ret)
}

fn escape(string: &str) -> String {
	let mut ret = String::with_capacity(string.len());
	for ch in string.chars() {
		match ch {
			'\\' => ret.push_str("\\\\"),
			'\n' => ret.push_str("\\n"),
			'\r' => ret.push_str("\\r"),
			'\0' => ret.push_str("\\0"),
			'\t' => ret.push_str("\\t"),
			ch => ret.push(ch),
		}
	}
	ret
}

/// Writes the given mappings into a `String`, in the hierarchical format.
///
/// If the mappings somehow produce invalid UTF-8, then this method fails.
///
/// This is equivalent to first calling [`write_vec`] and then [`String::from_utf8`].
///
/// This method is of most use in test cases, where you also use the
/// `pretty_assertions` crate for viewing string diffs.
pub fn write_string(mappings: &MappingTree) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the hierarchical format.
///
/// This is equivalent to letting [`write`][fn@write] write into a `Vec<u8>`.
pub fn write_vec(mappings: &MappingTree) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

#[allow(clippy::tabs_in_doc_comments)]
/// Writes the given mappings to the given writer, in the hierarchical format.
///
/// Classes, members and parameters are written in tree order; each class is
/// followed by its methods (with their parameters) and then its fields.
/// Comments are re-escaped. A canonically formatted input (every name slot
/// filled explicitly) round-trips bit for bit:
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let input = "\
/// tiny	2	0	official	named
/// c	a	pkg/A
/// 	m	(La;)V	m_1	run
/// 	f	I	f_1	count
/// ";
///
/// let mappings = stratum::tiny_v2::read(input.as_bytes()).unwrap();
///
/// let written = stratum::tiny_v2::write_string(&mappings).unwrap();
///
/// assert_eq!(written, input);
/// ```
pub fn write(mappings: &MappingTree, w: &mut impl Write) -> Result<()> {
	// the buffering makes it much faster
	let mut w = BufWriter::new(w);
	let w = &mut w;

	write!(w, "tiny\t{}\t{}", mappings.metadata.major_version, mappings.metadata.minor_version)?;
	for namespace in mappings.metadata.namespaces.names() {
		write!(w, "\t{namespace}")?;
	}
	writeln!(w)?;

	for (key, value) in &mappings.metadata.properties {
		match value {
			None => writeln!(w, "\t{key}")?,
			Some(value) => writeln!(w, "\t{key}\t{}", escape(value))?,
		}
	}

	for class in mappings.classes.values() {
		write!(w, "c")?;
		write_names(w, &class.names)?;
		write_comment(w, 1, &class.comment)?;

		for method in class.methods.values() {
			write!(w, "\tm\t{}", method.desc)?;
			write_names(w, &method.names)?;
			write_comment(w, 2, &method.comment)?;

			for parameter in method.parameters.values() {
				write!(w, "\t\tp\t{}", parameter.index)?;
				write_names(w, &parameter.names)?;
				write_comment(w, 3, &parameter.comment)?;
			}
		}

		for field in class.fields.values() {
			write!(w, "\tf\t{}", field.desc)?;
			write_names(w, &field.names)?;
			write_comment(w, 2, &field.comment)?;
		}
	}

	w.flush()?;

	Ok(())
}

fn write_names(w: &mut impl Write, names: &Names) -> Result<()> {
	for i in 0..names.count() {
		write!(w, "\t{}", names.name(Namespace(i)))?;
	}
	writeln!(w)?;
	Ok(())
}

fn write_comment(w: &mut impl Write, indent: usize, comment: &Option<String>) -> Result<()> {
	if let Some(comment) = comment {
		for _ in 0..indent {
			write!(w, "\t")?;
		}
		writeln!(w, "c\t{}", escape(comment))?;
	}
	Ok(())
}
