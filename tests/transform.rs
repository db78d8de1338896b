use anyhow::Result;
use pretty_assertions::assert_eq;
use stratum::transform::{KindSet, MapSymbol, RegexReplace, Transformation, Transformations, VisitEntries};
use stratum::tree::{EntryKind, Named};
use stratum::tree::mappings::{MappingTree, MemberKey};
use stratum::tree::names::Namespace;

const INPUT: &str = "tiny\t2\t0\tofficial\tintermediary\tnamed\n\
	c\ta\tclass_1\tpkg/One\n\
	\tm\t()V\tm_a\tmethod_1\t\n\
	\t\tp\t0\tp_0\tparam_1\tit\n\
	\tm\t(I)V\tm_b\tmethod_2\tsecondThing\n\
	\tf\tI\tf_a\tfield_1\tcount\n\
	c\tb\tclass_2\tpkg/Two\n";

fn tree() -> Result<MappingTree> {
	stratum::tiny_v2::read(INPUT.as_bytes())
}

fn named(tree: &MappingTree) -> Result<Namespace> {
	tree.get_namespace("named")
}

#[test]
fn map_symbol_is_targeted() -> Result<()> {
	let mut tree = tree()?;
	let named = named(&tree)?;

	let mut transformations = Transformations::new();
	transformations.map_method("method_1", "foo");
	transformations.apply(&mut tree)?;

	let class = &tree.classes["a"];
	let method_1 = &class.methods[&MemberKey { name: "m_a".to_owned(), desc: "()V".to_owned() }];
	let method_2 = &class.methods[&MemberKey { name: "m_b".to_owned(), desc: "(I)V".to_owned() }];

	assert_eq!(method_1.names.raw_name(named), "foo");
	assert_eq!(method_2.names.raw_name(named), "secondThing");

	// other kinds with the same intermediary name would stay untouched
	assert_eq!(class.names.raw_name(named), "pkg/One");

	Ok(())
}

#[test]
fn map_symbol_unmap() -> Result<()> {
	let mut tree = tree()?;
	let named = named(&tree)?;

	MapSymbol::unmap(EntryKind::Method, "method_2").apply(&mut tree)?;

	let method_2 = &tree.classes["a"].methods[&MemberKey { name: "m_b".to_owned(), desc: "(I)V".to_owned() }];
	assert_eq!(method_2.names.raw_name(named), "");
	// the mapped view falls back to the intermediary name
	assert_eq!(method_2.names.mapped_name(), "method_2");

	Ok(())
}

#[test]
fn regex_replace_full_match_only() -> Result<()> {
	let mut tree = tree()?;
	let named = named(&tree)?;

	// method_1 has no mapped name of its own, its mapped view falls back to
	// the intermediary name, which matches fully
	RegexReplace::new(KindSet::single(EntryKind::Method), r"method_(\d+)", "func_$1")?
		.apply(&mut tree)?;

	let class = &tree.classes["a"];
	let method_1 = &class.methods[&MemberKey { name: "m_a".to_owned(), desc: "()V".to_owned() }];
	let method_2 = &class.methods[&MemberKey { name: "m_b".to_owned(), desc: "(I)V".to_owned() }];

	assert_eq!(method_1.names.raw_name(named), "func_1");
	// "secondThing" only matches partially, so it stays
	assert_eq!(method_2.names.raw_name(named), "secondThing");

	Ok(())
}

#[test]
fn regex_replace_skips_other_kinds() -> Result<()> {
	let mut tree = tree()?;
	let named = named(&tree)?;

	RegexReplace::new(KindSet::single(EntryKind::Field), r".*", "gone")?
		.apply(&mut tree)?;

	let class = &tree.classes["a"];
	assert_eq!(class.names.raw_name(named), "pkg/One");
	assert_eq!(class.fields[&MemberKey { name: "f_a".to_owned(), desc: "I".to_owned() }].names.raw_name(named), "gone");

	Ok(())
}

#[test]
fn visit_entries() -> Result<()> {
	let mut tree = tree()?;
	let named = named(&tree)?;

	let transformation = VisitEntries::new(KindSet::of(&[EntryKind::Class]), "uppercase mapped class names", |entry| {
		let upper = entry.names().mapped_name().to_uppercase();
		entry.names_mut().set_mapped_name(upper);
	});
	transformation.apply(&mut tree)?;

	assert_eq!(tree.classes["a"].names.raw_name(named), "PKG/ONE");
	assert_eq!(tree.classes["b"].names.raw_name(named), "PKG/TWO");

	Ok(())
}

#[test]
fn walk_order_is_deterministic() -> Result<()> {
	let tree = tree()?;

	let mut visited = Vec::new();
	stratum::transform::walk(&tree, KindSet::ALL, |entry| {
		visited.push((entry.kind(), entry.names().intermediary_name().to_owned()));
	});

	assert_eq!(visited, vec![
		(EntryKind::Class, "class_1".to_owned()),
		(EntryKind::Method, "method_1".to_owned()),
		(EntryKind::Parameter, "param_1".to_owned()),
		(EntryKind::Method, "method_2".to_owned()),
		(EntryKind::Field, "field_1".to_owned()),
		(EntryKind::Class, "class_2".to_owned()),
	]);

	Ok(())
}

#[test]
fn fingerprints_are_stable() -> Result<()> {
	let build = || -> Result<Transformations> {
		let mut transformations = Transformations::new();
		transformations.map_method("method_1", "foo");
		transformations.unmap_field("field_1");
		transformations.replace_regex(KindSet::ALL, r"m_(\d+)", "member_$1")?;
		transformations.visit(KindSet::ALL, "no-op", |_| {});
		Ok(transformations)
	};

	let a = build()?;
	let b = build()?;

	assert_eq!(a.fingerprint(), b.fingerprint());
	assert_eq!(a.fingerprint().matches("||||").count(), 3);

	Ok(())
}

#[test]
fn fingerprints_tell_kinds_apart() {
	let class = MapSymbol::new(EntryKind::Class, "a", "b");
	let method = MapSymbol::new(EntryKind::Method, "a", "b");

	assert_ne!(class.fingerprint(), method.fingerprint());
}

#[test]
fn modify_content() -> Result<()> {
	let mut transformations = Transformations::new();
	transformations.map_method("method_1", "foo");

	let output = stratum::transform::modify(INPUT, &transformations)?;

	let expected = INPUT.replace("\tm\t()V\tm_a\tmethod_1\t\n", "\tm\t()V\tm_a\tmethod_1\tfoo\n");
	assert_eq!(output, expected);

	Ok(())
}
