use anyhow::Result;
use pretty_assertions::assert_eq;
use stratum::tree::mappings::MemberKey;

#[test]
fn read_and_write() -> Result<()> {
	let input = "tsrg2 obf srg\n\
		a pkg/A\n\
		\tfld field_1\n\
		\tmth (La;)V method_1\n\
		\t\t0 po param_0\n\
		\t\tstatic\n\
		b pkg/B\n";

	let mappings = stratum::tsrg2::read(input.as_bytes())?;

	mappings.metadata.namespaces.check_that(&["obf", "srg"])?;
	assert_eq!(mappings.metadata.major_version, 2);
	assert_eq!(mappings.classes.len(), 2);

	let class = &mappings.classes["a"];
	assert_eq!(class.names.names(), &["a", "pkg/A"]);

	// fields carry no descriptor in this format
	let field = &class.fields[&MemberKey { name: "fld".to_owned(), desc: String::new() }];
	assert_eq!(field.names.names(), &["fld", "field_1"]);

	let method = &class.methods[&MemberKey { name: "mth".to_owned(), desc: "(La;)V".to_owned() }];
	assert_eq!(method.names.names(), &["mth", "method_1"]);
	assert_eq!(method.parameters.len(), 1);
	assert_eq!(method.parameters[&0].names.names(), &["po", "param_0"]);

	// methods (with their parameters) come before fields on writing
	let expected = "tsrg2 obf srg\n\
		a pkg/A\n\
		\tmth (La;)V method_1\n\
		\t\t0 po param_0\n\
		\tfld field_1\n\
		b pkg/B\n";

	let actual = stratum::tsrg2::write_string(&mappings)?;

	assert_eq!(actual, expected, "left: written, right: expected");

	Ok(())
}

#[test]
fn method_and_field_told_apart_by_columns() -> Result<()> {
	let input = "tsrg2 a b c\n\
		x y z\n\
		\tf1 f2 f3\n\
		\tm1 ()V m2 m3\n";

	let mappings = stratum::tsrg2::read(input.as_bytes())?;

	let class = &mappings.classes["x"];
	assert_eq!(class.fields.len(), 1);
	assert_eq!(class.methods.len(), 1);
	assert_eq!(class.fields[&MemberKey { name: "f1".to_owned(), desc: String::new() }].names.names(), &["f1", "f2", "f3"]);
	assert_eq!(class.methods[&MemberKey { name: "m1".to_owned(), desc: "()V".to_owned() }].names.names(), &["m1", "m2", "m3"]);

	Ok(())
}

#[test]
fn rejects_member_before_class() {
	let input = "tsrg2 a b\n\tf1 f2\n";

	let err = stratum::tsrg2::read(input.as_bytes()).unwrap_err();

	let message = format!("{err:#}");
	assert!(message.contains("in line 2"), "got: {message}");
}

#[test]
fn rejects_bad_header() {
	assert!(stratum::tsrg2::read("tiny 2 0 a b\n".as_bytes()).is_err());
	assert!(stratum::tsrg2::read("".as_bytes()).is_err());
}

#[test]
fn rejects_malformed_slot() {
	let input = "tsrg2 a b\nx y\n\tm ()V m2\n\t\tone p1 p2\n";

	let err = stratum::tsrg2::read(input.as_bytes()).unwrap_err();

	let message = format!("{err:#}");
	assert!(message.contains("malformed local variable slot"), "got: {message}");
}

#[test]
fn rejects_too_deep_nesting() {
	let input = "tsrg2 a b\nx y\n\tm ()V m2\n\t\t0 p1 p2\n\t\t\tnope nope\n";

	assert!(stratum::tsrg2::read(input.as_bytes()).is_err());
}
