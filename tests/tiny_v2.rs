use anyhow::Result;
use pretty_assertions::assert_eq;
use stratum::tree::mappings::MemberKey;

#[test]
fn round_trip() -> Result<()> {
	let input = include_str!("round_trip_input.tiny");

	let mappings = stratum::tiny_v2::read(input.as_bytes())?;

	mappings.metadata.namespaces.check_that(&["official", "intermediary", "named"])?;
	assert_eq!(mappings.metadata.major_version, 2);
	assert_eq!(mappings.metadata.minor_version, 0);
	assert!(mappings.metadata.escaped_names());
	assert_eq!(mappings.classes.len(), 2);

	let class = &mappings.classes["a"];
	assert_eq!(class.names.names(), &["a", "net/example/C", "com/example/Cool"]);
	assert_eq!(class.comment.as_deref(), Some("A\nclass comment"));

	let method = &class.methods[&MemberKey { name: "m_1".to_owned(), desc: "(La;I)V".to_owned() }];
	assert_eq!(method.comment.as_deref(), Some("does the thing"));
	assert_eq!(method.parameters[&1].names.names(), &["p_1", "param_1", "amount"]);
	assert_eq!(method.parameters[&1].comment.as_deref(), Some("how much"));

	let field = &class.fields[&MemberKey { name: "f_1".to_owned(), desc: "La;".to_owned() }];
	assert_eq!(field.comment.as_deref(), Some("singleton\tinstance"));

	let actual = stratum::tiny_v2::write_string(&mappings)?;

	assert_eq!(actual, input, "left: written, right: input");

	Ok(())
}

#[test]
fn properties() -> Result<()> {
	let input = "tiny\t2\t0\ta\tb\n\tkey1\n\tkey2\tvalue2\nc\tA\tB\n";

	let mappings = stratum::tiny_v2::read(input.as_bytes())?;

	assert_eq!(mappings.metadata.properties.len(), 2);
	assert_eq!(mappings.metadata.properties["key1"], None);
	assert_eq!(mappings.metadata.properties["key2"], Some("value2".to_owned()));
	assert!(!mappings.metadata.escaped_names());

	Ok(())
}

#[test]
fn escaped_names_decode() -> Result<()> {
	let input = "tiny\t2\t0\ta\tb\n\tescaped-names\nc\tsome\\nclass\tother\n";

	let mappings = stratum::tiny_v2::read(input.as_bytes())?;

	// the escape sequence in the name becomes a real line feed
	assert!(mappings.classes.contains_key("some\nclass"));

	Ok(())
}

#[test]
fn without_flag_names_are_literal() -> Result<()> {
	let input = "tiny\t2\t0\ta\tb\nc\tsome\\nclass\tother\n";

	let mappings = stratum::tiny_v2::read(input.as_bytes())?;

	assert!(mappings.classes.contains_key("some\\nclass"));

	Ok(())
}

#[test]
fn local_variables_are_skipped() -> Result<()> {
	let input = "tiny\t2\t0\ta\tb\n\
		c\tA\tB\n\
		\tm\t()V\tm1\tm2\n\
		\t\tv\t1\t0\t-1\tx\ty\n\
		\t\t\tc\tlocal variable comment\n\
		\t\tp\t0\tpx\tpy\n";

	let mappings = stratum::tiny_v2::read(input.as_bytes())?;

	let method = &mappings.classes["A"].methods[&MemberKey { name: "m1".to_owned(), desc: "()V".to_owned() }];
	assert_eq!(method.parameters.len(), 1);
	assert_eq!(method.parameters[&0].names.names(), &["px", "py"]);
	assert_eq!(method.comment, None);

	Ok(())
}

#[test]
fn duplicate_class_records_merge() -> Result<()> {
	let input = "tiny\t2\t0\ta\tb\n\
		c\tA\tB\n\
		\tf\tI\tf1\tf2\n\
		c\tA\tB\n\
		\tm\t()V\tm1\tm2\n";

	let mappings = stratum::tiny_v2::read(input.as_bytes())?;

	assert_eq!(mappings.classes.len(), 1);
	assert_eq!(mappings.classes["A"].fields.len(), 1);
	assert_eq!(mappings.classes["A"].methods.len(), 1);

	Ok(())
}

#[test]
fn rejects_indent_jump() {
	let input = "tiny\t2\t0\ta\tb\nc\tA\tB\n\t\tp\t0\tx\ty\n";

	let err = stratum::tiny_v2::read(input.as_bytes()).unwrap_err();

	let message = format!("{err:#}");
	assert!(message.contains("in line 3"), "got: {message}");
	assert!(message.contains("indent"), "got: {message}");
}

#[test]
fn rejects_wrong_column_count() {
	// a field record needs namespace count + 2 columns
	let input = "tiny\t2\t0\ta\tb\nc\tA\tB\n\tf\tI\tonly\n";

	let err = stratum::tiny_v2::read(input.as_bytes()).unwrap_err();

	let message = format!("{err:#}");
	assert!(message.contains("in line 3"), "got: {message}");
	assert!(message.contains("columns"), "got: {message}");
}

#[test]
fn rejects_illegal_nesting() {
	let input = "tiny\t2\t0\ta\tb\nc\tA\tB\n\tp\t0\tx\ty\n";

	let err = stratum::tiny_v2::read(input.as_bytes()).unwrap_err();

	let message = format!("{err:#}");
	assert!(message.contains("not allowed"), "got: {message}");
}

#[test]
fn rejects_duplicate_comment() {
	let input = "tiny\t2\t0\ta\tb\nc\tA\tB\n\tc\tone\n\tc\ttwo\n";

	let err = stratum::tiny_v2::read(input.as_bytes()).unwrap_err();

	let message = format!("{err:#}");
	assert!(message.contains("only one comment"), "got: {message}");
}

#[test]
fn rejects_comment_on_comment() {
	let input = "tiny\t2\t0\ta\tb\nc\tA\tB\n\tc\tone\n\t\tc\ttwo\n";

	assert!(stratum::tiny_v2::read(input.as_bytes()).is_err());
}

#[test]
fn rejects_unknown_tag() {
	let input = "tiny\t2\t0\ta\tb\nx\tA\tB\n";

	let err = stratum::tiny_v2::read(input.as_bytes()).unwrap_err();

	let message = format!("{err:#}");
	assert!(message.contains("unrecognized record tag"), "got: {message}");
}

#[test]
fn rejects_malformed_versions() {
	assert!(stratum::tiny_v2::read("tiny\ttwo\t0\ta\tb\n".as_bytes()).is_err());
	assert!(stratum::tiny_v2::read("tiny\t2\t-1\ta\tb\n".as_bytes()).is_err());
}

#[test]
fn rejects_unsupported_header() {
	assert!(stratum::tiny_v2::read("bogus\t2\t0\ta\tb\n".as_bytes()).is_err());
	assert!(stratum::tiny_v2::read("".as_bytes()).is_err());
}

#[test]
fn reads_legacy_v1() -> Result<()> {
	// the field references its class before it is declared
	let input = "v1\tofficial\tnamed\n\
		FIELD\ta/b/C\tLa/b/C;\tf_1\tinstance\n\
		CLASS\ta/b/C\tcom/example/Cool\n\
		METHOD\ta/b/C\t(I)V\tm_1\tdoIt\n\
		CLASS\ta/b/D\tcom/example/Delta\n";

	let mappings = stratum::tiny_v2::read(input.as_bytes())?;

	mappings.metadata.namespaces.check_that(&["official", "named"])?;
	assert_eq!(mappings.metadata.major_version, 1);
	assert_eq!(mappings.classes.len(), 2);

	let class = &mappings.classes["a/b/C"];
	assert_eq!(class.names.names(), &["a/b/C", "com/example/Cool"]);

	let field = &class.fields[&MemberKey { name: "f_1".to_owned(), desc: "La/b/C;".to_owned() }];
	assert_eq!(field.names.names(), &["f_1", "instance"]);

	let method = &class.methods[&MemberKey { name: "m_1".to_owned(), desc: "(I)V".to_owned() }];
	assert_eq!(method.names.names(), &["m_1", "doIt"]);

	Ok(())
}

#[test]
fn legacy_v1_synthesizes_unknown_owners() -> Result<()> {
	let input = "v1\tofficial\tnamed\n\
		METHOD\tnever/Declared\t()V\tm_1\trun\n";

	let mappings = stratum::tiny_v2::read(input.as_bytes())?;

	let class = &mappings.classes["never/Declared"];
	assert_eq!(class.names.names(), &["never/Declared", ""]);
	assert_eq!(class.methods.len(), 1);

	Ok(())
}
