//! Tests for reading configuration modules without evaluating them.

mod course_support;

use course_support::read_fixture;
use createx::js::{ConfigFormatError, ConfigModule, Domain};

fn module(name: &str) -> ConfigModule {
    ConfigModule::parse(read_fixture(name)).expect("parse fixture")
}

fn format_error(source: &str) -> ConfigFormatError {
    let err = ConfigModule::parse(source.to_string())
        .and_then(|m| m.subtrees())
        .expect_err("config should be rejected");
    err.downcast_ref::<ConfigFormatError>()
        .expect("a config format error")
        .clone()
}

#[test]
fn commonjs_subtrees_are_copied_verbatim() {
    let subtrees = module("loops.js").subtrees().expect("subtrees");

    assert_eq!(
        subtrees.get(Domain::Machine).text(),
        "{\n    steps: stepIds(steps),\n    initial: 'init',\n  }"
    );
    assert_eq!(
        subtrees.get(Domain::Repo).text(),
        "{\n    remote: path.posix.join('course', 'loops'),\n  }"
    );

    let viewer_uses: Vec<_> = subtrees.get(Domain::Viewer).free().iter().collect();
    assert_eq!(viewer_uses, vec!["TITLE", "steps"]);
}

#[test]
fn esm_default_export_and_string_keys() {
    let module = module("esm.js");
    let subtrees = module.subtrees().expect("subtrees");

    assert_eq!(
        subtrees.get(Domain::Machine).text(),
        "{ ...shared, kind: 'counter' }"
    );
    assert_eq!(
        subtrees.get(Domain::Viewer).text(),
        "{ limit: shared.limit }"
    );
    assert_eq!(subtrees.get(Domain::Repo).text(), "{}");
}

#[test]
fn declarations_follow_source_order() {
    let declarations = module("loops.js").declarations().expect("declarations");
    let names: Vec<Vec<String>> = declarations.iter().map(|d| d.names().to_vec()).collect();

    assert_eq!(
        names,
        vec![
            vec!["path".to_string()],
            vec!["TITLE".to_string()],
            vec!["steps".to_string()],
            vec!["stepIds".to_string()],
            vec!["unused".to_string()],
        ]
    );
    assert_eq!(declarations[0].text(), "const path = require('path')");
}

#[test]
fn exported_declarations_lose_the_export_keyword() {
    let declarations = module("esm.js").declarations().expect("declarations");
    let texts: Vec<&str> = declarations.iter().map(|d| d.text()).collect();

    assert_eq!(texts, vec!["const LIMIT = 3", "const shared = { limit: LIMIT }"]);
}

#[test]
fn missing_keys_become_empty_objects() {
    let subtrees = module("viewer_only.js").subtrees().expect("subtrees");

    assert_eq!(subtrees.get(Domain::Machine).text(), "{}");
    assert_eq!(subtrees.get(Domain::Repo).text(), "{}");
    assert!(subtrees.get(Domain::Viewer).text().contains("Welcome\n  to the course"));
}

#[test]
fn last_duplicate_key_wins() {
    let module = ConfigModule::parse(
        "module.exports = { repo: { a: 1 }, repo: { b: 2 } }".to_string(),
    )
    .expect("parse");
    let subtrees = module.subtrees().expect("subtrees");
    assert_eq!(subtrees.get(Domain::Repo).text(), "{ b: 2 }");
}

#[test]
fn top_level_spread_is_rejected() {
    assert_eq!(
        format_error(&read_fixture("top_level_spread.js")),
        ConfigFormatError::UnsupportedProperty {
            what: "spread element".to_string(),
            line: 3,
        }
    );
}

#[test]
fn exported_call_is_not_an_object() {
    match format_error(&read_fixture("factory.js")) {
        ConfigFormatError::NotAnObject { kind, line } => {
            assert_eq!(kind, "call_expression");
            assert_eq!(line, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn domain_methods_and_computed_keys_are_rejected() {
    assert!(matches!(
        format_error("module.exports = { machine() { return {} } }"),
        ConfigFormatError::UnsupportedProperty { .. }
    ));
    assert!(matches!(
        format_error("const k = 'repo'\nmodule.exports = { [k]: {} }"),
        ConfigFormatError::UnsupportedProperty { line: 2, .. }
    ));

    let module = ConfigModule::parse("module.exports = { ['viewer']: { a: 1 } }".to_string())
        .expect("parse");
    assert_eq!(
        module.subtrees().expect("subtrees").get(Domain::Viewer).text(),
        "{ a: 1 }"
    );
}

#[test]
fn missing_export_is_reported() {
    assert_eq!(
        format_error("const config = { machine: {} }\n"),
        ConfigFormatError::MissingExport
    );
}

#[test]
fn syntax_errors_carry_a_position() {
    match format_error("const a = 1\nmodule.exports = { machine: ( }\n") {
        ConfigFormatError::Syntax { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}
