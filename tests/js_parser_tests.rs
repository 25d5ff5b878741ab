//! Tests for the JavaScript parser wrapper and its queries.

mod course_support;

use course_support::read_fixture;
use createx::js::{
    Parser,
    queries::{DECLARATION_QUERY, EXPORT_QUERY},
};

#[test]
fn parser_creates_successfully() {
    let parser = Parser::new("const a = 1\n".to_string()).expect("parse");
    assert_eq!(parser.root_node().kind(), "program");
    assert!(parser.first_error().is_none());
}

#[test]
fn declaration_query_skips_statements() {
    let parser = Parser::new(read_fixture("loops.js")).expect("parse");
    let nodes = parser
        .query_nodes(DECLARATION_QUERY, "declaration")
        .expect("run query");

    let kinds: Vec<&str> = nodes.iter().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "lexical_declaration",
            "lexical_declaration",
            "lexical_declaration",
            "function_declaration",
            "lexical_declaration",
        ]
    );
}

#[test]
fn export_query_ignores_other_assignments() {
    let source = "exports.x = 1\nmodule.other = 2\nmodule.exports = { repo: {} }\n";
    let parser = Parser::new(source.to_string()).expect("parse");
    let values = parser.query_nodes(EXPORT_QUERY, "value").expect("run query");

    assert_eq!(values.len(), 1);
    assert_eq!(parser.text(values[0]).expect("text"), "{ repo: {} }");
}

#[test]
fn nested_declarations_are_not_module_level() {
    let source = "function outer() { const inner = 1; return inner }\nmodule.exports = {}\n";
    let parser = Parser::new(source.to_string()).expect("parse");
    let nodes = parser
        .query_nodes(DECLARATION_QUERY, "declaration")
        .expect("run query");

    assert_eq!(nodes.len(), 1);
    assert!(parser.text(nodes[0]).expect("text").starts_with("function outer"));
}

#[test]
fn unknown_capture_is_an_error() {
    let parser = Parser::new("module.exports = {}".to_string()).expect("parse");
    assert!(parser.query_nodes(EXPORT_QUERY, "missing").is_err());
}

#[test]
fn first_error_points_at_the_broken_line() {
    let parser = Parser::new("const a = 1\nconst = 2\n".to_string()).expect("parse");
    let error = parser.first_error().expect("an error node");
    assert_eq!(error.start_position().row, 1);
}
