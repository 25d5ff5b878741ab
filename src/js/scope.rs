#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Static scope analysis over JavaScript syntax trees.
//!
//! Answers two questions without evaluating anything: which names a
//! declaration introduces, and which names an expression uses without
//! binding them itself.

use std::collections::{BTreeSet, HashSet};

use anyhow::{Context, Result};
use tree_sitter::Node;

/// Node kinds that open a function scope.
const FUNCTION_KINDS: &[&str] = &[
    "function",
    "function_expression",
    "function_declaration",
    "generator_function",
    "generator_function_declaration",
    "arrow_function",
    "method_definition",
];

/// Node kinds that open a block scope.
const BLOCK_KINDS: &[&str] = &[
    "statement_block",
    "switch_body",
    "for_statement",
    "for_in_statement",
    "catch_clause",
    "class",
    "class_declaration",
];

/// Node kinds that name a binding or a reference, depending on position.
const NAME_KINDS: &[&str] = &[
    "identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
];

/// Returns the source text of `node` as an owned string.
fn name_of(node: Node<'_>, code: &[u8]) -> Result<String> {
    node.utf8_text(code)
        .map(str::to_owned)
        .with_context(|| format!("Cannot map {} node to source text", node.kind()))
}

/// Whether `node` starts a new function scope.
fn is_function(node: Node<'_>) -> bool {
    FUNCTION_KINDS.contains(&node.kind())
}

/// Collects the names bound by a binding pattern.
///
/// Default values in the pattern are expressions and bind nothing.
fn pattern_names(node: Node<'_>, code: &[u8], out: &mut Vec<String>) -> Result<()> {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => out.push(name_of(node, code)?),
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                pattern_names(left, code, out)?;
            }
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                pattern_names(value, code, out)?;
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" | "formal_parameters" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                pattern_names(child, code, out)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Names introduced by a declaration statement, in source order.
///
/// Handles `var`/`let`/`const` (including destructuring), function,
/// generator and class declarations, and any of those wrapped in `export`.
/// Anything else declares nothing.
pub fn declared_names(node: Node<'_>, code: &[u8]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    match node.kind() {
        "export_statement" => {
            if let Some(declaration) = node.child_by_field_name("declaration") {
                names = declared_names(declaration, code)?;
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(name) = declarator.child_by_field_name("name") {
                    pattern_names(name, code, &mut names)?;
                }
            }
        }
        "function_declaration" | "generator_function_declaration" | "class_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                names.push(name_of(name, code)?);
            }
        }
        _ => {}
    }
    Ok(names)
}

/// Collects `var` names declared anywhere under `node` without crossing into
/// nested functions.
fn hoisted_vars(node: Node<'_>, code: &[u8], out: &mut Vec<String>) -> Result<()> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if is_function(child) {
            continue;
        }
        match child.kind() {
            "variable_declaration" => out.extend(declared_names(child, code)?),
            "for_in_statement" if declaration_kind(child, code)?.as_deref() == Some("var") => {
                if let Some(left) = child.child_by_field_name("left") {
                    pattern_names(left, code, out)?;
                }
            }
            _ => {}
        }
        hoisted_vars(child, code, out)?;
    }
    Ok(())
}

/// The `var`/`let`/`const` keyword of a `for ... in/of` head, if any.
fn declaration_kind(node: Node<'_>, code: &[u8]) -> Result<Option<String>> {
    node.child_by_field_name("kind")
        .map(|kind| name_of(kind, code))
        .transpose()
}

/// Names a function-like node binds for its body: its own name when it is
/// an expression, parameters, `arguments` and hoisted `var`s.
fn function_bindings(node: Node<'_>, code: &[u8]) -> Result<HashSet<String>> {
    let mut names = Vec::new();

    if let Some(name) = node.child_by_field_name("name")
        && name.kind() == "identifier"
    {
        names.push(name_of(name, code)?);
    }
    if let Some(params) = node.child_by_field_name("parameters") {
        pattern_names(params, code, &mut names)?;
    }
    if let Some(param) = node.child_by_field_name("parameter") {
        pattern_names(param, code, &mut names)?;
    }
    if node.kind() != "arrow_function" {
        names.push("arguments".to_string());
    }
    if let Some(body) = node.child_by_field_name("body") {
        hoisted_vars(body, code, &mut names)?;
    }

    Ok(names.into_iter().collect())
}

/// Lexically scoped names declared directly in a statement list.
fn lexical_names(node: Node<'_>, code: &[u8], out: &mut Vec<String>) -> Result<()> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "lexical_declaration"
            | "function_declaration"
            | "generator_function_declaration"
            | "class_declaration" => out.extend(declared_names(child, code)?),
            "switch_case" | "switch_default" => lexical_names(child, code, out)?,
            _ => {}
        }
    }
    Ok(())
}

/// Names a block-like node binds for its children.
fn block_bindings(node: Node<'_>, code: &[u8]) -> Result<HashSet<String>> {
    let mut names = Vec::new();

    match node.kind() {
        "statement_block" | "switch_body" => lexical_names(node, code, &mut names)?,
        "for_statement" => {
            if let Some(init) = node.child_by_field_name("initializer")
                && init.kind() == "lexical_declaration"
            {
                names.extend(declared_names(init, code)?);
            }
        }
        "for_in_statement" => {
            if declaration_kind(node, code)?.is_some()
                && let Some(left) = node.child_by_field_name("left")
            {
                pattern_names(left, code, &mut names)?;
            }
        }
        "catch_clause" => {
            if let Some(param) = node.child_by_field_name("parameter") {
                pattern_names(param, code, &mut names)?;
            }
        }
        "class" | "class_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                names.push(name_of(name, code)?);
            }
        }
        _ => {}
    }

    Ok(names.into_iter().collect())
}

/// Walks a tree while tracking the scopes opened along the way.
struct FreeIdentifiers<'a> {
    /// Source the tree was parsed from.
    code:   &'a [u8],
    /// Bindings of every enclosing scope, innermost last.
    scopes: Vec<HashSet<String>>,
    /// Names referenced but not bound by any enclosing scope.
    found:  BTreeSet<String>,
}

impl FreeIdentifiers<'_> {
    /// Whether `name` is bound by an enclosing scope.
    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    /// Visits `node` and its descendants.
    fn visit(&mut self, node: Node<'_>) -> Result<()> {
        if NAME_KINDS.contains(&node.kind()) {
            let name = name_of(node, self.code)?;
            if !self.is_bound(&name) {
                self.found.insert(name);
            }
            return Ok(());
        }

        let scope = if is_function(node) {
            Some(function_bindings(node, self.code)?)
        } else if BLOCK_KINDS.contains(&node.kind()) {
            Some(block_bindings(node, self.code)?)
        } else {
            None
        };
        let opened = scope.is_some();
        if let Some(scope) = scope {
            self.scopes.push(scope);
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child)?;
        }

        if opened {
            self.scopes.pop();
        }
        Ok(())
    }
}

/// Names referenced under `node` that are not bound within it.
///
/// Property names, member properties and labels are never references;
/// shorthand object properties (`{ port }`) are.
pub fn free_identifiers(node: Node<'_>, code: &[u8]) -> Result<BTreeSet<String>> {
    let mut walker = FreeIdentifiers {
        code,
        scopes: Vec::new(),
        found: BTreeSet::new(),
    };
    walker.visit(node)?;
    Ok(walker.found)
}
