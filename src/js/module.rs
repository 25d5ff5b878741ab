#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::BTreeSet, fmt};

use anyhow::Result;
use serde::Serialize;
use snailquote::unescape;
use tree_sitter::Node;

use super::{
    parser::Parser,
    queries::{DECLARATION_QUERY, EXPORT_QUERY},
    scope::{declared_names, free_identifiers},
};

/// The three registries a configuration is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Machine definitions, under the `machine` key.
    Machine,
    /// Viewer definitions, under the `viewer` key.
    Viewer,
    /// Repository definitions, under the `repo` key.
    Repo,
}

impl Domain {
    /// Every domain, in registry write order.
    pub const ALL: [Domain; 3] = [Domain::Machine, Domain::Viewer, Domain::Repo];

    /// The configuration key holding this domain's subtree.
    pub fn key(self) -> &'static str {
        match self {
            Domain::Machine => "machine",
            Domain::Viewer => "viewer",
            Domain::Repo => "repo",
        }
    }

    /// Looks up the domain named by a configuration key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.key() == key)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Reasons a configuration module cannot be split.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigFormatError {
    /// The source does not parse.
    #[error("Syntax error at line {line}, column {column}")]
    Syntax {
        /// 1-based line of the first error.
        line:   usize,
        /// 1-based column of the first error.
        column: usize,
    },
    /// Neither `module.exports = ...` nor `export default ...` was found.
    #[error("No top-level `module.exports = ...` or `export default ...` found")]
    MissingExport,
    /// The exported value is something other than an object literal.
    #[error("The exported value must be an object literal, found `{kind}` at line {line}")]
    NotAnObject {
        /// Tree-sitter kind of the exported value.
        kind: String,
        /// 1-based line of the exported value.
        line: usize,
    },
    /// A property whose keys cannot be known without evaluating the module.
    #[error("Unsupported {what} at line {line}: domain keys must be plain properties")]
    UnsupportedProperty {
        /// What was found, e.g. `spread element`.
        what: String,
        /// 1-based line of the property.
        line: usize,
    },
    /// Identifiers that resolve to nothing when the registries are loaded.
    #[error("Unresolved identifiers: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

/// 1-based line of `node`.
fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Top-level statement kinds that are either carried into submodules or
/// have no effect on them.
const CARRIED_OR_INERT_KINDS: &[&str] = &[
    "lexical_declaration",
    "variable_declaration",
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "export_statement",
    "import_statement",
    "comment",
    "empty_statement",
    "hash_bang_line",
];

/// A piece of source lifted out of a configuration module, together with the
/// names it uses but does not bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Verbatim source text.
    text: String,
    /// Free identifiers referenced by the text.
    free: BTreeSet<String>,
}

impl Fragment {
    /// Lifts `node` out of the source held by `parser`.
    fn from_node(parser: &Parser, node: Node<'_>) -> Result<Self> {
        Ok(Self {
            text: parser.text(node)?.to_string(),
            free: free_identifiers(node, parser.code().as_bytes())?,
        })
    }

    /// The fragment standing in for a missing domain key.
    pub fn empty_object() -> Self {
        Self {
            text: "{}".to_string(),
            free: BTreeSet::new(),
        }
    }

    /// Verbatim source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Names used but not bound by the fragment.
    pub fn free(&self) -> &BTreeSet<String> {
        &self.free
    }
}

/// The `machine`, `viewer` and `repo` subtrees of one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeSet {
    /// The `machine` subtree.
    machine: Fragment,
    /// The `viewer` subtree.
    viewer:  Fragment,
    /// The `repo` subtree.
    repo:    Fragment,
}

impl Default for SubtreeSet {
    fn default() -> Self {
        Self {
            machine: Fragment::empty_object(),
            viewer:  Fragment::empty_object(),
            repo:    Fragment::empty_object(),
        }
    }
}

impl SubtreeSet {
    /// The subtree for `domain`.
    pub fn get(&self, domain: Domain) -> &Fragment {
        match domain {
            Domain::Machine => &self.machine,
            Domain::Viewer => &self.viewer,
            Domain::Repo => &self.repo,
        }
    }

    /// Mutable access to the subtree for `domain`.
    fn slot(&mut self, domain: Domain) -> &mut Fragment {
        match domain {
            Domain::Machine => &mut self.machine,
            Domain::Viewer => &mut self.viewer,
            Domain::Repo => &mut self.repo,
        }
    }

    /// Free identifiers across all three subtrees.
    pub fn free(&self) -> BTreeSet<String> {
        Domain::ALL
            .iter()
            .flat_map(|d| self.get(*d).free.iter().cloned())
            .collect()
    }
}

/// A top-level statement that is not carried into any submodule, such as
/// `counter += 1` or `setup()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedStatement {
    /// 1-based line the statement starts on.
    line:  usize,
    /// Names it uses.
    names: BTreeSet<String>,
}

impl DroppedStatement {
    /// 1-based line the statement starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Names the statement uses, assignment targets included.
    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }
}

/// A module-level declaration statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Names it declares, in source order.
    names: Vec<String>,
    /// The declaration itself, verbatim, without any `export` keyword.
    text:  String,
    /// Names it uses apart from its own.
    free:  BTreeSet<String>,
}

impl Declaration {
    /// Creates a declaration from its parts.
    pub fn new(names: Vec<String>, text: impl Into<String>, free: BTreeSet<String>) -> Self {
        Self {
            names,
            text: text.into(),
            free,
        }
    }

    /// Names this declaration introduces.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Verbatim source of the declaration.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Names used by the declaration.
    pub fn free(&self) -> &BTreeSet<String> {
        &self.free
    }

    /// Whether the declaration introduces any of `names`.
    pub fn declares_any(&self, names: &BTreeSet<String>) -> bool {
        self.names.iter().any(|n| names.contains(n))
    }
}

/// A parsed configuration module.
///
/// Holds only the syntax tree; the module is never evaluated.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    /// Source and tree.
    parser: Parser,
}

impl ConfigModule {
    /// Parses `source`, rejecting anything with syntax errors.
    pub fn parse(source: String) -> Result<Self> {
        let parser = Parser::new(source)?;

        if let Some(node) = parser.first_error() {
            let pos = node.start_position();
            return Err(ConfigFormatError::Syntax {
                line:   pos.row + 1,
                column: pos.column + 1,
            }
            .into());
        }

        Ok(Self { parser })
    }

    /// Returns the exporting statement and the exported value, with any
    /// wrapping parentheses removed. The last export wins.
    fn export(&self) -> Result<(Node<'_>, Node<'_>)> {
        let statements = self.parser.query_nodes(EXPORT_QUERY, "statement")?;
        let values = self.parser.query_nodes(EXPORT_QUERY, "value")?;

        let (Some(statement), Some(mut value)) =
            (statements.last().copied(), values.last().copied())
        else {
            return Err(ConfigFormatError::MissingExport.into());
        };

        while value.kind() == "parenthesized_expression" {
            let mut cursor = value.walk();
            let inner = value
                .named_children(&mut cursor)
                .find(|c| c.kind() != "comment");
            match inner {
                Some(inner) => value = inner,
                None => break,
            }
        }

        Ok((statement, value))
    }

    /// Returns the exported object literal.
    fn export_object(&self) -> Result<Node<'_>> {
        let (_, value) = self.export()?;
        if value.kind() != "object" {
            return Err(ConfigFormatError::NotAnObject {
                kind: value.kind().to_string(),
                line: line_of(value),
            }
            .into());
        }
        Ok(value)
    }

    /// Resolves the key of an object property, if it is statically known.
    fn property_key(&self, key: Node<'_>) -> Result<Option<String>> {
        let text = self.parser.text(key)?;
        Ok(match key.kind() {
            "property_identifier" | "number" => Some(text.to_string()),
            "string" => unescape(text).ok(),
            "computed_property_name" => {
                let mut cursor = key.walk();
                let inner = key.named_children(&mut cursor).find(|c| c.kind() != "comment");
                match inner {
                    Some(inner) if inner.kind() == "string" => {
                        unescape(self.parser.text(inner)?).ok()
                    }
                    _ => {
                        return Err(ConfigFormatError::UnsupportedProperty {
                            what: "computed key".to_string(),
                            line: line_of(key),
                        }
                        .into());
                    }
                }
            }
            _ => None,
        })
    }

    /// Extracts the `machine`, `viewer` and `repo` subtrees of the exported
    /// object. Missing keys yield `{}`; unknown keys are ignored; a repeated
    /// key keeps its last value.
    pub fn subtrees(&self) -> Result<SubtreeSet> {
        let object = self.export_object()?;
        let mut set = SubtreeSet::default();

        let mut cursor = object.walk();
        for property in object.named_children(&mut cursor) {
            match property.kind() {
                "pair" => {
                    let (Some(key), Some(value)) = (
                        property.child_by_field_name("key"),
                        property.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    let domain = self
                        .property_key(key)?
                        .and_then(|k| Domain::from_key(&k));
                    if let Some(domain) = domain {
                        *set.slot(domain) = Fragment::from_node(&self.parser, value)?;
                    }
                }
                "shorthand_property_identifier" => {
                    if let Some(domain) = Domain::from_key(self.parser.text(property)?) {
                        *set.slot(domain) = Fragment::from_node(&self.parser, property)?;
                    }
                }
                "method_definition" => {
                    let named_domain = match property.child_by_field_name("name") {
                        Some(name) => self
                            .property_key(name)?
                            .and_then(|k| Domain::from_key(&k)),
                        None => None,
                    };
                    if named_domain.is_some() {
                        return Err(ConfigFormatError::UnsupportedProperty {
                            what: "method".to_string(),
                            line: line_of(property),
                        }
                        .into());
                    }
                }
                "spread_element" => {
                    return Err(ConfigFormatError::UnsupportedProperty {
                        what: "spread element".to_string(),
                        line: line_of(property),
                    }
                    .into());
                }
                _ => {}
            }
        }

        Ok(set)
    }

    /// Module-level declarations in source order.
    pub fn declarations(&self) -> Result<Vec<Declaration>> {
        let code = self.parser.code().as_bytes();
        let (export, _) = self.export()?;

        let mut declarations = Vec::new();
        for node in self.parser.query_nodes(DECLARATION_QUERY, "declaration")? {
            if node.id() == export.id() {
                continue;
            }
            let inner = match node.kind() {
                "export_statement" => match node.child_by_field_name("declaration") {
                    Some(inner) => inner,
                    None => continue,
                },
                _ => node,
            };

            let names = declared_names(inner, code)?;
            let mut free = free_identifiers(inner, code)?;
            for name in &names {
                free.remove(name);
            }
            declarations.push(Declaration::new(
                names,
                self.parser.text(inner)?.trim_end(),
                free,
            ));
        }

        Ok(declarations)
    }

    /// Top-level statements that are neither declarations, imports nor an
    /// export, in source order.
    pub fn dropped_statements(&self) -> Result<Vec<DroppedStatement>> {
        let code = self.parser.code().as_bytes();
        let exports: BTreeSet<usize> = self
            .parser
            .query_nodes(EXPORT_QUERY, "statement")?
            .iter()
            .map(|node| node.id())
            .collect();

        let root = self.parser.root_node();
        let mut cursor = root.walk();
        let mut dropped = Vec::new();
        for statement in root.named_children(&mut cursor) {
            if CARRIED_OR_INERT_KINDS.contains(&statement.kind())
                || exports.contains(&statement.id())
            {
                continue;
            }
            dropped.push(DroppedStatement {
                line:  line_of(statement),
                names: free_identifiers(statement, code)?,
            });
        }

        Ok(dropped)
    }
}
