#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Tree-sitter parser wrapper for JavaScript source code.

use std::fmt::Formatter;

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Language, Node, Query, QueryCursor, StreamingIterator, Tree};

/// A struct that wraps a tree-sitter parse tree and the source it came from.
#[derive(Clone)]
pub struct Parser {
    /// The source code being parsed.
    code: String,
    /// The parse tree.
    tree: Tree,
    /// The tree-sitter JavaScript grammar language.
    lang: Language,
}

/// Returns the compiled tree-sitter JavaScript language.
fn javascript_language() -> Language {
    tree_sitter_javascript::LANGUAGE.into()
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("len", &self.code.len())
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Returns a new parser object.
    ///
    /// * `source_code`: the source code to be parsed
    pub fn new(source_code: String) -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        let language = javascript_language();

        parser
            .set_language(&language)
            .with_context(|| "Failed to load JavaScript grammar")?;
        let tree = parser
            .parse(source_code.as_str(), None)
            .ok_or_else(|| anyhow!("Error parsing JavaScript code"))?;

        Ok(Self {
            code: source_code,
            tree,
            lang: language,
        })
    }

    /// A getter for parser's source code.
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the parse tree's root node.
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns the tree-sitter language (useful for custom queries).
    pub fn language(&self) -> &Language {
        &self.lang
    }

    /// Returns the source text spanned by `node`.
    pub fn text(&self, node: Node<'_>) -> Result<&str> {
        node.utf8_text(self.code.as_bytes())
            .with_context(|| format!("Cannot map {} node to source text", node.kind()))
    }

    /// Returns the first node that failed to parse, if any.
    ///
    /// Missing tokens the parser inserted to recover count as failures.
    pub fn first_error(&self) -> Option<Node<'_>> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return None;
        }

        let mut cursor = root.walk();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                return Some(node);
            }
            let mut children: Vec<_> = node
                .children(&mut cursor)
                .filter(|c| c.has_error())
                .collect();
            children.reverse();
            stack.extend(children);
        }
        Some(root)
    }

    /// Returns the nodes captured as `capture_name` by the supplied query, in
    /// document order.
    pub fn query_nodes(&self, q: &str, capture_name: &str) -> Result<Vec<Node<'_>>> {
        let query = Query::new(&self.lang, q)
            .with_context(|| format!("Failed to compile tree-sitter query: {q}"))?;
        let capture_index = query
            .capture_index_for_name(capture_name)
            .ok_or_else(|| anyhow!("Capture name {capture_name} not present in query"))?;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, self.tree.root_node(), self.code.as_bytes());
        let mut results = Vec::new();

        while let Some(m) = matches.next() {
            results.extend(
                m.captures
                    .iter()
                    .filter(|c| c.index == capture_index)
                    .map(|c| c.node),
            );
        }

        results.sort_by_key(|n| n.start_byte());
        results.dedup_by_key(|n| n.id());
        Ok(results)
    }
}
