#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::{closure::Closure, module::Fragment};

/// Width of one indentation level in generated code.
pub const INDENT: usize = 4;

/// A self-contained expression that re-declares a closure and evaluates to
/// one subtree:
///
/// ```js
/// (function () {
///     var a = 1
///     return { size: a };
/// }())
/// ```
///
/// Owns its own copy of every statement, so submodules built from the same
/// closure never share anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodule {
    /// Closure statements, verbatim, in source order.
    statements: Vec<String>,
    /// The subtree expression, verbatim.
    value:      String,
}

impl Submodule {
    /// Wraps `subtree` together with a private copy of `closure`.
    pub fn new(closure: &Closure, subtree: &Fragment) -> Self {
        Self {
            statements: closure
                .declarations()
                .iter()
                .map(|d| d.text().to_string())
                .collect(),
            value:      subtree.text().to_string(),
        }
    }

    /// Closure statements carried by this submodule.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Renders the expression. The first line is left for the caller to
    /// place; the body is indented one level past `indent` and the closing
    /// line sits at `indent`.
    ///
    /// Only the first line of each statement is indented. Later lines are
    /// copied as-is, so template literals keep their content.
    pub fn render(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let body = " ".repeat(indent + INDENT);

        let mut out = String::from("(function () {\n");
        for statement in &self.statements {
            out.push_str(&body);
            out.push_str(statement);
            out.push('\n');
        }
        out.push_str(&body);
        out.push_str("return ");
        out.push_str(&self.value);
        out.push_str(";\n");
        out.push_str(&pad);
        out.push_str("}())");
        out
    }
}
