//! Tree-sitter query strings used to pick apart configuration modules.

/// Tree-sitter query that returns the module's exported value
/// * `value`: right-hand side of `module.exports = ...`, or the expression of
///   `export default ...`
/// * `statement`: the whole exporting statement
pub const EXPORT_QUERY: &str = include_str!("export.scm");

/// Tree-sitter query that returns module-level declarations
/// * `declaration`: a `var`/`let`/`const`, function, generator or class
///   declaration, possibly wrapped in `export`
pub const DECLARATION_QUERY: &str = include_str!("declaration.scm");
