#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Collects the declarations subtrees depend on.
pub mod closure;
/// Configuration modules, their subtrees and declarations.
pub mod module;
/// Tree-sitter parser wrapper.
pub mod parser;
/// Tree-sitter query strings used by the extractor.
pub mod queries;
/// Free-identifier and declared-name analysis.
pub mod scope;
/// Builds self-contained submodule expressions.
pub mod synth;
/// Detects names that would not resolve in generated registries.
pub mod validate;

pub use closure::Closure;
pub use module::{
    ConfigFormatError, ConfigModule, Declaration, Domain, DroppedStatement, Fragment, SubtreeSet,
};
pub use parser::Parser;
pub use synth::Submodule;
pub use validate::unresolved;
