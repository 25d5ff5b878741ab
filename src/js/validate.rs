#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeSet;

use super::{closure::Closure, module::SubtreeSet};
use crate::constants::KNOWN_GLOBALS;

/// Names the synthesized submodules would use without any declaration in
/// scope, sorted.
///
/// A name counts as resolved when the closure declares it, when it is one of
/// [`KNOWN_GLOBALS`], or when it appears in `extra_globals`.
pub fn unresolved(
    subtrees: &SubtreeSet,
    closure: &Closure,
    extra_globals: &[String],
) -> Vec<String> {
    let declared = closure.declared();
    let mut used: BTreeSet<String> = subtrees.free();
    used.extend(closure.free());

    used.into_iter()
        .filter(|name| !declared.contains(name))
        .filter(|name| !KNOWN_GLOBALS.contains(&name.as_str()))
        .filter(|name| !extra_globals.iter().any(|g| g == name))
        .collect()
}
