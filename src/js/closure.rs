#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeSet;

use super::module::{Declaration, SubtreeSet};

/// The module-level declarations a configuration's subtrees depend on, in
/// source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Included declarations, in the order they appear in the module.
    declarations: Vec<Declaration>,
}

impl Closure {
    /// Selects the declarations referenced by any subtree, directly or
    /// through another selected declaration.
    ///
    /// Names with no module-level declaration are left alone; see
    /// [`super::validate::unresolved`].
    pub fn collect(declarations: &[Declaration], subtrees: &SubtreeSet) -> Self {
        let mut wanted = subtrees.free();
        let mut included = vec![false; declarations.len()];

        loop {
            let mut changed = false;
            for (i, declaration) in declarations.iter().enumerate() {
                if !included[i] && declaration.declares_any(&wanted) {
                    included[i] = true;
                    wanted.extend(declaration.free().iter().cloned());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let declarations = declarations
            .iter()
            .zip(included)
            .filter_map(|(d, keep)| keep.then(|| d.clone()))
            .collect();

        Self { declarations }
    }

    /// Included declarations, in source order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Whether nothing needs to be carried along.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Every name the closure declares.
    pub fn declared(&self) -> BTreeSet<String> {
        self.declarations
            .iter()
            .flat_map(|d| d.names().iter().cloned())
            .collect()
    }

    /// Every name the closure's declarations use.
    pub fn free(&self) -> BTreeSet<String> {
        self.declarations
            .iter()
            .flat_map(|d| d.free().iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A declaration of `name` using `uses`.
    fn decl(name: &str, uses: &[&str]) -> Declaration {
        Declaration::new(
            vec![name.to_string()],
            format!("var {name}"),
            uses.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn empty_subtrees_need_nothing() {
        let closure = Closure::collect(&[decl("a", &[])], &SubtreeSet::default());
        assert!(closure.is_empty());
    }

    #[test]
    fn later_declarations_can_pull_in_earlier_ones() {
        let module = crate::js::ConfigModule::parse(
            "var a = 1\nvar unused = 2\nvar b = a + 1\nmodule.exports = { machine: b }".to_string(),
        )
        .expect("parse");
        let closure = Closure::collect(
            &module.declarations().expect("declarations"),
            &module.subtrees().expect("subtrees"),
        );

        let names: Vec<_> = closure.declarations().iter().map(|d| d.text()).collect();
        assert_eq!(names, vec!["var a = 1", "var b = a + 1"]);
    }

    #[test]
    fn dependencies_declared_after_their_users_are_found() {
        let declarations = [decl("f", &["g"]), decl("g", &[])];
        let module =
            crate::js::ConfigModule::parse("module.exports = { repo: f() }".to_string())
                .expect("parse");
        let closure = Closure::collect(&declarations, &module.subtrees().expect("subtrees"));
        assert_eq!(closure.declared(), BTreeSet::from(["f", "g"].map(String::from)));
    }
}
