#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::{
    constants::{GENERATED_HEADER, ORDER_KEY},
    js::{Domain, Submodule, synth::INDENT},
};

/// Quotes `s` as a JavaScript string literal.
fn quote(s: &str) -> String {
    // JSON strings are valid JavaScript string literals.
    serde_json::Value::String(s.to_string()).to_string()
}

/// Value of one registry property.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    /// An array of names, used for `_order`.
    Names(Vec<String>),
    /// One exercise's synthesized submodule.
    Submodule(Submodule),
}

/// One generated registry: an ordered mapping from exercise name to
/// submodule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// Properties in output order.
    entries: Vec<(String, Value)>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of properties, `_order` included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Property keys in output order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// The submodule registered under `name`.
    pub fn submodule(&self, name: &str) -> Option<&Submodule> {
        self.entries.iter().find_map(|(k, v)| match v {
            Value::Submodule(s) if k == name => Some(s),
            _ => None,
        })
    }

    /// Appends the `_order` entry.
    fn push_order(&mut self, names: Vec<String>) {
        self.entries.push((ORDER_KEY.to_string(), Value::Names(names)));
    }

    /// Appends an exercise's submodule.
    fn push(&mut self, name: &str, submodule: Submodule) {
        self.entries.push((name.to_string(), Value::Submodule(submodule)));
    }

    /// Renders the registry as a CommonJS module.
    pub fn render(&self) -> String {
        let mut out = format!("{GENERATED_HEADER}\n");

        if self.entries.is_empty() {
            out.push_str("module.exports = {};\n");
            return out;
        }

        let pad = " ".repeat(INDENT);
        let properties: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Names(names) => format!(
                        "[{}]",
                        names.iter().map(|n| quote(n)).collect::<Vec<_>>().join(", ")
                    ),
                    Value::Submodule(submodule) => submodule.render(INDENT),
                };
                format!("{pad}{}: {value}", quote(key))
            })
            .collect();

        out.push_str("module.exports = {\n");
        out.push_str(&properties.join(",\n"));
        out.push_str("\n};\n");
        out
    }
}

/// The machine, viewer and repo registries of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registries {
    /// `machines.js`
    machines: Registry,
    /// `viewers.js`, led by `_order`
    viewers:  Registry,
    /// `repos.js`
    repos:    Registry,
    /// Names registered so far.
    names:    HashSet<String>,
}

impl Registries {
    /// Creates the three registries, seeding the viewers with `order`.
    pub fn new(order: Vec<String>) -> Self {
        let mut viewers = Registry::new();
        viewers.push_order(order);

        Self {
            machines: Registry::new(),
            viewers,
            repos: Registry::new(),
            names: HashSet::new(),
        }
    }

    /// Registers one exercise. `submodule` yields its submodule per domain.
    ///
    /// Fails if `name` was already registered, or collides with `_order`.
    pub fn insert(
        &mut self,
        name: &str,
        mut submodule: impl FnMut(Domain) -> Submodule,
    ) -> Result<()> {
        if name == ORDER_KEY {
            bail!("Exercise name `{name}` is reserved");
        }
        if !self.names.insert(name.to_string()) {
            bail!("Two exercises are published as `{name}`");
        }

        for domain in Domain::ALL {
            let submodule = submodule(domain);
            self.get_mut(domain).push(name, submodule);
        }
        Ok(())
    }

    /// The registry for `domain`.
    pub fn get(&self, domain: Domain) -> &Registry {
        match domain {
            Domain::Machine => &self.machines,
            Domain::Viewer => &self.viewers,
            Domain::Repo => &self.repos,
        }
    }

    /// Mutable access to the registry for `domain`.
    fn get_mut(&mut self, domain: Domain) -> &mut Registry {
        match domain {
            Domain::Machine => &mut self.machines,
            Domain::Viewer => &mut self.viewers,
            Domain::Repo => &mut self.repos,
        }
    }
}

/// What happened to a registry file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum WriteOutcome {
    /// The file already had the rendered contents.
    Unchanged,
    /// The file was created or replaced; `changed_lines` counts inserted and
    /// deleted lines against the previous contents.
    Written {
        /// Lines inserted or deleted.
        changed_lines: usize,
    },
}

/// Writes `contents` to `path` unless it already holds them.
///
/// The new contents go to a sibling temporary file that is then renamed over
/// `path`, so readers see either the old or the new file.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<WriteOutcome> {
    let previous = match tokio::fs::read_to_string(path).await {
        Ok(previous) => Some(previous),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(e).with_context(|| format!("Could not read {}", path.display()));
        }
    };

    if previous.as_deref() == Some(contents) {
        return Ok(WriteOutcome::Unchanged);
    }

    let changed_lines = TextDiff::from_lines(previous.as_deref().unwrap_or_default(), contents)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .count();

    let tmp = temp_path(path)?;
    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("Could not write {}", tmp.display()))?;
    persist(&tmp, path).await?;

    Ok(WriteOutcome::Written { changed_lines })
}

/// Renames `tmp` over `path`, deleting `tmp` if that fails.
async fn persist(tmp: &Path, path: &Path) -> Result<()> {
    if let Err(e) = tokio::fs::rename(tmp, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(tmp).await {
            tracing::warn!("Could not delete {}: {cleanup}", tmp.display());
        }
        return Err(e)
            .with_context(|| format!("Could not move {} to {}", tmp.display(), path.display()));
    }
    Ok(())
}

/// `<path>.tmp`, next to `path`.
fn temp_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let mut tmp = name.to_os_string();
    tmp.push(".tmp");
    Ok(path.with_file_name(tmp))
}
