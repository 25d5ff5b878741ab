#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::glob;
use itertools::Itertools;

use crate::constants::{CONFIG_FILE_NAME, RESOURCES_DIR_NAME};

peg::parser! {
    /// grammar for exercise directory names such as `03-loops`
    grammar exercise_id() for str {
        /// matches any sequence of 1 or more numbers
        rule ordinal() -> &'input str
            = $(['0'..='9']+)

        /// the separator between ordinal and name
        rule separator() = "-"

        /// the rest of the identifier, at least one character
        rule name() -> &'input str
            = $([_]+)

        /// parses an ordered identifier into its ordinal and public name
        pub rule ordered() -> (&'input str, &'input str)
            = o:ordinal() separator() n:name() { (o, n) }
    }
}

/// Identifier of an exercise, as given by its directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExerciseId {
    /// The directory name, e.g. `03-loops`.
    raw:     String,
    /// Digits of the ordering prefix as written, if the name carries one.
    ordinal: Option<String>,
    /// The public name with any ordering prefix stripped, e.g. `loops`.
    name:    String,
}

impl ExerciseId {
    /// Parses a directory name. Names without a numeric prefix are kept
    /// whole and are considered unordered.
    pub fn parse(raw: &str) -> Self {
        let (ordinal, name) = match exercise_id::ordered(raw) {
            Ok((ordinal, name)) => (Some(ordinal.to_string()), name.to_string()),
            Err(_) => (None, raw.to_string()),
        };

        Self {
            raw: raw.to_string(),
            ordinal,
            name,
        }
    }

    /// The raw directory name.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The public name, used as registry key and output directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordering prefix digits, if any.
    pub fn ordinal(&self) -> Option<&str> {
        self.ordinal.as_deref()
    }

    /// Whether the exercise takes part in the published ordering.
    pub fn is_ordered(&self) -> bool {
        self.ordinal.is_some()
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Public names of the ordered exercises, sorted by raw identifier.
///
/// Unordered exercises are left out. Sorting is by byte order of the raw
/// identifier, so `10-x` sorts before `2-y`.
pub fn ordered_names<'a>(ids: impl IntoIterator<Item = &'a ExerciseId>) -> Vec<String> {
    ids.into_iter()
        .sorted_by(|a, b| a.raw.cmp(&b.raw))
        .filter(|id| id.is_ordered())
        .map(|id| id.name.clone())
        .collect()
}

/// An exercise found in the source tree.
#[derive(Debug, Clone)]
pub struct Exercise {
    /// Identifier derived from the directory name.
    id:  ExerciseId,
    /// The exercise's source directory.
    dir: PathBuf,
}

impl Exercise {
    /// Creates an exercise rooted at `dir`, identified by its file name.
    pub fn from_dir(dir: PathBuf) -> Result<Self> {
        let raw = dir
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Exercise directory {} has no usable name", dir.display()))?;

        Ok(Self {
            id: ExerciseId::parse(raw),
            dir,
        })
    }

    /// The exercise identifier.
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    /// The exercise's source directory.
    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    /// Path of the exercise's configuration module.
    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// Path of the optional resources directory.
    pub fn resources_dir(&self) -> PathBuf {
        self.dir.join(RESOURCES_DIR_NAME)
    }
}

/// Finds every `<exercises_dir>/*/config.js` and returns the exercises in
/// raw identifier order.
pub fn discover(exercises_dir: &Path) -> Result<Vec<Exercise>> {
    let pattern = exercises_dir.join("*").join(CONFIG_FILE_NAME);
    let pattern = pattern
        .to_str()
        .context("Could not convert exercises directory to string")?;

    let mut exercises = glob(pattern)
        .context("Could not create glob")?
        .map(|entry| entry.context("Could not read an exercise directory"))
        .collect::<Result<Vec<PathBuf>>>()?
        .into_iter()
        .filter(|path| path.is_file())
        .filter_map(|path| path.parent().map(Path::to_path_buf))
        .map(Exercise::from_dir)
        .collect::<Result<Vec<_>>>()?;

    exercises.sort_by(|a, b| a.id.raw.cmp(&b.id.raw));
    tracing::debug!(
        "Discovered exercises: {}",
        exercises.iter().map(|e| e.id.raw()).join(", ")
    );

    Ok(exercises)
}
