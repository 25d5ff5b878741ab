#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::BTreeMap, fmt, path::PathBuf};

use anyhow::{Context, Result, bail};
use futures::future::join_all;
use itertools::Itertools;
use serde::Serialize;
use tabled::Tabled;
use tokio::task::JoinHandle;

use crate::{
    config::Settings,
    exercise::{Exercise, discover, ordered_names},
    git::Git,
    ignore::fix_ignore_files,
    js::{Closure, ConfigFormatError, ConfigModule, Domain, SubtreeSet, Submodule, unresolved},
    registry::{Registries, WriteOutcome, write_atomic},
    scaffold::Scaffolder,
    util::dir_exists,
};

/// What became of an exercise's scaffolding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum ScaffoldStatus {
    /// Scaffolding was switched off.
    Skipped,
    /// Output directory and starter repository were created.
    Done,
    /// Scaffolding stopped with this error.
    Failed(String),
}

impl ScaffoldStatus {
    /// Whether this is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, ScaffoldStatus::Failed(_))
    }
}

impl fmt::Display for ScaffoldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaffoldStatus::Skipped => f.write_str("skipped"),
            ScaffoldStatus::Done => f.write_str("done"),
            ScaffoldStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Tabled, Serialize, Clone, Debug)]
/// One row of the run summary
pub struct ExerciseOutcome {
    #[tabled(rename = "Exercise")]
    /// * `exercise`: directory name
    exercise: String,
    #[tabled(rename = "Name")]
    /// * `name`: published name
    name:     String,
    #[tabled(rename = "Ordered")]
    /// * `ordered`: whether it appears in `_order`
    ordered:  bool,
    #[tabled(rename = "Scaffold")]
    /// * `scaffold`: scaffolding outcome
    scaffold: ScaffoldStatus,
}

impl ExerciseOutcome {
    /// Directory name of the exercise.
    pub fn exercise(&self) -> &str {
        &self.exercise
    }

    /// Published name of the exercise.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the exercise is listed in `_order`.
    pub fn ordered(&self) -> bool {
        self.ordered
    }

    /// Scaffolding outcome.
    pub fn scaffold(&self) -> &ScaffoldStatus {
        &self.scaffold
    }
}

/// What happened to one registry file.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryWrite {
    /// Which registry.
    pub domain:  Domain,
    /// Where it was written.
    pub path:    PathBuf,
    /// Whether the file changed.
    pub outcome: WriteOutcome,
}

/// Summary of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Number of `.npmignore` files restored to `.gitignore`.
    pub restored_ignores: usize,
    /// One entry per discovered exercise, in identifier order.
    pub exercises:        Vec<ExerciseOutcome>,
    /// The three registry files.
    pub registries:       Vec<RegistryWrite>,
}

impl Report {
    /// Exercises whose scaffolding failed.
    pub fn scaffold_failures(&self) -> Vec<&ExerciseOutcome> {
        self.exercises
            .iter()
            .filter(|o| o.scaffold.is_failure())
            .collect()
    }
}

/// Reads an exercise's configuration and returns its subtrees along with
/// the declarations they need.
async fn split_config(settings: &Settings, exercise: &Exercise) -> Result<(SubtreeSet, Closure)> {
    let path = exercise.config_path();
    let source = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))?;

    let module = ConfigModule::parse(source)?;
    let subtrees = module.subtrees()?;
    let closure = Closure::collect(&module.declarations()?, &subtrees);

    let carried = closure.declared();
    for dropped in module.dropped_statements()? {
        let touched: Vec<&str> = dropped
            .names()
            .intersection(&carried)
            .map(String::as_str)
            .collect();
        if !touched.is_empty() {
            tracing::warn!(
                "{}: line {} uses {} but is not carried into the registries",
                exercise.id(),
                dropped.line(),
                touched.join(", ")
            );
        }
    }

    let missing = unresolved(&subtrees, &closure, settings.extra_globals());
    if !missing.is_empty() {
        if settings.strict() {
            return Err(ConfigFormatError::Unresolved(missing).into());
        }
        tracing::warn!(
            "{}: unresolved identifiers {}",
            exercise.id(),
            missing.join(", ")
        );
    }

    tracing::debug!(
        "{}: {} declarations carried along",
        exercise.id(),
        closure.declarations().len()
    );
    Ok((subtrees, closure))
}

/// Splits every exercise's configuration into the three registries.
async fn build_registries(settings: &Settings, exercises: &[Exercise]) -> Result<Registries> {
    let mut registries = Registries::new(ordered_names(exercises.iter().map(Exercise::id)));

    for exercise in exercises {
        let (subtrees, closure) = split_config(settings, exercise)
            .await
            .with_context(|| {
                format!(
                    "Could not split exercise {} ({})",
                    exercise.id(),
                    exercise.config_path().display()
                )
            })?;

        registries.insert(exercise.id().name(), |domain| {
            Submodule::new(&closure, subtrees.get(domain))
        })?;
    }

    Ok(registries)
}

/// Renders and writes the three registries.
async fn write_registries(
    settings: &Settings,
    registries: &Registries,
) -> Result<Vec<RegistryWrite>> {
    let mut writes = Vec::with_capacity(Domain::ALL.len());

    for domain in Domain::ALL {
        let path = settings.layout().registry_file(domain);
        let outcome = write_atomic(&path, &registries.get(domain).render()).await?;
        match outcome {
            WriteOutcome::Unchanged => tracing::info!("{} is up to date", path.display()),
            WriteOutcome::Written { changed_lines } => {
                tracing::info!("Wrote {} ({changed_lines} lines changed)", path.display())
            }
        }
        writes.push(RegistryWrite {
            domain,
            path,
            outcome,
        });
    }

    Ok(writes)
}

/// Fails if two exercises would be published under the same name.
fn check_unique_names(exercises: &[Exercise]) -> Result<()> {
    let duplicates: Vec<&str> = exercises
        .iter()
        .map(|e| e.id().name())
        .duplicates()
        .collect();

    if !duplicates.is_empty() {
        bail!(
            "Several exercises are published under the same name: {}",
            duplicates.join(", ")
        );
    }
    Ok(())
}

/// A background scaffolding task, yielding the exercise's raw identifier.
type ScaffoldTask = JoinHandle<(String, Result<PathBuf>)>;

/// Starts scaffolding every exercise in the background.
///
/// Exercises that cannot even be started are marked failed in `statuses`.
async fn spawn_scaffolds(
    settings: &Settings,
    exercises: &[Exercise],
    statuses: &mut BTreeMap<String, ScaffoldStatus>,
) -> Result<Vec<ScaffoldTask>> {
    let layout = settings.layout();

    tokio::fs::create_dir_all(layout.gen_dir())
        .await
        .with_context(|| format!("Could not create {}", layout.gen_dir().display()))?;

    let git = match Git::locate(settings.git_timeout()) {
        Ok(git) => git,
        Err(e) => {
            tracing::error!("{e}");
            for exercise in exercises {
                statuses.insert(
                    exercise.id().raw().to_string(),
                    ScaffoldStatus::Failed(e.to_string()),
                );
            }
            return Ok(Vec::new());
        }
    };

    let scaffolder = Scaffolder::new(layout.clone(), git, settings.webhook_url());
    let tasks = exercises
        .iter()
        .cloned()
        .map(|exercise| {
            let scaffolder = scaffolder.clone();
            tokio::spawn(async move {
                let result = scaffolder.scaffold(&exercise).await;
                (exercise.id().raw().to_string(), result)
            })
        })
        .collect();

    Ok(tasks)
}

/// Runs the whole build: restores ignore files, discovers exercises,
/// writes the registries and scaffolds every exercise.
///
/// Fails before touching anything if the source or exercises directory is
/// missing.
///
/// Scaffolding runs alongside the registry work and is always waited for
/// before returning, even when the registry work fails. Scaffolding failures
/// do not fail the run; they are recorded in the [`Report`].
pub async fn run(settings: &Settings) -> Result<Report> {
    let layout = settings.layout();
    tracing::info!("Building course at {}", layout.root_dir().display());

    for dir in [layout.src_dir(), layout.exercises_dir()] {
        if !dir_exists(dir).await? {
            bail!("{} is not a directory; is this a course root?", dir.display());
        }
    }

    let restored = fix_ignore_files(layout.src_dir()).await?;
    if !restored.is_empty() {
        tracing::info!("Restored {} .gitignore files", restored.len());
    }

    let exercises = discover(layout.exercises_dir())?;
    tracing::info!(
        "Found {} exercises in {}",
        exercises.len(),
        layout.exercises_dir().display()
    );
    check_unique_names(&exercises)?;

    let mut statuses: BTreeMap<String, ScaffoldStatus> = BTreeMap::new();
    let tasks = if settings.scaffold() {
        spawn_scaffolds(settings, &exercises, &mut statuses).await?
    } else {
        Vec::new()
    };

    let registries = match build_registries(settings, &exercises).await {
        Ok(registries) => write_registries(settings, &registries).await,
        Err(e) => Err(e),
    };

    let mut join_error = None;
    for joined in join_all(tasks).await {
        match joined {
            Ok((raw, Ok(dir))) => {
                tracing::debug!("{raw}: scaffolded into {}", dir.display());
                statuses.insert(raw, ScaffoldStatus::Done);
            }
            Ok((raw, Err(e))) => {
                tracing::error!("Scaffolding {raw} failed: {e:#}");
                statuses.insert(raw, ScaffoldStatus::Failed(format!("{e:#}")));
            }
            Err(e) => join_error = Some(e),
        }
    }

    let registries = registries?;
    if let Some(e) = join_error {
        return Err(e).context("scaffold task join error");
    }

    let exercises = exercises
        .iter()
        .map(|exercise| ExerciseOutcome {
            exercise: exercise.id().raw().to_string(),
            name: exercise.id().name().to_string(),
            ordered: exercise.id().is_ordered(),
            scaffold: statuses
                .remove(exercise.id().raw())
                .unwrap_or(ScaffoldStatus::Skipped),
        })
        .collect();

    Ok(Report {
        restored_ignores: restored.len(),
        exercises,
        registries,
    })
}
