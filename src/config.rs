#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use typed_builder::TypedBuilder;

use crate::{constants::*, js::Domain};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Every path a run reads from or writes to.
pub struct Layout {
    /// Root directory; all defaults hang off it.
    root_dir:          PathBuf,
    /// `src/`, swept for mangled ignore files.
    src_dir:           PathBuf,
    /// `src/exercises/`, one subdirectory per exercise.
    exercises_dir:     PathBuf,
    /// `src/starter_repo/template/`, passed to `git init --template`.
    repo_template_dir: PathBuf,
    /// `src/starter_repo/contents/`, copied into each starter repository.
    repo_contents_dir: PathBuf,
    /// `exercises/`, one output directory per exercise.
    gen_dir:           PathBuf,
    /// Directory the three registries are written to.
    registry_dir:      PathBuf,
}

impl Layout {
    /// Creates the standard layout rooted at `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        let src_dir = root_dir.join(SRC_DIR_NAME);
        let starter_dir = src_dir.join(STARTER_REPO_DIR_NAME);

        Self {
            exercises_dir: src_dir.join(EXERCISES_DIR_NAME),
            repo_template_dir: starter_dir.join(REPO_TEMPLATE_DIR_NAME),
            repo_contents_dir: starter_dir.join(REPO_CONTENTS_DIR_NAME),
            gen_dir: root_dir.join(GEN_DIR_NAME),
            registry_dir: root_dir.clone(),
            src_dir,
            root_dir,
        }
    }

    /// Root directory of the course.
    pub fn root_dir(&self) -> &Path {
        self.root_dir.as_path()
    }

    /// Source tree swept by the ignore-file fix.
    pub fn src_dir(&self) -> &Path {
        self.src_dir.as_path()
    }

    /// Directory holding one subdirectory per exercise.
    pub fn exercises_dir(&self) -> &Path {
        self.exercises_dir.as_path()
    }

    /// Git template directory for starter repositories.
    pub fn repo_template_dir(&self) -> &Path {
        self.repo_template_dir.as_path()
    }

    /// Working tree contents for starter repositories.
    pub fn repo_contents_dir(&self) -> &Path {
        self.repo_contents_dir.as_path()
    }

    /// Output directory for scaffolded exercises.
    pub fn gen_dir(&self) -> &Path {
        self.gen_dir.as_path()
    }

    /// Returns a copy of this layout writing scaffolded exercises elsewhere.
    pub fn with_gen_dir(mut self, gen_dir: impl Into<PathBuf>) -> Self {
        self.gen_dir = gen_dir.into();
        self
    }

    /// Returns a copy of this layout writing registries elsewhere.
    pub fn with_registry_dir(mut self, registry_dir: impl Into<PathBuf>) -> Self {
        self.registry_dir = registry_dir.into();
        self
    }

    /// Path of the generated registry for `domain`.
    pub fn registry_file(&self, domain: Domain) -> PathBuf {
        let name = match domain {
            Domain::Machine => MACHINES_FILE_NAME,
            Domain::Viewer => VIEWERS_FILE_NAME,
            Domain::Repo => REPOS_FILE_NAME,
        };
        self.registry_dir.join(name)
    }

    /// Output directory for the exercise published as `name`.
    pub fn output_dir(&self, name: &str) -> PathBuf {
        self.gen_dir.join(name)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
/// Options for one run of the pipeline.
pub struct Settings {
    /// Where inputs are read from and outputs written to.
    #[builder(default)]
    layout:          Layout,
    /// Value of `angler.url` in every starter repository.
    #[builder(default = DEFAULT_WEBHOOK_URL.to_string(), setter(into))]
    webhook_url:     String,
    /// Identifiers, beyond [`KNOWN_GLOBALS`], assumed to resolve when a
    /// registry is loaded.
    #[builder(default)]
    extra_globals:   Vec<String>,
    /// Treat unresolved identifiers as a configuration error.
    #[builder(default = false)]
    strict:          bool,
    /// Whether to scaffold output directories and starter repositories.
    #[builder(default = true)]
    scaffold:        bool,
    /// Upper bound on a single `git` invocation.
    #[builder(default = Duration::from_secs(GIT_TIMEOUT_SECS))]
    git_timeout:     Duration,
}

impl Settings {
    /// Builds settings rooted at `root_dir`, taking overrides from the
    /// environment.
    ///
    /// * `CREATEX_WEBHOOK_URL`: replaces the default webhook URL
    /// * `CREATEX_GLOBALS`: comma-separated extra globals
    pub fn from_env(root_dir: impl Into<PathBuf>) -> Self {
        let webhook_url = std::env::var(WEBHOOK_URL_ENV)
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string());

        Settings::builder()
            .layout(Layout::new(root_dir))
            .webhook_url(webhook_url)
            .extra_globals(parse_globals(std::env::var(GLOBALS_ENV).ok().as_deref()))
            .build()
    }

    /// Filesystem layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Webhook URL written into starter repositories.
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Extra identifiers treated as globals.
    pub fn extra_globals(&self) -> &[String] {
        &self.extra_globals
    }

    /// Adds identifiers treated as globals.
    pub fn with_extra_globals(mut self, globals: impl IntoIterator<Item = String>) -> Self {
        self.extra_globals.extend(globals);
        self
    }

    /// Whether unresolved identifiers abort the run.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Returns a copy with strict mode switched.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether starter repositories are scaffolded.
    pub fn scaffold(&self) -> bool {
        self.scaffold
    }

    /// Returns a copy with scaffolding switched.
    pub fn with_scaffold(mut self, scaffold: bool) -> Self {
        self.scaffold = scaffold;
        self
    }

    /// Timeout applied to each `git` invocation.
    pub fn git_timeout(&self) -> Duration {
        self.git_timeout
    }
}

/// Splits a comma-separated list of identifiers, dropping blanks.
fn parse_globals(val: Option<&str>) -> Vec<String> {
    val.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_defaults_hang_off_root() {
        let layout = Layout::new("/course");
        assert_eq!(layout.exercises_dir(), Path::new("/course/src/exercises"));
        assert_eq!(
            layout.repo_template_dir(),
            Path::new("/course/src/starter_repo/template")
        );
        assert_eq!(layout.output_dir("loops"), PathBuf::from("/course/exercises/loops"));
        assert_eq!(
            layout.registry_file(Domain::Viewer),
            PathBuf::from("/course/viewers.js")
        );
    }

    #[test]
    fn globals_list_skips_blanks() {
        assert_eq!(parse_globals(Some(" helpers, ,lodash ")), vec!["helpers", "lodash"]);
        assert!(parse_globals(None).is_empty());
    }

    #[test]
    fn builder_defaults() {
        let settings = Settings::builder().build();
        assert_eq!(settings.webhook_url(), DEFAULT_WEBHOOK_URL);
        assert!(settings.scaffold());
        assert!(!settings.strict());
    }
}
