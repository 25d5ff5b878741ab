#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{
    config::Layout,
    constants::{DENY_CURRENT_BRANCH_KEY, REPO_DIR_NAME, WEBHOOK_CONFIG_KEY},
    exercise::Exercise,
    git::Git,
    util::{copy_dir_contents, dir_exists, remove_dir_if_exists},
};

/// Creates output directories and starter repositories for exercises.
#[derive(Debug, Clone)]
pub struct Scaffolder {
    /// Where templates are read from and output is written to.
    layout:      Layout,
    /// `git` runner.
    git:         Git,
    /// Value written to `angler.url` in each starter repository.
    webhook_url: String,
}

impl Scaffolder {
    /// Creates a scaffolder.
    pub fn new(layout: Layout, git: Git, webhook_url: impl Into<String>) -> Self {
        Self {
            layout,
            git,
            webhook_url: webhook_url.into(),
        }
    }

    /// Scaffolds one exercise and returns its output directory.
    ///
    /// Steps run in order, and the first failure stops the exercise:
    /// 1. replace `<gen_dir>/<name>/` with an empty directory
    /// 2. copy `resources/` into it, if the exercise has one
    /// 3. fill `starting.git/` with the starter repository contents
    /// 4. `git init` it with the shared template
    /// 5. set the webhook URL and allow pushes to the checked-out branch
    /// 6. stage the whole working tree
    pub async fn scaffold(&self, exercise: &Exercise) -> Result<PathBuf> {
        let name = exercise.id().name();
        let out_dir = self.layout.output_dir(name);
        let repo_dir = out_dir.join(REPO_DIR_NAME);

        remove_dir_if_exists(&out_dir).await?;
        tokio::fs::create_dir_all(&out_dir)
            .await
            .with_context(|| format!("Could not create {}", out_dir.display()))?;

        let resources = exercise.resources_dir();
        if dir_exists(&resources).await? {
            let copied = copy_dir_contents(&resources, &out_dir).await?;
            tracing::debug!("{name}: copied {copied} resource files");
        }

        copy_dir_contents(self.layout.repo_contents_dir(), &repo_dir)
            .await
            .with_context(|| format!("Could not populate {}", repo_dir.display()))?;

        let template = tokio::fs::canonicalize(self.layout.repo_template_dir())
            .await
            .with_context(|| {
                format!(
                    "Could not find repository template {}",
                    self.layout.repo_template_dir().display()
                )
            })?;
        self.git.init(&repo_dir, &template, Path::new(".")).await?;
        self.git
            .set_config(&repo_dir, WEBHOOK_CONFIG_KEY, &self.webhook_url)
            .await?;
        self.git
            .set_config(&repo_dir, DENY_CURRENT_BRANCH_KEY, "false")
            .await?;
        self.git.add_all(&repo_dir).await?;

        tracing::info!("Scaffolded {}", out_dir.display());
        Ok(out_dir)
    }
}
