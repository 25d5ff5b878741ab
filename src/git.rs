#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use which::which;

use crate::process::run_collect;

/// Failures of a `git` invocation.
#[derive(Error, Debug)]
pub enum GitError {
    /// No `git` binary on `PATH`.
    #[error("Cannot find git on path")]
    NotFound(#[from] which::Error),
    /// The process could not be started, or did not finish in time.
    #[error("Could not run `{command}`")]
    Spawn {
        /// The command line.
        command: String,
        /// The underlying failure.
        #[source]
        source:  anyhow::Error,
    },
    /// The process exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        /// The command line.
        command: String,
        /// Exit status as printed by the OS.
        status:  String,
        /// Captured stderr, trimmed.
        stderr:  String,
    },
}

/// Runs `git` subcommands with a timeout.
#[derive(Debug, Clone)]
pub struct Git {
    /// Path to the `git` binary.
    program: PathBuf,
    /// Upper bound on each invocation.
    timeout: Duration,
}

impl Git {
    /// Locates `git` on `PATH`.
    pub fn locate(timeout: Duration) -> Result<Self, GitError> {
        Ok(Self {
            program: which("git")?,
            timeout,
        })
    }

    /// Runs `git <args>` in `cwd` and returns its trimmed stdout.
    pub async fn run(&self, cwd: &Path, args: &[OsString]) -> Result<String, GitError> {
        let command = format!(
            "git {}",
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        tracing::debug!("Running `{command}` in {}", cwd.display());

        let out = run_collect(&self.program, args, Some(cwd), Some(self.timeout))
            .await
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !out.status.success() {
            let stderr = out.stderr_text();
            return Err(GitError::Failed {
                command,
                status: out.status.to_string(),
                stderr: if stderr.is_empty() {
                    "Unknown error".to_string()
                } else {
                    stderr
                },
            });
        }

        Ok(out.stdout_text())
    }

    /// `git init --template=<template> <dir>`, run from `cwd`.
    pub async fn init(&self, cwd: &Path, template: &Path, dir: &Path) -> Result<(), GitError> {
        let mut template_arg = OsString::from("--template=");
        template_arg.push(template);
        self.run(cwd, &["init".into(), template_arg, dir.into()])
            .await
            .map(drop)
    }

    /// `git config <key> <value>` inside `repo`.
    pub async fn set_config(&self, repo: &Path, key: &str, value: &str) -> Result<(), GitError> {
        self.run(repo, &["config".into(), key.into(), value.into()])
            .await
            .map(drop)
    }

    /// Stages the whole working tree of `repo`.
    pub async fn add_all(&self, repo: &Path) -> Result<(), GitError> {
        self.run(repo, &["add".into(), ":/".into()]).await.map(drop)
    }
}
