#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! npm renames every `.gitignore` to `.npmignore` when a package is packed.
//! This undoes that across the course sources.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::constants::{GIT_IGNORE, NPM_IGNORE};

/// Renames every `.npmignore` file under `root` to `.gitignore` in place and
/// returns the renamed paths.
///
/// Fails if `root` or anything below it cannot be read.
pub fn restore_gitignores(root: &Path) -> Result<Vec<PathBuf>> {
    let mut restored = Vec::new();

    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Could not walk {}", root.display()))?;
        if entry.file_type().is_file() && entry.file_name() == NPM_IGNORE {
            found.push(entry.into_path());
        }
    }

    for path in found {
        let target = path.with_file_name(GIT_IGNORE);
        std::fs::rename(&path, &target).with_context(|| {
            format!("Could not rename {} to {}", path.display(), target.display())
        })?;
        tracing::debug!("Restored {}", target.display());
        restored.push(target);
    }

    Ok(restored)
}

/// Runs [`restore_gitignores`] off the async runtime and waits for it to
/// finish.
pub async fn fix_ignore_files(root: &Path) -> Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || restore_gitignores(&root))
        .await
        .context("ignore-file sweep task join error")?
}
