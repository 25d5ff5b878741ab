#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Whether `path` is an existing directory.
///
/// Absence is not an error; any other failure to stat `path` is.
pub async fn dir_exists(path: &Path) -> Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Could not stat {}", path.display())),
    }
}

/// One entry below a copy source, relative to it.
enum CopyEntry {
    /// A directory to create.
    Dir(PathBuf),
    /// A file to copy.
    File(PathBuf),
}

/// Lists everything below `src`, parents before children.
fn list_tree(src: &Path) -> Result<Vec<CopyEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Could not walk {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} is outside {}", entry.path().display(), src.display()))?
            .to_path_buf();

        if entry.file_type().is_dir() {
            entries.push(CopyEntry::Dir(relative));
        } else if entry.file_type().is_file() || entry.path().is_file() {
            entries.push(CopyEntry::File(relative));
        } else {
            tracing::debug!("Skipping {}", entry.path().display());
        }
    }
    Ok(entries)
}

/// Copies the contents of `src` into `dst`, creating `dst` if needed and
/// overwriting files that already exist. Returns the number of files copied.
pub async fn copy_dir_contents(src: &Path, dst: &Path) -> Result<usize> {
    let root = src.to_path_buf();
    let entries = tokio::task::spawn_blocking(move || list_tree(&root))
        .await
        .context("directory walk task join error")??;

    tokio::fs::create_dir_all(dst)
        .await
        .with_context(|| format!("Could not create {}", dst.display()))?;

    let mut copied = 0;
    for entry in entries {
        match entry {
            CopyEntry::Dir(relative) => {
                let target = dst.join(relative);
                tokio::fs::create_dir_all(&target)
                    .await
                    .with_context(|| format!("Could not create {}", target.display()))?;
            }
            CopyEntry::File(relative) => {
                let (from, to) = (src.join(&relative), dst.join(&relative));
                tokio::fs::copy(&from, &to).await.with_context(|| {
                    format!("Could not copy {} to {}", from.display(), to.display())
                })?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}

/// Removes `path` and everything below it, if it exists.
pub async fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Could not delete {}", path.display())),
    }
}
