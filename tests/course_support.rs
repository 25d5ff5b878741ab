//! Helpers for building throwaway course trees.
#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

/// Path of a JavaScript fixture.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("configs")
        .join(name)
}

/// Contents of a JavaScript fixture.
pub fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture(name)).expect("read fixture")
}

/// A fresh, empty directory under the system temp dir.
pub fn temp_root(prefix: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("createx-{prefix}-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
    fs::write(path, contents).expect("write file");
}

/// A course root with a starter repository template and the given
/// exercises, each `(directory name, config source)`.
pub fn course(prefix: &str, exercises: &[(&str, &str)]) -> PathBuf {
    let root = temp_root(prefix);
    write(&root, "src/starter_repo/template/description", "starter\n");
    write(&root, "src/starter_repo/contents/README.md", "# Exercise\n");
    write(&root, "src/starter_repo/contents/.npmignore", "node_modules\n");
    fs::create_dir_all(root.join("src/exercises")).expect("create exercises dir");
    for (id, source) in exercises {
        write(&root, &format!("src/exercises/{id}/config.js"), source);
    }
    root
}

/// Sorted names of the entries directly under `dir`.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
