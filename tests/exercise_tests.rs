//! Tests for exercise discovery and naming.

mod course_support;

use std::fs;

use course_support::{temp_root, write};
use createx::exercise::{ExerciseId, discover, ordered_names};

#[test]
fn discovery_needs_a_config() {
    let root = temp_root("discover");
    write(&root, "02-foo/config.js", "module.exports = {}");
    write(&root, "bar/config.js", "module.exports = {}");
    write(&root, "01-baz/config.js", "module.exports = {}");
    write(&root, "03-draft/notes.md", "not yet");

    let exercises = discover(&root).expect("discover");
    let raw: Vec<&str> = exercises.iter().map(|e| e.id().raw()).collect();
    assert_eq!(raw, vec!["01-baz", "02-foo", "bar"]);
    assert_eq!(exercises[0].config_path(), root.join("01-baz").join("config.js"));

    let order = ordered_names(exercises.iter().map(|e| e.id()));
    assert_eq!(order, vec!["baz", "foo"]);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn missing_exercises_dir_finds_nothing() {
    let root = temp_root("discover-empty");
    let exercises = discover(&root.join("absent")).expect("discover");
    assert!(exercises.is_empty());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn registry_key_drops_ordinal() {
    assert_eq!(ExerciseId::parse("03-loops").name(), "loops");
    assert_eq!(ExerciseId::parse("loops").name(), "loops");
}
