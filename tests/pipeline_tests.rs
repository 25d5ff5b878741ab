//! End-to-end runs of the registry pipeline without scaffolding.

mod course_support;

use std::fs;

use course_support::{course, read_fixture, temp_root, write};
use createx::{
    Layout, Settings,
    js::ConfigFormatError,
    pipeline::{ScaffoldStatus, run},
    registry::WriteOutcome,
};

fn registry_only(root: &std::path::Path) -> Settings {
    Settings::builder()
        .layout(Layout::new(root.to_path_buf()))
        .scaffold(false)
        .build()
}

#[tokio::test]
async fn registries_are_keyed_by_public_name() {
    let root = course(
        "pipeline",
        &[
            ("02-foo", &read_fixture("loops.js")),
            ("bar", &read_fixture("viewer_only.js")),
            ("01-baz", &read_fixture("esm.js")),
        ],
    );

    let report = run(&registry_only(&root)).await.expect("run");

    let names: Vec<&str> = report.exercises.iter().map(|o| o.name()).collect();
    assert_eq!(names, vec!["baz", "foo", "bar"]);
    assert!(
        report
            .exercises
            .iter()
            .all(|o| o.scaffold() == &ScaffoldStatus::Skipped)
    );
    assert_eq!(report.restored_ignores, 1);
    assert!(root.join("src/starter_repo/contents/.gitignore").exists());

    let viewers = fs::read_to_string(root.join("viewers.js")).expect("viewers.js");
    assert!(viewers.contains("    \"_order\": [\"baz\", \"foo\"],\n"));

    let machines = fs::read_to_string(root.join("machines.js")).expect("machines.js");
    let baz = machines.find("\"baz\":").expect("baz");
    let foo = machines.find("\"foo\":").expect("foo");
    let bar = machines.find("\"bar\":").expect("bar");
    assert!(baz < foo && foo < bar);
    assert!(machines.contains("const path = require('path')"));
    assert!(!machines.contains("let unused"));

    assert!(!root.join("exercises").exists());

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn second_run_is_byte_identical() {
    let root = course("pipeline-twice", &[("03-loops", &read_fixture("loops.js"))]);
    let settings = registry_only(&root);

    run(&settings).await.expect("first run");
    let first: Vec<String> = ["machines.js", "viewers.js", "repos.js"]
        .iter()
        .map(|f| fs::read_to_string(root.join(f)).expect("registry"))
        .collect();

    let report = run(&settings).await.expect("second run");
    let second: Vec<String> = ["machines.js", "viewers.js", "repos.js"]
        .iter()
        .map(|f| fs::read_to_string(root.join(f)).expect("registry"))
        .collect();

    assert_eq!(first, second);
    assert!(
        report
            .registries
            .iter()
            .all(|w| w.outcome == WriteOutcome::Unchanged)
    );
    assert!(first[0].contains("\"loops\": (function () {"));

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn empty_course_writes_empty_registries() {
    let root = course("pipeline-empty", &[]);

    let report = run(&registry_only(&root)).await.expect("run");
    assert!(report.exercises.is_empty());
    assert!(
        fs::read_to_string(root.join("repos.js"))
            .expect("repos.js")
            .ends_with("module.exports = {};\n")
    );
    assert!(
        fs::read_to_string(root.join("viewers.js"))
            .expect("viewers.js")
            .contains("\"_order\": []")
    );

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn missing_source_tree_is_an_error() {
    let root = temp_root("pipeline-bare");

    let err = run(&registry_only(&root)).await.expect_err("run without src");
    assert!(err.to_string().contains(&root.join("src").display().to_string()));
    assert!(!root.join("machines.js").exists());

    fs::create_dir_all(root.join("src")).expect("create src");
    let err = run(&registry_only(&root))
        .await
        .expect_err("run without src/exercises");
    assert!(
        err.to_string()
            .contains(&root.join("src/exercises").display().to_string())
    );
    assert!(!root.join("viewers.js").exists());

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn report_serializes_to_json() {
    let root = course("pipeline-json", &[("01-loops", &read_fixture("loops.js"))]);

    let report = run(&registry_only(&root)).await.expect("run");
    let json = serde_json::to_value(&report).expect("serialize report");

    assert_eq!(json["restored_ignores"], 1);
    assert_eq!(json["exercises"][0]["name"], "loops");
    assert_eq!(json["exercises"][0]["scaffold"]["status"], "skipped");
    assert_eq!(json["registries"][0]["domain"], "machine");
    assert_eq!(json["registries"][0]["outcome"]["status"], "written");
    assert!(json["registries"][0]["outcome"]["changed_lines"].as_u64() > Some(0));

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn strict_mode_rejects_unresolved_names() {
    let source = "module.exports = { machine: helpers.vm() }";
    let root = course("pipeline-strict", &[("01-vm", source)]);

    run(&registry_only(&root)).await.expect("lenient run");

    let err = run(&registry_only(&root).with_strict(true))
        .await
        .expect_err("strict run");
    assert!(format!("{err:#}").contains("01-vm"));
    assert_eq!(
        err.root_cause().downcast_ref::<ConfigFormatError>(),
        Some(&ConfigFormatError::Unresolved(vec!["helpers".to_string()]))
    );

    let allowed = registry_only(&root)
        .with_strict(true)
        .with_extra_globals(["helpers".to_string()]);
    run(&allowed).await.expect("strict run with extra global");

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn broken_config_names_the_exercise() {
    let root = course(
        "pipeline-broken",
        &[("01-ok", "module.exports = {}"), ("02-broken", &read_fixture("factory.js"))],
    );

    let err = run(&registry_only(&root)).await.expect_err("run");
    let message = format!("{err:#}");
    assert!(message.contains("02-broken"));
    assert!(message.contains("object literal"));
    assert!(!root.join("machines.js").exists());

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn clashing_public_names_are_fatal() {
    let root = temp_root("pipeline-clash");
    write(&root, "src/exercises/01-loops/config.js", "module.exports = {}");
    write(&root, "src/exercises/02-loops/config.js", "module.exports = {}");

    let err = run(&registry_only(&root)).await.expect_err("run");
    assert!(err.to_string().contains("loops"));

    let _ = fs::remove_dir_all(root);
}
