//! Manifest error-message and parameter-assembly integration tests.

use std::fs;

use ensemble_core::{
    manifest::load_manifest,
    types::{BuildIdentity, InvocationParameters, TaskName},
    CoreError,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write manifest");
    path
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn missing_manifest_reports_io_error_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let err = load_manifest(&dir.path().join("ensemble.yaml")).unwrap_err();

    assert!(matches!(err, CoreError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("ensemble.yaml"));
}

#[test]
fn corrupt_yaml_reports_parse_error_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "ensemble.yaml", ": : corrupt : yaml : !!!\n  - broken: [unclosed");

    let err = load_manifest(&path).unwrap_err();
    assert!(matches!(err, CoreError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("ensemble.yaml"));
}

#[test]
fn duplicate_identity_names_the_offender() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "ensemble.yaml",
        "builds:\n  - id: app\n    dir: ./x\n  - id: app\n    dir: ./y\n",
    );

    let err = load_manifest(&path).unwrap_err();
    assert!(err.to_string().contains("'app'"), "got: {err}");
    assert!(err.to_string().contains("more than once"), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Manifest → composite parameters → retargeting
// ---------------------------------------------------------------------------

#[test]
fn loaded_manifest_retargets_like_the_spec_scenario() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(
        &dir,
        "ensemble.yaml",
        "\
target: b
builds:
  - id: a
    dir: ./a
  - id: b
    dir: ./b
",
    );

    let manifest = load_manifest(&path).expect("load");
    let composite = manifest.composite_parameters(None).expect("parameters");
    assert_eq!(composite.target_build, BuildIdentity::from("b"));

    let target = composite
        .builds
        .iter()
        .find(|p| p.identity == composite.target_build)
        .expect("target declared");

    let original = InvocationParameters::new(dir.path(), vec![TaskName::from("build")]);
    let retargeted = original.for_participant(target);

    assert_eq!(retargeted.project_dir, dir.path().join("./b"));
    assert!(!retargeted.search_upwards);
    assert!(retargeted.assume_fluid_dependencies);
    assert_eq!(retargeted.task_names, vec![TaskName::from("build")]);
}
