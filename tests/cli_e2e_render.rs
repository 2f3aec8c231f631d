//! End-to-end tests for the `render` command.
//!
//! These tests invoke the actual CLI binary against temporary projects and
//! check the generated site and the exit status.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_help() {
    let mut cmd = cargo_bin_cmd!("quire");

    cmd.arg("render")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Render the project's documentation into the output directory",
        ))
        .stdout(predicate::str::contains("--overwrite"))
        .stdout(predicate::str::contains("--no-reference-docs"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_sample_project() {
    let fixture = TestFixture::new().with_sample_docs();

    fixture
        .command()
        .arg("--color=never")
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("[RENDER] Rendering documentation"))
        .stdout(predicate::str::contains("[OK] Rendered 4 pages and 1 assets"));

    fixture.child("site/index.html").assert(predicate::path::is_file());
    fixture
        .child("site/docs/advanced/tips.html")
        .assert(predicate::str::contains("<h1>Tips</h1>"));
    fixture.child("site/images/logo.png").assert(predicate::path::is_file());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_existing_output_requires_overwrite() {
    let fixture = TestFixture::new().with_sample_docs();

    fixture.command().arg("render").arg("--quiet").assert().success();

    fixture
        .command()
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Documentation already exists"))
        .stderr(predicate::str::contains("--overwrite"));

    fixture
        .command()
        .arg("render")
        .arg("--overwrite")
        .arg("--quiet")
        .assert()
        .success();
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_output_dir_flag_and_env() {
    let fixture = TestFixture::new().with_sample_docs();

    fixture
        .command()
        .arg("render")
        .arg("--quiet")
        .arg("--output-dir")
        .arg("public")
        .assert()
        .success();
    fixture.child("public/index.html").assert(predicate::path::is_file());

    fixture
        .command()
        .env("QUIRE_OUTPUT_DIR", fixture.path().join("from-env"))
        .arg("render")
        .arg("--quiet")
        .assert()
        .success();
    fixture.child("from-env/index.html").assert(predicate::path::is_file());
    fixture.child("site").assert(predicate::path::missing());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_from_other_directory() {
    let fixture = TestFixture::new().with_sample_docs();
    let elsewhere = assert_fs::TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("quire");
    cmd.current_dir(elsewhere.path())
        .arg("render")
        .arg("--quiet")
        .arg("--directory")
        .arg(fixture.path())
        .assert()
        .success();

    fixture.child("site/index.html").assert(predicate::path::is_file());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_no_project() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No project found"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_invalid_config_section() {
    let fixture = TestFixture::new().with_manifest(manifests::INVALID_SECTION);

    fixture
        .command()
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration parsing error"));
    fixture.child("site").assert(predicate::path::missing());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_no_reference_docs_flag() {
    let fixture = TestFixture::new()
        .with_manifest(manifests::WITH_REFERENCE_COMMAND)
        .with_file("README.md", "# Sample\n");

    fixture
        .command()
        .arg("render")
        .arg("--quiet")
        .arg("--no-reference-docs")
        .assert()
        .success();

    fixture.child("site/index.html").assert(predicate::path::is_file());
    fixture.child("site/reference").assert(predicate::path::missing());
}

/// Names in `dir` left behind by a render's staging area
#[cfg(unix)]
fn staging_leftovers(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("quire-"))
        .collect()
}

#[cfg(unix)]
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_render_interrupted_removes_staging_directories() {
    use std::process::{Command, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};

    let fixture = TestFixture::new()
        .with_manifest(manifests::WITH_SLOW_REFERENCE)
        .with_file("README.md", "# Sample\n");
    let tmp = assert_fs::TempDir::new().unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_quire"))
        .current_dir(fixture.path())
        .env("TMPDIR", tmp.path())
        .env_remove("QUIRE_CONFIG")
        .env_remove("QUIRE_OUTPUT_DIR")
        .args(["render", "--quiet"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Wait until the render is inside the reference command
    let started = Instant::now();
    while staging_leftovers(tmp.path()).len() < 2 {
        assert!(
            started.elapsed() < Duration::from_secs(20),
            "staging directories never appeared"
        );
        thread::sleep(Duration::from_millis(50));
    }
    thread::sleep(Duration::from_millis(200));

    let sent = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(sent.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(130));
    assert!(
        staging_leftovers(tmp.path()).is_empty(),
        "left behind: {:?}",
        staging_leftovers(tmp.path())
    );
    fixture.child("site").assert(predicate::path::missing());
}
