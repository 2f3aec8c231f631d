//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a project fixture and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_sample_docs();
//!     fixture.command().arg("render").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::list_files;
    pub use super::TestFixture;
}

/// `Cargo.toml` contents used by the fixtures.
#[allow(dead_code)]
pub mod manifests {
    /// A single crate with no quire section.
    pub const PACKAGE: &str = r#"[package]
name = "sample-crate"
version = "0.1.0"
edition = "2021"
"#;

    /// A crate whose quire section overrides the navigation.
    pub const WITH_NAV_OVERRIDE: &str = r#"[package]
name = "sample-crate"
version = "0.1.0"
edition = "2021"

[package.metadata.quire.site]
nav = [{ Guide = "docs/guide.md" }, { Home = "README.md" }, { Changes = "CHANGELOG.md" }]
"#;

    /// A crate with a quire section that does not parse.
    pub const INVALID_SECTION: &str = r#"[package]
name = "sample-crate"
version = "0.1.0"

[package.metadata.quire]
docs-dir = 42
"#;

    /// A crate whose reference command runs long enough to be interrupted.
    pub const WITH_SLOW_REFERENCE: &str = r#"[package]
name = "sample-crate"
version = "0.1.0"
edition = "2021"

[package.metadata.quire]
include-reference-docs = true

[package.metadata.quire.reference]
command = ["sleep", "30"]
"#;

    /// A crate whose reference docs come from a shell command.
    pub const WITH_REFERENCE_COMMAND: &str = r#"[package]
name = "sample-crate"
version = "0.1.0"
edition = "2021"

[package.metadata.quire]
include-reference-docs = true

[package.metadata.quire.reference]
command = ["sh", "-c", "for m in \"$@\"; do printf '# %s\n' \"$m\" > \"$0/$m.md\"; done", "{output_dir}", "{modules}"]
"#;
}

/// Every file beneath `root`, relative and sorted.
#[allow(dead_code)]
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

/// A temporary project directory.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_manifest(manifests::PACKAGE)
///     .with_file("docs/guide.md", "# Guide");
///
/// fixture.command().arg("render").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `Cargo.toml` with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("Cargo.toml", content)
    }

    /// A crate with a README, a changelog and a small docs tree.
    #[allow(dead_code)]
    pub fn with_sample_docs(self) -> Self {
        self.with_manifest(manifests::PACKAGE)
            .with_file("README.md", "# Sample\n\nRead the [guide](docs/guide.md).\n")
            .with_file("CHANGELOG.md", "# Changelog\n")
            .with_file("docs/guide.md", "# Guide\n")
            .with_file("docs/advanced/tips.md", "# Tips\n")
            .with_binary_file("images/logo.png", &[0x89, 0x50, 0x4e, 0x47])
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a binary file with the given path and content.
    #[allow(dead_code)]
    pub fn with_binary_file(self, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(path)
            .write_binary(content)
            .expect("Failed to write binary file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Default output directory of the project.
    #[allow(dead_code)]
    pub fn site_path(&self) -> PathBuf {
        self.path().join("site")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command configured to run in this fixture's directory.
    ///
    /// Environment fallbacks for the CLI flags are cleared so the host
    /// environment cannot leak into tests.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("quire");
        cmd.current_dir(self.path())
            .env_remove("QUIRE_CONFIG")
            .env_remove("QUIRE_OUTPUT_DIR")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_sample_docs() {
        let fixture = TestFixture::new().with_sample_docs();
        assert_eq!(
            list_files(fixture.path()),
            vec![
                PathBuf::from("CHANGELOG.md"),
                PathBuf::from("Cargo.toml"),
                PathBuf::from("README.md"),
                PathBuf::from("docs/advanced/tips.md"),
                PathBuf::from("docs/guide.md"),
                PathBuf::from("images/logo.png"),
            ]
        );
    }

    #[test]
    fn test_manifests_are_valid_toml() {
        for manifest in [
            manifests::PACKAGE,
            manifests::WITH_NAV_OVERRIDE,
            manifests::INVALID_SECTION,
            manifests::WITH_REFERENCE_COMMAND,
        ] {
            toml::from_str::<toml::Table>(manifest).expect("Manifest should be valid TOML");
        }
    }
}
