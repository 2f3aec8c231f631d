//! Project metadata from `Cargo.toml`
//!
//! The manifest is consumed read-only. It supplies the project name and the
//! list of modules to document when the configuration section leaves them out.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const MANIFEST_FILE: &str = "Cargo.toml";

/// What the build descriptor tells us about a project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// `package.name`, if the manifest declares a package
    pub name: Option<String>,
    /// Importable module names, `-` replaced with `_`
    pub modules: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<Package>,
    workspace: Option<Workspace>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Workspace {
    #[serde(default)]
    members: Vec<String>,
}

/// Turn a crate or directory name into an importable module name
pub fn module_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Read `Cargo.toml` from a project directory.
///
/// Returns `Ok(None)` when the directory has no manifest.
pub fn read(directory: &Path) -> Result<Option<ProjectMetadata>> {
    let path = directory.join(MANIFEST_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    parse(&content, directory).map(Some)
}

/// Parse manifest content. `directory` is used to expand `dir/*` workspace members.
pub fn parse(content: &str, directory: &Path) -> Result<ProjectMetadata> {
    let manifest: CargoManifest = toml::from_str(content).map_err(|e| Error::ConfigParse {
        message: format!("invalid {}: {}", MANIFEST_FILE, e),
        hint: None,
    })?;

    if let Some(package) = manifest.package {
        return Ok(ProjectMetadata {
            modules: vec![module_name(&package.name)],
            name: Some(package.name),
        });
    }

    let mut modules = Vec::new();
    if let Some(workspace) = manifest.workspace {
        for member in &workspace.members {
            modules.extend(expand_member(member, directory)?);
        }
    }

    Ok(ProjectMetadata {
        name: None,
        modules,
    })
}

fn expand_member(member: &str, directory: &Path) -> Result<Vec<String>> {
    let Some(parent) = member.strip_suffix("/*") else {
        if member.contains('*') {
            debug!("Skipping unsupported workspace member pattern '{}'", member);
            return Ok(Vec::new());
        }
        return Ok(member
            .rsplit('/')
            .next()
            .map(module_name)
            .into_iter()
            .collect());
    };

    let parent_dir = directory.join(parent);
    if !parent_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(&parent_dir)? {
        let path = entry?.path();
        if path.join(MANIFEST_FILE).is_file() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(module_name(name));
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_name_becomes_module() {
        let metadata = parse(
            "[package]\nname = \"my-crate\"\nversion = \"0.1.0\"\n",
            Path::new("."),
        )
        .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("my-crate"));
        assert_eq!(metadata.modules, vec!["my_crate"]);
    }

    #[test]
    fn test_workspace_members_become_modules() {
        let metadata = parse(
            "[workspace]\nmembers = [\"crates/core-lib\", \"cli\"]\n",
            Path::new("."),
        )
        .unwrap();
        assert_eq!(metadata.name, None);
        assert_eq!(metadata.modules, vec!["core_lib", "cli"]);
    }

    #[test]
    fn test_workspace_glob_members_are_expanded() {
        let temp = TempDir::new().unwrap();
        for name in ["zeta-lib", "alpha"] {
            let dir = temp.path().join("crates").join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("Cargo.toml"), "[package]\nname = \"x\"\n").unwrap();
        }
        fs::create_dir_all(temp.path().join("crates/not-a-crate")).unwrap();

        let metadata = parse("[workspace]\nmembers = [\"crates/*\"]\n", temp.path()).unwrap();
        assert_eq!(metadata.modules, vec!["alpha", "zeta_lib"]);
    }

    #[test]
    fn test_read_missing_manifest() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read(temp.path()).unwrap(), None);
    }

    #[test]
    fn test_parse_invalid_manifest() {
        let result = parse("[package", Path::new("."));
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }
}
