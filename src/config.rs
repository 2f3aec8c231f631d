//! # Project Configuration
//!
//! This module defines `ProjectConfig`, the immutable description of how to
//! build a documentation site, and the reconciliation logic that produces it.
//!
//! ## Layers
//!
//! Configuration is assembled from four layers, later layers winning:
//!
//! 1. **Built-in defaults** (`ProjectConfig::defaults`).
//! 2. **Manifest metadata**: module names and project name from `Cargo.toml`
//!    (see `manifest`).
//! 3. **Project config**: the `[package.metadata.quire]` section of the config
//!    file, falling back to `[workspace.metadata.quire]` and then to a
//!    top-level `[quire]` table.
//! 4. **Caller overrides**: a `PartialConfig` supplied by the caller (the CLI
//!    builds one from its flags).
//!
//! Each layer is a typed `PartialConfig`; applying a layer only replaces the
//! values it sets. Repository details for edit links are then filled in from
//! git (best effort), and the result is validated once.
//!
//! ## Option bags
//!
//! `SiteOptions` and `ReferenceOptions` are passed to the two generators. Their
//! known keys are typed; any other key lands in their `extra` table and is
//! handed over unchanged. Unknown keys at the top level of the section are
//! forwarded to the site generator's bag.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::git::{self, GitCli, RepositoryIntrospection, RepositorySettings};
use crate::manifest;
use crate::navigation::NavigationNode;

/// Options handed to the site generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_uri: Option<String>,
    /// Rewrite remote URLs into browsable HTTPS URLs (default true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize_repo_url: Option<bool>,
    /// Markdown sources; injected with the staging input root when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_dir: Option<PathBuf>,
    /// HTML destination; injected with the staging output root when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_dir: Option<PathBuf>,
    /// User navigation; when set, navigation auto-discovery is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<Vec<NavigationNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown_extensions: Option<Vec<String>>,
    /// Treat generator warnings as errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl SiteOptions {
    /// Overlay every value `other` sets
    pub fn merge(&mut self, other: SiteOptions) {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        overlay!(
            site_name,
            repo_url,
            repo_name,
            edit_uri,
            normalize_repo_url,
            docs_dir,
            site_dir,
            nav,
            markdown_extensions,
            strict
        );
        self.extra.extend(other.extra);
    }

    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }
}

/// Options handed to the reference-doc generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReferenceOptions {
    /// Command line of the generator; `{output_dir}` and `{modules}` are substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Output location relative to the staging input root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl ReferenceOptions {
    pub fn merge(&mut self, other: ReferenceOptions) {
        if other.command.is_some() {
            self.command = other.command;
        }
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
        self.extra.extend(other.extra);
    }
}

/// One configuration layer; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PartialConfig {
    pub docs_dir: Option<PathBuf>,
    pub extra_dirs: Option<Vec<PathBuf>>,
    pub output_dir: Option<PathBuf>,
    pub include_reference_docs: Option<bool>,
    pub modules: Option<Vec<String>>,
    /// Merged key by key over the default labels
    pub labels: Option<BTreeMap<String, String>>,
    /// Appended to the site's markdown extensions
    pub extra_markdown_extensions: Option<Vec<String>>,
    pub site: Option<SiteOptions>,
    pub reference: Option<ReferenceOptions>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// How to build the documentation site for one project
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Project root
    pub directory: PathBuf,
    /// File the configuration section was read from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Hand-written documentation, relative to `directory`
    pub docs_dir: PathBuf,
    /// Media directories copied alongside the docs, relative to `directory`
    pub extra_dirs: Vec<PathBuf>,
    /// Final destination of the HTML site
    pub output_dir: PathBuf,
    pub include_reference_docs: bool,
    pub modules: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub site: SiteOptions,
    pub reference: ReferenceOptions,
}

impl ProjectConfig {
    /// Built-in defaults for a project rooted at `directory`
    pub fn defaults(directory: &Path) -> Self {
        let site_name = directory
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        ProjectConfig {
            directory: directory.to_path_buf(),
            config_file: None,
            docs_dir: PathBuf::from(defaults::DOCS_DIR),
            extra_dirs: defaults::EXTRA_DIRS.iter().map(PathBuf::from).collect(),
            output_dir: directory.join(defaults::OUTPUT_DIR),
            include_reference_docs: false,
            modules: Vec::new(),
            labels: defaults::default_labels(),
            site: SiteOptions {
                site_name,
                markdown_extensions: Some(defaults::default_markdown_extensions()),
                ..Default::default()
            },
            reference: ReferenceOptions::default(),
        }
    }

    /// Load the configuration of the project in `directory`.
    ///
    /// `config_file` is resolved against `directory`. Repository details are
    /// read from git.
    pub fn load(directory: &Path, config_file: &Path, overrides: PartialConfig) -> Result<Self> {
        Self::load_with(directory, config_file, overrides, &GitCli)
    }

    /// Like `load`, with an explicit repository introspection.
    pub fn load_with(
        directory: &Path,
        config_file: &Path,
        overrides: PartialConfig,
        introspection: &dyn RepositoryIntrospection,
    ) -> Result<Self> {
        if !directory.is_dir() {
            return Err(Error::NoProjectFound {
                directory: directory.to_path_buf(),
            });
        }

        let config_path = directory.join(config_file);
        let has_manifest = directory.join(manifest::MANIFEST_FILE).is_file();
        if !config_path.is_file() && !has_manifest && overrides.modules.is_none() {
            return Err(Error::NoProjectFound {
                directory: directory.to_path_buf(),
            });
        }

        let mut config = Self::defaults(directory);

        match manifest::read(directory) {
            Ok(Some(metadata)) => config.apply_metadata(metadata),
            Ok(None) => {}
            Err(e) => warn!("Error occurred trying to read project metadata: {}", e),
        }

        if config_path.is_file() {
            let section = read_section(&config_path)?;
            config.config_file = Some(config_path);
            config.apply(section);
        } else {
            warn!("No config file found at location: \"{}\"", config_path.display());
        }

        config.apply(overrides);
        config.finish(introspection);
        config.validate()?;
        Ok(config)
    }

    fn apply_metadata(&mut self, metadata: manifest::ProjectMetadata) {
        if !metadata.modules.is_empty() {
            self.modules = metadata.modules;
        }
        if let Some(name) = metadata.name {
            self.site.site_name = Some(name);
        }
    }

    /// Apply one configuration layer
    pub fn apply(&mut self, layer: PartialConfig) {
        if let Some(docs_dir) = layer.docs_dir {
            self.docs_dir = docs_dir;
        }
        if let Some(extra_dirs) = layer.extra_dirs {
            self.extra_dirs = extra_dirs;
        }
        if let Some(output_dir) = layer.output_dir {
            self.output_dir = self.directory.join(output_dir);
        }
        if let Some(include) = layer.include_reference_docs {
            self.include_reference_docs = include;
        }
        if let Some(modules) = layer.modules {
            self.modules = modules;
        }
        if let Some(labels) = layer.labels {
            self.labels.extend(labels);
        }
        if let Some(site) = layer.site {
            self.site.merge(site);
        }
        if let Some(extensions) = layer.extra_markdown_extensions {
            self.site
                .markdown_extensions
                .get_or_insert_with(Vec::new)
                .extend(extensions);
        }
        if let Some(reference) = layer.reference {
            self.reference.merge(reference);
        }
        if !layer.extra.is_empty() {
            debug!(
                "Forwarding unknown keys to the site generator: {:?}",
                layer.extra.keys().collect::<Vec<_>>()
            );
            self.site.extra.extend(layer.extra);
        }
    }

    fn finish(&mut self, introspection: &dyn RepositoryIntrospection) {
        if self.modules.is_empty() {
            if let Some(name) = self.directory.file_name() {
                self.modules = vec![manifest::module_name(&name.to_string_lossy())];
            }
        }

        let info = git::repository(
            &self.directory,
            &RepositorySettings {
                repo_url: self.site.repo_url.as_deref(),
                repo_name: self.site.repo_name.as_deref(),
                edit_uri: self.site.edit_uri.as_deref(),
                normalize_repo_url: self.site.normalize_repo_url.unwrap_or(true),
            },
            introspection,
        );
        self.site.repo_url = info.repo_url;
        self.site.repo_name = info.repo_name;
        self.site.edit_uri = info.edit_uri;
    }

    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.include_reference_docs {
            if self.modules.is_empty() {
                errors.push("`modules` must not be empty when reference docs are enabled".to_string());
            }
            if self.reference.command.as_ref().map_or(true, |c| c.is_empty()) {
                errors.push(
                    "`reference.command` must be set when reference docs are enabled".to_string(),
                );
            }
        }

        for (key, path) in std::iter::once(("docs-dir", &self.docs_dir))
            .chain(self.extra_dirs.iter().map(|dir| ("extra-dirs", dir)))
            .chain(self.reference.output_dir.iter().map(|dir| ("reference.output-dir", dir)))
        {
            if !is_contained_relative(path) {
                errors.push(format!(
                    "`{}` must be a relative path inside the project, got '{}'",
                    key,
                    path.display()
                ));
            }
        }

        if let Some(nav) = &self.site.nav {
            if nav.is_empty() {
                errors.push("`site.nav` must not be empty".to_string());
            }
            validate_labels(nav, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigInvalid {
                message: format!("{} problem(s) in project configuration", errors.len()),
                errors,
            })
        }
    }

    /// The user-supplied navigation, if any
    pub fn navigation_override(&self) -> Option<&[NavigationNode]> {
        self.site.nav.as_deref()
    }
}

fn validate_labels(nodes: &[NavigationNode], errors: &mut Vec<String>) {
    for node in nodes {
        if node.label().trim().is_empty() {
            errors.push("navigation labels must not be empty".to_string());
        }
        if let NavigationNode::Branch { children, .. } = node {
            validate_labels(children, errors);
        }
    }
}

fn is_contained_relative(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Read the quire section from a config file; a file without one yields an empty layer.
pub fn read_section(path: &Path) -> Result<PartialConfig> {
    let content = fs::read_to_string(path)?;
    parse_section(&content).map_err(|e| match e {
        Error::ConfigParse { message, hint } => Error::ConfigParse {
            message: format!("{}: {}", path.display(), message),
            hint,
        },
        other => other,
    })
}

/// Parse config file content and extract the quire section
pub fn parse_section(content: &str) -> Result<PartialConfig> {
    let document: toml::Table = toml::from_str(content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })?;

    for section_path in defaults::CONFIG_SECTIONS {
        if let Some(section) = lookup(&document, section_path) {
            return section.clone().try_into().map_err(|e: toml::de::Error| {
                Error::ConfigParse {
                    message: format!("[{}]: {}", section_path.join("."), e),
                    hint: Some(
                        "see the documentation for the keys accepted in the quire section"
                            .to_string(),
                    ),
                }
            });
        }
    }

    Ok(PartialConfig::default())
}

fn lookup<'a>(document: &'a toml::Table, path: &[&str]) -> Option<&'a toml::Value> {
    let (first, rest) = path.split_first()?;
    let mut value = document.get(*first)?;
    for key in rest {
        value = value.as_table()?.get(*key)?;
    }
    Some(value)
}
