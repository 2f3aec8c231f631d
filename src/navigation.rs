//! # Navigation Trees
//!
//! This module derives the site navigation from the staged documentation
//! directory. The tree mirrors the directory structure:
//!
//! - a directory lists its own `*.md` files first, sorted by file name;
//! - then its subdirectories, sorted by name, each as a labelled branch;
//! - a subdirectory only appears if some `*.md` file exists beneath it at any
//!   depth, so the tree never contains empty branches.
//!
//! Hidden files and directories (leading `.`) are never part of the tree.
//!
//! Navigation trees are plain owned values rebuilt on every render. The same
//! type doubles as the wire format for user-supplied navigation: an ordered
//! sequence of single-key tables mapping a label either to a document path or
//! to a nested sequence.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::ProjectConfig;
use crate::defaults::{HOME_DOCUMENT, HOME_LABEL, INDEX_DOCUMENT, NO_HOME_PAGE, REFERENCE_LABEL};
use crate::error::{Error, Result};
use crate::path::{document_reference, label_for};

/// One entry of a navigation tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationNode {
    /// A single document, path relative to the staging root
    Leaf { label: String, document: String },
    /// A directory grouping
    Branch {
        label: String,
        children: Vec<NavigationNode>,
    },
}

impl NavigationNode {
    pub fn leaf(label: impl Into<String>, document: impl Into<String>) -> Self {
        NavigationNode::Leaf {
            label: label.into(),
            document: document.into(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<NavigationNode>) -> Self {
        NavigationNode::Branch {
            label: label.into(),
            children,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NavigationNode::Leaf { label, .. } | NavigationNode::Branch { label, .. } => label,
        }
    }

    /// Every document referenced by this node, depth first
    pub fn documents(&self) -> Vec<&str> {
        match self {
            NavigationNode::Leaf { document, .. } => vec![document.as_str()],
            NavigationNode::Branch { children, .. } => {
                children.iter().flat_map(NavigationNode::documents).collect()
            }
        }
    }
}

impl Serialize for NavigationNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            NavigationNode::Leaf { label, document } => map.serialize_entry(label, document)?,
            NavigationNode::Branch { label, children } => map.serialize_entry(label, children)?,
        }
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NavigationTarget {
    Document(String),
    Section(Vec<NavigationNode>),
}

impl<'de> Deserialize<'de> for NavigationNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = BTreeMap::<String, NavigationTarget>::deserialize(deserializer)?;
        if entries.len() != 1 {
            return Err(de::Error::custom(format!(
                "navigation entries must have exactly one label, found {}",
                entries.len()
            )));
        }

        match entries.into_iter().next() {
            Some((label, NavigationTarget::Document(document))) => {
                Ok(NavigationNode::Leaf { label, document })
            }
            Some((label, NavigationTarget::Section(children))) => {
                Ok(NavigationNode::Branch { label, children })
            }
            None => Err(de::Error::custom("empty navigation entry")),
        }
    }
}

/// Indented text outline of a navigation tree.
pub fn outline(nodes: &[NavigationNode]) -> String {
    fn write_nodes(out: &mut String, nodes: &[NavigationNode], depth: usize) {
        for node in nodes {
            let indent = "  ".repeat(depth);
            match node {
                NavigationNode::Leaf { label, document } => {
                    out.push_str(&format!("{}{} -> {}\n", indent, label, document));
                }
                NavigationNode::Branch { label, children } => {
                    out.push_str(&format!("{}{}/\n", indent, label));
                    write_nodes(out, children, depth + 1);
                }
            }
        }
    }

    let mut out = String::new();
    write_nodes(&mut out, nodes, 0);
    out
}

impl fmt::Display for NavigationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(outline(std::slice::from_ref(self)).trim_end())
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Whether auto-built navigation lists `path`: a visible `*.md` file
pub fn is_navigable_document(path: &Path) -> bool {
    !is_hidden(path)
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(".md"))
}

/// Immediate `*.md` files and subdirectories of `directory`, each sorted by name
fn list_directory(directory: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut documents = Vec::new();
    let mut subdirectories = Vec::new();

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            if !is_hidden(&path) {
                subdirectories.push(path);
            }
        } else if is_navigable_document(&path) {
            documents.push(path);
        }
    }

    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    subdirectories.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok((documents, subdirectories))
}

/// Check whether a `*.md` document exists anywhere beneath `directory`
pub fn contains_markdown(directory: &Path) -> bool {
    WalkDir::new(directory)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()))
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_type().is_file() && is_navigable_document(entry.path()))
}

/// Build the navigation tree for `directory`, with document paths relative to `root`.
///
/// A missing directory, or one without Markdown at any depth, yields an empty
/// tree.
pub fn build_navigation(
    directory: &Path,
    root: &Path,
    labels: &BTreeMap<String, String>,
) -> Result<Vec<NavigationNode>> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let (documents, subdirectories) = list_directory(directory)?;

    let mut nodes = documents
        .iter()
        .map(|document| {
            let reference = document_reference(document, root, labels)?;
            Ok(NavigationNode::leaf(reference.label, reference.relative_path))
        })
        .collect::<Result<Vec<_>>>()?;

    for subdirectory in subdirectories {
        if !contains_markdown(&subdirectory) {
            debug!("Skipping '{}': no Markdown documents", subdirectory.display());
            continue;
        }
        let children = build_navigation(&subdirectory, root, labels)?;
        nodes.push(NavigationNode::branch(label_for(&subdirectory, labels), children));
    }

    Ok(nodes)
}

/// Assemble the top-level navigation for a staged input root.
///
/// A navigation override in `config.site.nav` is returned as an independent
/// copy. Otherwise the tree is `Home` first, then the remaining root
/// documents, then the tree of the docs directory. When the input root has no
/// home document a placeholder is written so the site always has a first page.
pub fn assemble(input_root: &Path, config: &ProjectConfig) -> Result<Vec<NavigationNode>> {
    if let Some(nav) = &config.site.nav {
        return Ok(nav.clone());
    }

    let home = input_root.join(HOME_DOCUMENT);
    if !home.is_file() {
        debug!("No {} found, writing placeholder home page", HOME_DOCUMENT);
        fs::write(&home, NO_HOME_PAGE)?;
    }

    let (root_documents, _) = list_directory(input_root)?;

    let mut nav = vec![NavigationNode::leaf(HOME_LABEL, HOME_DOCUMENT)];
    for document in root_documents.iter().filter(|doc| **doc != home) {
        let reference = document_reference(document, input_root, &config.labels)?;
        nav.push(NavigationNode::leaf(reference.label, reference.relative_path));
    }

    nav.extend(build_navigation(
        &input_root.join(&config.docs_dir),
        input_root,
        &config.labels,
    )?);

    Ok(nav)
}

/// The `Reference` branch over generated reference documentation, if any was produced.
pub fn reference_branch(
    reference_dir: &Path,
    input_root: &Path,
    labels: &BTreeMap<String, String>,
) -> Result<Option<NavigationNode>> {
    let children = build_navigation(reference_dir, input_root, labels)?;
    if children.is_empty() {
        return Ok(None);
    }
    Ok(Some(NavigationNode::branch(REFERENCE_LABEL, children)))
}

/// Give an override navigation a landing page.
///
/// When the first entry is a document other than `README.md` or `index.md`
/// and the input root has no `index.md`, that document is copied to
/// `index.md`.
pub fn ensure_index_page(input_root: &Path, nav: &[NavigationNode]) -> Result<()> {
    let Some(NavigationNode::Leaf { document, .. }) = nav.first() else {
        return Ok(());
    };

    let index = input_root.join(INDEX_DOCUMENT);
    if document == HOME_DOCUMENT || document == INDEX_DOCUMENT || index.exists() {
        return Ok(());
    }

    let source = input_root.join(document);
    if !source.is_file() {
        return Err(Error::Navigation {
            message: format!("first navigation entry '{}' does not exist", document),
        });
    }
    fs::copy(&source, &index)?;
    Ok(())
}
