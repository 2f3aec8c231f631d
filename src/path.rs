//! Path and label utilities for quire
//!
//! Turns filesystem paths into human-readable navigation labels and
//! root-relative document references. Everything here is pure except the
//! relative-path computation, which only fails for paths outside the root.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use crate::error::{Error, Result};

/// File extensions recognised as Markdown documents.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkdn", "mkd"];

/// A document path paired with its navigation label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReference {
    pub label: String,
    /// Path relative to the staging root, always `/`-separated
    pub relative_path: String,
}

/// Check whether a path names a Markdown document by extension
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Derive the navigation label for a path.
///
/// Takes the final path segment, strips one trailing Markdown extension,
/// turns `-` and `_` into spaces and title-cases the result. The title-cased
/// label is then looked up in `labels` and replaced if an override exists.
pub fn label_for(path: &Path, labels: &BTreeMap<String, String>) -> String {
    let segment = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) =>
        {
            stem
        }
        _ => segment.as_str(),
    };

    let label = title_case(&stem.replace(['-', '_'], " "));
    labels.get(&label).cloned().unwrap_or(label)
}

/// Title-case a string: the first letter of every alphabetic run is upper-cased
/// and the remaining letters of the run are lower-cased.
pub fn title_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut previous_is_letter = false;

    for ch in input.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }

    result
}

/// Express `path` relative to `root` using `/` separators.
pub fn relative_slash_path(path: &Path, root: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| Error::Path {
        message: format!(
            "'{}' is not inside '{}'",
            path.display(),
            root.display()
        ),
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    Ok(parts.join("/"))
}

/// Build the document reference for `path` relative to `root`.
pub fn document_reference(
    path: &Path,
    root: &Path,
    labels: &BTreeMap<String, String>,
) -> Result<DocumentReference> {
    Ok(DocumentReference {
        label: label_for(path, labels),
        relative_path: relative_slash_path(path, root)?,
    })
}
