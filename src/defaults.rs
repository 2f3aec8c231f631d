//! Default values for quire configuration.
//!
//! This module provides centralized default values used across the pipeline
//! and the CLI, ensuring consistency and avoiding duplication.

use std::collections::BTreeMap;

/// Manifest read when no config file is given.
pub const CONFIG_FILE: &str = "Cargo.toml";

/// Table paths searched, in order, for the quire configuration section.
pub const CONFIG_SECTIONS: &[&[&str]] = &[
    &["package", "metadata", "quire"],
    &["workspace", "metadata", "quire"],
    &["quire"],
];

pub const DOCS_DIR: &str = "docs";
pub const EXTRA_DIRS: &[&str] = &["art", "images", "media"];
pub const OUTPUT_DIR: &str = "site";

/// The designated first page of every site.
pub const HOME_DOCUMENT: &str = "README.md";
pub const INDEX_DOCUMENT: &str = "index.md";
pub const HOME_LABEL: &str = "Home";

/// Where generated reference Markdown lands inside the staging input root.
pub const REFERENCE_DIR: &str = "reference";
pub const REFERENCE_LABEL: &str = "Reference";

/// Body written as the home page when a project has no `README.md`.
pub const NO_HOME_PAGE: &str = "
# Nothing here

`quire` uses README.md as your project's home page.
It appears you do not yet have a README.md file created.
";

/// Label overrides applied on top of the derived labels.
pub fn default_labels() -> BTreeMap<String, String> {
    [("Cli", "CLI"), ("Api", "API"), ("Http", "HTTP"), ("Url", "URL")]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

/// Markdown extensions enabled by the built-in site generator.
pub fn default_markdown_extensions() -> Vec<String> {
    ["tables", "footnotes", "strikethrough", "tasklists"]
        .into_iter()
        .map(String::from)
        .collect()
}
