//! # quire
//!
//! This library assembles a static documentation site from a project's
//! hand-written Markdown and, optionally, generated API reference pages. It is
//! the engine behind the `quire` command-line tool but can be embedded in
//! other tools that need to build documentation.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::path::Path;
//! use quire::path::label_for;
//!
//! let labels = BTreeMap::from([("Api".to_string(), "API".to_string())]);
//! assert_eq!(label_for(Path::new("docs/getting_started.md"), &labels), "Getting Started");
//! assert_eq!(label_for(Path::new("docs/api.md"), &labels), "API");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: `ProjectConfig` is assembled from built-in
//!   defaults, `Cargo.toml` metadata, the `[package.metadata.quire]` section
//!   and caller overrides, then validated once.
//! - **Navigation (`navigation`)**: the navigation tree is derived from the
//!   directory layout of the staged documentation, or taken from the
//!   configuration when the user supplies one.
//! - **Staging (`staging`)**: every render works in a pair of temporary
//!   directories that are removed however the render ends.
//! - **Generators (`generator`)**: reference documentation and the HTML site
//!   are produced behind two traits, with built-in implementations.
//! - **Rendering (`render`, `watch`)**: the finished site is copied to its
//!   destination under an overwrite policy, or swapped in atomically when
//!   watching for changes.
//!
//! ## Execution Flow
//!
//! 1.  **Configure**: `ProjectConfig::load` reconciles all configuration layers.
//! 2.  **Stage**: project Markdown and media are copied into the input root.
//! 3.  **Navigate**: the navigation tree is assembled.
//! 4.  **Reference**: reference docs are generated and added to the navigation.
//! 5.  **Build**: the site generator writes HTML into the output root.
//! 6.  **Place**: the output root is copied to `output_dir` and staging is removed.

pub mod cancel;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod generator;
pub mod git;
pub mod manifest;
pub mod navigation;
pub mod output;
pub mod path;
pub mod render;
pub mod staging;
pub mod watch;

#[cfg(test)]
mod path_proptest;

pub use cancel::CancellationToken;
pub use config::{PartialConfig, ProjectConfig};
pub use error::{Error, Result};
pub use render::{render, RenderReport};
pub use staging::{Pipeline, StagingArea};
