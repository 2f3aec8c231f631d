//! # Error Handling
//!
//! This module defines the centralized error type for `quire`. It uses the
//! `thiserror` library to create an `Error` enum covering every anticipated
//! failure mode of the documentation pipeline.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum for all errors raised by the library. Each
//!   variant carries enough context to be reported to a user directly.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The variants fall into a few groups:
//!
//! - Configuration errors (no project found, unreadable or invalid config).
//! - Precondition errors (the destination already exists).
//! - Collaborator errors from the reference-doc and site generators, which are
//!   surfaced as-is since they usually carry actionable detail.
//! - Staging and filesystem errors.
//! - Best-effort conditions (git introspection), which callers downgrade to
//!   warnings instead of failing a render.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for quire operations
#[derive(Error, Debug)]
pub enum Error {
    /// No manifest, no project markers and no explicit modules were found.
    #[error("No project found in the given directory: '{}'", directory.display())]
    NoProjectFound { directory: PathBuf },

    /// The configuration section of the manifest could not be parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The configuration parsed but failed validation.
    ///
    /// Raised both while building a `ProjectConfig` and by the site
    /// generator's own validation pass.
    #[error("Configuration invalid: {message}{}", format_problems(errors))]
    ConfigInvalid {
        message: String,
        /// Every individual problem found
        errors: Vec<String>,
    },

    /// The output directory exists and overwriting was not requested.
    #[error("Documentation already exists in '{}'. Use --overwrite to ignore", directory.display())]
    DocumentationAlreadyExists { directory: PathBuf },

    /// The external reference-doc generator failed.
    #[error("Reference generation error: {message}")]
    ReferenceGeneration { message: String },

    /// The site generator failed for a reason other than invalid configuration.
    #[error("Site generation error: {message}")]
    SiteGeneration { message: String },

    /// Copying sources into or out of the staging area failed.
    #[error("Staging error: {message}")]
    Staging { message: String },

    /// The render was interrupted before it finished.
    #[error("Render cancelled; staging directories were removed")]
    Cancelled,

    /// A navigation tree was malformed.
    #[error("Navigation error: {message}")]
    Navigation { message: String },

    /// A path could not be expressed relative to its root.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// A git command failed.
    #[error("Git command failed: {command} - {stderr}")]
    Git { command: String, stderr: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A file watcher error, wrapped from `notify::Error`.
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

fn format_problems(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  - {}", e))
        .collect::<String>()
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
