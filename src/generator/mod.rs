//! # Generators
//!
//! The pipeline drives two external collaborators through the traits in this
//! module:
//!
//! - a [`ReferenceGenerator`], which writes API reference Markdown for a list
//!   of modules into a directory, and
//! - a [`SiteGenerator`], which turns a directory of Markdown plus a
//!   navigation tree into a static HTML site.
//!
//! The built-in implementations are [`CommandReferenceGenerator`], which runs
//! a configured command line, and [`HtmlSiteGenerator`], which renders pages
//! with `pulldown-cmark`. Tests substitute their own implementations to inject
//! failures.

use std::path::{Path, PathBuf};

use crate::cancel::CancellationToken;
use crate::config::{ReferenceOptions, SiteOptions};
use crate::error::Result;
use crate::navigation::NavigationNode;

pub mod reference;
pub mod site;

pub use reference::CommandReferenceGenerator;
pub use site::HtmlSiteGenerator;

/// Everything a reference generator needs for one run
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRequest<'a> {
    /// Project root; the generator runs from here
    pub directory: &'a Path,
    pub modules: &'a [String],
    /// Directory the reference Markdown must be written to
    pub output_dir: &'a Path,
    pub options: &'a ReferenceOptions,
    /// Long-running generators should stop once this is cancelled
    pub cancel: &'a CancellationToken,
}

/// Trait for producing reference documentation - allows mocking in tests
pub trait ReferenceGenerator: Send + Sync {
    fn generate(&self, request: &ReferenceRequest<'_>) -> Result<()>;
}

/// Everything a site generator needs for one run
#[derive(Debug, Clone, Copy)]
pub struct SiteRequest<'a> {
    /// Markdown sources
    pub docs_dir: &'a Path,
    /// Where the HTML site is written; created if missing
    pub site_dir: &'a Path,
    pub navigation: &'a [NavigationNode],
    pub options: &'a SiteOptions,
}

/// Summary of a finished site build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    /// Pages rendered, relative to the site directory
    pub pages: Vec<PathBuf>,
    /// Non-Markdown files copied as-is
    pub assets: Vec<PathBuf>,
    /// Problems that did not fail the build
    pub warnings: Vec<String>,
}

/// Trait for producing the HTML site - allows mocking in tests
pub trait SiteGenerator: Send + Sync {
    fn generate(&self, request: &SiteRequest<'_>) -> Result<SiteReport>;
}
