//! # Staging Area
//!
//! Documentation is never built in place. A render copies the project's
//! Markdown into a private *input root*, generates reference docs there,
//! builds the site into a private *output root*, and only then hands the
//! finished site to the caller.
//!
//! Both roots belong to a [`StagingArea`]. They are `tempfile::TempDir`s, so
//! they are deleted when the area is dropped: on success, on error, and while
//! unwinding from a panic. Nothing a render produces outlives it except what
//! the caller copies out of [`StagingArea::output_root`].
//!
//! ## Steps
//!
//! `Pipeline::stage` runs, in order:
//!
//! 1. create the two temporary directories
//! 2. copy Markdown files from the project root
//! 3. copy the docs directory and the extra media directories
//! 4. assemble navigation (or take the user's override)
//! 5. generate reference docs and fold them into the navigation
//! 6. run the site generator
//!
//! The caller's `ProjectConfig` is only read. Staging paths and the generated
//! navigation go into a working copy of the site options.
//!
//! The pipeline's [`CancellationToken`] is checked between steps. Once it is
//! cancelled the current step returns `Error::Cancelled` and the staging
//! directories are dropped like on any other error.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::TempDir;

use crate::cancel::CancellationToken;
use crate::config::{ProjectConfig, SiteOptions};
use crate::defaults::REFERENCE_DIR;
use crate::error::{Error, Result};
use crate::filesystem;
use crate::generator::{
    CommandReferenceGenerator, HtmlSiteGenerator, ReferenceGenerator, ReferenceRequest,
    SiteGenerator, SiteReport, SiteRequest,
};
use crate::navigation::{self, NavigationNode};
use crate::path::is_markdown_file;

const INPUT_PREFIX: &str = "quire-input-";
const OUTPUT_PREFIX: &str = "quire-output-";

/// The pair of temporary directories one render works in
#[derive(Debug)]
pub struct StagingArea {
    input: TempDir,
    output: TempDir,
    navigation: Vec<NavigationNode>,
    report: SiteReport,
}

impl StagingArea {
    /// Staged Markdown, including generated reference docs
    pub fn input_root(&self) -> &Path {
        self.input.path()
    }

    /// The built site
    pub fn output_root(&self) -> &Path {
        self.output.path()
    }

    /// Navigation the site was built with
    pub fn navigation(&self) -> &[NavigationNode] {
        &self.navigation
    }

    pub fn report(&self) -> &SiteReport {
        &self.report
    }

    /// Delete both directories, reporting removal failures.
    ///
    /// Dropping the area also deletes them but ignores errors.
    pub fn close(self) -> Result<()> {
        let StagingArea { input, output, .. } = self;
        let input_result = input.close();
        output.close()?;
        input_result?;
        Ok(())
    }
}

/// The render pipeline and the generators it drives
pub struct Pipeline {
    reference: Box<dyn ReferenceGenerator>,
    site: Box<dyn SiteGenerator>,
    staging_parent: Option<PathBuf>,
    cancel: CancellationToken,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new(
            Box::new(CommandReferenceGenerator),
            Box::new(HtmlSiteGenerator),
        )
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("staging_parent", &self.staging_parent)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(reference: Box<dyn ReferenceGenerator>, site: Box<dyn SiteGenerator>) -> Self {
        Pipeline {
            reference,
            site,
            staging_parent: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between steps once `cancel` is cancelled
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Create staging directories inside `parent` instead of the system temp dir
    pub fn with_staging_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.staging_parent = Some(parent.into());
        self
    }

    fn temp_dir(&self, prefix: &str) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        let created = match &self.staging_parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };
        created.map_err(|e| Error::Staging {
            message: format!("Failed to create staging directory: {}", e),
        })
    }

    /// Build the documentation for `config` into a fresh staging area.
    pub fn stage(&self, config: &ProjectConfig) -> Result<StagingArea> {
        let input = self.temp_dir(INPUT_PREFIX)?;
        let output = self.temp_dir(OUTPUT_PREFIX)?;
        debug!(
            "Staging in '{}' and '{}'",
            input.path().display(),
            output.path().display()
        );

        let navigation = self.prepare_input(config, input.path())?;
        self.cancel.check()?;

        let site = working_site_options(config, input.path(), output.path(), &navigation);
        let docs_dir = site.docs_dir.clone().unwrap_or_else(|| input.path().to_path_buf());
        let site_dir = site.site_dir.clone().unwrap_or_else(|| output.path().to_path_buf());
        let site_navigation = site.nav.as_deref().unwrap_or(&navigation);

        info!("Rendering the site from Markdown");
        let report = self.site.generate(&SiteRequest {
            docs_dir: &docs_dir,
            site_dir: &site_dir,
            navigation: site_navigation,
            options: &site,
        })?;
        self.cancel.check()?;

        Ok(StagingArea {
            input,
            output,
            navigation,
            report,
        })
    }

    /// Navigation a render of `config` would use, without building the site.
    ///
    /// Reference docs are still generated when enabled, since they contribute
    /// to the tree.
    pub fn navigation(&self, config: &ProjectConfig) -> Result<Vec<NavigationNode>> {
        let input = self.temp_dir(INPUT_PREFIX)?;
        let navigation = self.prepare_input(config, input.path())?;
        input.close()?;
        Ok(navigation)
    }

    /// Copy sources into `input_root`, generate reference docs and return the navigation
    fn prepare_input(
        &self,
        config: &ProjectConfig,
        input_root: &Path,
    ) -> Result<Vec<NavigationNode>> {
        self.cancel.check()?;
        info!("Copying source documentation to the staging area");
        copy_sources(config, input_root)?;
        self.cancel.check()?;

        let mut navigation = navigation::assemble(input_root, config)?;
        let overridden = config.navigation_override().is_some();
        if overridden {
            navigation::ensure_index_page(input_root, &navigation)?;
        }

        if config.include_reference_docs {
            let reference_dir = input_root.join(
                config
                    .reference
                    .output_dir
                    .as_deref()
                    .unwrap_or(Path::new(REFERENCE_DIR)),
            );
            info!("Generating reference documentation");
            self.reference.generate(&ReferenceRequest {
                directory: &config.directory,
                modules: &config.modules,
                output_dir: &reference_dir,
                options: &config.reference,
                cancel: &self.cancel,
            })?;
            self.cancel.check()?;

            if overridden {
                debug!("Navigation is overridden, not adding a Reference section");
            } else if let Some(branch) =
                navigation::reference_branch(&reference_dir, input_root, &config.labels)?
            {
                navigation.push(branch);
            }
        }

        Ok(navigation)
    }

    /// Stage `config`, run `f` against the staging area, then clean up.
    ///
    /// Errors from staging or from `f` are returned after both temporary
    /// directories have been removed.
    pub fn with_staged_documentation<T, F>(&self, config: &ProjectConfig, f: F) -> Result<T>
    where
        F: FnOnce(&StagingArea) -> Result<T>,
    {
        let area = self.stage(config)?;
        let result = f(&area);
        let closed = area.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}

/// Copy root-level Markdown plus the docs and media directories into `input_root`
fn copy_sources(config: &ProjectConfig, input_root: &Path) -> Result<()> {
    let mut entries = fs::read_dir(&config.directory)?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_file() && is_markdown_file(&path) {
            filesystem::copy_file(&path, &input_root.join(entry.file_name()))?;
        }
    }

    for directory in std::iter::once(&config.docs_dir).chain(&config.extra_dirs) {
        let source = config.directory.join(directory);
        if !source.is_dir() {
            debug!("Skipping '{}': not a directory", source.display());
            continue;
        }
        let copied = filesystem::copy_tree(&source, &input_root.join(directory))?;
        debug!("Copied {} files from '{}'", copied, source.display());
    }

    Ok(())
}

/// Site options for this render: `docs_dir`, `site_dir` and `nav` are filled in
/// only where the configuration leaves them unset.
fn working_site_options(
    config: &ProjectConfig,
    input_root: &Path,
    output_root: &Path,
    navigation: &[NavigationNode],
) -> SiteOptions {
    let mut site = config.site.clone();
    site.docs_dir = Some(match site.docs_dir.take() {
        Some(dir) => config.directory.join(dir),
        None => input_root.to_path_buf(),
    });
    site.site_dir = Some(match site.site_dir.take() {
        Some(dir) => config.directory.join(dir),
        None => output_root.to_path_buf(),
    });
    if site.nav.is_none() {
        site.nav = Some(navigation.to_vec());
    }
    site
}
