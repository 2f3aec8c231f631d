//! Placing a finished site at its destination
//!
//! [`Pipeline::render`] is the one-shot entry point: it enforces the
//! overwrite policy, stages the documentation and copies the built site to
//! `config.output_dir`. [`publish_atomically`] is the variant watch mode uses
//! to replace a live site without ever exposing a half-written one.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::filesystem;
use crate::navigation::NavigationNode;
use crate::staging::Pipeline;

/// What a successful render produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub output_dir: PathBuf,
    pub pages: Vec<PathBuf>,
    pub assets: Vec<PathBuf>,
    pub navigation: Vec<NavigationNode>,
}

/// Render `config` with the built-in generators.
pub fn render(config: &ProjectConfig, overwrite: bool) -> Result<RenderReport> {
    Pipeline::default().render(config, overwrite)
}

impl Pipeline {
    /// Build the site for `config` and copy it to `config.output_dir`.
    ///
    /// An existing destination is an error unless `overwrite` is set, in
    /// which case it is removed before building.
    pub fn render(&self, config: &ProjectConfig, overwrite: bool) -> Result<RenderReport> {
        let destination = &config.output_dir;
        if destination.exists() {
            if !overwrite {
                return Err(Error::DocumentationAlreadyExists {
                    directory: destination.clone(),
                });
            }
            info!("Removing existing documentation in '{}'", destination.display());
            filesystem::remove_all(destination)?;
        }

        self.with_staged_documentation(config, |area| {
            self.cancellation().check()?;
            info!("Copying the site to '{}'", destination.display());
            let copied = filesystem::copy_tree(area.output_root(), destination)
                .and_then(|_| self.cancellation().check());
            if let Err(e) = copied {
                if let Err(cleanup) = filesystem::remove_all(destination) {
                    warn!(
                        "Failed to remove partial output '{}': {}",
                        destination.display(),
                        cleanup
                    );
                }
                return Err(e);
            }

            Ok(RenderReport {
                output_dir: destination.clone(),
                pages: area.report().pages.clone(),
                assets: area.report().assets.clone(),
                navigation: area.navigation().to_vec(),
            })
        })
    }

    /// Build the site for `config` and swap it into `config.output_dir` atomically.
    pub fn publish(&self, config: &ProjectConfig) -> Result<RenderReport> {
        self.with_staged_documentation(config, |area| {
            self.cancellation().check()?;
            publish_atomically(area.output_root(), &config.output_dir)?;
            Ok(RenderReport {
                output_dir: config.output_dir.clone(),
                pages: area.report().pages.clone(),
                assets: area.report().assets.clone(),
                navigation: area.navigation().to_vec(),
            })
        })
    }
}

/// Replace `destination` with a copy of `staged_site`.
///
/// The copy is made in a hidden sibling directory first. The old tree is then
/// renamed aside and the new one renamed into place, so `destination` is never
/// partially written. Between the two renames it is briefly absent. If the
/// copy fails the old tree is left untouched.
pub fn publish_atomically(staged_site: &Path, destination: &Path) -> Result<()> {
    let parent = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    let name = destination
        .file_name()
        .ok_or_else(|| Error::Path {
            message: format!("'{}' has no file name", destination.display()),
        })?
        .to_string_lossy()
        .into_owned();

    let incoming = tempfile::Builder::new()
        .prefix(&format!(".{}-incoming-", name))
        .tempdir_in(parent)?;
    let fresh = incoming.path().join(&name);
    filesystem::copy_tree(staged_site, &fresh)?;

    let previous = if destination.exists() {
        let aside = incoming.path().join(format!("{}-previous", name));
        fs::rename(destination, &aside)?;
        Some(aside)
    } else {
        None
    };

    if let Err(e) = fs::rename(&fresh, destination) {
        if let Some(aside) = &previous {
            if let Err(restore) = fs::rename(aside, destination) {
                warn!("Failed to restore '{}': {}", destination.display(), restore);
            }
        }
        return Err(e.into());
    }

    debug!("Published '{}'", destination.display());
    incoming.close()?;
    Ok(())
}
