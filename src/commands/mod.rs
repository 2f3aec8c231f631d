//! # CLI Command Implementations
//!
//! Each subcommand of the `quire` command-line tool lives in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `quire` library.
//!
//! Commands that read a project share [`ProjectArgs`] so that every command
//! resolves the project and its overrides the same way.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use quire::cancel::CancellationToken;
use quire::config::{PartialConfig, ProjectConfig};
use quire::defaults;

pub mod completions;
pub mod config;
pub mod nav;
pub mod render;
pub mod watch;

/// Options locating a project and overriding its configuration
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project root directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// File holding the quire configuration section, relative to the project
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "QUIRE_CONFIG",
        default_value = defaults::CONFIG_FILE
    )]
    pub config_file: PathBuf,

    /// Where to write the site (default: `site` inside the project)
    #[arg(short, long, value_name = "DIR", env = "QUIRE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Modules to generate reference documentation for (repeatable)
    #[arg(short, long = "modules", value_name = "MODULE", value_delimiter = ',')]
    pub modules: Vec<String>,

    /// Skip reference documentation even if the configuration enables it
    #[arg(long)]
    pub no_reference_docs: bool,
}

impl ProjectArgs {
    /// The project directory, absolute
    pub fn project_directory(&self) -> Result<PathBuf> {
        absolute(&self.directory)
    }

    /// Caller overrides built from the flags
    pub fn overrides(&self) -> Result<PartialConfig> {
        let output_dir = match &self.output_dir {
            Some(dir) => Some(absolute(dir)?),
            None => None,
        };

        Ok(PartialConfig {
            output_dir,
            modules: (!self.modules.is_empty()).then(|| self.modules.clone()),
            include_reference_docs: self.no_reference_docs.then_some(false),
            ..Default::default()
        })
    }

    /// Load the project configuration with these flags applied
    pub fn load(&self) -> Result<ProjectConfig> {
        let directory = self.project_directory()?;
        ProjectConfig::load(&directory, &self.config_file, self.overrides()?)
            .with_context(|| format!("Failed to load project in '{}'", directory.display()))
    }
}

/// A token cancelled by the first Ctrl-C; a second Ctrl-C exits immediately.
///
/// Commands that stage documentation pass it to their `Pipeline` so that an
/// interrupted render still removes its temporary directories.
pub fn interrupt_token() -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let handler = token.clone();
    ctrlc::set_handler(move || {
        if handler.is_cancelled() {
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
        handler.cancel();
    })
    .context("Failed to install the Ctrl-C handler")?;
    Ok(token)
}

/// Exit status for a run stopped by Ctrl-C (128 + SIGINT)
pub const EXIT_INTERRUPTED: u8 = 130;

/// Resolve `path` against the current directory, dropping `.` components
fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("Failed to get current directory")?
            .join(path)
    };
    Ok(joined.components().collect())
}
