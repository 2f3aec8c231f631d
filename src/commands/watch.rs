//! Watch command implementation
//!
//! Builds the site once, then keeps watching the project directory and
//! rebuilds on every change. Each rebuild replaces the output directory
//! atomically, so a static file server pointed at it never sees a partial
//! site. Ctrl-C stops watching; a rebuild in progress is abandoned and its
//! staging directories are removed.

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use quire::output::{emoji, OutputConfig};
use quire::staging::Pipeline;
use quire::watch::WatchSession;

use super::{interrupt_token, ProjectArgs};

/// Arguments for the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Quiet period after a change before rebuilding, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 300)]
    pub debounce_ms: u64,
}

/// Execute the watch command
pub fn execute(args: WatchArgs, output: &OutputConfig) -> Result<()> {
    let pipeline = Pipeline::default().with_cancellation(interrupt_token()?);
    let directory = args.project.project_directory()?;
    let session = WatchSession::new(
        directory.clone(),
        args.project.config_file.clone(),
        args.project.overrides()?,
    )
    .with_debounce(Duration::from_millis(args.debounce_ms));

    println!(
        "{} Watching {} (Ctrl-C to stop)",
        emoji(output, "👀", "[WATCH]"),
        directory.display()
    );

    session.run(&pipeline)?;
    Ok(())
}
