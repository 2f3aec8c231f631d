//! Render command implementation
//!
//! The render command runs the full pipeline once:
//! 1. Load and validate the project configuration
//! 2. Stage the project's Markdown and media in temporary directories
//! 3. Generate reference documentation (if enabled)
//! 4. Build the HTML site
//! 5. Copy the site to the output directory

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use quire::output::{emoji, highlight, OutputConfig};
use quire::staging::Pipeline;

use super::{interrupt_token, ProjectArgs};

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Replace an existing output directory
    #[arg(long)]
    pub overwrite: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

fn spinner(output: &OutputConfig) -> ProgressBar {
    if !output.use_color {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]));
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Execute the render command
pub fn execute(args: RenderArgs, output: &OutputConfig) -> Result<()> {
    let start_time = Instant::now();
    let pipeline = Pipeline::default().with_cancellation(interrupt_token()?);
    let config = args.project.load()?;

    if !args.quiet {
        println!(
            "{} Rendering documentation for {}",
            emoji(output, "📚", "[RENDER]"),
            config.directory.display()
        );
    }

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        spinner(output)
    };
    progress.set_message("Building site");

    let result = pipeline.render(&config, args.overwrite);
    progress.finish_and_clear();
    let report = result?;

    if !args.quiet {
        println!(
            "{} Rendered {} pages and {} assets into {} in {:.2?}",
            emoji(output, "✅", "[OK]"),
            report.pages.len(),
            report.assets.len(),
            highlight(output, &report.output_dir.display().to_string()),
            start_time.elapsed()
        );
    }

    Ok(())
}
