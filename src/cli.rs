//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// quire - Build a documentation site from Markdown and API reference docs
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the project's documentation into the output directory
    Render(commands::render::RenderArgs),

    /// Render, then re-render whenever the project's documentation changes
    Watch(commands::watch::WatchArgs),

    /// Print the effective project configuration
    Config(commands::config::ConfigArgs),

    /// Print the navigation tree the site would be built with
    Nav(commands::nav::NavArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = quire::output::OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Render(args) => commands::render::execute(args, &output),
            Commands::Watch(args) => commands::watch::execute(args, &output),
            Commands::Config(args) => commands::config::execute(args),
            Commands::Nav(args) => commands::nav::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// `RUST_LOG` wins over `--log-level`
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when embedded
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
