//! # Config Command Implementation
//!
//! Prints the effective configuration after every layer (defaults, manifest
//! metadata, the quire section and command-line overrides) has been applied.
//! Useful for checking what a render will actually do.
//!
//! This command is read-only.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use quire::config::ProjectConfig;

use super::ProjectArgs;

/// Output formats for the effective configuration
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
    Yaml,
}

/// Print the effective project configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
    pub format: ConfigFormat,
}

/// Serialize a configuration in the requested format
pub fn format_config(config: &ProjectConfig, format: ConfigFormat) -> Result<String> {
    let text = match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).context("Failed to serialize as TOML")?,
        ConfigFormat::Json => {
            serde_json::to_string_pretty(config).context("Failed to serialize as JSON")?
        }
        ConfigFormat::Yaml => serde_yaml::to_string(config).context("Failed to serialize as YAML")?,
    };
    Ok(text)
}

/// Execute the `config` command.
pub fn execute(args: ConfigArgs) -> Result<()> {
    let config = args.project.load()?;
    let text = format_config(&config, args.format)?;
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}
