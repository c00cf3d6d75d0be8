use crate::OutputFormat;
use anyhow::{Context, Result, bail};
use clap::Subcommand;
use cpia_client::ApiSettings;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the effective settings (file, environment and flags applied)
    Show,

    /// Print the settings file location
    Path,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Settings file in use: `--config` if given, else the per-user default
pub fn settings_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => ApiSettings::default_path()
            .context("Could not determine the configuration directory"),
    }
}

pub fn execute(
    command: ConfigCommand,
    explicit: Option<&Path>,
    base_url: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let settings = super::load_settings(explicit, base_url)?;
            show(&settings, format)?;
        }
        ConfigCommand::Path => {
            println!("{}", settings_path(explicit)?.display());
        }
        ConfigCommand::Init { force } => {
            let path = settings_path(explicit)?;
            if path.exists() && !force {
                bail!(
                    "Settings file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }

            ApiSettings::default().save_to(&path)?;
            println!("✓ Wrote default settings to {}", path.display());
        }
    }

    Ok(())
}

fn show(settings: &ApiSettings, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(settings)?),
        OutputFormat::Table => {
            println!("Setting,Value");
            println!("base_url,{}", settings.base_url);
            println!("timeout_secs,{}", settings.timeout_secs);
            println!("poll.max_attempts,{}", settings.poll.max_attempts);
            println!("poll.delay_secs,{}", settings.poll.delay_secs);
        }
        OutputFormat::Pretty => print!("{}", settings.to_toml_string()?),
    }
    Ok(())
}
