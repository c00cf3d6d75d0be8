pub mod analyze;
pub mod completion;
pub mod config;
pub mod format;
pub mod health;
pub mod metrics;
pub mod results;

use anyhow::{Context, Result};
use cpia_client::{ApiClient, ApiSettings};
use std::path::Path;

/// Resolve settings from file, environment and the `--base-url` flag
pub fn load_settings(config: Option<&Path>, base_url: Option<String>) -> Result<ApiSettings> {
    let mut settings = ApiSettings::load(config).context("Failed to load settings")?;
    settings.apply_overrides(base_url, None)?;
    settings.validate()?;

    tracing::debug!("Using API at {}", settings.base_url);
    Ok(settings)
}

pub fn build_client(settings: &ApiSettings) -> Result<ApiClient> {
    ApiClient::new(settings).context("Failed to create API client")
}
