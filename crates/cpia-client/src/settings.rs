use crate::poll::PollOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "CPIA_API_BASE_URL";
/// Environment variable overriding the request timeout (seconds)
pub const ENV_TIMEOUT_SECS: &str = "CPIA_API_TIMEOUT_SECS";

/// Connection settings for the analysis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base address of the service, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// Per-request timeout; generous because the backend can be slow
    pub timeout_secs: u64,
    pub poll: PollSettings,
}

/// Poll loop defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll: PollSettings::default(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        let options = PollOptions::default();
        Self {
            max_attempts: options.max_attempts,
            delay_secs: options.delay.as_secs(),
        }
    }
}

impl ApiSettings {
    /// Default settings file (`<config dir>/cpia/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cpia").join("config.toml"))
    }

    /// Resolve settings: defaults, then the settings file, then the environment.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => {
                    tracing::debug!("No settings file found, using defaults");
                    Self::default()
                }
            },
        };

        settings.apply_overrides(
            std::env::var(ENV_BASE_URL).ok(),
            std::env::var(ENV_TIMEOUT_SECS).ok(),
        )?;

        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Reading settings from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply string overrides (environment or command line)
    pub fn apply_overrides(
        &mut self,
        base_url: Option<String>,
        timeout_secs: Option<String>,
    ) -> Result<()> {
        if let Some(base_url) = base_url.filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }

        if let Some(raw) = timeout_secs.filter(|v| !v.trim().is_empty()) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Config(format!("timeout must be a whole number of seconds, got '{}'", raw))
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Base URL normalized to end with `/` so relative endpoints join beneath it
    pub fn parsed_base_url(&self) -> Result<Url> {
        let mut url = Url::parse(self.base_url.trim())
            .map_err(|e| Error::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must be an http(s) address, got '{}'",
                self.base_url
            )));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            max_attempts: self.poll.max_attempts,
            delay: Duration::from_secs(self.poll.delay_secs),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize settings: {}", e)))
    }

    /// Write settings, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml_string()?)?;
        tracing::info!("Wrote settings to: {}", path.display());
        Ok(())
    }
}
