//! Dashboard configuration loaded from an optional TOML file.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_API_ENDPOINT: &str = "http://127.0.0.1:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: u32 = 7;
const MIN_PAGE_SIZE: u32 = 1;
const MAX_PAGE_SIZE: u32 = 100;

/// Top-level configuration for the dashboard binary.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub gui: GuiConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            gui: GuiConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Returns a sanitized copy that clamps out-of-range values.
    pub fn sanitized(mut self) -> Self {
        if self.api.timeout_secs == 0 {
            self.api.timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        if self.gui.page_size < MIN_PAGE_SIZE {
            self.gui.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.gui.page_size > MAX_PAGE_SIZE {
            self.gui.page_size = MAX_PAGE_SIZE;
        }
        self
    }
}

/// Connection settings for the notas API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the notas service.
    pub endpoint: String,
    /// Optional bearer token attached to every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Transport-level request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            auth_token: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Presentation settings for the dashboard window.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GuiConfig {
    /// Number of rows requested per page.
    pub page_size: u32,
    pub theme: GuiTheme,
    /// Enables metrics recording for UI interactions.
    pub telemetry_opt_in: bool,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            theme: GuiTheme::Dark,
            telemetry_opt_in: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuiTheme {
    Light,
    Dark,
}

/// Loads the configuration from `path`. A missing file yields the defaults;
/// a malformed file is reported as an error.
pub fn load(path: &Path) -> io::Result<DashboardConfig> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let config: DashboardConfig = toml::from_str(&contents)
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
            Ok(config.sanitized())
        }
        Err(error) => {
            if error.kind() == io::ErrorKind::NotFound {
                Ok(DashboardConfig::default())
            } else {
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = DashboardConfig::default();
        assert_eq!(config.api.endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(config.gui.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.gui.theme, GuiTheme::Dark);
        assert!(!config.gui.telemetry_opt_in);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let mut config = DashboardConfig::default();
        config.api.timeout_secs = 0;
        config.gui.page_size = 0;
        let config = config.sanitized();
        assert_eq!(config.api.timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.gui.page_size, DEFAULT_PAGE_SIZE);

        let mut config = DashboardConfig::default();
        config.gui.page_size = 10_000;
        assert_eq!(config.sanitized().gui.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load(Path::new("./does-not-exist/dashboard.toml")).expect("defaults");
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let parsed: DashboardConfig =
            toml::from_str("[gui]\npage_size = 25\n").expect("parse partial config");
        let config = parsed.sanitized();
        assert_eq!(config.gui.page_size, 25);
        assert_eq!(config.api.endpoint, DEFAULT_API_ENDPOINT);
    }
}
