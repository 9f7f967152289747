//! *arr service (Radarr / Sonarr) connection configuration

use crate::{get_required_env, parse_env, ConfigError, ConfigResult};

/// Connection settings for one Radarr or Sonarr instance
#[derive(Debug, Clone)]
pub struct ArrConfig {
    /// Base URL of the service, without a trailing slash
    pub url: String,

    /// Service API key
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ArrConfig {
    /// Load a service configuration from `{PREFIX}_URL`, `{PREFIX}_API_KEY`
    /// and `{PREFIX}_TIMEOUT`.
    ///
    /// Returns an error if the URL or API key is missing or blank, which lets
    /// callers use `.ok()` to treat the service as unconfigured.
    pub fn from_env(prefix: &str) -> ConfigResult<Self> {
        let url_var = format!("{prefix}_URL");
        let key_var = format!("{prefix}_API_KEY");

        let url = get_required_env(&url_var)?;
        let api_key = get_required_env(&key_var)?;

        if url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                url_var,
                "URL cannot be empty".to_string(),
            ));
        }

        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                key_var,
                "API key cannot be empty".to_string(),
            ));
        }

        url::Url::parse(url.trim())
            .map_err(|e| ConfigError::InvalidUrl(url_var.clone(), e.to_string()))?;

        Ok(Self {
            url: url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            timeout_secs: parse_env(&format!("{prefix}_TIMEOUT"), 30)?,
        })
    }

    /// Create a configuration with custom URL and API key (useful for testing)
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }

    /// Get the full URL for a v3 API endpoint
    pub fn api_url(&self, path: &str) -> String {
        let base = self.url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/api/v3/{}", base, path)
    }
}
