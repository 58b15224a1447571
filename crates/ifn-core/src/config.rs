use crate::error::{IfnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_AUTH_URL: &str = "http://localhost:4000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_FOCUS_ZOOM: f64 = 14.0;
pub const DEFAULT_ANIMATION_MS: u64 = 1500;
const MAX_ZOOM: f64 = 22.0;

/// Layered configuration for the console
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Base URL of the conglomerado service
    pub api_url: ConfigValue<String>,
    /// Base URL of the user directory service
    pub auth_url: ConfigValue<String>,
    pub request_timeout_secs: ConfigValue<u64>,
    /// Zoom level used when focusing a selected unit
    pub focus_zoom: ConfigValue<f64>,
    /// Nominal duration of the focus animation
    pub animation_ms: ConfigValue<u64>,
    pub access_token: ConfigValue<Option<String>>,
    pub email: ConfigValue<Option<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            api_url: ConfigValue::new(DEFAULT_API_URL.to_string(), ConfigSource::Default),
            auth_url: ConfigValue::new(DEFAULT_AUTH_URL.to_string(), ConfigSource::Default),
            request_timeout_secs: ConfigValue::new(
                DEFAULT_REQUEST_TIMEOUT_SECS,
                ConfigSource::Default,
            ),
            focus_zoom: ConfigValue::new(DEFAULT_FOCUS_ZOOM, ConfigSource::Default),
            animation_ms: ConfigValue::new(DEFAULT_ANIMATION_MS, ConfigSource::Default),
            access_token: ConfigValue::new(None, ConfigSource::Default),
            email: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| IfnError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| IfnError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(url) = file_config.api_url {
            self.api_url.update(parse_url("api_url", &url)?, ConfigSource::File);
        }

        if let Some(url) = file_config.auth_url {
            self.auth_url.update(parse_url("auth_url", &url)?, ConfigSource::File);
        }

        if let Some(timeout) = file_config.request_timeout_secs {
            self.request_timeout_secs.update(timeout, ConfigSource::File);
        }

        if let Some(zoom) = file_config.focus_zoom {
            self.focus_zoom.update(parse_zoom(&zoom.to_string())?, ConfigSource::File);
        }

        if let Some(ms) = file_config.animation_ms {
            self.animation_ms.update(ms, ConfigSource::File);
        }

        if let Some(email) = file_config.email {
            self.email.update(Some(email), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // IFN_API_URL
        if let Ok(url) = env::var("IFN_API_URL") {
            match parse_url("api_url", &url) {
                Ok(url) => self.api_url.update(url, ConfigSource::Environment),
                Err(_) => tracing::warn!("Invalid IFN_API_URL value '{}': expected http(s) URL", url),
            }
        }

        // IFN_AUTH_URL
        if let Ok(url) = env::var("IFN_AUTH_URL") {
            match parse_url("auth_url", &url) {
                Ok(url) => self.auth_url.update(url, ConfigSource::Environment),
                Err(_) => {
                    tracing::warn!("Invalid IFN_AUTH_URL value '{}': expected http(s) URL", url)
                }
            }
        }

        // IFN_REQUEST_TIMEOUT_SECS
        if let Ok(timeout_str) = env::var("IFN_REQUEST_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => {
                    self.request_timeout_secs.update(timeout, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid IFN_REQUEST_TIMEOUT_SECS value '{}': expected whole seconds",
                    timeout_str
                ),
            }
        }

        // IFN_FOCUS_ZOOM
        if let Ok(zoom_str) = env::var("IFN_FOCUS_ZOOM") {
            match parse_zoom(&zoom_str) {
                Ok(zoom) => self.focus_zoom.update(zoom, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid IFN_FOCUS_ZOOM value '{}': expected a number between 0 and 22",
                    zoom_str
                ),
            }
        }

        // IFN_ANIMATION_MS
        if let Ok(ms_str) = env::var("IFN_ANIMATION_MS") {
            match ms_str.parse::<u64>() {
                Ok(ms) => self.animation_ms.update(ms, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid IFN_ANIMATION_MS value '{}': expected milliseconds",
                    ms_str
                ),
            }
        }

        // IFN_ACCESS_TOKEN
        if let Ok(token) = env::var("IFN_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                self.access_token.update(Some(token), ConfigSource::Environment);
            }
        }

        // IFN_EMAIL
        if let Ok(email) = env::var("IFN_EMAIL") {
            self.email.update(Some(email), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(url) = overrides.api_url {
            self.api_url.update(url, ConfigSource::Cli);
        }

        if let Some(url) = overrides.auth_url {
            self.auth_url.update(url, ConfigSource::Cli);
        }

        if let Some(token) = overrides.access_token {
            self.access_token.update(Some(token), ConfigSource::Cli);
        }

        if let Some(email) = overrides.email {
            self.email.update(Some(email), ConfigSource::Cli);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.value)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_ms.value)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("api_url".to_string(), (self.api_url.value.clone(), self.api_url.source));
        map.insert("auth_url".to_string(), (self.auth_url.value.clone(), self.auth_url.source));
        map.insert(
            "request_timeout".to_string(),
            (format!("{}s", self.request_timeout_secs.value), self.request_timeout_secs.source),
        );
        map.insert(
            "focus_zoom".to_string(),
            (format!("{}", self.focus_zoom.value), self.focus_zoom.source),
        );
        map.insert(
            "animation".to_string(),
            (format!("{}ms", self.animation_ms.value), self.animation_ms.source),
        );

        let token = match self.access_token.value {
            Some(_) => "<set>".to_string(),
            None => "<unset>".to_string(),
        };
        map.insert("access_token".to_string(), (token, self.access_token.source));

        map.insert(
            "email".to_string(),
            (self.email.value.clone().unwrap_or_else(|| "<unset>".to_string()), self.email.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    api_url: Option<String>,
    auth_url: Option<String>,
    request_timeout_secs: Option<u64>,
    focus_zoom: Option<f64>,
    animation_ms: Option<u64>,
    email: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub api_url: Option<String>,
    pub auth_url: Option<String>,
    pub access_token: Option<String>,
    pub email: Option<String>,
}

/// Validate a service base URL and strip any trailing slash
pub fn parse_url(key: &str, s: &str) -> Result<String> {
    let trimmed = s.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(IfnError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("Invalid URL: {}. Use http:// or https://", s),
        })
    }
}

/// Parse a map zoom level
pub fn parse_zoom(s: &str) -> Result<f64> {
    match s.trim().parse::<f64>() {
        Ok(zoom) if (0.0..=MAX_ZOOM).contains(&zoom) => Ok(zoom),
        _ => Err(IfnError::ConfigInvalid {
            key: "focus_zoom".to_string(),
            reason: format!("Invalid zoom level: {}. Use a number between 0 and 22", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.api_url.value, DEFAULT_API_URL);
        assert_eq!(config.api_url.source, ConfigSource::Default);
        assert_eq!(config.focus_zoom.value, DEFAULT_FOCUS_ZOOM);
        assert_eq!(config.animation_duration(), Duration::from_millis(1500));
        assert!(config.access_token.value.is_none());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_url = "https://brigadas.ifn.example/"
auth_url = "https://auth.ifn.example"
request_timeout_secs = 10
focus_zoom = 12.5
animation_ms = 800
email = "revisor@ifn.example"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.api_url.value, "https://brigadas.ifn.example");
        assert_eq!(config.api_url.source, ConfigSource::File);
        assert_eq!(config.auth_url.value, "https://auth.ifn.example");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.focus_zoom.value, 12.5);
        assert_eq!(config.animation_ms.value, 800);
        assert_eq!(config.email.value.as_deref(), Some("revisor@ifn.example"));
    }

    #[test]
    fn test_file_rejects_bad_url() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"ftp://nope\"").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(IfnError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            api_url: Some("http://cli:3000".to_string()),
            access_token: Some("cli-token".to_string()),
            ..Default::default()
        });

        assert_eq!(config.api_url.value, "http://cli:3000");
        assert_eq!(config.api_url.source, ConfigSource::Cli);
        assert_eq!(config.access_token.value.as_deref(), Some("cli-token"));
        assert_eq!(config.auth_url.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_zoom() {
        assert_eq!(parse_zoom("14").unwrap(), 14.0);
        assert_eq!(parse_zoom(" 0 ").unwrap(), 0.0);
        assert!(parse_zoom("23").is_err());
        assert!(parse_zoom("close").is_err());
    }

    #[test]
    fn test_inspection_map_redacts_token() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            access_token: Some("very-secret".to_string()),
            ..Default::default()
        });

        let map = config.to_inspection_map();
        let (token, source) = &map["access_token"];
        assert_eq!(token, "<set>");
        assert_eq!(*source, ConfigSource::Cli);
        assert!(map.values().all(|(v, _)| !v.contains("very-secret")));
    }
}
