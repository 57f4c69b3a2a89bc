//! Configuration loading and defaults for vibecode.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;
pub const RELAY_ROUTE: &str = "/v1/agent-chat";

// === Types ===

/// Relay listener settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Resolved configuration, including defaults and environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Credential for the upstream inference gateway.
    pub api_key: Option<String>,
    pub gateway_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Relay endpoint used by the REPL.
    pub relay_url: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
}

// === Config Loading ===

impl Config {
    /// Load configuration from disk and merge with environment overrides.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.or_else(default_config_path);
        let mut config = match path.as_deref() {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Config::default(),
        };
        apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Validate that configured values are usable.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref key) = self.api_key
            && key.trim().is_empty()
        {
            anyhow::bail!("api_key cannot be empty string");
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            anyhow::bail!("Invalid temperature {temperature}: expected a value between 0.0 and 2.0.");
        }
        if self.max_tokens == Some(0) {
            anyhow::bail!("max_tokens must be greater than 0");
        }
        if let Some(port) = self.server.port
            && port == 0
        {
            anyhow::bail!("server.port must be > 0");
        }
        Ok(())
    }

    /// Gateway credential, if any. The relay refuses requests without one.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    /// Return the gateway base URL (normalized).
    #[must_use]
    pub fn gateway_url(&self) -> String {
        let base = self.gateway_url.as_deref().unwrap_or(DEFAULT_GATEWAY_URL);
        normalize_base_url(base)
    }

    #[must_use]
    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    #[must_use]
    pub fn host(&self) -> String {
        self.server
            .host
            .clone()
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    /// Relay endpoint for clients; defaults to the local relay.
    #[must_use]
    pub fn relay_url(&self) -> String {
        self.relay_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}{RELAY_ROUTE}", self.host(), self.port()))
    }
}

/// Default config location: `~/.vibecode/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".vibecode").join("config.toml"))
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var("VIBECODE_API_KEY") {
        config.api_key = Some(value);
    }
    if let Ok(value) = std::env::var("VIBECODE_GATEWAY_URL") {
        config.gateway_url = Some(value);
    }
    if let Ok(value) = std::env::var("VIBECODE_MODEL") {
        config.model = Some(value);
    }
    if let Ok(value) = std::env::var("VIBECODE_RELAY_URL") {
        config.relay_url = Some(value);
    }
}

fn normalize_base_url(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::default();
        assert_eq!(config.gateway_url(), DEFAULT_GATEWAY_URL);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(config.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(config.relay_url(), "http://127.0.0.1:8787/v1/agent-chat");
        assert!(config.api_key().is_none());
    }

    #[test]
    fn parses_toml_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"
api_key = "sk-test"
gateway_url = "http://localhost:9000/v1/"
model = "test-model"
temperature = 0.2
max_tokens = 64

[server]
host = "0.0.0.0"
port = 9999
"#
        )?;
        let config = Config::from_file(file.path())?;
        config.validate()?;
        assert_eq!(config.api_key().as_deref(), Some("sk-test"));
        assert_eq!(config.gateway_url(), "http://localhost:9000/v1");
        assert_eq!(config.model(), "test-model");
        assert_eq!(config.max_tokens(), 64);
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), 9999);
        assert_eq!(config.relay_url(), "http://0.0.0.0:9999/v1/agent-chat");
        Ok(())
    }

    #[test]
    fn validate_rejects_bad_values() {
        let blank_key = Config {
            api_key: Some("  ".to_string()),
            ..Config::default()
        };
        assert!(blank_key.validate().is_err());

        let hot = Config {
            temperature: Some(3.5),
            ..Config::default()
        };
        assert!(hot.validate().is_err());

        let no_tokens = Config {
            max_tokens: Some(0),
            ..Config::default()
        };
        assert!(no_tokens.validate().is_err());
    }

    #[test]
    fn malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "temperature = \"warm\"").expect("write");
        let err = Config::from_file(file.path()).expect_err("should fail");
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
