use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the backend lives and how long a single request may take.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5055".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// Settings for the runtime config server (`nbc serve`).
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port appended when a forwarded host header carries none.
    #[serde(default = "default_api_port")]
    pub default_api_port: u16,
    /// Answer of last resort when neither the environment nor the request
    /// headers yield an API URL.
    #[serde(default = "default_fallback_api_url")]
    pub fallback_api_url: String,
    /// Environment variable holding an explicit API URL override.
    #[serde(default = "default_api_url_env")]
    pub api_url_env: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            default_api_port: default_api_port(),
            fallback_api_url: default_fallback_api_url(),
            api_url_env: default_api_url_env(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8502".to_string()
}
fn default_api_port() -> u16 {
    8899
}
fn default_fallback_api_url() -> String {
    "http://localhost:8899".to_string()
}
fn default_api_url_env() -> String {
    "API_URL".to_string()
}

impl Config {
    /// Configuration used when no config file is present.
    pub fn minimal() -> Self {
        Self {
            api: ApiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    let base = config.api.base_url.trim();
    if base.is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!("api.base_url must start with http:// or https://, got '{}'", base);
    }

    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }

    if config.server.default_api_port == 0 {
        anyhow::bail!("server.default_api_port must be > 0");
    }

    if config.server.api_url_env.trim().is_empty() {
        anyhow::bail!("server.api_url_env must not be empty");
    }

    Ok(())
}
