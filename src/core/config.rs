//! Runtime configuration for the oracle, template root and diagram repository.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `APIFORGE_*` environment variables.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::error::{Error, Result};

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Bearer API key, wiped from memory on drop and never printed
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Error::config("API key cannot be empty"));
        }
        if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(Error::config("API key contains whitespace or control characters"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the key value (limited access)
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Settings for talking to the LLM endpoint
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: Option<ApiKey>,
    pub base_url: Url,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 4000,
            timeout_secs: 120,
            max_retries: 3,
        }
    }
}

/// Top-level runtime configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub oracle: OracleConfig,
    /// Root of on-disk templates; embedded templates are used when absent
    pub template_dir: Option<PathBuf>,
    /// SQLite file backing the diagram repository
    pub database_path: Option<PathBuf>,
}

/// On-disk shape of `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    template_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path` (or the default location if it exists),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        let file_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        if let Some(file_path) = file_path {
            debug!(path = %file_path.display(), "Loading configuration file");
            let content = std::fs::read_to_string(&file_path)
                .map_err(|e| Error::filesystem(&file_path, e))?;
            let file: FileConfig = toml::from_str(&content).map_err(|e| {
                Error::config(format!("Invalid config file {}: {e}", file_path.display()))
            })?;
            config.apply_file(file)?;
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// `~/.config/apiforge/config.toml` (platform equivalent)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("apiforge").join("config.toml"))
    }

    /// Diagram database location, falling back to the platform data directory
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("apiforge")
                .join("diagrams.db")
        })
    }

    /// Fails when no API key has been configured
    pub fn require_api_key(&self) -> Result<&ApiKey> {
        self.oracle.api_key.as_ref().ok_or_else(|| {
            Error::config("No API key configured; set APIFORGE_API_KEY or api_key in config.toml")
        })
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(key) = file.api_key {
            self.oracle.api_key = Some(ApiKey::new(key)?);
        }
        if let Some(base_url) = file.base_url {
            self.oracle.base_url = parse_base_url(&base_url)?;
        }
        if let Some(model) = file.model {
            self.oracle.model = model;
        }
        if let Some(t) = file.temperature {
            self.oracle.temperature = t;
        }
        if let Some(m) = file.max_tokens {
            self.oracle.max_tokens = m;
        }
        if let Some(t) = file.timeout_secs {
            self.oracle.timeout_secs = t;
        }
        if let Some(r) = file.max_retries {
            self.oracle.max_retries = r;
        }
        if file.template_dir.is_some() {
            self.template_dir = file.template_dir;
        }
        if file.database_path.is_some() {
            self.database_path = file.database_path;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = get("APIFORGE_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.oracle.api_key = Some(ApiKey::new(key)?);
        }
        if let Some(base_url) = get("APIFORGE_BASE_URL") {
            self.oracle.base_url = parse_base_url(&base_url)?;
        }
        if let Some(model) = get("APIFORGE_MODEL") {
            self.oracle.model = model;
        }
        if let Some(t) = get("APIFORGE_TEMPERATURE") {
            self.oracle.temperature = t
                .parse()
                .map_err(|_| Error::config(format!("Invalid APIFORGE_TEMPERATURE: {t}")))?;
        }
        if let Some(m) = get("APIFORGE_MAX_TOKENS") {
            self.oracle.max_tokens = m
                .parse()
                .map_err(|_| Error::config(format!("Invalid APIFORGE_MAX_TOKENS: {m}")))?;
        }
        if let Some(dir) = get("APIFORGE_TEMPLATE_DIR") {
            self.template_dir = Some(PathBuf::from(dir));
        }
        if let Some(db) = get("APIFORGE_DATABASE") {
            self.database_path = Some(PathBuf::from(db));
        }
        Ok(())
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| Error::config(format!("Invalid base URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}
