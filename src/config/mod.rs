//! Configuration management
//!
//! This module handles loading and parsing configuration for the Inkpress
//! blog backend. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Object storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// LLM generation configuration
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin ("*" allows any origin)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/inkpress.db".to_string()
}

/// Object storage configuration
///
/// Document bodies and per-owner blog indexes are kept in an object store
/// selected here: an in-memory map (tests, ephemeral deployments) or a
/// directory on the local filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage driver (memory or fs)
    #[serde(default)]
    pub driver: StorageDriver,
    /// Root directory for the fs driver
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: StorageDriver::default(),
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/objects")
}

/// Object storage driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageDriver {
    /// Local filesystem (default)
    #[default]
    Fs,
    /// In-memory map
    Memory,
}

/// LLM generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat-completion endpoint (OpenAI-compatible)
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,
    /// API key; usually supplied via INKPRESS_LLM_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name sent with every completion request
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    /// Cost per million input tokens, in USD
    #[serde(default = "default_input_rate")]
    pub input_cost_per_mtok: f64,
    /// Cost per million output tokens, in USD
    #[serde(default = "default_output_rate")]
    pub output_cost_per_mtok: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key: None,
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
            input_cost_per_mtok: default_input_rate(),
            output_cost_per_mtok: default_output_rate(),
        }
    }
}

fn default_llm_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_input_rate() -> f64 {
    0.05
}

fn default_output_rate() -> f64 {
    0.08
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - INKPRESS_SERVER_HOST
    /// - INKPRESS_SERVER_PORT
    /// - INKPRESS_SERVER_CORS_ORIGIN
    /// - INKPRESS_DATABASE_URL
    /// - INKPRESS_STORAGE_DRIVER
    /// - INKPRESS_STORAGE_PATH
    /// - INKPRESS_LLM_API_URL
    /// - INKPRESS_LLM_API_KEY
    /// - INKPRESS_LLM_MODEL
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("INKPRESS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("INKPRESS_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("INKPRESS_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("INKPRESS_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(driver) = std::env::var("INKPRESS_STORAGE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "fs" => self.storage.driver = StorageDriver::Fs,
                "memory" => self.storage.driver = StorageDriver::Memory,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(path) = std::env::var("INKPRESS_STORAGE_PATH") {
            self.storage.path = PathBuf::from(path);
        }

        if let Ok(api_url) = std::env::var("INKPRESS_LLM_API_URL") {
            self.llm.api_url = api_url;
        }
        if let Ok(api_key) = std::env::var("INKPRESS_LLM_API_KEY") {
            self.llm.api_key = Some(api_key);
        }
        if let Ok(model) = std::env::var("INKPRESS_LLM_MODEL") {
            self.llm.model = model;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
