// crates/nakadi-mock/src/config.rs
// ============================================================================
// Module: Nakadi Mock Configuration
// Description: Configuration loading and validation for the mock server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration is optional: [`MockConfig::default`] binds an ephemeral
//! loopback port with auditing disabled. When loaded from TOML, the file is
//! size-limited and validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "nakadi-mock.toml";
/// Environment variable holding the configuration path.
const CONFIG_ENV_VAR: &str = "NAKADI_MOCK_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a configuration path.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address: loopback with an ephemeral port.
pub const DEFAULT_BIND: &str = "127.0.0.1:0";
/// Default maximum submission body size in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// Default number of runtime worker threads.
pub const DEFAULT_WORKERS: usize = 2;
/// Maximum number of runtime worker threads.
pub const MAX_WORKERS: usize = 64;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Nakadi mock configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MockConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl MockConfig {
    /// Loads configuration from disk.
    ///
    /// Without an explicit path, `NAKADI_MOCK_CONFIG` is consulted, then
    /// `nakadi-mock.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.audit.validate()
    }
}

/// Listener and request limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind; port 0 picks an ephemeral port.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum submission body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Runtime worker threads serving connections.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            workers: default_workers(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "workers must be between 1 and {MAX_WORKERS}"
            )));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkType {
    /// Audit events are discarded.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `path`.
    File,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkType,
    /// Log file for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkType::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkType::File, Some(path)) if path.as_os_str().is_empty() => {
                Err(ConfigError::Invalid("audit.path must be non-empty".to_string()))
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default worker count.
const fn default_workers() -> usize {
    DEFAULT_WORKERS
}
