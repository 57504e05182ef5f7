//! Engine Configuration
//!
//! Provides unified configuration for deployments including:
//! - Gerber computation parameters
//! - Logging
//! - Worker pool runtime
//!
//! # Example
//!
//! ```rust,ignore
//! use gerber_core::config::EngineConfig;
//!
//! // Load from environment
//! let config = EngineConfig::from_env()?;
//!
//! // Or load from file
//! let config = EngineConfig::from_file("config/gerber.toml")?;
//!
//! config.logging.init()?;
//! ```

pub mod params;

pub use params::{BoundaryRule, GerberParams, UndefinedPairPolicy, DEFAULT_THRESHOLD};

use crate::error::{GerberError, Result};
use crate::observability::{LogConfig, LogLevel};
use crate::runtime::RuntimeConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Environment name
    pub environment: String,
    /// Service name
    pub service_name: String,
    /// Gerber computation parameters
    pub gerber: GerberParams,
    /// Logging configuration
    pub logging: LogConfig,
    /// Runtime configuration
    pub runtime: RuntimeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gerber: GerberParams::default(),
            logging: LogConfig::default(),
            runtime: RuntimeConfig::default(),
            environment: "development".to_string(),
            service_name: "gerberkernels".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create development configuration
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            runtime: RuntimeConfig::development(),
            environment: "development".to_string(),
            ..Default::default()
        }
    }

    /// Create production configuration
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            runtime: RuntimeConfig::production(),
            environment: "production".to_string(),
            ..Default::default()
        }
    }

    /// Create testing configuration
    pub fn testing() -> Self {
        Self {
            logging: LogConfig::default().with_level(LogLevel::Trace),
            runtime: RuntimeConfig::testing(),
            environment: "testing".to_string(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a key lookup.
    ///
    /// `GERBER_ENV` selects the preset; the remaining keys override it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("GERBER_ENV").as_deref().unwrap_or("development") {
            "production" | "prod" => Self::production(),
            "testing" | "test" => Self::testing(),
            _ => Self::development(),
        };

        if let Some(name) = lookup("GERBER_SERVICE_NAME") {
            config.service_name = name;
        }

        // Computation overrides
        if let Some(val) = lookup("GERBER_THRESHOLD") {
            config.gerber.threshold = parse_value("GERBER_THRESHOLD", &val)?;
        }
        if let Some(val) = lookup("GERBER_LOOKBACK") {
            config.gerber.lookback_length = parse_value("GERBER_LOOKBACK", &val)?;
        }
        if let Some(val) = lookup("GERBER_LOOKBACK_FROM_START") {
            config.gerber.lookback_from_start = parse_value("GERBER_LOOKBACK_FROM_START", &val)?;
        }
        if let Some(val) = lookup("GERBER_BOUNDARY") {
            config.gerber.boundary = val.trim().parse().map_err(GerberError::ConfigError)?;
        }
        if let Some(val) = lookup("GERBER_UNDEFINED_PAIR") {
            config.gerber.undefined_pair = val.trim().parse().map_err(GerberError::ConfigError)?;
        }

        // Logging overrides
        if let Some(val) = lookup("GERBER_LOG_LEVEL") {
            config.logging.level = val.trim().parse().map_err(GerberError::ConfigError)?;
        }
        if let Some(val) = lookup("GERBER_STRUCTURED_LOGGING") {
            config.logging.structured = parse_value("GERBER_STRUCTURED_LOGGING", &val)?;
        }

        config.runtime = config.runtime.with_overrides(&lookup)?;

        Ok(config)
    }

    /// Load configuration from a TOML or JSON file (chosen by extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GerberError::ConfigError(format!("Failed to read config: {}", e)))?;

        match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
            "json" => serde_json::from_str(&content)
                .map_err(|e| GerberError::ConfigError(format!("Failed to parse config: {}", e))),
            "toml" => toml::from_str(&content)
                .map_err(|e| GerberError::ConfigError(format!("Failed to parse config: {}", e))),
            other => Err(GerberError::ConfigError(format!(
                "Unsupported config format: {}",
                other
            ))),
        }
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GerberError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| GerberError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.gerber.validate()?;
        self.runtime.validate()?;

        if self.environment == "production" && self.gerber.undefined_pair == UndefinedPairPolicy::Zero
        {
            tracing::warn!(
                "Production environment maps all-neutral pairs to 0.0; degenerate pairs will not surface as errors"
            );
        }

        Ok(())
    }

    /// Set environment
    pub fn with_environment(mut self, env: impl Into<String>) -> Self {
        self.environment = env.into();
        self
    }

    /// Set computation parameters
    pub fn with_gerber(mut self, params: GerberParams) -> Self {
        self.gerber = params;
        self
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.trim()
        .parse()
        .map_err(|_| GerberError::ConfigError(format!("Invalid value for {}: {:?}", key, val)))
}
