//! Runtime configuration for the worker pool.
//!
//! Supports:
//! - Programmatic configuration via builders
//! - Environment variable overrides
//! - File-based configuration through [`crate::config::EngineConfig`]

use crate::error::{GerberError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the pair loop is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run every pair on the calling thread.
    Sequential,
    /// Split output rows across a rayon pool.
    #[default]
    Parallel,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "serial" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" => Ok(Self::Parallel),
            _ => Err(format!("Invalid execution mode: {}", s)),
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Worker thread count (0 = auto-detect)
    pub worker_threads: usize,
    /// Sequential or parallel pair loop
    pub execution_mode: ExecutionMode,
    /// Prefix for worker thread names
    pub thread_name_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl RuntimeConfig {
    /// Development configuration - parallel on all cores
    pub fn development() -> Self {
        Self {
            worker_threads: 0,
            execution_mode: ExecutionMode::Parallel,
            thread_name_prefix: "gerber-worker".to_string(),
        }
    }

    /// Production configuration - parallel on all cores
    pub fn production() -> Self {
        Self::development()
    }

    /// Testing configuration - deterministic single-threaded behavior
    pub fn testing() -> Self {
        Self {
            worker_threads: 1,
            execution_mode: ExecutionMode::Sequential,
            ..Self::development()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (environment or test map).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(val) = lookup(super::ENV_WORKER_THREADS) {
            self.worker_threads = val.trim().parse().map_err(|_| {
                GerberError::ConfigError(format!(
                    "{} must be a non-negative integer, got {:?}",
                    super::ENV_WORKER_THREADS,
                    val
                ))
            })?;
        }
        if let Some(val) = lookup(super::ENV_EXECUTION_MODE) {
            self.execution_mode = val.trim().parse().map_err(GerberError::ConfigError)?;
        }

        Ok(self)
    }

    /// Create a builder for this configuration
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }

    /// Number of workers the pair loop will actually run on.
    ///
    /// `worker_threads = 0` means rayon's global pool, which honours `RAYON_NUM_THREADS`.
    pub fn effective_threads(&self) -> usize {
        match (self.execution_mode, self.worker_threads) {
            (ExecutionMode::Sequential, _) => 1,
            (ExecutionMode::Parallel, 0) => rayon::current_num_threads(),
            (ExecutionMode::Parallel, n) => n,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.thread_name_prefix.is_empty() {
            return Err(GerberError::ConfigError(
                "thread_name_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a dedicated rayon pool sized by this configuration.
    pub fn build_pool(&self) -> Result<rayon::ThreadPool> {
        self.validate()?;
        let prefix = self.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.effective_threads())
            .thread_name(move |i| format!("{}-{}", prefix, i))
            .build()?;
        Ok(pool)
    }
}

/// Builder for RuntimeConfig
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfigBuilder {
    config: RuntimeConfig,
}

impl RuntimeConfigBuilder {
    /// Set worker thread count
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set execution mode
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.config.execution_mode = mode;
        self
    }

    /// Set the worker thread name prefix
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RuntimeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
