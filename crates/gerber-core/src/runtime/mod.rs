//! Runtime Configuration
//!
//! The engine's only runtime resource is a CPU worker pool. This module
//! decides how many workers exist and whether the pair loop runs on them at all.

pub mod config;

pub use config::{ExecutionMode, RuntimeConfig, RuntimeConfigBuilder};

/// Environment variable overriding the worker count
pub const ENV_WORKER_THREADS: &str = "GERBER_WORKER_THREADS";

/// Environment variable overriding the execution mode
pub const ENV_EXECUTION_MODE: &str = "GERBER_EXECUTION_MODE";
