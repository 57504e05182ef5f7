//! # Gerber Core
//!
//! Core abstractions shared by the Gerber statistic engine.
//!
//! This crate provides:
//! - The engine-wide error type
//! - Kernel metadata and the batch kernel traits
//! - Computation parameters and production configuration
//! - Structured logging built on `tracing`
//! - Runtime configuration for the worker thread pool

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod kernel;
pub mod observability;
pub mod runtime;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BoundaryRule, EngineConfig, GerberParams, UndefinedPairPolicy};
    pub use crate::error::{GerberError, Result};
    pub use crate::kernel::KernelMetadata;
    pub use crate::observability::{LogConfig, LogLevel, StructuredLogger};
    pub use crate::runtime::{ExecutionMode, RuntimeConfig};
    pub use crate::traits::{BatchKernel, Kernel};
}
