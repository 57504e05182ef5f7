//! Observability
//!
//! Diagnostics for the engine go through `tracing`. This module owns the
//! subscriber setup and a small builder for kernel-scoped structured events.
//!
//! # Example
//!
//! ```rust,ignore
//! use gerber_core::observability::{LogConfig, StructuredLogger};
//!
//! LogConfig::production().init()?;
//!
//! StructuredLogger::info()
//!     .kernel("risk/gerber-statistic")
//!     .message("Matrix computed")
//!     .field("assets", 500)
//!     .log();
//! ```

pub mod logging;

pub use logging::{LogConfig, LogLevel, LogOutput, StructuredLogger};
