//! # GerberKernels
//!
//! Gerber statistic engine for portfolio construction.
//!
//! The Gerber matrix is a robust alternative to the Pearson correlation
//! matrix: only co-movements that clear a volatility-scaled threshold on
//! both assets are counted, so small noisy moves and isolated outliers carry
//! little weight.
//!
//! ## Quick Start
//!
//! ```rust
//! use gerberkernels::prelude::*;
//!
//! let returns = ReturnMatrix::from_rows(&[
//!     vec![0.02, 0.01, -0.03],
//!     vec![-0.01, -0.02, 0.02],
//!     vec![0.03, 0.02, -0.01],
//!     vec![-0.02, -0.01, 0.03],
//! ])
//! .unwrap();
//!
//! let matrix = gerberkernels::compute_gerber_matrix(&returns, &GerberParams::default()).unwrap();
//! assert_eq!(matrix.get(0, 0), 1.0);
//! assert!(matrix.is_symmetric());
//! ```
//!
//! ## Configuration
//!
//! [`EngineConfig`](gerber_core::config::EngineConfig) loads parameters,
//! logging and the worker pool from a TOML/JSON file or `GERBER_*`
//! environment variables. [`init`] installs logging for a loaded config.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export core crate
pub use gerber_core as core;

// Re-export risk kernels
pub use gerber_risk as risk;

pub use gerber_risk::compute_gerber_matrix;

use gerber_core::config::EngineConfig;
use gerber_core::error::Result;
use gerber_core::observability::StructuredLogger;
use gerber_risk::GerberMatrixBuilder;

/// Prelude module for convenient imports.
///
/// ```rust
/// use gerberkernels::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use gerber_core::prelude::*;

    // Gerber kernels and data types
    pub use gerber_risk::{
        compute_gerber_matrix, CorrelationMatrix, GerberMatrixBuilder, GerberResult,
        GerberStatistic, LookbackSpec, PairCounts, ParallelScheduler, ReturnMatrix,
        ThresholdVector,
    };
    pub use gerber_risk::messages::{GerberMatrixInput, GerberMatrixOutput};
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Validate a configuration, install its logging and return a matrix builder.
///
/// Logging initialization is idempotent; a second call keeps the first
/// subscriber.
pub fn init(config: &EngineConfig) -> Result<GerberMatrixBuilder> {
    config.logging.init()?;
    let builder = GerberMatrixBuilder::from_config(config)?;

    StructuredLogger::info()
        .message("Gerber engine initialized")
        .field("service", &config.service_name)
        .field("environment", &config.environment)
        .field("execution_mode", config.runtime.execution_mode.to_string())
        .field("threads", builder.scheduler().threads())
        .field("threshold", config.gerber.threshold)
        .log();

    Ok(builder)
}
