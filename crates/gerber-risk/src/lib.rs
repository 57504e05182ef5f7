//! # Gerber Risk Kernels
//!
//! Robust co-movement matrices for portfolio construction.
//!
//! The Gerber statistic counts, for every pair of assets, the periods in
//! which both returns moved past a volatility-scaled threshold in the same
//! direction against those in which they moved past it in opposite
//! directions. Small moves inside the band are ignored, so the result is
//! insensitive to noise and outliers.
//!
//! ## Kernels
//! - `GerberStatistic` - Gerber matrix from a return history
//!
//! ## Pipeline
//! 1. `window` - lookback range for threshold estimation
//! 2. `threshold` - per-asset sample standard deviation and cutoff
//! 3. `classifier` - concordant/discordant/neutral counts per pair
//! 4. `scheduler` - pair rows distributed over a rayon pool
//! 5. `matrix` - assembly into a symmetric matrix

#![warn(missing_docs)]

pub mod classifier;
pub mod matrix;
pub mod messages;
pub mod scheduler;
pub mod threshold;
pub mod types;
pub mod window;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::classifier::*;
    pub use crate::matrix::*;
    pub use crate::messages::*;
    pub use crate::scheduler::*;
    pub use crate::threshold::*;
    pub use crate::types::*;
    pub use crate::window::*;
}

// Re-export main kernels
pub use matrix::{compute_gerber_matrix, GerberMatrixBuilder, GerberResult, GerberStatistic};
pub use scheduler::ParallelScheduler;

// Re-export key types
pub use types::{CorrelationMatrix, LookbackSpec, PairCounts, ReturnMatrix, ThresholdVector};
