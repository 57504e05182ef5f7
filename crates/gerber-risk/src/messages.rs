//! Message types for Gerber statistic kernels.
//!
//! This module defines input/output types for batch execution
//! of the Gerber statistic kernel.

use crate::types::{CorrelationMatrix, ReturnMatrix, ThresholdVector};
use gerber_core::config::GerberParams;
use serde::{Deserialize, Serialize};

// ============================================================================
// Gerber Matrix Messages
// ============================================================================

/// Input for Gerber matrix computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GerberMatrixInput {
    /// Periods × assets return history.
    pub returns: ReturnMatrix,
    /// Threshold, lookback and policy parameters.
    #[serde(default)]
    pub params: GerberParams,
}

impl GerberMatrixInput {
    /// Create a new Gerber matrix input.
    pub fn new(returns: ReturnMatrix, params: GerberParams) -> Self {
        Self { returns, params }
    }
}

/// Output from Gerber matrix computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GerberMatrixOutput {
    /// The Gerber matrix.
    pub matrix: CorrelationMatrix,
    /// Thresholds used for classification.
    pub thresholds: ThresholdVector,
    /// Pairs written as 0.0 because no period crossed.
    pub undefined_pairs: usize,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}
