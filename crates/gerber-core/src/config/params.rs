//! Gerber computation parameters.

use crate::error::{GerberError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default threshold multiplier applied to each asset's standard deviation.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// How a return exactly equal to its threshold is classified.
///
/// The same rule governs both the concordant and the discordant tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryRule {
    /// `x >= t` is an up move and `x <= -t` is a down move.
    #[default]
    Inclusive,
    /// `x > t` is an up move and `x < -t` is a down move.
    Exclusive,
}

impl fmt::Display for BoundaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inclusive => write!(f, "inclusive"),
            Self::Exclusive => write!(f, "exclusive"),
        }
    }
}

impl FromStr for BoundaryRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inclusive" => Ok(Self::Inclusive),
            "exclusive" | "strict" => Ok(Self::Exclusive),
            _ => Err(format!("Invalid boundary rule: {}", s)),
        }
    }
}

/// What to do with a pair whose periods are all neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedPairPolicy {
    /// Abort the call with `GerberError::UndefinedPairStatistic`.
    #[default]
    Error,
    /// Write 0.0 for the pair and report it in the output diagnostics.
    Zero,
}

impl fmt::Display for UndefinedPairPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Zero => write!(f, "zero"),
        }
    }
}

impl FromStr for UndefinedPairPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "zero" | "0" => Ok(Self::Zero),
            _ => Err(format!("Invalid undefined pair policy: {}", s)),
        }
    }
}

/// Parameters for one Gerber matrix computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GerberParams {
    /// Lookback length for threshold estimation (0 = full history).
    pub lookback_length: usize,
    /// Take the lookback window from the start of history instead of the end.
    pub lookback_from_start: bool,
    /// Threshold multiplier (θ) applied to each asset's standard deviation.
    pub threshold: f64,
    /// Comparison rule at the threshold boundary.
    pub boundary: BoundaryRule,
    /// Handling of pairs with no concordant or discordant period.
    pub undefined_pair: UndefinedPairPolicy,
}

impl Default for GerberParams {
    fn default() -> Self {
        Self {
            lookback_length: 0,
            lookback_from_start: false,
            threshold: DEFAULT_THRESHOLD,
            boundary: BoundaryRule::Inclusive,
            undefined_pair: UndefinedPairPolicy::Error,
        }
    }
}

impl GerberParams {
    /// Create parameters with the given threshold multiplier.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Set the threshold multiplier
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the lookback window
    pub fn with_lookback(mut self, length: usize, from_start: bool) -> Self {
        self.lookback_length = length;
        self.lookback_from_start = from_start;
        self
    }

    /// Set the boundary rule
    pub fn with_boundary(mut self, boundary: BoundaryRule) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the undefined pair policy
    pub fn with_undefined_pair(mut self, policy: UndefinedPairPolicy) -> Self {
        self.undefined_pair = policy;
        self
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(GerberError::invalid_parameter(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.threshold < 0.0 {
            return Err(GerberError::invalid_parameter(format!(
                "threshold must be >= 0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
