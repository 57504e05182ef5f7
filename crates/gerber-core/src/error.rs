//! Error types for the Gerber statistic engine.

use thiserror::Error;

/// Result type alias using `GerberError`.
pub type Result<T> = std::result::Result<T, GerberError>;

/// Errors that can occur while computing a Gerber matrix.
#[derive(Debug, Error)]
pub enum GerberError {
    /// The return matrix has fewer than two periods or no assets.
    #[error("Invalid dimension: {periods} periods x {assets} assets (need at least 2 x 1)")]
    InvalidDimension {
        /// Number of periods (rows).
        periods: usize,
        /// Number of assets (columns).
        assets: usize,
    },

    /// An asset has too few observations in the lookback window for a standard deviation.
    #[error("Degenerate window for asset {asset}: {count} present observation(s), need at least 2")]
    DegenerateWindow {
        /// Asset (column) index.
        asset: usize,
        /// Present observations in the window.
        count: usize,
    },

    /// No period crossed either threshold for this pair.
    #[error("Undefined Gerber statistic for pair ({asset_i}, {asset_j}): no concordant or discordant periods")]
    UndefinedPairStatistic {
        /// First asset index.
        asset_i: usize,
        /// Second asset index.
        asset_j: usize,
    },

    /// A computation parameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Timeout waiting for a kernel to finish.
    #[error("Timeout waiting for response after {0:?}")]
    Timeout(std::time::Duration),

    /// The worker thread pool could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GerberError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        GerberError::ValidationError(msg.into())
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        GerberError::InvalidParameter(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        GerberError::InternalError(msg.into())
    }

    /// Returns true if the error was caused by the caller's input or parameters.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GerberError::InvalidDimension { .. }
                | GerberError::DegenerateWindow { .. }
                | GerberError::UndefinedPairStatistic { .. }
                | GerberError::InvalidParameter(_)
                | GerberError::ValidationError(_)
        )
    }

    /// Returns true if retrying the same call could succeed.
    ///
    /// The computation is pure, so only a timeout qualifies.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GerberError::Timeout(_))
    }
}

impl From<rayon::ThreadPoolBuildError> for GerberError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        GerberError::ThreadPool(err.to_string())
    }
}
