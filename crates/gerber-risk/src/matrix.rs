//! Gerber matrix construction.
//!
//! One call selects the lookback window, estimates every asset's threshold
//! once, then classifies each unordered pair over the full history. The
//! packed upper triangle is filled by the [`ParallelScheduler`] and mirrored
//! into a symmetric matrix with a unit diagonal after the join.

use crate::classifier::{classify_pair, pair_statistic};
use crate::messages::{GerberMatrixInput, GerberMatrixOutput};
use crate::scheduler::{upper_triangle_len, upper_triangle_segments, ParallelScheduler, RowSegment};
use crate::threshold::estimate_thresholds;
use crate::types::{CorrelationMatrix, LookbackSpec, PairCounts, ReturnMatrix, ThresholdVector};
use crate::window::select_window;
use async_trait::async_trait;
use gerber_core::config::{EngineConfig, GerberParams};
use gerber_core::error::{GerberError, Result};
use gerber_core::kernel::KernelMetadata;
use gerber_core::traits::{BatchKernel, Kernel};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Instant;

/// Matrix plus the intermediate quantities it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GerberResult {
    /// Symmetric Gerber matrix.
    pub matrix: CorrelationMatrix,
    /// Per-asset thresholds used for classification.
    pub thresholds: ThresholdVector,
    /// Periods used for threshold estimation.
    pub window: Range<usize>,
    /// Pairs with no crossing that were written as 0.0.
    pub undefined_pairs: usize,
}

/// Computes Gerber matrices with fixed parameters and scheduling.
#[derive(Debug, Clone, Default)]
pub struct GerberMatrixBuilder {
    params: GerberParams,
    scheduler: ParallelScheduler,
}

impl GerberMatrixBuilder {
    /// Builder running on rayon's global pool.
    pub fn new(params: GerberParams) -> Self {
        Self {
            params,
            scheduler: ParallelScheduler::global(),
        }
    }

    /// Builder configured from an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            params: config.gerber,
            scheduler: ParallelScheduler::from_config(&config.runtime)?,
        })
    }

    /// Replace the scheduler.
    pub fn with_scheduler(mut self, scheduler: ParallelScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Computation parameters.
    pub fn params(&self) -> &GerberParams {
        &self.params
    }

    /// Scheduler used for the pair loop.
    pub fn scheduler(&self) -> &ParallelScheduler {
        &self.scheduler
    }

    fn check_input(&self, returns: &ReturnMatrix) -> Result<()> {
        self.params.validate()?;
        returns.validate()?;
        if returns.periods() < 2 || returns.assets() < 1 {
            return Err(GerberError::InvalidDimension {
                periods: returns.periods(),
                assets: returns.assets(),
            });
        }
        Ok(())
    }

    /// Lookback range and thresholds for `returns`.
    pub fn thresholds(&self, returns: &ReturnMatrix) -> Result<(Range<usize>, ThresholdVector)> {
        self.check_input(returns)?;

        let window = select_window(returns.periods(), &LookbackSpec::from(&self.params));
        tracing::debug!(
            begin = window.start,
            end = window.end,
            "Selected lookback window"
        );

        let windowed = returns.rows(window.clone());
        let thresholds = estimate_thresholds(&windowed, self.params.threshold)?;
        Ok((window, thresholds))
    }

    /// Classification counts for a single pair, for diagnostics.
    pub fn pair_counts(&self, returns: &ReturnMatrix, i: usize, j: usize) -> Result<PairCounts> {
        let n = returns.assets();
        if i >= n || j >= n || i == j {
            return Err(GerberError::validation(format!(
                "pair ({}, {}) is not a distinct pair of {} assets",
                i, j, n
            )));
        }

        let (_, thresholds) = self.thresholds(returns)?;
        Ok(classify_pair(
            returns.column(i),
            returns.column(j),
            thresholds.threshold(i),
            thresholds.threshold(j),
            self.params.boundary,
        ))
    }

    /// Compute the full Gerber matrix.
    pub fn build(&self, returns: &ReturnMatrix) -> Result<GerberResult> {
        let start = Instant::now();
        let n = returns.assets();
        let span = tracing::info_span!(
            "gerber_matrix",
            assets = n,
            periods = returns.periods(),
            mode = %self.scheduler.mode()
        );
        let _enter = span.enter();

        let (window, thresholds) = self.thresholds(returns)?;
        let rule = self.params.boundary;
        let policy = self.params.undefined_pair;

        let mut packed = vec![0.0; upper_triangle_len(n)];
        let segments = upper_triangle_segments(n, &mut packed);

        let outcomes = self.scheduler.run(segments, |RowSegment { row, cells }| -> Result<usize> {
            let returns_i = returns.column(row);
            let threshold_i = thresholds.threshold(row);
            let mut undefined = 0usize;

            for (k, cell) in cells.iter_mut().enumerate() {
                let j = row + 1 + k;
                let counts = classify_pair(
                    returns_i,
                    returns.column(j),
                    threshold_i,
                    thresholds.threshold(j),
                    rule,
                );
                let outcome = pair_statistic(&counts, row, j, policy)?;
                *cell = outcome.value;
                undefined += usize::from(outcome.undefined);
            }
            Ok(undefined)
        });

        // Rows come back in order, so the first error is the first failing pair in row-major order.
        let mut undefined_pairs = 0;
        for outcome in outcomes {
            undefined_pairs += outcome?;
        }

        let mut matrix = CorrelationMatrix::identity(n);
        let mut cells = packed.into_iter();
        for i in 0..n {
            for j in (i + 1)..n {
                let value = cells
                    .next()
                    .ok_or_else(|| GerberError::internal("packed triangle exhausted"))?;
                matrix.set_symmetric(i, j, value);
            }
        }

        tracing::debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            undefined_pairs,
            "Gerber matrix complete"
        );

        Ok(GerberResult {
            matrix,
            thresholds,
            window,
            undefined_pairs,
        })
    }
}

/// Compute a Gerber matrix on rayon's global pool.
pub fn compute_gerber_matrix(
    returns: &ReturnMatrix,
    params: &GerberParams,
) -> Result<CorrelationMatrix> {
    GerberMatrixBuilder::new(*params)
        .build(returns)
        .map(|result| result.matrix)
}

// ============================================================================
// Gerber Statistic Kernel
// ============================================================================

/// Gerber statistic kernel.
///
/// Produces the robust co-movement matrix used as a correlation proxy in
/// portfolio construction. Stateless: every call recomputes thresholds.
#[derive(Debug, Clone)]
pub struct GerberStatistic {
    metadata: KernelMetadata,
    scheduler: ParallelScheduler,
}

impl Default for GerberStatistic {
    fn default() -> Self {
        Self::new()
    }
}

impl GerberStatistic {
    /// Create a new Gerber statistic kernel on rayon's global pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scheduler(ParallelScheduler::global())
    }

    /// Create with an explicit scheduler.
    #[must_use]
    pub fn with_scheduler(scheduler: ParallelScheduler) -> Self {
        Self {
            metadata: KernelMetadata::batch("risk/gerber-statistic")
                .with_description("Gerber robust co-movement matrix")
                .with_throughput(5_000_000)
                .with_latency_us(1_000.0),
            scheduler,
        }
    }

    /// Compute the Gerber matrix for `returns`.
    pub fn compute(returns: &ReturnMatrix, params: &GerberParams) -> Result<CorrelationMatrix> {
        compute_gerber_matrix(returns, params)
    }

    /// Compute the Gerber matrix with thresholds and diagnostics.
    pub fn compute_detailed(
        &self,
        returns: &ReturnMatrix,
        params: &GerberParams,
    ) -> Result<GerberResult> {
        GerberMatrixBuilder::new(*params)
            .with_scheduler(self.scheduler.clone())
            .build(returns)
    }
}

impl Kernel for GerberStatistic {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<GerberMatrixInput, GerberMatrixOutput> for GerberStatistic {
    async fn execute(&self, input: GerberMatrixInput) -> Result<GerberMatrixOutput> {
        let start = Instant::now();
        self.validate_input(&input)?;
        let result = self.compute_detailed(&input.returns, &input.params)?;
        Ok(GerberMatrixOutput {
            matrix: result.matrix,
            thresholds: result.thresholds,
            undefined_pairs: result.undefined_pairs,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &GerberMatrixInput) -> Result<()> {
        input.params.validate()?;
        input.returns.validate()
    }
}
