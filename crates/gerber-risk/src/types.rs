//! Data types for Gerber statistic kernels.

use gerber_core::config::GerberParams;
use gerber_core::error::{GerberError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

// ============================================================================
// Return Matrix
// ============================================================================

/// Periods × assets matrix of returns.
///
/// Stored column-major so each asset's series is one contiguous slice.
/// Absent observations are `NaN` and are skipped by every count. Infinite
/// returns are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMatrix {
    periods: usize,
    assets: usize,
    data: Vec<f64>,
}

impl ReturnMatrix {
    /// Build from column-major data (`data[asset * periods + period]`).
    pub fn from_column_major(periods: usize, assets: usize, data: Vec<f64>) -> Result<Self> {
        let matrix = Self {
            periods,
            assets,
            data,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Build from one `Vec` per asset.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        let assets = columns.len();
        let periods = columns.first().map_or(0, Vec::len);
        if let Some((asset, col)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != periods)
        {
            return Err(GerberError::validation(format!(
                "asset {} has {} periods, expected {}",
                asset,
                col.len(),
                periods
            )));
        }

        let data = columns.into_iter().flatten().collect();
        Self::from_column_major(periods, assets, data)
    }

    /// Build from one row per period, each row holding every asset's return.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let periods = rows.len();
        let assets = rows.first().map_or(0, Vec::len);
        if let Some((period, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != assets) {
            return Err(GerberError::validation(format!(
                "period {} has {} assets, expected {}",
                period,
                row.len(),
                assets
            )));
        }

        let mut data = vec![0.0; shape_len(periods, assets)?];
        for (k, row) in rows.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                data[j * periods + k] = x;
            }
        }
        Self::from_column_major(periods, assets, data)
    }

    /// Check that the buffer length matches the declared shape and that every
    /// present return is finite.
    ///
    /// Deserialized matrices bypass the constructors, so kernels call this again.
    pub fn validate(&self) -> Result<()> {
        let expected = shape_len(self.periods, self.assets)?;
        if self.data.len() != expected {
            return Err(GerberError::validation(format!(
                "buffer holds {} values, shape {}x{} needs {}",
                self.data.len(),
                self.periods,
                self.assets,
                expected
            )));
        }

        if let Some(idx) = self.data.iter().position(|x| x.is_infinite()) {
            return Err(GerberError::validation(format!(
                "infinite return at period {}, asset {}",
                idx % self.periods,
                idx / self.periods
            )));
        }
        Ok(())
    }

    /// Number of periods (rows).
    pub fn periods(&self) -> usize {
        self.periods
    }

    /// Number of assets (columns).
    pub fn assets(&self) -> usize {
        self.assets
    }

    /// Return series for one asset.
    pub fn column(&self, asset: usize) -> &[f64] {
        &self.data[asset * self.periods..(asset + 1) * self.periods]
    }

    /// Return for one period and asset, `None` if out of range or absent.
    pub fn get(&self, period: usize, asset: usize) -> Option<f64> {
        if period >= self.periods || asset >= self.assets {
            return None;
        }
        let x = self.data[asset * self.periods + period];
        (!x.is_nan()).then_some(x)
    }

    /// Owned copy of a contiguous range of periods, every asset kept.
    pub fn rows(&self, range: Range<usize>) -> ReturnMatrix {
        let start = range.start.min(self.periods);
        let end = range.end.clamp(start, self.periods);
        let periods = end - start;

        let mut data = Vec::with_capacity(periods * self.assets);
        for asset in 0..self.assets {
            data.extend_from_slice(&self.column(asset)[start..end]);
        }

        ReturnMatrix {
            periods,
            assets: self.assets,
            data,
        }
    }
}

fn shape_len(periods: usize, assets: usize) -> Result<usize> {
    periods.checked_mul(assets).ok_or_else(|| {
        GerberError::validation(format!(
            "shape {}x{} overflows the addressable size",
            periods, assets
        ))
    })
}

// ============================================================================
// Lookback
// ============================================================================

/// Lookback window used for threshold estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LookbackSpec {
    /// Window length in periods (0 = full history).
    pub length: usize,
    /// Take the window from the start of history instead of the end.
    pub from_start: bool,
}

impl LookbackSpec {
    /// Full history.
    pub fn full() -> Self {
        Self::default()
    }

    /// The most recent `length` periods.
    pub fn last(length: usize) -> Self {
        Self {
            length,
            from_start: false,
        }
    }

    /// The first `length` periods.
    pub fn first(length: usize) -> Self {
        Self {
            length,
            from_start: true,
        }
    }
}

impl From<&GerberParams> for LookbackSpec {
    fn from(params: &GerberParams) -> Self {
        Self {
            length: params.lookback_length,
            from_start: params.lookback_from_start,
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Per-asset classification cutoffs, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdVector {
    /// Multiplier applied to each standard deviation.
    pub multiplier: f64,
    /// Sample standard deviation per asset over the lookback window.
    pub std_devs: Vec<f64>,
    /// `multiplier * std_dev` per asset.
    pub thresholds: Vec<f64>,
}

impl ThresholdVector {
    /// Number of assets.
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// True when no asset is covered.
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Cutoff for one asset.
    pub fn threshold(&self, asset: usize) -> f64 {
        self.thresholds[asset]
    }
}

// ============================================================================
// Pair Counts
// ============================================================================

/// Classification tally for one asset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PairCounts {
    /// Both assets moved past their thresholds in the same direction.
    pub concordant: u64,
    /// The assets moved past their thresholds in opposite directions.
    pub discordant: u64,
    /// At least one asset stayed inside its band.
    pub neutral: u64,
    /// At least one observation was absent.
    pub skipped: u64,
}

impl PairCounts {
    /// Periods that crossed a threshold on both assets.
    pub fn crossings(&self) -> u64 {
        self.concordant + self.discordant
    }

    /// `(pos - neg) / (pos + neg)`, `None` when no period crossed.
    pub fn statistic(&self) -> Option<f64> {
        let total = self.crossings();
        if total == 0 {
            return None;
        }
        Some((self.concordant as f64 - self.discordant as f64) / total as f64)
    }
}

// ============================================================================
// Correlation Matrix
// ============================================================================

/// Symmetric n × n Gerber matrix, row-major, unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    n_assets: usize,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Identity matrix.
    pub fn identity(n_assets: usize) -> Self {
        let mut values = vec![0.0; n_assets * n_assets];
        for i in 0..n_assets {
            values[i * n_assets + i] = 1.0;
        }
        Self { n_assets, values }
    }

    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.n_assets
    }

    /// Entry (i, j). Panics when out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n_assets + j]
    }

    /// Row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n_assets..(i + 1) * self.n_assets]
    }

    /// Row-major values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Consume into row-major values.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Write (i, j) and (j, i).
    pub(crate) fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.n_assets + j] = value;
        self.values[j * self.n_assets + i] = value;
    }

    /// Exact symmetry check.
    pub fn is_symmetric(&self) -> bool {
        let n = self.n_assets;
        (0..n).all(|i| ((i + 1)..n).all(|j| self.get(i, j).to_bits() == self.get(j, i).to_bits()))
    }

    /// Gerber covariance `G[i][j] * sd[i] * sd[j]`, row-major.
    pub fn to_covariance(&self, std_devs: &[f64]) -> Result<Vec<f64>> {
        let n = self.n_assets;
        if std_devs.len() != n {
            return Err(GerberError::validation(format!(
                "expected {} standard deviations, got {}",
                n,
                std_devs.len()
            )));
        }

        let mut cov = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                cov[i * n + j] = self.get(i, j) * std_devs[i] * std_devs[j];
            }
        }
        Ok(cov)
    }
}
