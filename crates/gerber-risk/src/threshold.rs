//! Per-asset threshold estimation.
//!
//! Each asset's cutoff is `multiplier * sd`, with `sd` the Bessel-corrected
//! sample standard deviation over the present observations of the window.

use crate::types::{ReturnMatrix, ThresholdVector};
use gerber_core::error::{GerberError, Result};

/// Sample standard deviation of the non-NaN values.
///
/// Returns the deviation and the number of values it was computed from.
/// Fewer than two present values is a `DegenerateWindow` for `asset`.
pub fn sample_std_dev(values: &[f64], asset: usize) -> Result<(f64, usize)> {
    let (sum, count) = values
        .iter()
        .filter(|x| !x.is_nan())
        .fold((0.0, 0usize), |(s, c), &x| (s + x, c + 1));

    if count <= 1 {
        return Err(GerberError::DegenerateWindow { asset, count });
    }

    let mean = sum / count as f64;
    let ss: f64 = values
        .iter()
        .filter(|x| !x.is_nan())
        .map(|&x| (x - mean).powi(2))
        .sum();

    let sd = (ss / (count - 1) as f64).sqrt();
    if !sd.is_finite() {
        return Err(GerberError::validation(format!(
            "standard deviation of asset {} overflows",
            asset
        )));
    }
    Ok((sd, count))
}

/// Threshold vector for every asset of the windowed matrix.
pub fn estimate_thresholds(window: &ReturnMatrix, multiplier: f64) -> Result<ThresholdVector> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(GerberError::invalid_parameter(format!(
            "threshold must be finite and >= 0, got {}",
            multiplier
        )));
    }

    let std_devs = (0..window.assets())
        .map(|asset| sample_std_dev(window.column(asset), asset).map(|(sd, _)| sd))
        .collect::<Result<Vec<f64>>>()?;

    let thresholds = std_devs.iter().map(|sd| multiplier * sd).collect();

    tracing::debug!(
        assets = window.assets(),
        window_periods = window.periods(),
        multiplier,
        "Estimated Gerber thresholds"
    );

    Ok(ThresholdVector {
        multiplier,
        std_devs,
        thresholds,
    })
}
