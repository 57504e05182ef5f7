//! Integration tests for GerberKernels
//!
//! These tests drive the engine end to end through the public API.

use gerberkernels::core::config::{BoundaryRule, EngineConfig, GerberParams, UndefinedPairPolicy};
use gerberkernels::core::error::GerberError;
use gerberkernels::core::runtime::{ExecutionMode, RuntimeConfig};
use gerberkernels::core::traits::{BatchKernel, Kernel};
use gerberkernels::prelude::{
    GerberMatrixBuilder, GerberMatrixInput, GerberStatistic, ParallelScheduler, ReturnMatrix,
};
use std::collections::HashMap;

/// Deterministic returns with two sectors driven by a shared market factor.
fn sector_returns(periods: usize, assets: usize, seed: u64) -> ReturnMatrix {
    let mut state = seed;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state as f64 / u64::MAX as f64) - 0.5
    };

    let market: Vec<f64> = (0..periods).map(|_| next() * 0.02).collect();
    let sector: Vec<f64> = (0..periods).map(|_| next() * 0.02).collect();

    let columns = (0..assets)
        .map(|a| {
            let sign = if a % 2 == 0 { 1.0 } else { -1.0 };
            (0..periods)
                .map(|k| market[k] + sign * sector[k] + next() * 0.005)
                .collect()
        })
        .collect();
    ReturnMatrix::from_columns(columns).unwrap()
}

fn lenient() -> GerberParams {
    GerberParams::default().with_undefined_pair(UndefinedPairPolicy::Zero)
}

// ============================================================================
// Matrix Properties
// ============================================================================

#[test]
fn test_matrix_is_symmetric_with_unit_diagonal() {
    let returns = sector_returns(500, 20, 7);
    let g = gerberkernels::compute_gerber_matrix(&returns, &lenient()).unwrap();

    assert_eq!(g.n_assets(), 20);
    assert!(g.is_symmetric());
    for i in 0..20 {
        assert_eq!(g.get(i, i), 1.0);
        assert!(g.row(i).iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}

#[test]
fn test_sector_structure_is_recovered() {
    let returns = sector_returns(1_000, 6, 11);
    let g = gerberkernels::compute_gerber_matrix(&returns, &lenient()).unwrap();

    // Same sector sign: market and sector add up.
    assert!(g.get(0, 2) > 0.5, "same-sector value {}", g.get(0, 2));
    // Opposite sector sign: the sector factor cancels the market factor.
    assert!(g.get(0, 1) < g.get(0, 2));
}

#[test]
fn test_repeated_calls_are_identical() {
    let returns = sector_returns(300, 10, 3);
    let a = gerberkernels::compute_gerber_matrix(&returns, &lenient()).unwrap();
    let b = gerberkernels::compute_gerber_matrix(&returns, &lenient()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_thread_count_does_not_change_result() {
    let returns = sector_returns(400, 25, 19);
    let reference = GerberMatrixBuilder::new(lenient())
        .with_scheduler(ParallelScheduler::sequential())
        .build(&returns)
        .unwrap();

    for threads in [2, 3, 8] {
        let runtime = RuntimeConfig::builder().worker_threads(threads).build().unwrap();
        let scheduler = ParallelScheduler::from_config(&runtime).unwrap();
        let result = GerberMatrixBuilder::new(lenient())
            .with_scheduler(scheduler)
            .build(&returns)
            .unwrap();

        let lhs: Vec<u64> = reference.matrix.as_slice().iter().map(|v| v.to_bits()).collect();
        let rhs: Vec<u64> = result.matrix.as_slice().iter().map(|v| v.to_bits()).collect();
        assert_eq!(lhs, rhs, "mismatch with {} threads", threads);
    }
}

#[test]
fn test_higher_threshold_never_adds_crossings() {
    let returns = sector_returns(300, 4, 23);
    let mut last = u64::MAX;
    for threshold in [0.0, 0.25, 0.5, 1.0, 2.0] {
        let builder = GerberMatrixBuilder::new(lenient().with_threshold(threshold));
        let counts = builder.pair_counts(&returns, 0, 3).unwrap();
        assert!(counts.crossings() <= last);
        last = counts.crossings();
    }
}

#[test]
fn test_exclusive_boundary_never_adds_crossings() {
    let returns = sector_returns(200, 3, 29);
    let inclusive = GerberMatrixBuilder::new(GerberParams::new(0.0));
    let exclusive =
        GerberMatrixBuilder::new(GerberParams::new(0.0).with_boundary(BoundaryRule::Exclusive));

    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        let inc = inclusive.pair_counts(&returns, i, j).unwrap();
        let exc = exclusive.pair_counts(&returns, i, j).unwrap();
        assert!(exc.crossings() <= inc.crossings());
    }
}

// ============================================================================
// Lookback Window
// ============================================================================

#[test]
fn test_lookback_changes_thresholds_not_history() {
    // Calm first half, volatile second half.
    let periods = 200;
    let column = |scale_late: f64, phase: f64| -> Vec<f64> {
        (0..periods)
            .map(|k| {
                let scale = if k < periods / 2 { 0.001 } else { scale_late };
                scale * ((k as f64 * 0.7 + phase).sin())
            })
            .collect()
    };
    let returns = ReturnMatrix::from_columns(vec![column(0.05, 0.0), column(0.04, 0.3)]).unwrap();

    let early = GerberMatrixBuilder::new(lenient().with_lookback(100, true))
        .build(&returns)
        .unwrap();
    let late = GerberMatrixBuilder::new(lenient().with_lookback(100, false))
        .build(&returns)
        .unwrap();

    assert_eq!(early.window, 0..100);
    assert_eq!(late.window, 100..200);
    assert!(early.thresholds.threshold(0) < late.thresholds.threshold(0));

    // Smaller thresholds from the calm window let more periods cross.
    let early_counts = GerberMatrixBuilder::new(lenient().with_lookback(100, true))
        .pair_counts(&returns, 0, 1)
        .unwrap();
    let late_counts = GerberMatrixBuilder::new(lenient().with_lookback(100, false))
        .pair_counts(&returns, 0, 1)
        .unwrap();
    assert!(early_counts.crossings() >= late_counts.crossings());
}

// ============================================================================
// Absent Observations
// ============================================================================

#[test]
fn test_absent_observations_are_skipped() {
    let rows = vec![
        vec![0.02, 0.03],
        vec![f64::NAN, -0.02],
        vec![-0.03, -0.01],
        vec![0.01, f64::NAN],
        vec![-0.02, -0.03],
        vec![0.03, 0.02],
    ];
    let returns = ReturnMatrix::from_rows(&rows).unwrap();
    let builder = GerberMatrixBuilder::new(GerberParams::new(0.0));

    let counts = builder.pair_counts(&returns, 0, 1).unwrap();
    assert_eq!(counts.skipped, 2);
    assert_eq!(counts.concordant, 4);

    let g = builder.build(&returns).unwrap();
    assert_eq!(g.matrix.get(0, 1), 1.0);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_kinds() {
    let returns = sector_returns(50, 3, 5);

    let err = gerberkernels::compute_gerber_matrix(&returns, &GerberParams::new(f64::INFINITY))
        .unwrap_err();
    assert!(matches!(err, GerberError::InvalidParameter(_)));

    let short = ReturnMatrix::from_rows(&[vec![0.1, 0.2, 0.3]]).unwrap();
    let err = gerberkernels::compute_gerber_matrix(&short, &GerberParams::default()).unwrap_err();
    assert!(matches!(err, GerberError::InvalidDimension { periods: 1, .. }));

    let err = ReturnMatrix::from_rows(&[vec![0.1, 0.2], vec![0.3]]).unwrap_err();
    assert!(matches!(err, GerberError::ValidationError(_)));
}

#[test]
fn test_first_undefined_pair_is_reported() {
    // Assets 1 and 2 are flat with a zero threshold; under the exclusive rule
    // a zero return never crosses it.
    let rows: Vec<Vec<f64>> = (0..10)
        .map(|k| {
            let x = if k % 2 == 0 { 0.02 } else { -0.02 };
            vec![x, 0.0, 0.0, -x]
        })
        .collect();
    let returns = ReturnMatrix::from_rows(&rows).unwrap();
    let params = GerberParams::default().with_boundary(BoundaryRule::Exclusive);

    let err = gerberkernels::compute_gerber_matrix(&returns, &params).unwrap_err();
    assert!(matches!(
        err,
        GerberError::UndefinedPairStatistic {
            asset_i: 0,
            asset_j: 1
        }
    ));

    let result = GerberMatrixBuilder::new(params.with_undefined_pair(UndefinedPairPolicy::Zero))
        .build(&returns)
        .unwrap();
    // (0,1) (0,2) (1,2) (1,3) (2,3) have no crossings; (0,3) is fully discordant.
    assert_eq!(result.undefined_pairs, 5);
    assert_eq!(result.matrix.get(0, 3), -1.0);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_from_env_lookup_drives_builder() {
    let env: HashMap<&str, &str> = [
        ("GERBER_THRESHOLD", "0.75"),
        ("GERBER_LOOKBACK", "60"),
        ("GERBER_UNDEFINED_PAIR", "zero"),
        ("GERBER_EXECUTION_MODE", "sequential"),
    ]
    .into_iter()
    .collect();

    let config = EngineConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
    assert_eq!(config.runtime.execution_mode, ExecutionMode::Sequential);

    let builder = GerberMatrixBuilder::from_config(&config).unwrap();
    assert_eq!(builder.params().threshold, 0.75);
    assert_eq!(builder.scheduler().threads(), 1);

    let result = builder.build(&sector_returns(100, 4, 31)).unwrap();
    assert_eq!(result.window, 40..100);
    assert_eq!(result.thresholds.multiplier, 0.75);
}

#[test]
fn test_config_file_round_trip_drives_init() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gerber.toml");

    let config = EngineConfig::testing().with_gerber(lenient().with_threshold(0.3));
    config.to_file(&path).unwrap();

    let loaded = EngineConfig::from_file(&path).unwrap();
    let builder = gerberkernels::init(&loaded).unwrap();
    assert_eq!(builder.params().threshold, 0.3);

    let g = builder.build(&sector_returns(120, 5, 37)).unwrap();
    assert!(g.matrix.is_symmetric());
}

// ============================================================================
// Batch Kernel
// ============================================================================

#[tokio::test]
async fn test_kernel_execute() {
    let kernel = GerberStatistic::new();
    assert_eq!(kernel.metadata().id, "risk/gerber-statistic");

    let returns = sector_returns(250, 8, 41);
    let expected = gerberkernels::compute_gerber_matrix(&returns, &lenient()).unwrap();

    let output = kernel
        .execute(GerberMatrixInput::new(returns, lenient()))
        .await
        .unwrap();
    assert_eq!(output.matrix, expected);
    assert_eq!(output.thresholds.len(), 8);
}

#[tokio::test]
async fn test_kernel_execute_with_timeout() {
    let kernel = GerberStatistic::with_scheduler(ParallelScheduler::sequential());
    let input = GerberMatrixInput::new(sector_returns(100, 4, 43), lenient());

    let output = kernel
        .execute_with_timeout(input, std::time::Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(output.matrix.n_assets(), 4);
}

#[tokio::test]
async fn test_kernel_rejects_malformed_input() {
    let kernel = GerberStatistic::new();
    let json = r#"{"returns":{"periods":3,"assets":2,"data":[0.1,0.2]}}"#;
    let input: GerberMatrixInput = serde_json::from_str(json).unwrap();

    let err = kernel.execute(input).await.unwrap_err();
    assert!(matches!(err, GerberError::ValidationError(_)));
}
