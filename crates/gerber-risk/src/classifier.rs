//! Pairwise period classification.
//!
//! For assets `i` and `j` with thresholds `t_i` and `t_j`, each period is:
//! - concordant when both returns are past their thresholds on the same side,
//! - discordant when they are past their thresholds on opposite sides,
//! - neutral otherwise.
//!
//! Under `BoundaryRule::Inclusive` with a zero threshold a zero return is both
//! "up" and "down". Concordance is tested first, so such a period is concordant.

use crate::types::PairCounts;
use gerber_core::config::{BoundaryRule, UndefinedPairPolicy};
use gerber_core::error::{GerberError, Result};

/// Outcome of reducing one pair's counts to a matrix entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairOutcome {
    /// Value written to the matrix.
    pub value: f64,
    /// True when the pair had no crossing and the policy substituted 0.0.
    pub undefined: bool,
}

#[inline]
fn is_up(x: f64, t: f64, rule: BoundaryRule) -> bool {
    match rule {
        BoundaryRule::Inclusive => x >= t,
        BoundaryRule::Exclusive => x > t,
    }
}

#[inline]
fn is_down(x: f64, t: f64, rule: BoundaryRule) -> bool {
    match rule {
        BoundaryRule::Inclusive => x <= -t,
        BoundaryRule::Exclusive => x < -t,
    }
}

/// Count concordant, discordant, neutral and skipped periods for one pair.
///
/// `returns_i` and `returns_j` are full-history columns of equal length.
pub fn classify_pair(
    returns_i: &[f64],
    returns_j: &[f64],
    threshold_i: f64,
    threshold_j: f64,
    rule: BoundaryRule,
) -> PairCounts {
    debug_assert_eq!(returns_i.len(), returns_j.len());

    let mut counts = PairCounts::default();
    for (&xi, &xj) in returns_i.iter().zip(returns_j) {
        if xi.is_nan() || xj.is_nan() {
            counts.skipped += 1;
            continue;
        }

        let up_i = is_up(xi, threshold_i, rule);
        let down_i = is_down(xi, threshold_i, rule);
        let up_j = is_up(xj, threshold_j, rule);
        let down_j = is_down(xj, threshold_j, rule);

        if (up_i && up_j) || (down_i && down_j) {
            counts.concordant += 1;
        } else if (up_i && down_j) || (down_i && up_j) {
            counts.discordant += 1;
        } else {
            counts.neutral += 1;
        }
    }
    counts
}

/// Reduce pair counts to a matrix entry under the given policy.
pub fn pair_statistic(
    counts: &PairCounts,
    asset_i: usize,
    asset_j: usize,
    policy: UndefinedPairPolicy,
) -> Result<PairOutcome> {
    match (counts.statistic(), policy) {
        (Some(value), _) => Ok(PairOutcome {
            value,
            undefined: false,
        }),
        (None, UndefinedPairPolicy::Zero) => Ok(PairOutcome {
            value: 0.0,
            undefined: true,
        }),
        (None, UndefinedPairPolicy::Error) => {
            Err(GerberError::UndefinedPairStatistic { asset_i, asset_j })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INC: BoundaryRule = BoundaryRule::Inclusive;
    const EXC: BoundaryRule = BoundaryRule::Exclusive;

    #[test]
    fn test_all_concordant() {
        let c = classify_pair(&[1.0, 1.0, -1.0, -1.0], &[1.0, 1.0, -1.0, -1.0], 0.0, 0.0, INC);
        assert_eq!(c.concordant, 4);
        assert_eq!(c.discordant, 0);
        assert_eq!(c.statistic(), Some(1.0));
    }

    #[test]
    fn test_all_discordant() {
        let c = classify_pair(&[1.0, 1.0, -1.0, -1.0], &[-1.0, -1.0, 1.0, 1.0], 0.0, 0.0, INC);
        assert_eq!(c.discordant, 4);
        assert_eq!(c.statistic(), Some(-1.0));
    }

    #[test]
    fn test_neutral_band() {
        // 0.1 is inside the 0.5 band for asset i.
        let c = classify_pair(&[0.1, 1.0, -1.0], &[1.0, 1.0, 1.0], 0.5, 0.5, INC);
        assert_eq!(c.neutral, 1);
        assert_eq!(c.concordant, 1);
        assert_eq!(c.discordant, 1);
        assert_eq!(c.statistic(), Some(0.0));
    }

    #[test]
    fn test_boundary_value_inclusive_vs_exclusive() {
        let xi = [0.5, -0.5];
        let xj = [0.5, 0.5];

        let inc = classify_pair(&xi, &xj, 0.5, 0.5, INC);
        assert_eq!(inc.concordant, 1);
        assert_eq!(inc.discordant, 1);
        assert_eq!(inc.neutral, 0);

        let exc = classify_pair(&xi, &xj, 0.5, 0.5, EXC);
        assert_eq!(exc.crossings(), 0);
        assert_eq!(exc.neutral, 2);
    }

    #[test]
    fn test_zero_threshold_zero_returns() {
        // Inclusive: 0 >= 0 and 0 <= -0, concordance wins.
        let inc = classify_pair(&[0.0, 0.0, 0.0], &[0.0, 2.0, -2.0], 0.0, 0.0, INC);
        assert_eq!(inc.concordant, 3);
        assert_eq!(inc.discordant, 0);

        // Exclusive: a zero return never crosses a zero threshold.
        let exc = classify_pair(&[0.0, 0.0, 0.0], &[0.0, 2.0, -2.0], 0.0, 0.0, EXC);
        assert_eq!(exc.neutral, 3);
    }

    #[test]
    fn test_absent_values_skipped() {
        let c = classify_pair(
            &[1.0, f64::NAN, -1.0, 1.0],
            &[1.0, 1.0, f64::NAN, -1.0],
            0.0,
            0.0,
            INC,
        );
        assert_eq!(c.skipped, 2);
        assert_eq!(c.concordant, 1);
        assert_eq!(c.discordant, 1);
    }

    #[test]
    fn test_asymmetric_thresholds() {
        // Asset j needs a bigger move.
        let c = classify_pair(&[1.0, 1.0], &[1.0, 3.0], 0.5, 2.0, INC);
        assert_eq!(c.neutral, 1);
        assert_eq!(c.concordant, 1);
    }

    #[test]
    fn test_pair_is_order_independent() {
        let a = [0.3, -0.7, 1.2, -0.1, 0.9];
        let b = [-0.4, -0.8, 0.6, 0.2, -1.1];
        let ab = classify_pair(&a, &b, 0.2, 0.3, INC);
        let ba = classify_pair(&b, &a, 0.3, 0.2, INC);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_pair_statistic_policies() {
        let neutral = PairCounts {
            neutral: 4,
            ..Default::default()
        };

        let err = pair_statistic(&neutral, 0, 1, UndefinedPairPolicy::Error).unwrap_err();
        assert!(matches!(
            err,
            GerberError::UndefinedPairStatistic {
                asset_i: 0,
                asset_j: 1
            }
        ));

        let zero = pair_statistic(&neutral, 0, 1, UndefinedPairPolicy::Zero).unwrap();
        assert_eq!(zero.value, 0.0);
        assert!(zero.undefined);

        let defined = PairCounts {
            concordant: 1,
            ..Default::default()
        };
        let out = pair_statistic(&defined, 0, 1, UndefinedPairPolicy::Error).unwrap();
        assert_eq!(out.value, 1.0);
        assert!(!out.undefined);
    }
}
