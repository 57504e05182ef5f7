//! Lookback window selection.
//!
//! The window only feeds threshold estimation. Pair counting always scans
//! the full history.
//!
//! One rule applies to both directions: a window collapses to the full range
//! only when its length is 0 or at least the number of periods. A window of
//! `periods - 1` therefore always drops exactly one period.

use crate::types::LookbackSpec;
use std::ops::Range;

/// Row range `[begin, end)` used for threshold estimation.
pub fn select_window(periods: usize, lookback: &LookbackSpec) -> Range<usize> {
    let length = lookback.length;
    if length == 0 || length >= periods {
        return 0..periods;
    }

    if lookback.from_start {
        0..length
    } else {
        (periods - length)..periods
    }
}
