//! Sensitivity of category counts
//!
//! The bound is the spread `max - min` of the counts, floored at 1.
//! It is a heuristic: it does not bound the effect of adding or removing one patient.

use crate::filter::CategoryCounts;
use itertools::{Itertools, MinMaxResult};

/// The smallest sensitivity ever returned, the mechanism needs a positive one
pub const MIN_SENSITIVITY: u64 = 1;

pub fn sensitivity(counts: &CategoryCounts) -> u64 {
    let spread = match counts.values().minmax() {
        MinMaxResult::NoElements | MinMaxResult::OneElement(_) => 0,
        MinMaxResult::MinMax(min, max) => max - min,
    };
    spread.max(MIN_SENSITIVITY)
}
