//! Integer rounding used by the schedule arithmetic.
//!
//! Frame and line indices are derived from float timing with
//! round-half-to-even. Captured datasets were produced with that rule, so
//! switching to round-half-away would shift render borders by one row at
//! exact ties.

/// Round to the nearest integer, ties to even.
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Ceiling of `num / den` for a positive denominator.
pub fn ceil_div(num: i64, den: i64) -> i64 {
    debug_assert!(den > 0);
    -((-num).div_euclid(den))
}
