use crate::{CxError, CxResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Smallest denominator used when a physical rate may legitimately be zero.
pub const DENOMINATOR_FLOOR: Real = 1e-15;

pub fn ensure_finite(v: Real, what: &'static str) -> CxResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CxError::NonFinite { what, value: v })
    }
}

/// Divide by `den`, flooring the denominator at [`DENOMINATOR_FLOOR`].
#[inline]
pub fn floored_div(num: Real, den: Real) -> Real {
    num / den.max(DENOMINATOR_FLOOR)
}

/// Largest absolute element-wise difference between two equal-length slices.
pub fn max_abs_diff(a: &[Real], b: &[Real]) -> Real {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, Real::max)
}
