use crate::SoError;

/// Floating point type for coordinates, elevations and traced quantities.
pub type Real = f64;

/// Absolute + relative tolerance pair for comparing traced quantities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// Purely absolute comparison.
    pub const fn absolute(abs: Real) -> Self {
        Self { abs, rel: 0.0 }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::absolute(1e-4)
    }
}

/// `a` and `b` agree within `tol.abs`, or within `tol.rel` of the larger
/// magnitude.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// Split `quantity` evenly over `parts` outlets. Zero outlets keep nothing.
pub fn even_share(quantity: Real, parts: usize) -> Real {
    if parts == 0 {
        0.0
    } else {
        quantity / parts as Real
    }
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, SoError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SoError::NonFinite { what, value: v })
    }
}
