//! Numerical support: float intrinsics and polynomial root finding.
//!
//! All float math goes through [`libm`] so the same code path is used with
//! and without the standard library.

pub(crate) mod roots;

pub(crate) use libm::{cbrt, ceil, fabs, fmax, fmin, sqrt};

#[inline]
pub(crate) fn sq(x: f64) -> f64 {
    x * x
}

#[inline]
pub(crate) fn cube(x: f64) -> f64 {
    x * x * x
}

#[inline]
pub(crate) fn p4(x: f64) -> f64 {
    sq(sq(x))
}

#[inline]
pub(crate) fn p5(x: f64) -> f64 {
    p4(x) * x
}

#[inline]
pub(crate) fn p6(x: f64) -> f64 {
    sq(cube(x))
}

/// Machine epsilon, the base unit of the candidate-digest tolerances.
pub(crate) const EPS: f64 = f64::EPSILON;

/// Absolute position tolerance for profile endpoint validation.
pub(crate) const P_PRECISION: f64 = 1e-8;
/// Absolute velocity tolerance for profile endpoint validation.
pub(crate) const V_PRECISION: f64 = 1e-8;
/// Absolute acceleration tolerance for profile endpoint validation.
pub(crate) const A_PRECISION: f64 = 1e-10;
/// Absolute duration tolerance for fixed-time profile validation.
pub(crate) const T_PRECISION: f64 = 1e-12;

/// Margin granted on velocity/acceleration bounds during validation.
pub(crate) const LIMIT_EPS: f64 = 1e-12;
