//! Real-root extraction for the low-degree polynomials of the shape
//! catalogue, plus sign-bracketed interval shrinking for the cases that are
//! swept numerically.

use libm::{acos, cos, fabs, sqrt};

use super::EPS;

/// Real roots of `a·x³ + b·x² + c·x + d`, in no particular order.
///
/// Degenerates gracefully to the quadratic and linear cases.
pub(crate) fn cubic(a: f64, b: f64, c: f64, d: f64) -> heapless::Vec<f64, 3> {
    let mut roots = heapless::Vec::new();

    if fabs(a) < EPS {
        // Quadratic b·x² + c·x + d
        if fabs(b) < EPS {
            if fabs(c) > EPS {
                let _ = roots.push(-d / c);
            }
            return roots;
        }
        let disc = c * c - 4.0 * b * d;
        if disc < 0.0 {
            return roots;
        }
        let sq = sqrt(disc);
        let _ = roots.push((-c - sq) / (2.0 * b));
        let _ = roots.push((-c + sq) / (2.0 * b));
        return roots;
    }

    let (found, n) = cubic_monic(b / a, c / a, d / a);
    for root in found.iter().take(n) {
        let _ = roots.push(*root);
    }
    roots
}

/// Real roots of the monic cubic `x³ + a·x² + b·x + c`.
///
/// Returns the root array and the number of real roots (1 or 3).
pub(crate) fn cubic_monic(a: f64, b: f64, c: f64) -> ([f64; 3], usize) {
    let a2 = a * a;
    let q = (a2 - 3.0 * b) / 9.0;
    let r = (a * (2.0 * a2 - 9.0 * b) + 27.0 * c) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;

    if r2 < q3 {
        let mut t = r / sqrt(q3);
        t = t.clamp(-1.0, 1.0);
        let t = acos(t);
        let ad = a / 3.0;
        let qd = -2.0 * sqrt(q);
        let x0 = qd * cos(t / 3.0) - ad;
        let x1 = qd * cos((t + 2.0 * core::f64::consts::PI) / 3.0) - ad;
        let x2 = qd * cos((t - 2.0 * core::f64::consts::PI) / 3.0) - ad;
        ([x0, x1, x2], 3)
    } else {
        let mut big_a = -super::cbrt(fabs(r) + sqrt(r2 - q3));
        if r < 0.0 {
            big_a = -big_a;
        }
        let big_b = if big_a == 0.0 { 0.0 } else { q / big_a };
        let x0 = (big_a + big_b) - a / 3.0;
        ([x0, 0.0, 0.0], 1)
    }
}

/// Real roots of the monic quartic `x⁴ + a·x³ + b·x² + c·x + d`, sorted
/// ascending. Factorizes into two quadratics through the resolvent cubic.
pub(crate) fn quartic_monic(a: f64, b: f64, c: f64, d: f64) -> heapless::Vec<f64, 4> {
    let mut roots: heapless::Vec<f64, 4> = heapless::Vec::new();

    if fabs(d) < EPS {
        // x = 0 is a root; the rest is a cubic.
        let _ = roots.push(0.0);
        let (found, n) = cubic_monic(a, b, c);
        for root in found.iter().take(n) {
            let _ = roots.push(*root);
        }
        roots.sort_unstable_by(f64::total_cmp);
        return roots;
    }

    let a3 = -b;
    let b3 = a * c - 4.0 * d;
    let c3 = -a * a * d - c * c + 4.0 * b * d;

    let (x3, n3) = cubic_monic(a3, b3, c3);
    let mut y = x3[0];
    if n3 > 1 {
        if fabs(x3[1]) > fabs(y) {
            y = x3[1];
        }
        if fabs(x3[2]) > fabs(y) {
            y = x3[2];
        }
    }

    let (p1, q1, p2, q2);
    let mut disc = y * y - 4.0 * d;
    if fabs(disc) < EPS {
        q1 = y / 2.0;
        q2 = q1;
        disc = a * a - 4.0 * (b - y);
        if disc < 0.0 {
            return roots;
        }
        if fabs(disc) < EPS {
            p1 = a / 2.0;
            p2 = p1;
        } else {
            let sq = sqrt(disc);
            p1 = (a + sq) / 2.0;
            p2 = (a - sq) / 2.0;
        }
    } else {
        if disc < 0.0 {
            return roots;
        }
        let sq = sqrt(disc);
        q1 = (y + sq) / 2.0;
        q2 = (y - sq) / 2.0;
        p1 = (a * q1 - c) / (q1 - q2);
        p2 = (c - a * q2) / (q1 - q2);
    }

    for (p, q) in [(p1, q1), (p2, q2)] {
        let disc = p * p - 4.0 * q;
        if disc >= 0.0 {
            let sq = sqrt(disc);
            let _ = roots.push((-p - sq) / 2.0);
            let _ = roots.push((-p + sq) / 2.0);
        }
    }

    roots.sort_unstable_by(f64::total_cmp);
    roots
}

/// Horner evaluation of a polynomial given as `[c0, c1, ..., cn]` for
/// `c0·x^n + c1·x^(n-1) + ... + cn`.
pub(crate) fn poly_eval(coeffs: &[f64], t: f64) -> f64 {
    let mut acc = 0.0;
    for c in coeffs {
        acc = acc * t + c;
    }
    acc
}

/// Shrink a sign-changing bracket of `poly` down to `tol` and return the
/// enclosed root.
pub(crate) fn shrink_interval(coeffs: &[f64], lower: f64, upper: f64, tol: f64) -> f64 {
    bracket_root(|t| poly_eval(coeffs, t), lower, upper, tol)
}

/// Bisection over an arbitrary residual with a sign change on the bracket.
///
/// Falls back to the midpoint if the endpoints do not actually straddle zero.
pub(crate) fn bracket_root<F: Fn(f64) -> f64>(f: F, lower: f64, upper: f64, tol: f64) -> f64 {
    let mut l = lower;
    let mut u = upper;
    let mut fl = f(l);
    if fl == 0.0 {
        return l;
    }

    for _ in 0..128 {
        let m = 0.5 * (l + u);
        if (u - l) < tol {
            return m;
        }
        let fm = f(m);
        if fm == 0.0 {
            return m;
        }
        if fl * fm < 0.0 {
            u = m;
        } else {
            l = m;
            fl = fm;
        }
    }
    0.5 * (l + u)
}

/// Bisection over a residual that may become undefined; bails out if the
/// bracket interior turns out not to be evaluable.
pub(crate) fn bracket_root_partial<F: Fn(f64) -> Option<f64>>(
    f: F,
    lower: f64,
    upper: f64,
    tol: f64,
) -> Option<f64> {
    let mut l = lower;
    let mut u = upper;
    let mut fl = f(l)?;
    if fl == 0.0 {
        return Some(l);
    }

    for _ in 0..128 {
        let m = 0.5 * (l + u);
        if (u - l) < tol {
            return Some(m);
        }
        let fm = f(m)?;
        if fm == 0.0 {
            return Some(m);
        }
        if fl * fm < 0.0 {
            u = m;
        } else {
            l = m;
            fl = fm;
        }
    }
    Some(0.5 * (l + u))
}

/// Roots of a residual that is exactly quadratic in its argument.
///
/// The coefficients are recovered from probes at -1, 0 and 1, which is exact
/// for a quadratic up to rounding, so the closed-form root formula applies
/// without expanding the symbolic expression.
pub(crate) fn probe_quadratic<F: Fn(f64) -> f64>(f: F) -> heapless::Vec<f64, 2> {
    let mut roots = heapless::Vec::new();

    let c = f(0.0);
    let fp = f(1.0);
    let fm = f(-1.0);
    let b = 0.5 * (fp - fm);
    let a = 0.5 * (fp + fm) - c;

    let scale = fabs(a) + fabs(b) + fabs(c);
    if !scale.is_finite() || scale == 0.0 {
        return roots;
    }

    if fabs(a) <= 1e-14 * scale {
        if fabs(b) > 1e-14 * scale {
            let _ = roots.push(-c / b);
        }
        return roots;
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return roots;
    }
    let sq = sqrt(disc);
    // Citardauq pairing avoids cancellation in the small root.
    let q = -0.5 * (b + if b >= 0.0 { sq } else { -sq });
    let _ = roots.push(q / a);
    if fabs(q) > 0.0 {
        let _ = roots.push(c / q);
    } else {
        let _ = roots.push(0.0);
    }
    roots
}
