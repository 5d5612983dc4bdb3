//! Fixed-duration profile search for the position interface.
//!
//! Re-solves the shape catalogue with the total duration prescribed. Each
//! family keeps exactly one free parameter once the duration constraint is
//! applied:
//!
//! - cruise families: the cruise velocity. Ramp and plateau durations follow
//!   in closed form (plateaus appear exactly when the ramp extremum would
//!   leave the acceleration bound), the cruise absorbs the remaining time,
//!   and the position residual is swept for a sign change.
//! - pinned-plateau families without a cruise: one acceleration plateau sits
//!   at its bound, the opposite ramp extremum is free; both plateau
//!   durations follow linearly from the duration and velocity balances.
//! - jerk-scaled families: no plateau at all; the ramp extrema follow in
//!   closed form from a reduced jerk magnitude, which is swept instead.
//!
//! Direction roles are as in the fastest search: UP receives
//! `(vmax, amax, amin, jmax)`, DOWN `(vmin, amin, amax, -jmax)`.

use crate::math::{fabs, fmax, fmin, roots, sqrt, EPS};
use crate::profile::{JerkSigns, Profile, ReachedLimits};

/// Subdivisions of each sweep bracket.
const SCAN_STEPS: usize = 64;

pub(crate) struct PositionTimed {
    tf: f64,
    p0: f64,
    v0: f64,
    a0: f64,
    pf: f64,
    vf: f64,
    af: f64,
    vmax: f64,
    vmin: f64,
    amax: f64,
    amin: f64,
    jmax: f64,
}

fn tag_of(acc0: bool, acc1: bool, vel: bool) -> ReachedLimits {
    match (acc0, acc1, vel) {
        (true, true, true) => ReachedLimits::Acc0Acc1Vel,
        (true, true, false) => ReachedLimits::Acc0Acc1,
        (true, false, true) => ReachedLimits::Acc0Vel,
        (false, true, true) => ReachedLimits::Acc1Vel,
        (false, false, true) => ReachedLimits::Vel,
        (true, false, false) => ReachedLimits::Acc0,
        (false, true, false) => ReachedLimits::Acc1,
        (false, false, false) => ReachedLimits::None,
    }
}

fn sanitize(t: f64) -> Option<f64> {
    if t >= 0.0 {
        Some(t)
    } else if t > -1e-12 {
        Some(0.0)
    } else {
        None
    }
}

impl PositionTimed {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tf: f64,
        p0: f64,
        v0: f64,
        a0: f64,
        pf: f64,
        vf: f64,
        af: f64,
        vmax: f64,
        vmin: f64,
        amax: f64,
        amin: f64,
        jmax: f64,
    ) -> Self {
        Self {
            tf,
            p0,
            v0,
            a0,
            pf,
            vf,
            af,
            vmax,
            vmin,
            amax,
            amin,
            jmax,
        }
    }

    /// Search the catalogue for a profile of duration `tf`; writes the
    /// accepted shape into `profile`.
    pub fn solve(&self, profile: &mut Profile) -> bool {
        let up = (self.vmax, self.amax, self.amin, self.jmax);
        let down = (self.vmin, self.amin, self.amax, -self.jmax);
        let (first, second) = if self.pf >= self.p0 { (up, down) } else { (down, up) };

        for dir in [first, second] {
            if self.time_cruise(profile, dir.0, dir.1, dir.2, dir.3, JerkSigns::UDDU) {
                return true;
            }
        }
        for dir in [first, second] {
            if self.time_cruise(profile, dir.0, dir.1, dir.2, dir.3, JerkSigns::UDUD) {
                return true;
            }
        }
        for dir in [first, second] {
            if self.time_pinned_acc0(profile, dir.1, dir.2, dir.3) {
                return true;
            }
            if self.time_pinned_acc1(profile, dir.1, dir.2, dir.3) {
                return true;
            }
        }
        for dir in [first, second] {
            if self.time_jerk_scaled_uddu(profile, dir.3) {
                return true;
            }
        }
        for dir in [first, second] {
            if self.time_jerk_scaled_udud(profile, dir.3) {
                return true;
            }
        }
        false
    }

    fn end_position(&self, t: &[f64; 7], signs: JerkSigns, jerk: f64) -> f64 {
        let pattern = match signs {
            JerkSigns::UDDU => [1.0, 0.0, -1.0, 0.0, -1.0, 0.0, 1.0],
            JerkSigns::UDUD => [1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0],
        };
        let (mut p, mut v, mut a) = (self.p0, self.v0, self.a0);
        for i in 0..7 {
            let next = Profile::integrate(t[i], p, v, a, pattern[i] * jerk);
            p = next.0;
            v = next.1;
            a = next.2;
        }
        p
    }

    /// Sweep `f` over `[lo, hi]` for sign changes; `accept` validates each
    /// bracketed root. Returns true as soon as one root is accepted.
    fn sweep<F, G>(&self, lo: f64, hi: f64, f: F, mut accept: G) -> bool
    where
        F: Fn(f64) -> Option<f64>,
        G: FnMut(f64) -> bool,
    {
        if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
            return false;
        }
        let mut prev: Option<(f64, f64)> = None;
        for i in 0..=SCAN_STEPS {
            let x = lo + (hi - lo) * (i as f64) / (SCAN_STEPS as f64);
            let r = match f(x) {
                Some(r) if r.is_finite() => r,
                _ => {
                    prev = None;
                    continue;
                }
            };
            if r == 0.0 && accept(x) {
                return true;
            }
            if let Some((px, pr)) = prev {
                if pr * r < 0.0 {
                    if let Some(root) = roots::bracket_root_partial(&f, px, x, 1e-14) {
                        if accept(root) {
                            return true;
                        }
                    }
                }
            }
            prev = Some((x, r));
        }
        false
    }

    /// Segment durations of a cruise shape with plateau velocity `vp`.
    fn cruise_times(
        &self,
        vp: f64,
        amax: f64,
        amin: f64,
        jmax: f64,
        signs: JerkSigns,
    ) -> Option<[f64; 7]> {
        let s = if jmax > 0.0 { 1.0 } else { -1.0 };
        let (a0, af) = (self.a0, self.af);

        // First side: reach velocity vp with zero acceleration.
        let ap_sq = jmax * (vp - self.v0) + a0 * a0 / 2.0;
        if ap_sq < 0.0 {
            return None;
        }
        let (t0, t1, t2) = if ap_sq > amax * amax {
            (
                sanitize((amax - a0) / jmax)?,
                sanitize((a0 * a0 / 2.0 - amax * amax - jmax * (self.v0 - vp)) / (amax * jmax))?,
                sanitize(amax / jmax)?,
            )
        } else {
            let ap = s * sqrt(ap_sq);
            (sanitize((ap - a0) / jmax)?, 0.0, sanitize(ap / jmax)?)
        };

        // Second side: from (vp, 0) to (vf, af).
        let (t4, t5, t6) = match signs {
            JerkSigns::UDDU => {
                let an_sq = jmax * (vp - self.vf) + af * af / 2.0;
                if an_sq < 0.0 {
                    return None;
                }
                if an_sq > amin * amin {
                    (
                        sanitize(-amin / jmax)?,
                        sanitize(
                            -(af * af / 2.0 - amin * amin - jmax * (self.vf - vp)) / (amin * jmax),
                        )?,
                        sanitize((af - amin) / jmax)?,
                    )
                } else {
                    let an = -s * sqrt(an_sq);
                    (sanitize(-an / jmax)?, 0.0, sanitize((af - an) / jmax)?)
                }
            }
            JerkSigns::UDUD => {
                let aq_sq = jmax * (self.vf - vp) + af * af / 2.0;
                if aq_sq < 0.0 {
                    return None;
                }
                if aq_sq > amax * amax {
                    (
                        sanitize(amax / jmax)?,
                        sanitize(
                            (self.vf - vp - (2.0 * amax * amax - af * af) / (2.0 * jmax)) / amax,
                        )?,
                        sanitize((amax - af) / jmax)?,
                    )
                } else {
                    let aq = s * sqrt(aq_sq);
                    (sanitize(aq / jmax)?, 0.0, sanitize((aq - af) / jmax)?)
                }
            }
        };

        let t3 = self.tf - (t0 + t1 + t2 + t4 + t5 + t6);
        let t3 = sanitize(t3)?;
        Some([t0, t1, t2, t3, t4, t5, t6])
    }

    fn time_cruise(
        &self,
        profile: &mut Profile,
        vlim: f64,
        amax: f64,
        amin: f64,
        jmax: f64,
        signs: JerkSigns,
    ) -> bool {
        let (a0, af) = (self.a0, self.af);
        let b1 = self.v0 - a0 * a0 / (2.0 * jmax);
        let (lo, hi) = match signs {
            JerkSigns::UDDU => {
                let b2 = self.vf - af * af / (2.0 * jmax);
                if jmax > 0.0 {
                    (fmax(b1, b2), vlim)
                } else {
                    (vlim, fmin(b1, b2))
                }
            }
            JerkSigns::UDUD => {
                let b2 = self.vf + af * af / (2.0 * jmax);
                if jmax > 0.0 {
                    (b1, fmin(vlim, b2))
                } else {
                    (fmax(vlim, b2), b1)
                }
            }
        };

        let residual = |vp: f64| {
            let t = self.cruise_times(vp, amax, amin, jmax, signs)?;
            Some(self.end_position(&t, signs, jmax) - self.pf)
        };

        self.sweep(lo, hi, residual, |vp| {
            let Some(t) = self.cruise_times(vp, amax, amin, jmax, signs) else {
                return false;
            };
            profile.t = t;
            let tag = tag_of(t[1] >= EPS, t[5] >= EPS, t[3] >= EPS);
            profile.check_with_timing(
                signs, tag, self.tf, jmax, self.vmax, self.vmin, self.amax, self.amin,
            )
        })
    }

    /// No cruise, initial-side plateau pinned at its bound, the valley free.
    fn time_pinned_acc0(&self, profile: &mut Profile, amax: f64, amin: f64, jmax: f64) -> bool {
        let (a0, af) = (self.a0, self.af);
        let s = if jmax > 0.0 { 1.0 } else { -1.0 };

        let t0 = (amax - a0) / jmax;
        if t0 < 0.0 {
            return false;
        }

        let times = |valley: f64| -> Option<[f64; 7]> {
            let t2 = sanitize((amax - valley) / jmax)?;
            let t6 = sanitize((af - valley) / jmax)?;
            let span = self.tf - (t0 + t2 + t6);
            // Duration and velocity balances fix both plateau durations.
            let c_v = self.vf
                - self.v0
                - (amax * amax - a0 * a0) / (2.0 * jmax)
                - (valley * valley - amax * amax) / (-2.0 * jmax)
                - (af * af - valley * valley) / (2.0 * jmax);
            let det = amax - valley;
            if fabs(det) < 1e-12 {
                return None;
            }
            let t1 = sanitize((c_v - valley * span) / det)?;
            let t5 = sanitize(span - t1)?;
            Some([t0, t1, t2, 0.0, 0.0, t5, t6])
        };

        let hi_dir = if s > 0.0 { fmin(af, amax) } else { fmax(af, amax) };
        let (lo, hi) = (fmin(amin, hi_dir), fmax(amin, hi_dir));

        let residual = |valley: f64| {
            let t = times(valley)?;
            Some(self.end_position(&t, JerkSigns::UDDU, jmax) - self.pf)
        };

        self.sweep(lo, hi, residual, |valley| {
            let Some(t) = times(valley) else {
                return false;
            };
            profile.t = t;
            let tag = tag_of(t[1] >= EPS, t[5] >= EPS, false);
            profile.check_with_timing(
                JerkSigns::UDDU, tag, self.tf, jmax, self.vmax, self.vmin, self.amax, self.amin,
            )
        })
    }

    /// No cruise, final-side plateau pinned at its bound, the peak free.
    fn time_pinned_acc1(&self, profile: &mut Profile, amax: f64, amin: f64, jmax: f64) -> bool {
        let (a0, af) = (self.a0, self.af);
        let s = if jmax > 0.0 { 1.0 } else { -1.0 };

        let t6 = (af - amin) / jmax;
        if t6 < 0.0 {
            return false;
        }

        let times = |peak: f64| -> Option<[f64; 7]> {
            let t0 = sanitize((peak - a0) / jmax)?;
            let t2 = sanitize((peak - amin) / jmax)?;
            let span = self.tf - (t0 + t2 + t6);
            let c_v = self.vf
                - self.v0
                - (peak * peak - a0 * a0) / (2.0 * jmax)
                - (amin * amin - peak * peak) / (-2.0 * jmax)
                - (af * af - amin * amin) / (2.0 * jmax);
            let det = peak - amin;
            if fabs(det) < 1e-12 {
                return None;
            }
            let t1 = sanitize((c_v - amin * span) / det)?;
            let t5 = sanitize(span - t1)?;
            Some([t0, t1, t2, 0.0, 0.0, t5, t6])
        };

        let lo_dir = if s > 0.0 { fmax(a0, amin) } else { fmin(a0, amin) };
        let (lo, hi) = (fmin(lo_dir, amax), fmax(lo_dir, amax));

        let residual = |peak: f64| {
            let t = times(peak)?;
            Some(self.end_position(&t, JerkSigns::UDDU, jmax) - self.pf)
        };

        self.sweep(lo, hi, residual, |peak| {
            let Some(t) = times(peak) else {
                return false;
            };
            profile.t = t;
            let tag = tag_of(t[1] >= EPS, t[5] >= EPS, false);
            profile.check_with_timing(
                JerkSigns::UDDU, tag, self.tf, jmax, self.vmax, self.vmin, self.amax, self.amin,
            )
        })
    }

    /// No plateau at all: three ramps with a reduced jerk magnitude.
    fn time_jerk_scaled_uddu(&self, profile: &mut Profile, jmax: f64) -> bool {
        let (a0, af) = (self.a0, self.af);

        let times = |jerk: f64| -> Option<[f64; 7]> {
            let half = (jerk * self.tf + a0 - af) / 2.0;
            if fabs(half) < 1e-14 {
                return None;
            }
            let rhs = 2.0 * jerk * (self.vf - self.v0) + a0 * a0 - af * af;
            let peak = (rhs + 2.0 * half * half) / (4.0 * half);
            let valley = peak - half;
            let t0 = sanitize((peak - a0) / jerk)?;
            let t24 = sanitize((peak - valley) / jerk)?;
            let t6 = sanitize((af - valley) / jerk)?;
            Some([t0, 0.0, t24 / 2.0, 0.0, t24 / 2.0, 0.0, t6])
        };

        let sgn = if jmax > 0.0 { 1.0 } else { -1.0 };
        let residual = |mag: f64| {
            let t = times(sgn * mag)?;
            Some(self.end_position(&t, JerkSigns::UDDU, sgn * mag) - self.pf)
        };
        self.sweep(fabs(jmax) * 1e-4, fabs(jmax), residual, |mag| {
            let Some(t) = times(sgn * mag) else {
                return false;
            };
            profile.t = t;
            profile.check_with_timing_jerk(
                JerkSigns::UDDU,
                ReachedLimits::None,
                self.tf,
                sgn * mag,
                self.jmax,
                self.vmax,
                self.vmin,
                self.amax,
                self.amin,
            )
        })
    }

    /// No plateau, UDUD: ramp to a peak, back through zero, up to a second
    /// peak, down to the target acceleration; jerk magnitude reduced.
    fn time_jerk_scaled_udud(&self, profile: &mut Profile, jmax: f64) -> bool {
        let (a0, af) = (self.a0, self.af);
        let sgn = if jmax > 0.0 { 1.0 } else { -1.0 };

        // For a given jerk, the velocity balance is an exact quadratic in
        // the first ramp duration; each root is a shape branch.
        let branch_times = |jerk: f64, branch: usize| -> Option<[f64; 7]> {
            let fixed = (self.tf - (a0 - af) / jerk) / 2.0;
            let rhs = 2.0 * jerk * (self.vf - self.v0) + a0 * a0 + af * af;
            let balance = |t0: f64| {
                let peak = a0 + jerk * t0;
                let second = jerk * (fixed - t0);
                2.0 * peak * peak + 2.0 * second * second - rhs
            };
            let mut found = roots::probe_quadratic(balance);
            if found.is_empty() {
                return None;
            }
            found.sort_unstable_by(f64::total_cmp);
            let t0 = sanitize(*found.get(branch)?)?;
            let t2 = sanitize(t0 + a0 / jerk)?;
            let t4 = sanitize(fixed - t0)?;
            let t6 = sanitize(t4 - af / jerk)?;
            Some([t0, 0.0, t2, 0.0, t4, 0.0, t6])
        };

        for branch in 0..2 {
            let residual = |mag: f64| {
                let t = branch_times(sgn * mag, branch)?;
                Some(self.end_position(&t, JerkSigns::UDUD, sgn * mag) - self.pf)
            };
            let accepted = self.sweep(fabs(jmax) * 1e-4, fabs(jmax), residual, |mag| {
                let Some(t) = branch_times(sgn * mag, branch) else {
                    return false;
                };
                profile.t = t;
                profile.check_with_timing_jerk(
                    JerkSigns::UDUD,
                    ReachedLimits::None,
                    self.tf,
                    sgn * mag,
                    self.jmax,
                    self.vmax,
                    self.vmin,
                    self.amax,
                    self.amin,
                )
            });
            if accepted {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stretch(
        state: (f64, f64, f64),
        target: (f64, f64, f64),
        limits: (f64, f64, f64),
        tf: f64,
    ) -> Option<Profile> {
        let (vmax, amax, jmax) = limits;
        let solver = PositionTimed::new(
            tf, state.0, state.1, state.2, target.0, target.1, target.2, vmax, -vmax, amax,
            -amax, jmax,
        );
        let mut profile = Profile::default();
        profile.set_boundary(state.0, state.1, state.2, target.0, target.1, target.2);
        solver.solve(&mut profile).then_some(profile)
    }

    #[test]
    fn stretches_rest_to_rest_move() {
        // Optimal duration is 4·cbrt(0.5) ≈ 3.17; ask for 4.0.
        let profile = stretch((0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 1.0), 4.0).unwrap();
        assert!((profile.total_duration() - 4.0).abs() < 1e-9);
        assert!((profile.p[7] - 1.0).abs() < 1e-7);
        assert!((profile.v[7]).abs() < 1e-7);
        assert!((profile.a[7]).abs() < 1e-9);
    }

    #[test]
    fn stretches_limit_reaching_move() {
        // Optimal duration is 12 s; ask for 15.
        let profile = stretch((0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (1.0, 1.0, 1.0), 15.0).unwrap();
        assert!((profile.total_duration() - 15.0).abs() < 1e-9);
        assert!((profile.p[7] - 10.0).abs() < 1e-7);
        for v in profile.v {
            assert!(v.abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn rejects_impossible_duration() {
        // Shorter than the time-optimal duration: no shape can exist.
        assert!(stretch((0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (1.0, 1.0, 1.0), 5.0).is_none());
    }

    #[test]
    fn stretches_negative_direction() {
        let profile = stretch((0.0, 0.0, 0.0), (-1.0, 0.0, 0.0), (1.0, 1.0, 1.0), 4.5).unwrap();
        assert!((profile.total_duration() - 4.5).abs() < 1e-9);
        assert!((profile.p[7] + 1.0).abs() < 1e-7);
    }

    #[test]
    fn stretches_nonzero_boundary_velocity() {
        let profile = stretch((0.0, 0.3, 0.0), (2.0, 0.1, 0.0), (1.0, 1.0, 1.0), 8.0).unwrap();
        assert!((profile.total_duration() - 8.0).abs() < 1e-9);
        assert!((profile.p[7] - 2.0).abs() < 1e-7);
        assert!((profile.v[7] - 0.1).abs() < 1e-7);
    }
}
