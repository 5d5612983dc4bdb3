//! Time-optimal profile search for the position interface.
//!
//! Enumerates the closed catalogue of shape variants, direction UP and DOWN,
//! each defined by which limit plateaus it holds (velocity, initial-side
//! acceleration, final-side acceleration) and its jerk sign pattern. The
//! ramp and plateau durations of a variant follow in closed form or as real
//! roots of a monic quartic (a swept sextic for the UDUD shape with no
//! plateau); the cruise duration is recovered from the exact position
//! balance. Every candidate is validated by the profile check before it
//! enters the digest.
//!
//! Asymmetric limits enter through direction roles: UP variants receive
//! `(vmax, amax, amin, jmax)` and DOWN variants `(vmin, amin, amax, -jmax)`.

use crate::math::{cbrt, cube, fabs, p4, p5, p6, roots, sq, sqrt, EPS};
use crate::profile::{JerkSigns, Profile, ReachedLimits};

use super::{Candidates, FeasibleSet};

pub(crate) struct PositionFastest {
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
    candidates: Candidates,
    overflowed: bool,
}

impl PositionFastest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
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
            candidates: Candidates::new(),
            overflowed: false,
        }
    }

    /// Run the catalogue and digest the valid candidates.
    ///
    /// `template` carries the brake pre-profile and the boundary state the
    /// candidates start from.
    pub fn solve(mut self, template: &Profile) -> Option<FeasibleSet> {
        let mut profile = template.clone();

        // Try the natural direction first; ties then favor it.
        if self.pf > self.p0 {
            self.enumerate_up_first(&mut profile);
        } else {
            self.enumerate_down_first(&mut profile);
        }

        if self.overflowed {
            return None;
        }
        FeasibleSet::digest(self.candidates)
    }

    fn enumerate_up_first(&mut self, profile: &mut Profile) {
        let (vmax, vmin, amax, amin, jmax) =
            (self.vmax, self.vmin, self.amax, self.amin, self.jmax);
        self.time_acc0_acc1_vel(profile, vmax, amax, amin, jmax);
        self.time_acc0_acc1_vel(profile, vmin, amin, amax, -jmax);
        self.time_acc1_vel(profile, vmax, amax, amin, jmax);
        self.time_acc1_vel(profile, vmin, amin, amax, -jmax);
        self.time_acc0_vel(profile, vmax, amax, amin, jmax);
        self.time_acc0_vel(profile, vmin, amin, amax, -jmax);
        self.time_vel(profile, vmax, amax, amin, jmax);
        self.time_vel(profile, vmin, amin, amax, -jmax);
        self.time_none(profile, vmax, amax, amin, jmax);
        self.time_acc0(profile, vmax, amax, amin, jmax);
        self.time_acc1(profile, vmax, amax, amin, jmax);
        self.time_acc0_acc1(profile, vmax, amax, amin, jmax);
        self.time_none(profile, vmin, amin, amax, -jmax);
        self.time_acc0(profile, vmin, amin, amax, -jmax);
        self.time_acc1(profile, vmin, amin, amax, -jmax);
        self.time_acc0_acc1(profile, vmin, amin, amax, -jmax);
    }

    fn enumerate_down_first(&mut self, profile: &mut Profile) {
        let (vmax, vmin, amax, amin, jmax) =
            (self.vmax, self.vmin, self.amax, self.amin, self.jmax);
        self.time_acc0_acc1_vel(profile, vmin, amin, amax, -jmax);
        self.time_acc0_acc1_vel(profile, vmax, amax, amin, jmax);
        self.time_acc1_vel(profile, vmin, amin, amax, -jmax);
        self.time_acc1_vel(profile, vmax, amax, amin, jmax);
        self.time_acc0_vel(profile, vmin, amin, amax, -jmax);
        self.time_acc0_vel(profile, vmax, amax, amin, jmax);
        self.time_vel(profile, vmin, amin, amax, -jmax);
        self.time_vel(profile, vmax, amax, amin, jmax);
        self.time_none(profile, vmin, amin, amax, -jmax);
        self.time_acc0(profile, vmin, amin, amax, -jmax);
        self.time_acc1(profile, vmin, amin, amax, -jmax);
        self.time_acc0_acc1(profile, vmin, amin, amax, -jmax);
        self.time_none(profile, vmax, amax, amin, jmax);
        self.time_acc0(profile, vmax, amax, amin, jmax);
        self.time_acc1(profile, vmax, amax, amin, jmax);
        self.time_acc0_acc1(profile, vmax, amax, amin, jmax);
    }

    fn add(&mut self, profile: &Profile, limits: ReachedLimits, jmax: f64) {
        let mut candidate = profile.clone();
        candidate.limits = limits;
        candidate.direction = if jmax > 0.0 {
            crate::profile::Direction::Up
        } else {
            crate::profile::Direction::Down
        };
        if self.candidates.push(candidate).is_err() {
            self.overflowed = true;
        }
    }

    fn try_add(&mut self, profile: &mut Profile, signs: JerkSigns, limits: ReachedLimits, jmax: f64) {
        if profile.check(signs, limits, jmax, self.vmax, self.vmin, self.amax, self.amin) {
            self.add(profile, limits, jmax);
        }
    }

    /// Cruise duration that exactly closes the position balance, given the
    /// ramp/plateau durations on both sides of the cruise.
    fn cruise_duration(&self, t: &[f64; 7], jmax: f64, vplat: f64) -> f64 {
        let side = |durations: [f64; 3], jerks: [f64; 3], v: f64, a: f64| {
            let (mut p, mut v, mut a) = (0.0, v, a);
            for i in 0..3 {
                let next = Profile::integrate(durations[i], p, v, a, jerks[i]);
                p = next.0;
                v = next.1;
                a = next.2;
            }
            p
        };
        let p_acc = side([t[0], t[1], t[2]], [jmax, 0.0, -jmax], self.v0, self.a0);
        let p_dec = side([t[4], t[5], t[6]], [-jmax, 0.0, jmax], vplat, 0.0);
        (self.pf - self.p0 - p_acc - p_dec) / vplat
    }

    /// End position of a full candidate timing, relative to the start.
    fn end_position(&self, t: &[f64; 7], signs: JerkSigns, jmax: f64) -> f64 {
        let pattern = match signs {
            JerkSigns::UDDU => [1.0, 0.0, -1.0, 0.0, -1.0, 0.0, 1.0],
            JerkSigns::UDUD => [1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0],
        };
        let (mut p, mut v, mut a) = (0.0, self.v0, self.a0);
        for i in 0..7 {
            let next = Profile::integrate(t[i], p, v, a, pattern[i] * jmax);
            p = next.0;
            v = next.1;
            a = next.2;
        }
        p
    }

    fn time_acc0_acc1_vel(&mut self, profile: &mut Profile, vmax: f64, amax: f64, amin: f64, jmax: f64) {
        let a0 = self.a0;
        let af = self.af;

        profile.t[0] = (-a0 + amax) / jmax;
        profile.t[1] = (a0 * a0 / 2.0 - amax * amax - jmax * (self.v0 - vmax)) / (amax * jmax);
        profile.t[2] = amax / jmax;
        profile.t[4] = -amin / jmax;
        profile.t[5] = -(af * af / 2.0 - amin * amin - jmax * (self.vf - vmax)) / (amin * jmax);
        profile.t[6] = (af - amin) / jmax;
        profile.t[3] = self.cruise_duration(&profile.t, jmax, vmax);

        self.try_add(profile, JerkSigns::UDDU, ReachedLimits::Acc0Acc1Vel, jmax);
    }

    fn time_acc1_vel(&mut self, profile: &mut Profile, vmax: f64, _amax: f64, amin: f64, jmax: f64) {
        let a0 = self.a0;
        let af = self.af;

        let h1 = a0 * a0 / 2.0 + jmax * (vmax - self.v0);
        if h1 < 0.0 {
            return;
        }

        profile.t[0] = (-a0 * jmax + sqrt(h1) * fabs(jmax)) / (jmax * jmax);
        profile.t[1] = 0.0;
        profile.t[2] = profile.t[0] + a0 / jmax;
        profile.t[4] = -amin / jmax;
        profile.t[5] = -(af * af / 2.0 - amin * amin - jmax * (self.vf - vmax)) / (amin * jmax);
        profile.t[6] = (af - amin) / jmax;
        profile.t[3] = self.cruise_duration(&profile.t, jmax, vmax);

        self.try_add(profile, JerkSigns::UDDU, ReachedLimits::Acc1Vel, jmax);
    }

    fn time_acc0_vel(&mut self, profile: &mut Profile, vmax: f64, amax: f64, _amin: f64, jmax: f64) {
        let a0 = self.a0;
        let af = self.af;

        let h1 = af * af / 2.0 + jmax * (vmax - self.vf);
        if h1 < 0.0 {
            return;
        }

        profile.t[0] = (-a0 + amax) / jmax;
        profile.t[1] = (a0 * a0 / 2.0 - amax * amax - jmax * (self.v0 - vmax)) / (amax * jmax);
        profile.t[2] = amax / jmax;
        profile.t[4] = sqrt(h1) / fabs(jmax);
        profile.t[5] = 0.0;
        profile.t[6] = profile.t[4] + af / jmax;
        profile.t[3] = self.cruise_duration(&profile.t, jmax, vmax);

        self.try_add(profile, JerkSigns::UDDU, ReachedLimits::Acc0Vel, jmax);
    }

    fn time_vel(&mut self, profile: &mut Profile, vmax: f64, _amax: f64, _amin: f64, jmax: f64) {
        let a0 = self.a0;
        let af = self.af;

        let h1 = a0 * a0 / 2.0 + jmax * (vmax - self.v0);
        let h2 = af * af / 2.0 + jmax * (vmax - self.vf);
        if h1 < 0.0 || h2 < 0.0 {
            return;
        }

        profile.t[0] = (-a0 * jmax + sqrt(h1) * fabs(jmax)) / (jmax * jmax);
        profile.t[1] = 0.0;
        profile.t[2] = profile.t[0] + a0 / jmax;
        profile.t[4] = sqrt(h2) / fabs(jmax);
        profile.t[5] = 0.0;
        profile.t[6] = profile.t[4] + af / jmax;
        profile.t[3] = self.cruise_duration(&profile.t, jmax, vmax);

        self.try_add(profile, JerkSigns::UDDU, ReachedLimits::Vel, jmax);
    }

    fn time_acc0_acc1(&mut self, profile: &mut Profile, _vmax: f64, amax: f64, amin: f64, jmax: f64) {
        let a0 = self.a0;
        let af = self.af;

        // UDDU: ramps are fixed by the plateaus, the two plateau durations
        // solve the velocity and position balances. The position residual is
        // exactly quadratic in t[1], so both solutions come from the probed
        // quadratic.
        {
            let t0 = (amax - a0) / jmax;
            let t2 = amax / jmax;
            let t4 = -amin / jmax;
            let t6 = (af - amin) / jmax;
            let c_v = self.vf
                - self.v0
                - (2.0 * amax * amax - a0 * a0) / (2.0 * jmax)
                - (af * af - 2.0 * amin * amin) / (2.0 * jmax);
            let t5_of = |t1: f64| (c_v - amax * t1) / amin;

            let residual = |t1: f64| {
                let t = [t0, t1, t2, 0.0, t4, t5_of(t1), t6];
                self.p0 + self.end_position(&t, JerkSigns::UDDU, jmax) - self.pf
            };

            for t1 in roots::probe_quadratic(residual) {
                if !t1.is_finite() {
                    continue;
                }
                profile.t = [t0, t1, t2, 0.0, t4, t5_of(t1), t6];
                self.try_add(profile, JerkSigns::UDDU, ReachedLimits::Acc0Acc1, jmax);
            }
        }

        // UDUD: both plateaus sit at the initial-side bound; same reduction.
        if fabs(af) > EPS {
            let t0 = (amax - a0) / jmax;
            let t2 = amax / jmax;
            let t4 = amax / jmax;
            let t6 = (amax - af) / jmax;
            let c_v = self.vf
                - self.v0
                - (2.0 * amax * amax - a0 * a0) / (2.0 * jmax)
                - (2.0 * amax * amax - af * af) / (2.0 * jmax);
            let t5_of = |t1: f64| c_v / amax - t1;

            let residual = |t1: f64| {
                let t = [t0, t1, t2, 0.0, t4, t5_of(t1), t6];
                self.p0 + self.end_position(&t, JerkSigns::UDUD, jmax) - self.pf
            };

            for t1 in roots::probe_quadratic(residual) {
                if !t1.is_finite() {
                    continue;
                }
                profile.t = [t0, t1, t2, 0.0, t4, t5_of(t1), t6];
                self.try_add(profile, JerkSigns::UDUD, ReachedLimits::Acc0Acc1, jmax);
            }
        }
    }

    fn time_acc1(&mut self, profile: &mut Profile, _vmax: f64, amax: f64, amin: f64, jmax: f64) {
        let a0 = self.a0;
        let af = self.af;
        let (p0, v0, pf, vf) = (self.p0, self.v0, self.pf, self.vf);
        let j2 = jmax * jmax;

        // UDDU: the final-side plateau magnitude takes the acc1 role.
        {
            let am = -amin;
            let polynom = [
                1.0,
                2.0 * (2.0 * a0 + am) / jmax,
                (5.0 * a0 * a0 + 6.0 * a0 * am + am * am + 2.0 * jmax * v0) / j2,
                (2.0 * (a0 + am) * (a0 * a0 + a0 * am + 2.0 * jmax * v0)) / (j2 * jmax),
                (3.0 * p4(a0) - 3.0 * p4(af) + 8.0 * cube(a0) * am
                    - 8.0 * cube(af) * am
                    + 24.0 * a0 * am * jmax * v0
                    + 6.0 * a0 * a0 * (am * am + 2.0 * jmax * v0)
                    + 24.0 * af * am * jmax * vf
                    - 6.0 * af * af * (am * am - 2.0 * jmax * vf)
                    + 12.0
                        * jmax
                        * (2.0 * am * jmax * (p0 - pf)
                            + am * am * (v0 + vf)
                            + jmax * (v0 * v0 - vf * vf)))
                    / (12.0 * j2 * j2),
            ];

            for t in roots::quartic_monic(polynom[1], polynom[2], polynom[3], polynom[4]) {
                if t < 0.0 {
                    continue;
                }
                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t + a0 / jmax;
                profile.t[3] = 0.0;
                profile.t[4] = am / jmax;
                profile.t[5] = (a0 * a0 / 2.0 + af * af / 2.0 - am * am
                    + 2.0 * a0 * jmax * t
                    + j2 * t * t
                    + jmax * (v0 - vf))
                    / (am * jmax);
                profile.t[6] = profile.t[4] + af / jmax;

                // Segments 2 and 4 share the same jerk; balance the split.
                profile.t[2] = (profile.t[2] + profile.t[4]) / 2.0;
                profile.t[4] = profile.t[2];

                self.try_add(profile, JerkSigns::UDDU, ReachedLimits::Acc1, jmax);
            }
        }

        // UDUD: the second plateau re-accelerates at the initial-side bound.
        if fabs(af) > EPS {
            let am = amax;
            let polynom = [
                1.0,
                (4.0 * a0 - 2.0 * am) / jmax,
                (5.0 * a0 * a0 - 6.0 * a0 * am - am * am + 2.0 * jmax * v0) / j2,
                (2.0 * (cube(a0) - 2.0 * a0 * a0 * am - a0 * am * am + 2.0 * a0 * jmax * v0
                    - 2.0 * am * jmax * v0))
                    / (j2 * jmax),
                -(-3.0 * p4(a0) + 3.0 * p4(af) + 8.0 * cube(a0) * am
                    - 8.0 * cube(af) * am
                    + 24.0 * a0 * am * jmax * v0
                    + 6.0 * a0 * a0 * (am * am - 2.0 * jmax * v0)
                    - 24.0 * af * am * jmax * vf
                    + 6.0 * af * af * (am * am + 2.0 * jmax * vf)
                    + 12.0
                        * jmax
                        * (2.0 * am * jmax * (p0 - pf) + am * am * (v0 + vf)
                            + jmax * (-v0 * v0 + vf * vf)))
                    / (12.0 * j2 * j2),
            ];

            for t in roots::quartic_monic(polynom[1], polynom[2], polynom[3], polynom[4]) {
                if t < 0.0 {
                    continue;
                }
                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t + a0 / jmax;
                profile.t[3] = 0.0;
                profile.t[4] = am / jmax;
                profile.t[5] = -(a0 * a0 - af * af
                    + 4.0 * a0 * jmax * t
                    + 2.0 * (am * am + jmax * (jmax * t * t + v0 - vf)))
                    / (2.0 * am * jmax);
                profile.t[6] = profile.t[4] - af / jmax;

                self.try_add(profile, JerkSigns::UDUD, ReachedLimits::Acc1, jmax);
            }
        }
    }

    fn time_acc0(&mut self, profile: &mut Profile, _vmax: f64, amax: f64, _amin: f64, jmax: f64) {
        let a0 = self.a0;
        let af = self.af;
        let (p0, v0, pf, vf) = (self.p0, self.v0, self.pf, self.vf);
        let j2 = jmax * jmax;

        // UDDU
        {
            let polynom = [
                1.0,
                (2.0 * amax) / jmax,
                (-af * af + amax * amax + 2.0 * jmax * vf) / j2,
                (-2.0 * amax * (af * af - 2.0 * jmax * vf)) / (j2 * jmax),
                (-3.0 * p4(a0) + 3.0 * p4(af) + 8.0 * cube(a0) * amax
                    - 8.0 * cube(af) * amax
                    - 24.0 * a0 * amax * jmax * v0
                    - 6.0 * a0 * a0 * (amax * amax - 2.0 * jmax * v0)
                    + 24.0 * af * amax * jmax * vf
                    - 6.0 * af * af * (amax * amax + 2.0 * jmax * vf)
                    + 12.0
                        * jmax
                        * (2.0 * amax * jmax * (p0 - pf)
                            + amax * amax * (v0 + vf)
                            + jmax * (-v0 * v0 + vf * vf)))
                    / (12.0 * j2 * j2),
            ];

            for t in roots::quartic_monic(polynom[1], polynom[2], polynom[3], polynom[4]) {
                if t < 0.0 {
                    continue;
                }
                profile.t[0] = (-a0 + amax) / jmax;
                profile.t[1] = (a0 * a0 / 2.0 - af * af / 2.0 - amax * amax + j2 * t * t
                    - jmax * (v0 - vf))
                    / (amax * jmax);
                profile.t[2] = profile.t[0] + a0 / jmax;
                profile.t[3] = 0.0;
                profile.t[4] = t;
                profile.t[5] = 0.0;
                profile.t[6] = profile.t[4] + af / jmax;

                profile.t[2] = (profile.t[2] + profile.t[4]) / 2.0;
                profile.t[4] = profile.t[2];

                self.try_add(profile, JerkSigns::UDDU, ReachedLimits::Acc0, jmax);
            }
        }

        // UDUD
        if fabs(af) > EPS {
            let polynom = [
                1.0,
                (-2.0 * amax) / jmax,
                -((af * af + amax * amax + 2.0 * jmax * vf) / j2),
                (2.0 * amax * (af * af + 2.0 * jmax * vf)) / (j2 * jmax),
                (-3.0 * p4(a0) + 3.0 * p4(af) + 8.0 * cube(a0) * amax
                    - 8.0 * cube(af) * amax
                    - 24.0 * a0 * amax * jmax * v0
                    - 6.0 * a0 * a0 * (amax * amax - 2.0 * jmax * v0)
                    - 24.0 * af * amax * jmax * vf
                    + 6.0 * af * af * (amax * amax + 2.0 * jmax * vf)
                    + 12.0
                        * jmax
                        * (2.0 * amax * jmax * (p0 - pf)
                            + amax * amax * (v0 + vf)
                            + jmax * (-v0 * v0 + vf * vf)))
                    / (12.0 * j2 * j2),
            ];

            for t in roots::quartic_monic(polynom[1], polynom[2], polynom[3], polynom[4]) {
                if t < 0.0 {
                    continue;
                }
                profile.t[0] = (-a0 + amax) / jmax;
                profile.t[1] = (a0 * a0 + af * af
                    - 2.0 * (amax * amax + jmax * (jmax * t * t + v0 - vf)))
                    / (2.0 * amax * jmax);
                profile.t[2] = profile.t[0] + a0 / jmax;
                profile.t[3] = 0.0;
                profile.t[4] = t;
                profile.t[5] = 0.0;
                profile.t[6] = profile.t[4] - af / jmax;

                self.try_add(profile, JerkSigns::UDUD, ReachedLimits::Acc0, jmax);
            }
        }
    }

    fn time_none(&mut self, profile: &mut Profile, _vmax: f64, _amax: f64, _amin: f64, jmax: f64) {
        let a0 = self.a0;
        let af = self.af;
        let (p0, v0, pf, vf) = (self.p0, self.v0, self.pf, self.vf);

        if fabs(v0) < EPS && fabs(a0) < EPS && fabs(vf) < EPS && fabs(af) < EPS {
            // Rest to rest: four equal ramps.
            let t = cbrt((pf - p0) / (2.0 * jmax));
            profile.t = [t, 0.0, t, 0.0, t, 0.0, t];
            self.try_add(profile, JerkSigns::UDDU, ReachedLimits::None, jmax);
            return;
        }

        let j2 = jmax * jmax;

        // UDDU
        {
            let den = -a0 * a0 + af * af + 2.0 * jmax * (v0 - vf);
            let h0 = cube(af) + 3.0 * j2 * (-p0 + pf) - 3.0 * af * jmax * vf;
            let polynom = [
                1.0,
                (-4.0
                    * (2.0 * cube(a0) + h0 - 3.0 * a0 * (af * af + jmax * (v0 - 2.0 * vf))))
                    / (3.0 * jmax * den),
                (-3.0 * p4(a0) + sq(af * af + 2.0 * jmax * (v0 - vf)) - 8.0 * a0 * h0
                    + 2.0 * a0 * a0 * (5.0 * af * af - 2.0 * jmax * (v0 + 5.0 * vf)))
                    / (2.0 * j2 * den),
                -(p5(a0) + 8.0 * (a0 * a0 + jmax * v0) * h0
                    + cube(a0) * (-6.0 * af * af + 4.0 * jmax * (v0 + 3.0 * vf))
                    - 3.0
                        * a0
                        * (p4(af) + 4.0 * af * af * jmax * (v0 - vf)
                            - 4.0 * j2 * (v0 * v0 + 2.0 * v0 * vf - vf * vf)))
                    / (3.0 * j2 * jmax * den),
                -(p6(a0)
                    + p6(af)
                    + 48.0 * cube(af) * j2 * (p0 - pf)
                    - 144.0 * af * j2 * jmax * (p0 - pf) * vf
                    - 6.0 * p4(af) * jmax * (3.0 * v0 + vf)
                    + 16.0 * cube(a0) * h0
                    + 48.0 * a0 * jmax * v0 * h0
                    - 36.0 * af * af * j2 * (v0 * v0 - 2.0 * v0 * vf - vf * vf)
                    - 72.0
                        * j2
                        * jmax
                        * (jmax * sq(p0 - pf) - (v0 - vf) * sq(v0 + vf))
                    + p4(a0) * (-9.0 * af * af + 6.0 * jmax * (v0 + 3.0 * vf))
                    - 9.0
                        * a0
                        * a0
                        * (p4(af) + 4.0 * af * af * jmax * (v0 - vf)
                            - 4.0 * j2 * (v0 * v0 + 2.0 * v0 * vf - vf * vf)))
                    / (36.0 * j2 * j2 * den),
            ];

            for t in roots::quartic_monic(polynom[1], polynom[2], polynom[3], polynom[4]) {
                if t < 0.0 {
                    continue;
                }
                let mut t = t;
                // Refine near-miss roots with a sign-bracketed shrink.
                if fabs(roots::poly_eval(&polynom, t)) > 1e-9 {
                    t = roots::shrink_interval(&polynom, t - 1e-5, t + 1e-5, 1e-14);
                }

                let h1 = a0 * a0 / 2.0 + af * af / 2.0
                    + 2.0 * a0 * jmax * t
                    + jmax * (jmax * t * t + v0 - vf);
                if h1 < 0.0 {
                    continue;
                }

                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t + a0 / jmax;
                profile.t[3] = 0.0;
                profile.t[4] = sqrt(h1) / fabs(jmax);
                profile.t[5] = 0.0;
                profile.t[6] = profile.t[4] + af / jmax;

                profile.t[2] = (profile.t[2] + profile.t[4]) / 2.0;
                profile.t[4] = profile.t[2];

                self.try_add(profile, JerkSigns::UDDU, ReachedLimits::None, jmax);
            }
        }

        // UDUD: sextic, swept between the stationary points of its quintic
        // derivative.
        if fabs(af) > EPS {
            let h0 = cube(af) + 3.0 * j2 * (-p0 + pf) + 3.0 * af * jmax * vf;
            let polynom = [
                1.0,
                6.0 * a0 / jmax,
                (53.0 * a0 * a0 + af * af + 2.0 * jmax * (7.0 * v0 + vf)) / (4.0 * j2),
                (40.0 * cube(a0) - cube(af) + 3.0 * j2 * (p0 - pf) - 3.0 * af * jmax * vf
                    + 3.0 * a0 * (af * af + 13.0 * jmax * v0 + 2.0 * jmax * vf))
                    / (3.0 * j2 * jmax),
                (51.0 * p4(a0) - p4(af)
                    + 4.0 * af * af * jmax * (v0 - vf)
                    + 2.0 * a0 * a0 * (5.0 * af * af + 58.0 * jmax * v0 + 10.0 * jmax * vf)
                    - 8.0 * a0 * h0
                    + 4.0 * j2 * (7.0 * v0 * v0 + 2.0 * v0 * vf - vf * vf))
                    / (8.0 * j2 * j2),
                (17.0 * p5(a0)
                    + 2.0 * cube(a0) * (3.0 * af * af + 34.0 * jmax * v0 + 6.0 * jmax * vf)
                    - 8.0 * (a0 * a0 + jmax * v0) * h0
                    - 3.0
                        * a0
                        * (p4(af)
                            + 4.0 * af * af * jmax * (-v0 + vf)
                            + 4.0 * j2 * (-5.0 * v0 * v0 - 2.0 * v0 * vf + vf * vf)))
                    / (12.0 * j2 * j2 * jmax),
                -(-17.0 * p6(a0)
                    + p6(af)
                    + 48.0 * cube(af) * j2 * (p0 - pf)
                    + 144.0 * af * j2 * jmax * (p0 - pf) * vf
                    + 6.0 * p4(af) * jmax * (3.0 * v0 + vf)
                    - 3.0 * p4(a0) * (3.0 * af * af + 34.0 * jmax * v0 + 6.0 * jmax * vf)
                    + 16.0 * cube(a0) * h0
                    + 48.0 * a0 * jmax * v0 * h0
                    - 36.0 * af * af * j2 * (v0 * v0 - 2.0 * v0 * vf - vf * vf)
                    - 72.0
                        * j2
                        * jmax
                        * (jmax * sq(p0 - pf) + (v0 - vf) * sq(v0 + vf))
                    + 9.0
                        * a0
                        * a0
                        * (p4(af)
                            + 4.0 * af * af * jmax * (-v0 + vf)
                            + 4.0 * j2 * (-5.0 * v0 * v0 - 2.0 * v0 * vf + vf * vf)))
                    / (144.0 * j2 * j2 * j2),
            ];

            let deriv = [
                1.0,
                5.0 / 6.0 * polynom[1],
                4.0 / 6.0 * polynom[2],
                3.0 / 6.0 * polynom[3],
                2.0 / 6.0 * polynom[4],
                1.0 / 6.0 * polynom[5],
            ];

            let dd_extrema = roots::quartic_monic(
                4.0 / 5.0 * deriv[1],
                3.0 / 5.0 * deriv[2],
                2.0 / 5.0 * deriv[3],
                1.0 / 5.0 * deriv[4],
            );

            let tz_max: f64 = 1000.0;

            let mut deriv_intervals: heapless::Vec<(f64, f64), 6> = heapless::Vec::new();
            let mut current = 0.0;
            for &tz in dd_extrema.iter() {
                if tz <= 0.0 || tz >= tz_max {
                    continue;
                }
                if roots::poly_eval(&deriv, current) * roots::poly_eval(&deriv, tz) < 0.0 {
                    let _ = deriv_intervals.push((current, tz));
                }
                current = tz;
            }
            if roots::poly_eval(&deriv, current) * roots::poly_eval(&deriv, tz_max) < 0.0 {
                let _ = deriv_intervals.push((current, tz_max));
            }

            let mut intervals: heapless::Vec<(f64, f64), 6> = heapless::Vec::new();
            let mut current = 0.0;
            for &(lower, upper) in deriv_intervals.iter() {
                let tz = roots::shrink_interval(&deriv, lower, upper, 1e-14);
                if tz <= 0.0 {
                    continue;
                }
                if roots::poly_eval(&polynom, current) * roots::poly_eval(&polynom, tz) < 0.0 {
                    let _ = intervals.push((current, tz));
                }
                current = tz;
            }
            if roots::poly_eval(&polynom, current) * roots::poly_eval(&polynom, tz_max) < 0.0 {
                let _ = intervals.push((current, tz_max));
            }

            for &(lower, upper) in intervals.iter() {
                let t = roots::shrink_interval(&polynom, lower, upper, 1e-14);
                if t < 0.0 {
                    continue;
                }

                let h1 = -a0 * a0 + af * af
                    - 4.0 * a0 * jmax * t
                    - 2.0 * jmax * (jmax * t * t + v0 - vf);
                if h1 < 0.0 {
                    continue;
                }

                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t + a0 / jmax;
                profile.t[3] = 0.0;
                profile.t[4] = sqrt(h1 / 2.0) / fabs(jmax);
                profile.t[5] = 0.0;
                profile.t[6] = profile.t[4] - af / jmax;

                self.try_add(profile, JerkSigns::UDUD, ReachedLimits::None, jmax);
            }
        }
    }
}
