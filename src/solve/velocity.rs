//! Profile searches for the velocity control interface.
//!
//! The target is a velocity/acceleration pair; position integrates freely.
//! Shapes are ramp–plateau–ramp on the acceleration, held in the first three
//! segments of the profile (plus the fifth segment for the monotone
//! fixed-time shape). No velocity bound applies.

use crate::math::{fabs, roots, sqrt, EPS};
use crate::profile::{JerkSigns, Profile, ReachedLimits};

use super::FeasibleSet;

pub(crate) struct VelocityFastest {
    v0: f64,
    a0: f64,
    vf: f64,
    af: f64,
    amax: f64,
    amin: f64,
    jmax: f64,
}

impl VelocityFastest {
    pub fn new(v0: f64, a0: f64, vf: f64, af: f64, amax: f64, amin: f64, jmax: f64) -> Self {
        Self {
            v0,
            a0,
            vf,
            af,
            amax,
            amin,
            jmax,
        }
    }

    /// Try one direction; pushes a validated candidate into `best` if it is
    /// faster than what is there.
    fn try_direction(&self, template: &Profile, jmax: f64, apl: f64, best: &mut Option<Profile>) {
        let (v0, a0, vf, af) = (self.v0, self.a0, self.vf, self.af);

        let ap_sq = jmax * (vf - v0) + (a0 * a0 + af * af) / 2.0;
        if ap_sq < 0.0 {
            return;
        }
        let s = if jmax > 0.0 { 1.0 } else { -1.0 };
        let ap = s * sqrt(ap_sq);

        let (t0, t1, t2) = if ap_sq > apl * apl {
            // Plateau at the acceleration bound.
            (
                (apl - a0) / jmax,
                (vf - v0 - (2.0 * apl * apl - a0 * a0 - af * af) / (2.0 * jmax)) / apl,
                (apl - af) / jmax,
            )
        } else {
            ((ap - a0) / jmax, 0.0, (ap - af) / jmax)
        };

        let mut profile = template.clone();
        profile.t = [t0, t1, t2, 0.0, 0.0, 0.0, 0.0];
        let tag = if t1 >= EPS { ReachedLimits::Acc0 } else { ReachedLimits::None };
        if profile.check_velocity(JerkSigns::UDDU, tag, jmax, self.amax, self.amin) {
            profile.direction = if jmax > 0.0 {
                crate::profile::Direction::Up
            } else {
                crate::profile::Direction::Down
            };
            let faster = best
                .as_ref()
                .map_or(true, |b| profile.t_sum[6] < b.t_sum[6]);
            if faster {
                *best = Some(profile);
            }
        }
    }

    /// Time-optimal velocity-interface profile; no blocked gaps exist.
    pub fn solve(&self, template: &Profile) -> Option<FeasibleSet> {
        let mut best: Option<Profile> = None;
        if self.vf >= self.v0 {
            self.try_direction(template, self.jmax, self.amax, &mut best);
            self.try_direction(template, -self.jmax, self.amin, &mut best);
        } else {
            self.try_direction(template, -self.jmax, self.amin, &mut best);
            self.try_direction(template, self.jmax, self.amax, &mut best);
        }
        best.map(FeasibleSet::from_profile)
    }
}

pub(crate) struct VelocityTimed {
    tf: f64,
    v0: f64,
    a0: f64,
    vf: f64,
    af: f64,
    amax: f64,
    amin: f64,
    jmax: f64,
}

impl VelocityTimed {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tf: f64,
        v0: f64,
        a0: f64,
        vf: f64,
        af: f64,
        amax: f64,
        amin: f64,
        jmax: f64,
    ) -> Self {
        Self {
            tf,
            v0,
            a0,
            vf,
            af,
            amax,
            amin,
            jmax,
        }
    }

    /// Ramp–plateau–ramp with the plateau acceleration free; the velocity
    /// balance is an exact quadratic in it.
    fn try_plateau(&self, profile: &mut Profile, jmax: f64) -> bool {
        let (v0, a0, vf, af) = (self.v0, self.a0, self.vf, self.af);
        let tf = self.tf;

        let residual = |ap: f64| {
            let t0 = (ap - a0) / jmax;
            let t2 = (ap - af) / jmax;
            let t1 = tf - t0 - t2;
            (ap * ap - a0 * a0) / (2.0 * jmax) + ap * t1 + (ap * ap - af * af) / (2.0 * jmax)
                - (vf - v0)
        };

        for ap in roots::probe_quadratic(residual) {
            if !ap.is_finite() {
                continue;
            }
            let t0 = (ap - a0) / jmax;
            let t2 = (ap - af) / jmax;
            let t1 = tf - t0 - t2;
            if t0 < 0.0 || t1 < 0.0 || t2 < 0.0 {
                continue;
            }
            profile.t = [t0, t1, t2, 0.0, 0.0, 0.0, 0.0];
            let tag = if t1 >= EPS { ReachedLimits::Acc0 } else { ReachedLimits::None };
            if profile.check_velocity_with_timing(
                JerkSigns::UDDU,
                tag,
                tf,
                jmax,
                self.amax,
                self.amin,
            ) {
                return true;
            }
        }
        false
    }

    /// Monotone acceleration between `a0` and `af`: ramp, hold, ramp the
    /// same way. The hold duration is fixed by the boundary accelerations,
    /// so the hold level follows linearly.
    fn try_monotone(&self, profile: &mut Profile, jmax: f64) -> bool {
        let (v0, a0, vf, af) = (self.v0, self.a0, self.vf, self.af);

        let t1 = self.tf - (af - a0) / jmax;
        if t1 < 0.0 || fabs(t1) < 1e-14 {
            return false;
        }
        let ap = (vf - v0 - (af * af - a0 * a0) / (2.0 * jmax)) / t1;
        let t0 = (ap - a0) / jmax;
        let t4 = (af - ap) / jmax;
        if t0 < 0.0 || t4 < 0.0 {
            return false;
        }
        profile.t = [t0, t1, 0.0, 0.0, t4, 0.0, 0.0];
        profile.check_velocity_with_timing(
            JerkSigns::UDUD,
            ReachedLimits::None,
            self.tf,
            jmax,
            self.amax,
            self.amin,
        )
    }

    /// Search for a velocity-interface profile of duration `tf`.
    pub fn solve(&self, profile: &mut Profile) -> bool {
        let (first, second) = if self.vf >= self.v0 {
            (self.jmax, -self.jmax)
        } else {
            (-self.jmax, self.jmax)
        };
        self.try_plateau(profile, first)
            || self.try_plateau(profile, second)
            || self.try_monotone(profile, first)
            || self.try_monotone(profile, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(v0: f64, a0: f64, vf: f64, af: f64) -> Profile {
        let mut profile = Profile::default();
        profile.set_boundary(0.0, v0, a0, 0.0, vf, af);
        profile
    }

    #[test]
    fn ramp_to_velocity() {
        // Reaching dv = 1 with amax = 1, jmax = 1: ramp 1 s up, hold 0 s,
        // ramp 1 s down covers exactly dv = 1 (triangular, at the bound).
        let solver = VelocityFastest::new(0.0, 0.0, 1.0, 0.0, 1.0, -1.0, 1.0);
        let set = solver.solve(&template(0.0, 0.0, 1.0, 0.0)).unwrap();
        let p = &set.fastest;
        assert!((p.v[7] - 1.0).abs() < 1e-9);
        assert!((p.a[7]).abs() < 1e-10);
        assert!((set.t_min - 2.0).abs() < 1e-9);
    }

    #[test]
    fn large_velocity_change_holds_plateau() {
        let solver = VelocityFastest::new(0.0, 0.0, 4.0, 0.0, 1.0, -1.0, 1.0);
        let set = solver.solve(&template(0.0, 0.0, 4.0, 0.0)).unwrap();
        let p = &set.fastest;
        assert_eq!(p.limits, ReachedLimits::Acc0);
        assert!(p.t[1] > 0.0);
        // 1 s ramp + 3 s hold + 1 s ramp.
        assert!((set.t_min - 5.0).abs() < 1e-9);
    }

    #[test]
    fn deceleration_uses_down_direction() {
        let solver = VelocityFastest::new(2.0, 0.0, 0.5, 0.0, 1.0, -1.0, 1.0);
        let set = solver.solve(&template(2.0, 0.0, 0.5, 0.0)).unwrap();
        assert_eq!(set.fastest.direction, crate::profile::Direction::Down);
        assert!((set.fastest.v[7] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn timed_solution_hits_duration() {
        let solver = VelocityTimed::new(6.0, 0.0, 0.0, 1.0, 0.0, 1.0, -1.0, 1.0);
        let mut profile = template(0.0, 0.0, 1.0, 0.0);
        assert!(solver.solve(&mut profile));
        assert!((profile.total_duration() - 6.0).abs() < 1e-9);
        assert!((profile.v[7] - 1.0).abs() < 1e-9);
        assert!((profile.a[7]).abs() < 1e-10);
    }

    #[test]
    fn timed_monotone_acceleration_branch() {
        // The hold level must sit strictly between a0 and af here; both
        // overshooting plateau shapes run out of time.
        let solver = VelocityTimed::new(2.0, 0.0, 0.2, 0.5, 0.3, 1.0, -1.0, 1.0);
        let mut profile = template(0.0, 0.2, 0.5, 0.3);
        assert!(solver.solve(&mut profile));
        assert!((profile.total_duration() - 2.0).abs() < 1e-9);
        assert!((profile.v[7] - 0.5).abs() < 1e-9);
        assert!((profile.a[7] - 0.3).abs() < 1e-10);
    }
}
