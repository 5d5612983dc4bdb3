//! Seven-segment constant-jerk profile for a single axis.
//!
//! A profile stores the segment durations and jerks of one candidate
//! trajectory together with the integrated kinematic state at every segment
//! boundary. Candidate timings proposed by the solvers are accepted or
//! rejected by [`Profile::check`], which re-integrates the profile and
//! verifies the boundary conditions and limits.

mod brake;

pub use brake::BrakeProfile;

use crate::math::{
    fabs, roots, A_PRECISION, EPS, LIMIT_EPS, P_PRECISION, T_PRECISION, V_PRECISION,
};

/// Jerk sign pattern of the seven segments.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JerkSigns {
    /// +jerk, coast, −jerk, cruise, −jerk, coast, +jerk.
    #[default]
    UDDU,
    /// +jerk, coast, −jerk, cruise, +jerk, coast, −jerk.
    UDUD,
}

/// Direction of the profile's leading jerk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Positive leading jerk.
    #[default]
    Up,
    /// Negative leading jerk.
    Down,
}

/// Which kinematic limits the profile shape holds a plateau at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReachedLimits {
    /// Initial-side acceleration, final-side acceleration and velocity.
    Acc0Acc1Vel,
    /// Initial-side and final-side acceleration.
    Acc0Acc1,
    /// Initial-side acceleration and velocity.
    Acc0Vel,
    /// Final-side acceleration and velocity.
    Acc1Vel,
    /// Velocity only.
    Vel,
    /// Initial-side acceleration only.
    Acc0,
    /// Final-side acceleration only.
    Acc1,
    /// No limit plateau.
    #[default]
    None,
}

impl ReachedLimits {
    #[inline]
    pub(crate) fn has_acc0(self) -> bool {
        matches!(
            self,
            ReachedLimits::Acc0 | ReachedLimits::Acc0Acc1 | ReachedLimits::Acc0Vel | ReachedLimits::Acc0Acc1Vel
        )
    }

    #[inline]
    pub(crate) fn has_acc1(self) -> bool {
        matches!(
            self,
            ReachedLimits::Acc1 | ReachedLimits::Acc0Acc1 | ReachedLimits::Acc1Vel | ReachedLimits::Acc0Acc1Vel
        )
    }

    #[inline]
    pub(crate) fn has_vel(self) -> bool {
        matches!(
            self,
            ReachedLimits::Vel | ReachedLimits::Acc0Vel | ReachedLimits::Acc1Vel | ReachedLimits::Acc0Acc1Vel
        )
    }
}

/// Extreme positions of one axis over the trajectory, with the times at
/// which they occur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionExtrema {
    /// Minimum position.
    pub min: f64,
    /// Maximum position.
    pub max: f64,
    /// Time of the minimum position.
    pub t_min: f64,
    /// Time of the maximum position.
    pub t_max: f64,
}

impl Default for PositionExtrema {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            t_min: 0.0,
            t_max: 0.0,
        }
    }
}

/// One axis' seven-segment constant-jerk trajectory candidate.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    /// Segment durations.
    pub t: [f64; 7],
    /// Cumulative segment durations; `t_sum[6]` is the main-profile duration.
    pub t_sum: [f64; 7],
    /// Segment jerks.
    pub j: [f64; 7],
    /// Acceleration at the start of each segment plus the endpoint.
    pub a: [f64; 8],
    /// Velocity at the start of each segment plus the endpoint.
    pub v: [f64; 8],
    /// Position at the start of each segment plus the endpoint.
    pub p: [f64; 8],
    /// Target position.
    pub pf: f64,
    /// Target velocity.
    pub vf: f64,
    /// Target acceleration.
    pub af: f64,
    /// Optional brake pre-profile.
    pub brake: BrakeProfile,
    /// Jerk sign pattern.
    pub jerk_signs: JerkSigns,
    /// Direction of the leading jerk.
    pub direction: Direction,
    /// Limits the shape holds a plateau at.
    pub limits: ReachedLimits,
}

impl Profile {
    /// Integrate one constant-jerk segment of duration `t`.
    #[inline]
    pub fn integrate(t: f64, p0: f64, v0: f64, a0: f64, j: f64) -> (f64, f64, f64) {
        (
            p0 + t * (v0 + t * (a0 / 2.0 + t * j / 6.0)),
            v0 + t * (a0 + t * j / 2.0),
            a0 + t * j,
        )
    }

    /// Set the initial state and the target boundary values.
    pub fn set_boundary(&mut self, p0: f64, v0: f64, a0: f64, pf: f64, vf: f64, af: f64) {
        self.p[0] = p0;
        self.v[0] = v0;
        self.a[0] = a0;
        self.pf = pf;
        self.vf = vf;
        self.af = af;
    }

    /// Total main-profile duration.
    #[inline]
    pub fn total_duration(&self) -> f64 {
        self.t_sum[6]
    }

    fn jerk_pattern(signs: JerkSigns) -> [f64; 7] {
        match signs {
            JerkSigns::UDDU => [1.0, 0.0, -1.0, 0.0, -1.0, 0.0, 1.0],
            JerkSigns::UDUD => [1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0],
        }
    }

    fn integrate_segments(&mut self, signs: JerkSigns, limits: ReachedLimits, jf: f64) -> bool {
        if self.t[0] < 0.0 {
            return false;
        }
        self.t_sum[0] = self.t[0];
        for i in 0..6 {
            if self.t[i + 1] < 0.0 {
                return false;
            }
            self.t_sum[i + 1] = self.t_sum[i] + self.t[i + 1];
        }

        // The claimed limit plateaus must actually exist; degenerate shapes
        // are covered by the smaller tag's family.
        if limits.has_acc0() && self.t[1] < EPS {
            return false;
        }
        if limits.has_acc1() && self.t[5] < EPS {
            return false;
        }
        if limits.has_vel() && self.t[3] < EPS {
            return false;
        }

        let pattern = Self::jerk_pattern(signs);
        for i in 0..7 {
            self.j[i] = if self.t[i] > 0.0 { pattern[i] * jf } else { 0.0 };
        }

        for i in 0..7 {
            self.a[i + 1] = self.a[i] + self.t[i] * self.j[i];
            self.v[i + 1] = self.v[i] + self.t[i] * (self.a[i] + self.t[i] * self.j[i] / 2.0);
            self.p[i + 1] = self.p[i]
                + self.t[i]
                    * (self.v[i] + self.t[i] * (self.a[i] / 2.0 + self.t[i] * self.j[i] / 6.0));
            if limits.has_vel() && i == 2 {
                // Entering the cruise: null the integration drift so the
                // plateau is exactly constant-velocity.
                self.a[3] = 0.0;
            }
        }
        true
    }

    fn within_limits(&self, vmax: f64, vmin: f64, amax: f64, amin: f64) -> bool {
        let (v_upp, v_low) = if vmax > vmin { (vmax, vmin) } else { (vmin, vmax) };
        let (a_upp, a_low) = if amax > amin { (amax, amin) } else { (amin, amax) };

        // Jerk is piecewise constant, so acceleration extrema sit on segment
        // boundaries.
        for i in 0..8 {
            if self.a[i] > a_upp + LIMIT_EPS || self.a[i] < a_low - LIMIT_EPS {
                return false;
            }
        }

        for i in 0..8 {
            if self.v[i] > v_upp + LIMIT_EPS || self.v[i] < v_low - LIMIT_EPS {
                return false;
            }
        }
        // Interior velocity extremum wherever the acceleration crosses zero
        // inside a segment.
        for i in 0..7 {
            if self.j[i] != 0.0 && self.a[i] * self.a[i + 1] < 0.0 {
                let v_ext = self.v[i] - self.a[i] * self.a[i] / (2.0 * self.j[i]);
                if v_ext > v_upp + LIMIT_EPS || v_ext < v_low - LIMIT_EPS {
                    return false;
                }
            }
        }
        true
    }

    #[inline]
    fn endpoint_matches(&self) -> bool {
        fabs(self.p[7] - self.pf) < P_PRECISION
            && fabs(self.v[7] - self.vf) < V_PRECISION
            && fabs(self.a[7] - self.af) < A_PRECISION
    }

    /// Validate a proposed timing for the position interface.
    ///
    /// Re-integrates the profile from its initial state, verifying
    /// non-negative durations, binding plateaus for the claimed tag, the
    /// kinematic limits (including interior velocity extrema) and the target
    /// endpoint. On success the jerk array, pattern and tag are committed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn check(
        &mut self,
        signs: JerkSigns,
        limits: ReachedLimits,
        jf: f64,
        vmax: f64,
        vmin: f64,
        amax: f64,
        amin: f64,
    ) -> bool {
        if !self.integrate_segments(signs, limits, jf) {
            return false;
        }
        if !self.within_limits(vmax, vmin, amax, amin) {
            return false;
        }
        if !self.endpoint_matches() {
            return false;
        }
        self.jerk_signs = signs;
        self.limits = limits;
        true
    }

    /// [`Profile::check`] with an exact total-duration requirement.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn check_with_timing(
        &mut self,
        signs: JerkSigns,
        limits: ReachedLimits,
        tf: f64,
        jf: f64,
        vmax: f64,
        vmin: f64,
        amax: f64,
        amin: f64,
    ) -> bool {
        self.check(signs, limits, jf, vmax, vmin, amax, amin)
            && fabs(self.t_sum[6] - tf) < T_PRECISION
    }

    /// [`Profile::check_with_timing`] for shapes that scale the jerk down:
    /// additionally enforces the jerk bound.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn check_with_timing_jerk(
        &mut self,
        signs: JerkSigns,
        limits: ReachedLimits,
        tf: f64,
        jf: f64,
        jmax: f64,
        vmax: f64,
        vmin: f64,
        amax: f64,
        amin: f64,
    ) -> bool {
        fabs(jf) < fabs(jmax) + LIMIT_EPS
            && self.check_with_timing(signs, limits, tf, jf, vmax, vmin, amax, amin)
    }

    /// Validate a proposed timing for the velocity interface: no velocity
    /// bound applies and the final position is whatever the integration
    /// yields.
    pub(crate) fn check_velocity(
        &mut self,
        signs: JerkSigns,
        limits: ReachedLimits,
        jf: f64,
        amax: f64,
        amin: f64,
    ) -> bool {
        if !self.integrate_segments(signs, limits, jf) {
            return false;
        }
        let (a_upp, a_low) = if amax > amin { (amax, amin) } else { (amin, amax) };
        for i in 0..8 {
            if self.a[i] > a_upp + LIMIT_EPS || self.a[i] < a_low - LIMIT_EPS {
                return false;
            }
        }
        if fabs(self.v[7] - self.vf) < V_PRECISION && fabs(self.a[7] - self.af) < A_PRECISION {
            self.pf = self.p[7];
            self.jerk_signs = signs;
            self.limits = limits;
            true
        } else {
            false
        }
    }

    /// [`Profile::check_velocity`] with an exact total-duration requirement.
    pub(crate) fn check_velocity_with_timing(
        &mut self,
        signs: JerkSigns,
        limits: ReachedLimits,
        tf: f64,
        jf: f64,
        amax: f64,
        amin: f64,
    ) -> bool {
        self.check_velocity(signs, limits, jf, amax, amin)
            && fabs(self.t_sum[6] - tf) < T_PRECISION
    }

    fn scan_segment_extrema(
        offset: f64,
        duration: f64,
        p: f64,
        v: f64,
        a: f64,
        j: f64,
        extrema: &mut PositionExtrema,
    ) {
        let mut consider = |tau: f64| {
            let (pos, _, _) = Self::integrate(tau, p, v, a, j);
            if pos < extrema.min {
                extrema.min = pos;
                extrema.t_min = offset + tau;
            }
            if pos > extrema.max {
                extrema.max = pos;
                extrema.t_max = offset + tau;
            }
        };

        consider(0.0);
        consider(duration);

        // Interior stationary points of the position: roots of the velocity.
        if j != 0.0 {
            let disc = a * a - 2.0 * j * v;
            if disc >= 0.0 {
                let sq = crate::math::sqrt(disc);
                for tau in [(-a - sq) / j, (-a + sq) / j] {
                    if tau > 0.0 && tau < duration {
                        consider(tau);
                    }
                }
            }
        } else if a != 0.0 {
            let tau = -v / a;
            if tau > 0.0 && tau < duration {
                consider(tau);
            }
        }
    }

    /// Position extrema over the brake and main segments.
    pub fn position_extrema(&self) -> PositionExtrema {
        let mut extrema = PositionExtrema::default();

        let mut offset = 0.0;
        for i in 0..2 {
            if self.brake.t[i] <= 0.0 {
                break;
            }
            Self::scan_segment_extrema(
                offset,
                self.brake.t[i],
                self.brake.p[i],
                self.brake.v[i],
                self.brake.a[i],
                self.brake.j[i],
                &mut extrema,
            );
            offset += self.brake.t[i];
        }

        for i in 0..7 {
            if self.t[i] <= 0.0 {
                continue;
            }
            let start = self.brake.duration + if i > 0 { self.t_sum[i - 1] } else { 0.0 };
            Self::scan_segment_extrema(
                start,
                self.t[i],
                self.p[i],
                self.v[i],
                self.a[i],
                self.j[i],
                &mut extrema,
            );
        }

        if extrema.min > extrema.max {
            // Zero-length profile: the extremum is the held position.
            extrema.min = self.pf;
            extrema.max = self.pf;
        }
        extrema
    }

    /// Earliest time at which the axis passes `position`, if it does.
    pub fn first_time_at_position(&self, position: f64) -> Option<f64> {
        for i in 0..7 {
            if self.t[i] <= 0.0 {
                continue;
            }
            let start = self.brake.duration + if i > 0 { self.t_sum[i - 1] } else { 0.0 };
            if fabs(self.p[i] - position) < P_PRECISION {
                return Some(start);
            }

            let candidates = roots::cubic(
                self.j[i] / 6.0,
                self.a[i] / 2.0,
                self.v[i],
                self.p[i] - position,
            );
            let mut first: Option<f64> = None;
            for tau in candidates {
                let tau = if tau >= -T_PRECISION { tau.max(0.0) } else { continue };
                if tau <= self.t[i] && first.map_or(true, |f| tau < f) {
                    first = Some(tau);
                }
            }
            if let Some(tau) = first {
                return Some(start + tau);
            }
        }

        if fabs(self.p[7] - position) < P_PRECISION {
            return Some(self.brake.duration + self.t_sum[6]);
        }
        None
    }
}
