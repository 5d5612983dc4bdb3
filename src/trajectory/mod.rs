//! Trajectory calculation and sampling.
//!
//! [`Trajectory`] owns all per-axis buffers, sized once at construction.
//! `calculate` runs brake handling, the per-axis time-optimal search,
//! duration synchronization and the per-axis re-timing; afterwards the
//! trajectory is immutable sampling data.

mod sync;

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{CalculationError, Error, InputError, Result};
use crate::input::{ControlInterface, DurationDiscretization, MotionInput, Synchronization};
use crate::math::{fabs, fmax, EPS, T_PRECISION};
use crate::profile::{Direction, PositionExtrema, Profile, ReachedLimits};
use crate::solve::{FeasibleSet, PositionFastest, PositionTimed, VelocityFastest, VelocityTimed};

use sync::{select_duration, SyncSource};

/// Safety ceiling on the synchronized duration, in seconds. Only enforced
/// when the guard is enabled.
const MAX_DURATION: f64 = 7.6e3;

/// Where a sampled time lies relative to the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Inside the trajectory (brake or main profile).
    Active,
    /// Past the end; the state extrapolates at constant acceleration.
    PastEnd,
}

/// Synchronized multi-axis trajectory.
///
/// Construct once per axis count, then recompute in place with
/// [`Trajectory::calculate`]. Sampling is pure and safe to share between
/// readers once `calculate` has returned.
#[derive(Debug, Clone)]
pub struct Trajectory {
    dofs: usize,
    profiles: Vec<Profile>,
    duration: f64,
    limiting_dof: Option<usize>,
    independent_min_durations: Vec<f64>,
    blocks: Vec<FeasibleSet>,
    // Starting states of the main profiles, after the brake pre-profiles.
    p0s: Vec<f64>,
    v0s: Vec<f64>,
    a0s: Vec<f64>,
    min_velocity: Vec<f64>,
    min_acceleration: Vec<f64>,
    control_interfaces: Vec<ControlInterface>,
    synchronizations: Vec<Synchronization>,
    pd: Vec<f64>,
    scaled_jerk: Vec<f64>,
    possible_t_syncs: Vec<f64>,
    idx: Vec<usize>,
    extrema: Vec<PositionExtrema>,
    duration_cap: bool,
}

impl Trajectory {
    /// Create a trajectory for `dofs` axes. All buffers are allocated here;
    /// calculation and sampling never allocate.
    pub fn new(dofs: usize) -> Self {
        Self {
            dofs,
            profiles: vec![Profile::default(); dofs],
            duration: 0.0,
            limiting_dof: None,
            independent_min_durations: vec![0.0; dofs],
            blocks: vec![FeasibleSet::default(); dofs],
            p0s: vec![0.0; dofs],
            v0s: vec![0.0; dofs],
            a0s: vec![0.0; dofs],
            min_velocity: vec![0.0; dofs],
            min_acceleration: vec![0.0; dofs],
            control_interfaces: vec![ControlInterface::default(); dofs],
            synchronizations: vec![Synchronization::default(); dofs],
            pd: vec![0.0; dofs],
            scaled_jerk: vec![0.0; dofs],
            possible_t_syncs: vec![0.0; 3 * dofs + 1],
            idx: vec![0; 3 * dofs + 1],
            extrema: vec![PositionExtrema::default(); dofs],
            duration_cap: false,
        }
    }

    /// Enable the maximal-duration guard: `calculate` fails when the
    /// synchronized duration exceeds 7.6e3 s.
    pub fn with_duration_cap(mut self) -> Self {
        self.duration_cap = true;
        self
    }

    /// Number of axes.
    pub fn degrees_of_freedom(&self) -> usize {
        self.dofs
    }

    /// Synchronized duration of the last calculation.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The axis whose minimum duration set the synchronized duration, if
    /// the duration was not forced by a floor or discretization.
    pub fn limiting_dof(&self) -> Option<usize> {
        self.limiting_dof
    }

    /// Minimum independent duration of each axis.
    pub fn independent_min_durations(&self) -> &[f64] {
        &self.independent_min_durations
    }

    /// Read-only access to the per-axis profiles.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Calculate the synchronized time-optimal trajectory for `input`.
    ///
    /// `delta_time` is the control cycle; it is only used to snap the
    /// duration when the input requests discrete durations.
    ///
    /// # Errors
    ///
    /// Input inconsistencies surface as [`Error::Input`] before any math
    /// runs; solver failures as [`Error::Calculation`]. Partial state after
    /// an error is undefined.
    pub fn calculate(&mut self, input: &MotionInput, delta_time: f64) -> Result<()> {
        crate::input::validate_input(input, self.dofs)?;

        let discrete = input.duration_discretization == DurationDiscretization::Discrete;
        if discrete && delta_time <= 0.0 {
            return Err(Error::Input(InputError::InvalidDeltaTime { value: delta_time }));
        }

        for dof in 0..self.dofs {
            self.control_interfaces[dof] = input.control_interface_at(dof);
            self.synchronizations[dof] = input.synchronization_at(dof);

            if !input.is_enabled(dof) {
                // A disabled axis holds its current state for the whole
                // duration and does not constrain synchronization.
                let mut profile = Profile::default();
                profile.set_boundary(
                    input.current_position[dof],
                    input.current_velocity[dof],
                    input.current_acceleration[dof],
                    input.current_position[dof],
                    input.current_velocity[dof],
                    input.current_acceleration[dof],
                );
                profile.p[7] = profile.pf;
                profile.v[7] = profile.vf;
                profile.a[7] = profile.af;
                self.profiles[dof] = profile;
                self.blocks[dof] = FeasibleSet::default();
                self.independent_min_durations[dof] = 0.0;
                continue;
            }

            self.min_velocity[dof] = input.min_velocity_at(dof);
            self.min_acceleration[dof] = input.min_acceleration_at(dof);

            let profile = &mut self.profiles[dof];
            match self.control_interfaces[dof] {
                ControlInterface::Position => profile.brake.position_brake(
                    input.current_velocity[dof],
                    input.current_acceleration[dof],
                    input.max_velocity[dof],
                    self.min_velocity[dof],
                    input.max_acceleration[dof],
                    self.min_acceleration[dof],
                    input.max_jerk[dof],
                ),
                ControlInterface::Velocity => profile.brake.velocity_brake(
                    input.current_acceleration[dof],
                    input.max_acceleration[dof],
                    self.min_acceleration[dof],
                    input.max_jerk[dof],
                ),
            }

            let (p0, v0, a0) = profile.brake.finalize(
                input.current_position[dof],
                input.current_velocity[dof],
                input.current_acceleration[dof],
            );
            self.p0s[dof] = p0;
            self.v0s[dof] = v0;
            self.a0s[dof] = a0;

            profile.set_boundary(
                p0,
                v0,
                a0,
                input.target_position[dof],
                input.target_velocity[dof],
                input.target_acceleration[dof],
            );

            let found = match self.control_interfaces[dof] {
                ControlInterface::Position => PositionFastest::new(
                    p0,
                    v0,
                    a0,
                    input.target_position[dof],
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_velocity[dof],
                    self.min_velocity[dof],
                    input.max_acceleration[dof],
                    self.min_acceleration[dof],
                    input.max_jerk[dof],
                )
                .solve(&self.profiles[dof]),
                ControlInterface::Velocity => VelocityFastest::new(
                    v0,
                    a0,
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_acceleration[dof],
                    self.min_acceleration[dof],
                    input.max_jerk[dof],
                )
                .solve(&self.profiles[dof]),
            };

            match found {
                Some(block) => {
                    self.independent_min_durations[dof] = block.t_min;
                    self.blocks[dof] = block;
                }
                None => return Err(Error::Calculation(CalculationError::ExecutionTime { dof })),
            }
        }

        let outcome = select_duration(
            &self.blocks,
            input.minimum_duration,
            discrete,
            delta_time,
            &mut self.possible_t_syncs,
            &mut self.idx,
        )
        .ok_or_else(|| {
            let duration = self.blocks.iter().map(|b| b.t_min).fold(0.0, fmax);
            Error::Calculation(CalculationError::Synchronization { duration })
        })?;

        self.duration = outcome.t_sync;
        self.limiting_dof = outcome.limiting_dof;

        if let Some(dof) = outcome.limiting_dof {
            let profile = match outcome.source {
                SyncSource::Fastest => Some(self.blocks[dof].fastest.clone()),
                SyncSource::GapA => self.blocks[dof].gap_a.as_ref().map(|g| g.profile.clone()),
                SyncSource::GapB => self.blocks[dof].gap_b.as_ref().map(|g| g.profile.clone()),
                SyncSource::Floor => None,
            };
            match profile {
                Some(profile) => {
                    let own = profile.t_sum[6] + profile.brake.duration;
                    if discrete && fabs(own - self.duration) > T_PRECISION {
                        // Snapping moved the duration off the cached
                        // profile; every axis is re-timed instead.
                        self.limiting_dof = None;
                    } else {
                        self.profiles[dof] = profile;
                    }
                }
                None => self.limiting_dof = None,
            }
        }

        if self.duration_cap && self.duration > MAX_DURATION {
            return Err(Error::Calculation(CalculationError::MaxDurationExceeded {
                duration: self.duration,
            }));
        }

        if self.duration == 0.0 {
            for dof in 0..self.dofs {
                if input.is_enabled(dof) {
                    self.profiles[dof] = self.blocks[dof].fastest.clone();
                }
            }
            return Ok(());
        }

        // Unsynchronized axes keep their own fastest profile.
        for dof in 0..self.dofs {
            if input.is_enabled(dof)
                && self.limiting_dof != Some(dof)
                && self.synchronizations[dof] == Synchronization::None
            {
                self.profiles[dof] = self.blocks[dof].fastest.clone();
            }
        }
        if self
            .synchronizations
            .iter()
            .all(|&s| s == Synchronization::None)
        {
            return Ok(());
        }

        // Phase synchronization: scale the limiting profile onto every
        // collinear axis.
        if self.phase_synchronizable() {
            if let Some(limiting) = self.limiting_dof {
                if self.is_input_collinear(input, self.profiles[limiting].direction, limiting)
                    && self.apply_phase_profiles(input, limiting)
                    && self.synchronizations.iter().all(|&s| {
                        s == Synchronization::Phase || s == Synchronization::None
                    })
                {
                    return Ok(());
                }
            }
        }

        // Time synchronization: re-time every remaining axis to the
        // synchronized duration.
        for dof in 0..self.dofs {
            if !input.is_enabled(dof)
                || self.limiting_dof == Some(dof)
                || self.synchronizations[dof] == Synchronization::None
            {
                continue;
            }

            let t_profile = self.duration - self.profiles[dof].brake.duration;

            if self.synchronizations[dof] == Synchronization::TimeIfNecessary
                && fabs(input.target_velocity[dof]) < EPS
                && fabs(input.target_acceleration[dof]) < EPS
            {
                self.profiles[dof] = self.blocks[dof].fastest.clone();
                continue;
            }

            // The synchronized duration may coincide with an extremal
            // profile cached by the fastest search.
            if fabs(t_profile - self.blocks[dof].t_min) < EPS {
                self.profiles[dof] = self.blocks[dof].fastest.clone();
                continue;
            }
            if let Some(gap) = &self.blocks[dof].gap_a {
                if fabs(t_profile - gap.right) < EPS {
                    self.profiles[dof] = gap.profile.clone();
                    continue;
                }
            }
            if let Some(gap) = &self.blocks[dof].gap_b {
                if fabs(t_profile - gap.right) < EPS {
                    self.profiles[dof] = gap.profile.clone();
                    continue;
                }
            }

            // A failed phase attempt may have re-anchored the profile to the
            // pre-brake state; the timed search starts after the brake.
            self.profiles[dof].set_boundary(
                self.p0s[dof],
                self.v0s[dof],
                self.a0s[dof],
                input.target_position[dof],
                input.target_velocity[dof],
                input.target_acceleration[dof],
            );

            let found = match self.control_interfaces[dof] {
                ControlInterface::Position => PositionTimed::new(
                    t_profile,
                    self.p0s[dof],
                    self.v0s[dof],
                    self.a0s[dof],
                    input.target_position[dof],
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_velocity[dof],
                    self.min_velocity[dof],
                    input.max_acceleration[dof],
                    self.min_acceleration[dof],
                    input.max_jerk[dof],
                )
                .solve(&mut self.profiles[dof]),
                ControlInterface::Velocity => VelocityTimed::new(
                    t_profile,
                    self.v0s[dof],
                    self.a0s[dof],
                    input.target_velocity[dof],
                    input.target_acceleration[dof],
                    input.max_acceleration[dof],
                    self.min_acceleration[dof],
                    input.max_jerk[dof],
                )
                .solve(&mut self.profiles[dof]),
            };

            if !found {
                return Err(Error::Calculation(CalculationError::Synchronization {
                    duration: self.duration,
                }));
            }
        }

        Ok(())
    }

    /// Continuation from a previously calculated trajectory is not
    /// implemented.
    pub fn continue_calculation(&mut self, _input: &MotionInput, _delta_time: f64) -> Result<()> {
        Err(Error::Calculation(CalculationError::Unsupported))
    }

    fn phase_synchronizable(&self) -> bool {
        self.synchronizations
            .iter()
            .any(|&s| s == Synchronization::Phase)
            && self
                .control_interfaces
                .iter()
                .all(|&c| c == ControlInterface::Position)
    }

    /// Whether all phase-synchronized axes are scalar multiples of the
    /// position difference, with a common scale per derivative.
    fn is_input_collinear(
        &mut self,
        input: &MotionInput,
        limiting_direction: Direction,
        limiting_dof: usize,
    ) -> bool {
        let mut pd_found_nonzero = false;
        let (mut v0_scale, mut a0_scale, mut vf_scale, mut af_scale) = (0.0, 0.0, 0.0, 0.0);
        for dof in 0..self.dofs {
            self.pd[dof] = input.target_position[dof] - input.current_position[dof];
            if self.synchronizations[dof] != Synchronization::Phase {
                continue;
            }
            if !pd_found_nonzero && fabs(self.pd[dof]) > EPS {
                v0_scale = input.current_velocity[dof] / self.pd[dof];
                a0_scale = input.current_acceleration[dof] / self.pd[dof];
                vf_scale = input.target_velocity[dof] / self.pd[dof];
                af_scale = input.target_acceleration[dof] / self.pd[dof];
                pd_found_nonzero = true;
            }
        }

        if !pd_found_nonzero {
            return false;
        }

        let max_jerk_limiting = match limiting_direction {
            Direction::Up => input.max_jerk[limiting_dof],
            Direction::Down => -input.max_jerk[limiting_dof],
        };
        let eps_colinear = 10.0 * EPS;

        for dof in 0..self.dofs {
            if dof == limiting_dof || self.synchronizations[dof] != Synchronization::Phase {
                continue;
            }
            let pd = self.pd[dof];
            if fabs(input.current_velocity[dof] - v0_scale * pd) > eps_colinear
                || fabs(input.current_acceleration[dof] - a0_scale * pd) > eps_colinear
                || fabs(input.target_velocity[dof] - vf_scale * pd) > eps_colinear
                || fabs(input.target_acceleration[dof] - af_scale * pd) > eps_colinear
            {
                return false;
            }

            let scale = pd / self.pd[limiting_dof];
            self.scaled_jerk[dof] = scale * max_jerk_limiting;
        }
        true
    }

    /// Copy the limiting axis' timing onto every phase axis with its scaled
    /// jerk; every copy must pass the bounded timing check.
    fn apply_phase_profiles(&mut self, input: &MotionInput, limiting_dof: usize) -> bool {
        let timing = self.profiles[limiting_dof].t;
        let signs = self.profiles[limiting_dof].jerk_signs;
        let limits = self.profiles[limiting_dof].limits;

        let mut synchronized = true;
        for dof in 0..self.dofs {
            if !input.is_enabled(dof)
                || dof == limiting_dof
                || self.synchronizations[dof] != Synchronization::Phase
            {
                continue;
            }

            let profile = &mut self.profiles[dof];
            let t_profile = self.duration - profile.brake.duration;

            profile.t = timing;
            profile.set_boundary(
                input.current_position[dof],
                input.current_velocity[dof],
                input.current_acceleration[dof],
                input.target_position[dof],
                input.target_velocity[dof],
                input.target_acceleration[dof],
            );

            if !profile.check_with_timing_jerk(
                signs,
                ReachedLimits::None,
                t_profile,
                self.scaled_jerk[dof],
                input.max_jerk[dof],
                input.max_velocity[dof],
                self.min_velocity[dof],
                input.max_acceleration[dof],
                self.min_acceleration[dof],
            ) {
                synchronized = false;
            }
            profile.limits = limits;
        }
        synchronized
    }

    fn sample(profile: &Profile, time: f64) -> (f64, f64, f64) {
        let mut t_diff = time;

        if profile.brake.duration > 0.0 {
            if t_diff < profile.brake.duration {
                let index = if t_diff < profile.brake.t[0] { 0 } else { 1 };
                if index > 0 {
                    t_diff -= profile.brake.t[0];
                }
                return Profile::integrate(
                    t_diff,
                    profile.brake.p[index],
                    profile.brake.v[index],
                    profile.brake.a[index],
                    profile.brake.j[index],
                );
            }
            t_diff -= profile.brake.duration;
        }

        // An unsynchronized axis may end before the trajectory does; hold
        // constant acceleration from its target state.
        if t_diff >= profile.t_sum[6] {
            return Profile::integrate(t_diff - profile.t_sum[6], profile.pf, profile.vf, profile.af, 0.0);
        }

        let index = profile.t_sum.partition_point(|&t_sum| t_sum <= t_diff);
        if index > 0 {
            t_diff -= profile.t_sum[index - 1];
        }
        Profile::integrate(
            t_diff,
            profile.p[index],
            profile.v[index],
            profile.a[index],
            profile.j[index],
        )
    }

    /// Sample the kinematic state of every axis at `time`.
    ///
    /// # Errors
    ///
    /// Fails with a DoF mismatch if an output slice length differs from the
    /// trajectory's axis count.
    pub fn at_time(
        &self,
        time: f64,
        new_position: &mut [f64],
        new_velocity: &mut [f64],
        new_acceleration: &mut [f64],
    ) -> Result<Section> {
        for len in [new_position.len(), new_velocity.len(), new_acceleration.len()] {
            if len != self.dofs {
                return Err(Error::Input(InputError::DofMismatch {
                    expected: self.dofs,
                    actual: len,
                }));
            }
        }

        if time >= self.duration {
            // Keep constant acceleration past the end.
            for (dof, profile) in self.profiles.iter().enumerate() {
                let t_diff = time - (profile.brake.duration + profile.t_sum[6]);
                let (p, v, a) =
                    Profile::integrate(t_diff, profile.pf, profile.vf, profile.af, 0.0);
                new_position[dof] = p;
                new_velocity[dof] = v;
                new_acceleration[dof] = a;
            }
            return Ok(Section::PastEnd);
        }

        for (dof, profile) in self.profiles.iter().enumerate() {
            let (p, v, a) = Self::sample(profile, time);
            new_position[dof] = p;
            new_velocity[dof] = v;
            new_acceleration[dof] = a;
        }
        Ok(Section::Active)
    }

    /// Position extrema of every axis over the whole trajectory.
    pub fn position_extrema(&mut self) -> &[PositionExtrema] {
        for (dof, profile) in self.profiles.iter().enumerate() {
            self.extrema[dof] = profile.position_extrema();
        }
        &self.extrema
    }

    /// Earliest time at which `dof` passes `position`, if it does within
    /// the trajectory duration.
    pub fn first_time_at_position(&self, dof: usize, position: f64) -> Option<f64> {
        if dof >= self.dofs {
            return None;
        }
        let time = self.profiles[dof].first_time_at_position(position)?;
        (time <= self.duration + T_PRECISION).then_some(time)
    }
}
