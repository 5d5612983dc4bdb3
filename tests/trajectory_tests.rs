//! Integration tests for the jerk-motion library.
//!
//! These exercise the full pipeline: brake handling, the time-optimal
//! search, synchronization, re-timing and sampling.

use jerk_motion::{
    ControlInterface, DurationDiscretization, MotionInput, Section, Synchronization, Trajectory,
};

/// Duration of the unit rest-to-rest move (four equal ramps of cbrt(1/2) s).
const UNIT_MOVE_DURATION: f64 = 3.174802103936399;

fn unit_input(dofs: usize) -> MotionInput {
    let mut input = MotionInput::new(dofs);
    input.max_velocity = vec![1.0; dofs];
    input.max_acceleration = vec![1.0; dofs];
    input.max_jerk = vec![1.0; dofs];
    input
}

fn sample(trajectory: &Trajectory, t: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let dofs = trajectory.degrees_of_freedom();
    let (mut p, mut v, mut a) = (vec![0.0; dofs], vec![0.0; dofs], vec![0.0; dofs]);
    trajectory.at_time(t, &mut p, &mut v, &mut a).unwrap();
    (p, v, a)
}

/// Sample the whole trajectory and verify the kinematic limits and the
/// sampling continuity for every enabled position-interface axis. Limits are
/// only enforced after each axis' brake window.
fn assert_limits_and_continuity(trajectory: &Trajectory, input: &MotionInput) {
    let dofs = trajectory.degrees_of_freedom();
    let dt = 1e-3;
    let steps = (trajectory.duration() / dt) as usize + 1;

    let mut previous: Option<(Vec<f64>, Vec<f64>)> = None;
    for step in 0..=steps {
        let t = (step as f64 * dt).min(trajectory.duration());
        let (p, v, a) = sample(trajectory, t);

        for dof in 0..dofs {
            if !input.is_enabled(dof) {
                continue;
            }
            if t >= trajectory.profiles()[dof].brake.duration {
                let vmin = input
                    .min_velocity
                    .as_ref()
                    .map_or(-input.max_velocity[dof], |m| m[dof]);
                let amin = input
                    .min_acceleration
                    .as_ref()
                    .map_or(-input.max_acceleration[dof], |m| m[dof]);
                assert!(
                    v[dof] <= input.max_velocity[dof] + 1e-6 && v[dof] >= vmin - 1e-6,
                    "velocity limit violated at t={}: {}",
                    t,
                    v[dof]
                );
                assert!(
                    a[dof] <= input.max_acceleration[dof] + 1e-6 && a[dof] >= amin - 1e-6,
                    "acceleration limit violated at t={}: {}",
                    t,
                    a[dof]
                );
            }
        }

        if let Some((pp, pv)) = previous {
            for dof in 0..dofs {
                // Continuity: one step changes position by at most the
                // velocity bound and velocity by at most the acceleration
                // bound (loose factor for the brake window).
                let dv_bound = 4.0 * input.max_acceleration[dof].max(1.0) * dt + 1e-9;
                let dp_bound = 4.0
                    * input.max_velocity[dof]
                        .max(input.current_velocity[dof].abs())
                        .max(1.0)
                    * dt
                    + 1e-9;
                assert!((p[dof] - pp[dof]).abs() < dp_bound, "position jump at t={}", t);
                assert!((v[dof] - pv[dof]).abs() < dv_bound, "velocity jump at t={}", t);
            }
        }
        previous = Some((p, v));
    }
}

fn assert_reaches_target(trajectory: &Trajectory, input: &MotionInput) {
    let (p, v, a) = sample(trajectory, trajectory.duration());
    for dof in 0..trajectory.degrees_of_freedom() {
        if !input.is_enabled(dof) {
            continue;
        }
        assert!(
            (p[dof] - input.target_position[dof]).abs() < 1e-8,
            "axis {} position {} != {}",
            dof,
            p[dof],
            input.target_position[dof]
        );
        assert!((v[dof] - input.target_velocity[dof]).abs() < 1e-8);
        assert!((a[dof] - input.target_acceleration[dof]).abs() < 1e-8);
    }
}

// =============================================================================
// Single axis, rest to rest
// =============================================================================

#[test]
fn rest_to_rest_single_axis() {
    let mut input = unit_input(1);
    input.target_position = vec![1.0];

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    assert!((trajectory.duration() - UNIT_MOVE_DURATION).abs() < 1e-9);
    assert_eq!(trajectory.limiting_dof(), Some(0));
    assert_reaches_target(&trajectory, &input);
    assert_limits_and_continuity(&trajectory, &input);

    // The profile is symmetric: half the distance at half the time.
    let (p, v, _) = sample(&trajectory, trajectory.duration() / 2.0);
    assert!((p[0] - 0.5).abs() < 1e-9);
    assert!(v[0] > 0.0);
}

#[test]
fn independent_min_durations_match_single_axis() {
    let mut input = unit_input(1);
    input.target_position = vec![1.0];

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    let minima = trajectory.independent_min_durations();
    assert!((minima[0] - trajectory.duration()).abs() < 1e-12);
}

// =============================================================================
// Two axes, time synchronization
// =============================================================================

#[test]
fn two_axes_synchronize_to_slower() {
    let mut input = unit_input(2);
    input.target_position = vec![1.0, 0.5];

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&input, 0.01).unwrap();

    // Axis 0 is the slower one and sets the duration.
    assert!((trajectory.duration() - UNIT_MOVE_DURATION).abs() < 1e-9);
    assert_eq!(trajectory.limiting_dof(), Some(0));

    // Axis 1 is stretched so both finish together.
    let p1 = &trajectory.profiles()[1];
    assert!((p1.total_duration() + p1.brake.duration - trajectory.duration()).abs() < 1e-9);

    assert_reaches_target(&trajectory, &input);
    assert_limits_and_continuity(&trajectory, &input);

    let minima = trajectory.independent_min_durations();
    assert!(minima[1] < minima[0]);
    assert!(trajectory.duration() >= minima[0] - 1e-12);
}

#[test]
fn no_synchronization_lets_axes_run_free() {
    let mut input = unit_input(2);
    input.target_position = vec![1.0, 0.5];
    input.synchronization = Synchronization::None;

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&input, 0.01).unwrap();

    let p1 = &trajectory.profiles()[1];
    assert!(p1.total_duration() < trajectory.duration() - 1e-9);

    // The faster axis holds its target afterwards.
    let (p, v, _) = sample(&trajectory, trajectory.duration() - 1e-4);
    assert!((p[1] - 0.5).abs() < 1e-6);
    assert!(v[1].abs() < 1e-6);
}

#[test]
fn time_if_necessary_keeps_stopped_axis_fast() {
    let mut input = unit_input(2);
    input.target_position = vec![1.0, 0.5];
    input.per_dof_synchronization =
        Some(vec![Synchronization::Time, Synchronization::TimeIfNecessary]);

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&input, 0.01).unwrap();

    // The stopped axis is not lengthened.
    let minima = trajectory.independent_min_durations().to_vec();
    let p1 = &trajectory.profiles()[1];
    assert!((p1.total_duration() + p1.brake.duration - minima[1]).abs() < 1e-9);
    assert_reaches_target(&trajectory, &input);
}

// =============================================================================
// Phase synchronization
// =============================================================================

#[test]
fn phase_synchronization_scales_collinear_axes() {
    let mut input = unit_input(2);
    input.target_position = vec![1.0, 0.5];
    input.synchronization = Synchronization::Phase;

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&input, 0.01).unwrap();

    let p0 = &trajectory.profiles()[0];
    let p1 = &trajectory.profiles()[1];
    assert_eq!(p0.t, p1.t);
    assert_eq!(p0.jerk_signs, p1.jerk_signs);
    // The jerk scales with the position-difference ratio.
    assert!((p1.j[0] / p0.j[0] - 0.5).abs() < 1e-9);

    assert_reaches_target(&trajectory, &input);
    assert_limits_and_continuity(&trajectory, &input);

    // Scaled profile: axis 1 tracks half of axis 0 at every instant.
    for step in 0..=20 {
        let t = trajectory.duration() * (step as f64) / 20.0;
        let (p, _, _) = sample(&trajectory, t);
        assert!((p[1] - 0.5 * p[0]).abs() < 1e-7);
    }
}

#[test]
fn phase_synchronization_falls_back_when_not_collinear() {
    let mut input = unit_input(2);
    input.target_position = vec![1.0, 0.5];
    input.current_velocity = vec![0.1, 0.0];
    input.synchronization = Synchronization::Phase;

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&input, 0.01).unwrap();

    // Falls back to time synchronization; the targets are still reached
    // simultaneously.
    assert_reaches_target(&trajectory, &input);
    let p1 = &trajectory.profiles()[1];
    assert!((p1.total_duration() + p1.brake.duration - trajectory.duration()).abs() < 1e-9);
}

// =============================================================================
// Disabled axes
// =============================================================================

#[test]
fn disabled_axis_holds_its_state() {
    let mut input = unit_input(3);
    input.target_position = vec![1.0, 9.9, 0.5];
    input.current_position = vec![0.0, 0.3, 0.0];
    input.enabled = vec![true, false, true];

    let mut trajectory = Trajectory::new(3);
    trajectory.calculate(&input, 0.01).unwrap();

    assert!((trajectory.duration() - UNIT_MOVE_DURATION).abs() < 1e-9);
    for step in 0..=10 {
        let t = trajectory.duration() * (step as f64) / 10.0;
        let (p, v, a) = sample(&trajectory, t);
        assert!((p[1] - 0.3).abs() < 1e-12);
        assert!(v[1].abs() < 1e-12);
        assert!(a[1].abs() < 1e-12);
    }
    assert_reaches_target(&trajectory, &input);
}

// =============================================================================
// Brake pre-profiles
// =============================================================================

#[test]
fn initial_velocity_above_limit_brakes_first() {
    let mut input = unit_input(1);
    input.current_velocity = vec![2.0];
    input.target_position = vec![2.0];

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    let brake_duration = trajectory.profiles()[0].brake.duration;
    assert!(brake_duration > 0.0);

    // The velocity is back inside the limit at the end of the brake window.
    let (_, v, _) = sample(&trajectory, brake_duration);
    assert!(v[0] <= 1.0 + 1e-6);

    assert_reaches_target(&trajectory, &input);
    assert_limits_and_continuity(&trajectory, &input);
}

#[test]
fn initial_acceleration_above_limit_brakes_first() {
    let mut input = unit_input(1);
    input.current_acceleration = vec![1.8];
    input.target_position = vec![1.5];

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    assert!(trajectory.profiles()[0].brake.duration > 0.0);
    assert_reaches_target(&trajectory, &input);
}

// =============================================================================
// Discrete durations and the duration floor
// =============================================================================

#[test]
fn discrete_duration_snaps_to_cycle() {
    let mut input = unit_input(1);
    input.target_position = vec![1.0];
    input.duration_discretization = DurationDiscretization::Discrete;

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.1).unwrap();

    let duration = trajectory.duration();
    assert!(duration >= UNIT_MOVE_DURATION - 1e-12);
    let cycles = duration / 0.1;
    assert!((cycles - cycles.round()).abs() < 1e-9, "duration {} not a multiple", duration);

    assert_reaches_target(&trajectory, &input);
    assert_limits_and_continuity(&trajectory, &input);
}

#[test]
fn minimum_duration_floor_stretches_all_axes() {
    let mut input = unit_input(2);
    input.target_position = vec![1.0, 0.5];
    input.minimum_duration = Some(10.0);

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&input, 0.01).unwrap();

    assert!((trajectory.duration() - 10.0).abs() < 1e-9);
    assert_eq!(trajectory.limiting_dof(), None);
    assert_reaches_target(&trajectory, &input);
    assert_limits_and_continuity(&trajectory, &input);
}

// =============================================================================
// Velocity interface
// =============================================================================

#[test]
fn velocity_interface_reaches_target_velocity() {
    let mut input = unit_input(1);
    input.control_interface = ControlInterface::Velocity;
    // The velocity bound does not apply to the velocity interface.
    input.max_velocity = vec![0.5];
    input.target_velocity = vec![1.0];

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    assert!((trajectory.duration() - 2.0).abs() < 1e-9);
    let (_, v, a) = sample(&trajectory, trajectory.duration());
    assert!((v[0] - 1.0).abs() < 1e-8);
    assert!(a[0].abs() < 1e-8);
}

#[test]
fn mixed_interfaces_synchronize() {
    let mut input = unit_input(2);
    input.target_position = vec![1.0, 0.0];
    input.target_velocity = vec![0.0, 0.5];
    input.per_dof_control_interface =
        Some(vec![ControlInterface::Position, ControlInterface::Velocity]);

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&input, 0.01).unwrap();

    let p1 = &trajectory.profiles()[1];
    assert!((p1.total_duration() + p1.brake.duration - trajectory.duration()).abs() < 1e-9);
    let (_, v, _) = sample(&trajectory, trajectory.duration());
    assert!((v[1] - 0.5).abs() < 1e-8);
}

// =============================================================================
// Sampling behavior
// =============================================================================

#[test]
fn past_end_extrapolates_at_constant_acceleration() {
    let mut input = unit_input(1);
    input.target_position = vec![1.0];
    input.target_velocity = vec![0.2];

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    let dofs = 1;
    let (mut p, mut v, mut a) = (vec![0.0; dofs], vec![0.0; dofs], vec![0.0; dofs]);
    let dt = 0.5;
    let section = trajectory
        .at_time(trajectory.duration() + dt, &mut p, &mut v, &mut a)
        .unwrap();
    assert_eq!(section, Section::PastEnd);
    assert!((p[0] - (1.0 + 0.2 * dt)).abs() < 1e-9);
    assert!((v[0] - 0.2).abs() < 1e-9);
    assert!(a[0].abs() < 1e-12);
}

#[test]
fn at_time_rejects_wrong_buffer_length() {
    let mut input = unit_input(1);
    input.target_position = vec![1.0];

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    let (mut p, mut v, mut a) = (vec![0.0; 2], vec![0.0; 1], vec![0.0; 1]);
    assert!(trajectory.at_time(0.0, &mut p, &mut v, &mut a).is_err());
}

#[test]
fn first_passage_and_extrema() {
    let mut input = unit_input(1);
    input.target_position = vec![1.0];

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    // Symmetric move: half the distance at half the duration.
    let t_half = trajectory.first_time_at_position(0, 0.5).unwrap();
    assert!((t_half - trajectory.duration() / 2.0).abs() < 1e-8);
    assert!(trajectory.first_time_at_position(0, 2.0).is_none());
    assert!(trajectory.first_time_at_position(7, 0.5).is_none());

    let extrema = trajectory.position_extrema()[0];
    assert!(extrema.min.abs() < 1e-9);
    assert!((extrema.max - 1.0).abs() < 1e-8);
    assert!((extrema.t_max - trajectory.duration()).abs() < 1e-8);
}

#[test]
fn zero_distance_move_has_zero_duration() {
    let input = unit_input(1);

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();
    assert_eq!(trajectory.duration(), 0.0);

    let (p, v, a) = sample(&trajectory, 1.0);
    assert!(p[0].abs() < 1e-12);
    assert!(v[0].abs() < 1e-12);
    assert!(a[0].abs() < 1e-12);
}

// =============================================================================
// Error reporting
// =============================================================================

#[test]
fn invalid_limits_are_rejected_before_calculation() {
    let mut input = unit_input(1);
    input.max_jerk = vec![0.0];
    input.target_position = vec![1.0];

    let mut trajectory = Trajectory::new(1);
    let result = trajectory.calculate(&input, 0.01);
    assert!(matches!(result, Err(jerk_motion::Error::Input(_))));
}

#[test]
fn dof_mismatch_is_rejected() {
    let input = unit_input(2);
    let mut trajectory = Trajectory::new(3);
    assert!(matches!(
        trajectory.calculate(&input, 0.01),
        Err(jerk_motion::Error::Input(
            jerk_motion::InputError::DofMismatch { expected: 3, actual: 2 }
        ))
    ));
}

#[test]
fn duration_cap_guards_long_moves() {
    let mut input = unit_input(1);
    input.target_position = vec![1.0];
    input.minimum_duration = Some(8000.0);

    let mut trajectory = Trajectory::new(1).with_duration_cap();
    assert!(matches!(
        trajectory.calculate(&input, 0.01),
        Err(jerk_motion::Error::Calculation(
            jerk_motion::CalculationError::MaxDurationExceeded { .. }
        ))
    ));
}

#[test]
fn continuation_is_unsupported() {
    let input = unit_input(1);
    let mut trajectory = Trajectory::new(1);
    assert!(matches!(
        trajectory.continue_calculation(&input, 0.01),
        Err(jerk_motion::Error::Calculation(
            jerk_motion::CalculationError::Unsupported
        ))
    ));
}

// =============================================================================
// Asymmetric limits and nonzero boundary states
// =============================================================================

#[test]
fn asymmetric_limits_are_respected() {
    let mut input = unit_input(1);
    input.target_position = vec![3.0];
    input.min_velocity = Some(vec![-0.25]);
    input.min_acceleration = Some(vec![-0.5]);

    let mut trajectory = Trajectory::new(1);
    trajectory.calculate(&input, 0.01).unwrap();

    assert_reaches_target(&trajectory, &input);
    assert_limits_and_continuity(&trajectory, &input);
}

#[test]
fn nonzero_boundary_states_synchronize() {
    let mut input = unit_input(2);
    input.current_velocity = vec![0.3, -0.2];
    input.target_position = vec![2.0, -1.0];
    input.target_velocity = vec![0.1, 0.0];

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&input, 0.01).unwrap();

    assert_reaches_target(&trajectory, &input);
    assert_limits_and_continuity(&trajectory, &input);
    for profile in trajectory.profiles() {
        let end = profile.total_duration() + profile.brake.duration;
        assert!((end - trajectory.duration()).abs() < 1e-9);
    }
}

// =============================================================================
// TOML input descriptions
// =============================================================================

#[test]
fn toml_input_round_trip() {
    let mut input = unit_input(2);
    input.target_position = vec![1.0, -0.5];
    input.synchronization = Synchronization::Phase;
    input.minimum_duration = Some(1.5);

    let serialized = input.to_toml().unwrap();
    let reparsed = jerk_motion::parse_input(&serialized).unwrap();
    assert_eq!(input, reparsed);

    let mut trajectory = Trajectory::new(2);
    trajectory.calculate(&reparsed, 0.01).unwrap();
    assert_reaches_target(&trajectory, &reparsed);
}
