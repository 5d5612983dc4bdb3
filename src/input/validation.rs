//! Input validation.
//!
//! Called at the start of every calculation; surfaces inconsistent inputs
//! before any math runs.

use crate::error::{Error, InputError, Result};

use super::{ControlInterface, MotionInput};

/// Validate a motion input against the trajectory's degrees of freedom.
///
/// Checks:
/// - every per-axis array has one entry per axis (`enabled` may be empty)
/// - all kinematic values are finite
/// - maximum limits are strictly positive, minimum limits strictly negative
/// - the target state lies inside the limits
pub fn validate_input(input: &MotionInput, dofs: usize) -> Result<()> {
    let expect_len = |actual: usize| -> Result<()> {
        if actual != dofs {
            return Err(Error::Input(InputError::DofMismatch {
                expected: dofs,
                actual,
            }));
        }
        Ok(())
    };

    expect_len(input.current_position.len())?;
    expect_len(input.current_velocity.len())?;
    expect_len(input.current_acceleration.len())?;
    expect_len(input.target_position.len())?;
    expect_len(input.target_velocity.len())?;
    expect_len(input.target_acceleration.len())?;
    expect_len(input.max_velocity.len())?;
    expect_len(input.max_acceleration.len())?;
    expect_len(input.max_jerk.len())?;

    if !input.enabled.is_empty() {
        expect_len(input.enabled.len())?;
    }
    if let Some(v) = &input.min_velocity {
        expect_len(v.len())?;
    }
    if let Some(v) = &input.min_acceleration {
        expect_len(v.len())?;
    }
    if let Some(v) = &input.per_dof_control_interface {
        expect_len(v.len())?;
    }
    if let Some(v) = &input.per_dof_synchronization {
        expect_len(v.len())?;
    }

    if let Some(value) = input.minimum_duration {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::Input(InputError::InvalidMinimumDuration { value }));
        }
    }

    for dof in 0..dofs {
        if !input.is_enabled(dof) {
            continue;
        }
        validate_axis(input, dof)?;
    }
    Ok(())
}

fn validate_axis(input: &MotionInput, dof: usize) -> Result<()> {
    let values = [
        input.current_position[dof],
        input.current_velocity[dof],
        input.current_acceleration[dof],
        input.target_position[dof],
        input.target_velocity[dof],
        input.target_acceleration[dof],
        input.max_velocity[dof],
        input.max_acceleration[dof],
        input.max_jerk[dof],
        input.min_velocity_at(dof),
        input.min_acceleration_at(dof),
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::Input(InputError::NonFiniteValue { dof }));
    }

    let value = input.max_velocity[dof];
    if value <= 0.0 {
        return Err(Error::Input(InputError::InvalidMaxVelocity { dof, value }));
    }
    let value = input.max_acceleration[dof];
    if value <= 0.0 {
        return Err(Error::Input(InputError::InvalidMaxAcceleration { dof, value }));
    }
    let value = input.max_jerk[dof];
    if value <= 0.0 {
        return Err(Error::Input(InputError::InvalidMaxJerk { dof, value }));
    }
    let value = input.min_velocity_at(dof);
    if value >= 0.0 {
        return Err(Error::Input(InputError::InvalidMinVelocity { dof, value }));
    }
    let value = input.min_acceleration_at(dof);
    if value >= 0.0 {
        return Err(Error::Input(InputError::InvalidMinAcceleration { dof, value }));
    }

    // The target must be reachable without violating the limits. The
    // velocity bound does not apply to the velocity interface.
    if input.control_interface_at(dof) == ControlInterface::Position {
        let vf = input.target_velocity[dof];
        if vf > input.max_velocity[dof] || vf < input.min_velocity_at(dof) {
            return Err(Error::Input(InputError::TargetVelocityBeyondLimits { dof }));
        }
    }
    let af = input.target_acceleration[dof];
    if af > input.max_acceleration[dof] || af < input.min_acceleration_at(dof) {
        return Err(Error::Input(InputError::TargetAccelerationBeyondLimits { dof }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn valid_input() -> MotionInput {
        let mut input = MotionInput::new(2);
        input.target_position = vec![1.0, -1.0];
        input.max_velocity = vec![1.0, 1.0];
        input.max_acceleration = vec![1.0, 1.0];
        input.max_jerk = vec![1.0, 1.0];
        input
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate_input(&valid_input(), 2).is_ok());
    }

    #[test]
    fn rejects_length_mismatch() {
        let mut input = valid_input();
        input.target_position.pop();
        assert!(matches!(
            validate_input(&input, 2),
            Err(Error::Input(InputError::DofMismatch { expected: 2, actual: 1 }))
        ));
    }

    #[test]
    fn rejects_non_positive_limits() {
        let mut input = valid_input();
        input.max_jerk[1] = 0.0;
        assert!(matches!(
            validate_input(&input, 2),
            Err(Error::Input(InputError::InvalidMaxJerk { dof: 1, .. }))
        ));
    }

    #[test]
    fn rejects_positive_min_velocity() {
        let mut input = valid_input();
        input.min_velocity = Some(vec![-1.0, 0.5]);
        assert!(matches!(
            validate_input(&input, 2),
            Err(Error::Input(InputError::InvalidMinVelocity { dof: 1, .. }))
        ));
    }

    #[test]
    fn rejects_unreachable_target_velocity() {
        let mut input = valid_input();
        input.target_velocity[0] = 2.0;
        assert!(matches!(
            validate_input(&input, 2),
            Err(Error::Input(InputError::TargetVelocityBeyondLimits { dof: 0 }))
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut input = valid_input();
        input.current_velocity[0] = f64::NAN;
        assert!(matches!(
            validate_input(&input, 2),
            Err(Error::Input(InputError::NonFiniteValue { dof: 0 }))
        ));
    }

    #[test]
    fn disabled_axis_is_not_validated() {
        let mut input = valid_input();
        input.max_jerk[1] = 0.0;
        input.enabled = vec![true, false];
        assert!(validate_input(&input, 2).is_ok());
    }
}
