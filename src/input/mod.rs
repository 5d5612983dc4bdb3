//! Motion input description.
//!
//! Holds the per-axis boundary states, kinematic limits and behavioral
//! options of one trajectory calculation. The types (de)serialize with
//! serde, so an input can be loaded from TOML (with the `std` feature) and
//! a failing input can be serialized back out for diagnostics.

#[cfg(feature = "std")]
mod loader;
mod validation;

pub use validation::validate_input;

#[cfg(feature = "std")]
pub use loader::{load_input, parse_input};

use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// Which kinematic quantity the target state constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum ControlInterface {
    /// Reach a target position with target velocity and acceleration.
    #[default]
    Position,
    /// Reach a target velocity and acceleration; position integrates freely.
    Velocity,
}

/// How the axes' durations are coupled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum Synchronization {
    /// Every axis finishes at the same time.
    #[default]
    Time,
    /// Axes share a scaled identical profile when the input is collinear,
    /// falling back to time synchronization otherwise.
    Phase,
    /// Synchronize, but do not lengthen an axis whose target is a full stop.
    TimeIfNecessary,
    /// Every axis runs at its own minimum duration.
    None,
}

/// Whether the synchronized duration may be arbitrary or must be a multiple
/// of the control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum DurationDiscretization {
    /// Any duration is allowed.
    #[default]
    Continuous,
    /// The duration is snapped up to the next multiple of the delta time.
    Discrete,
}

/// Input parameters of one trajectory calculation.
///
/// All per-axis arrays must have one entry per degree of freedom; `enabled`
/// may be left empty, meaning every axis is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionInput {
    /// Current position per axis.
    pub current_position: Vec<f64>,
    /// Current velocity per axis.
    pub current_velocity: Vec<f64>,
    /// Current acceleration per axis.
    pub current_acceleration: Vec<f64>,
    /// Target position per axis.
    pub target_position: Vec<f64>,
    /// Target velocity per axis.
    pub target_velocity: Vec<f64>,
    /// Target acceleration per axis.
    pub target_acceleration: Vec<f64>,
    /// Maximum velocity per axis, positive.
    pub max_velocity: Vec<f64>,
    /// Maximum acceleration per axis, positive.
    pub max_acceleration: Vec<f64>,
    /// Maximum jerk per axis, positive.
    pub max_jerk: Vec<f64>,
    /// Minimum velocity per axis, negative. Defaults to the negated maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_velocity: Option<Vec<f64>>,
    /// Minimum acceleration per axis, negative. Defaults to the negated
    /// maximum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_acceleration: Option<Vec<f64>>,
    /// Per-axis enable flag; a disabled axis holds its current state.
    #[serde(default)]
    pub enabled: Vec<bool>,
    /// Control interface for all axes.
    #[serde(default)]
    pub control_interface: ControlInterface,
    /// Synchronization behavior for all axes.
    #[serde(default)]
    pub synchronization: Synchronization,
    /// Duration discretization behavior.
    #[serde(default)]
    pub duration_discretization: DurationDiscretization,
    /// Per-axis control interface override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_dof_control_interface: Option<Vec<ControlInterface>>,
    /// Per-axis synchronization override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_dof_synchronization: Option<Vec<Synchronization>>,
    /// Optional lower bound on the synchronized duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_duration: Option<f64>,
}

impl MotionInput {
    /// Create a zero-initialized input for `dofs` axes; the limits must be
    /// filled in before use.
    pub fn new(dofs: usize) -> Self {
        Self {
            current_position: vec![0.0; dofs],
            current_velocity: vec![0.0; dofs],
            current_acceleration: vec![0.0; dofs],
            target_position: vec![0.0; dofs],
            target_velocity: vec![0.0; dofs],
            target_acceleration: vec![0.0; dofs],
            max_velocity: vec![0.0; dofs],
            max_acceleration: vec![0.0; dofs],
            max_jerk: vec![0.0; dofs],
            min_velocity: None,
            min_acceleration: None,
            enabled: vec![true; dofs],
            control_interface: ControlInterface::default(),
            synchronization: Synchronization::default(),
            duration_discretization: DurationDiscretization::default(),
            per_dof_control_interface: None,
            per_dof_synchronization: None,
            minimum_duration: None,
        }
    }

    /// Number of axes this input describes.
    pub fn degrees_of_freedom(&self) -> usize {
        self.current_position.len()
    }

    /// Whether an axis participates in the calculation.
    #[inline]
    pub fn is_enabled(&self, dof: usize) -> bool {
        self.enabled.get(dof).copied().unwrap_or(true)
    }

    /// Resolved minimum velocity of an axis.
    #[inline]
    pub(crate) fn min_velocity_at(&self, dof: usize) -> f64 {
        self.min_velocity
            .as_ref()
            .map_or(-self.max_velocity[dof], |v| v[dof])
    }

    /// Resolved minimum acceleration of an axis.
    #[inline]
    pub(crate) fn min_acceleration_at(&self, dof: usize) -> f64 {
        self.min_acceleration
            .as_ref()
            .map_or(-self.max_acceleration[dof], |v| v[dof])
    }

    /// Resolved control interface of an axis.
    #[inline]
    pub(crate) fn control_interface_at(&self, dof: usize) -> ControlInterface {
        self.per_dof_control_interface
            .as_ref()
            .map_or(self.control_interface, |v| v[dof])
    }

    /// Resolved synchronization behavior of an axis.
    #[inline]
    pub(crate) fn synchronization_at(&self, dof: usize) -> Synchronization {
        self.per_dof_synchronization
            .as_ref()
            .map_or(self.synchronization, |v| v[dof])
    }

    /// Serialize this input to a TOML string, e.g. to report a failing
    /// calculation.
    #[cfg(feature = "std")]
    pub fn to_toml(&self) -> crate::error::Result<alloc::string::String> {
        toml::to_string(self).map_err(|e| {
            let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
            crate::error::Error::Input(crate::error::InputError::ParseError(msg))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_input_is_enabled_everywhere() {
        let input = MotionInput::new(3);
        assert_eq!(input.degrees_of_freedom(), 3);
        assert!((0..3).all(|dof| input.is_enabled(dof)));
    }

    #[test]
    fn min_limits_default_to_negated_max() {
        let mut input = MotionInput::new(1);
        input.max_velocity[0] = 2.0;
        input.max_acceleration[0] = 3.0;
        assert_eq!(input.min_velocity_at(0), -2.0);
        assert_eq!(input.min_acceleration_at(0), -3.0);

        input.min_velocity = Some(vec![-0.5]);
        assert_eq!(input.min_velocity_at(0), -0.5);
    }

    #[test]
    fn per_dof_overrides_win() {
        let mut input = MotionInput::new(2);
        input.synchronization = Synchronization::Time;
        input.per_dof_synchronization =
            Some(vec![Synchronization::Time, Synchronization::None]);
        assert_eq!(input.synchronization_at(0), Synchronization::Time);
        assert_eq!(input.synchronization_at(1), Synchronization::None);
    }
}
