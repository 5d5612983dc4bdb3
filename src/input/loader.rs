//! Motion input loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{Error, InputError, Result};

use super::{validate_input, MotionInput};

/// Load a motion input from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use jerk_motion::load_input;
///
/// let input = load_input("move.toml")?;
/// ```
pub fn load_input<P: AsRef<Path>>(path: P) -> Result<MotionInput> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Input(InputError::IoError(msg))
    })?;

    parse_input(&content)
}

/// Parse a motion input from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_input(content: &str) -> Result<MotionInput> {
    let input: MotionInput = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Input(InputError::ParseError(msg))
    })?;

    validate_input(&input, input.degrees_of_freedom())?;

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_input() {
        let toml = r#"
current_position = [0.0]
current_velocity = [0.0]
current_acceleration = [0.0]
target_position = [1.0]
target_velocity = [0.0]
target_acceleration = [0.0]
max_velocity = [1.0]
max_acceleration = [1.0]
max_jerk = [1.0]
"#;

        let input = parse_input(toml).unwrap();
        assert_eq!(input.degrees_of_freedom(), 1);
        assert!(input.is_enabled(0));
        assert_eq!(input.synchronization, crate::input::Synchronization::Time);
    }

    #[test]
    fn parse_with_options() {
        let toml = r#"
current_position = [0.0, 0.0]
current_velocity = [0.0, 0.0]
current_acceleration = [0.0, 0.0]
target_position = [1.0, 0.5]
target_velocity = [0.0, 0.0]
target_acceleration = [0.0, 0.0]
max_velocity = [1.0, 1.0]
max_acceleration = [1.0, 1.0]
max_jerk = [1.0, 1.0]
min_velocity = [-0.5, -0.5]
synchronization = "phase"
duration_discretization = "discrete"
minimum_duration = 2.0
"#;

        let input = parse_input(toml).unwrap();
        assert_eq!(input.synchronization, crate::input::Synchronization::Phase);
        assert_eq!(
            input.duration_discretization,
            crate::input::DurationDiscretization::Discrete
        );
        assert_eq!(input.minimum_duration, Some(2.0));
        assert_eq!(input.min_velocity_at(1), -0.5);
    }

    #[test]
    fn parse_rejects_invalid_limits() {
        let toml = r#"
current_position = [0.0]
current_velocity = [0.0]
current_acceleration = [0.0]
target_position = [1.0]
target_velocity = [0.0]
target_acceleration = [0.0]
max_velocity = [0.0]
max_acceleration = [1.0]
max_jerk = [1.0]
"#;

        assert!(parse_input(toml).is_err());
    }

    #[test]
    fn toml_round_trip() {
        let mut input = MotionInput::new(2);
        input.target_position = alloc::vec![1.0, -0.25];
        input.max_velocity = alloc::vec![1.0, 2.0];
        input.max_acceleration = alloc::vec![1.0, 2.0];
        input.max_jerk = alloc::vec![1.0, 2.0];
        input.minimum_duration = Some(0.5);

        let serialized = input.to_toml().unwrap();
        let reparsed = parse_input(&serialized).unwrap();
        assert_eq!(input, reparsed);
    }
}
