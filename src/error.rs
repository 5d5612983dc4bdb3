//! Error types for jerk-motion.
//!
//! Input problems are reported before any math runs; calculation errors are
//! reported, never retried. The caller decides whether to relax limits and
//! re-invoke.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all jerk-motion operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Invalid or inconsistent input parameters
    Input(InputError),
    /// Trajectory calculation failure
    Calculation(CalculationError),
}

/// Input validation errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// A per-axis array does not match the trajectory's degrees of freedom
    DofMismatch {
        /// Expected number of axes
        expected: usize,
        /// Number of entries found
        actual: usize,
    },
    /// Maximum velocity must be strictly positive
    InvalidMaxVelocity {
        /// Offending axis
        dof: usize,
        /// Offending value
        value: f64,
    },
    /// Maximum acceleration must be strictly positive
    InvalidMaxAcceleration {
        /// Offending axis
        dof: usize,
        /// Offending value
        value: f64,
    },
    /// Maximum jerk must be strictly positive
    InvalidMaxJerk {
        /// Offending axis
        dof: usize,
        /// Offending value
        value: f64,
    },
    /// Minimum velocity must be strictly negative
    InvalidMinVelocity {
        /// Offending axis
        dof: usize,
        /// Offending value
        value: f64,
    },
    /// Minimum acceleration must be strictly negative
    InvalidMinAcceleration {
        /// Offending axis
        dof: usize,
        /// Offending value
        value: f64,
    },
    /// Target velocity lies outside the velocity limits
    TargetVelocityBeyondLimits {
        /// Offending axis
        dof: usize,
    },
    /// Target acceleration lies outside the acceleration limits
    TargetAccelerationBeyondLimits {
        /// Offending axis
        dof: usize,
    },
    /// A kinematic value is NaN or infinite
    NonFiniteValue {
        /// Offending axis
        dof: usize,
    },
    /// Discrete durations require a positive delta time
    InvalidDeltaTime {
        /// Offending value
        value: f64,
    },
    /// The minimum duration must be finite and non-negative
    InvalidMinimumDuration {
        /// Offending value
        value: f64,
    },
    /// Failed to parse a TOML input description
    ParseError(heapless::String<128>),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Trajectory calculation errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalculationError {
    /// The time-optimal search found no valid profile for an axis
    ExecutionTime {
        /// Offending axis
        dof: usize,
    },
    /// No synchronized duration exists, or an axis could not be re-timed
    /// to the synchronized duration
    Synchronization {
        /// The duration that could not be realized
        duration: f64,
    },
    /// The synchronized duration exceeds the safety ceiling
    MaxDurationExceeded {
        /// The synchronized duration
        duration: f64,
    },
    /// The requested operation is not implemented
    Unsupported,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Input(e) => write!(f, "Input error: {}", e),
            Error::Calculation(e) => write!(f, "Calculation error: {}", e),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::DofMismatch { expected, actual } => {
                write!(f, "Expected {} axes, found {}", expected, actual)
            }
            InputError::InvalidMaxVelocity { dof, value } => {
                write!(f, "Axis {}: max velocity {} must be > 0", dof, value)
            }
            InputError::InvalidMaxAcceleration { dof, value } => {
                write!(f, "Axis {}: max acceleration {} must be > 0", dof, value)
            }
            InputError::InvalidMaxJerk { dof, value } => {
                write!(f, "Axis {}: max jerk {} must be > 0", dof, value)
            }
            InputError::InvalidMinVelocity { dof, value } => {
                write!(f, "Axis {}: min velocity {} must be < 0", dof, value)
            }
            InputError::InvalidMinAcceleration { dof, value } => {
                write!(f, "Axis {}: min acceleration {} must be < 0", dof, value)
            }
            InputError::TargetVelocityBeyondLimits { dof } => {
                write!(f, "Axis {}: target velocity exceeds the velocity limits", dof)
            }
            InputError::TargetAccelerationBeyondLimits { dof } => {
                write!(
                    f,
                    "Axis {}: target acceleration exceeds the acceleration limits",
                    dof
                )
            }
            InputError::NonFiniteValue { dof } => {
                write!(f, "Axis {}: non-finite kinematic value", dof)
            }
            InputError::InvalidDeltaTime { value } => {
                write!(f, "Delta time {} must be > 0 for discrete durations", value)
            }
            InputError::InvalidMinimumDuration { value } => {
                write!(f, "Minimum duration {} must be finite and >= 0", value)
            }
            InputError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            #[cfg(feature = "std")]
            InputError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for CalculationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationError::ExecutionTime { dof } => {
                write!(f, "No time-optimal profile exists for axis {}", dof)
            }
            CalculationError::Synchronization { duration } => {
                write!(f, "No profile reaches the synchronized duration {}", duration)
            }
            CalculationError::MaxDurationExceeded { duration } => {
                write!(f, "Trajectory duration {} exceeds the safety ceiling", duration)
            }
            CalculationError::Unsupported => write!(f, "Operation not implemented"),
        }
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Error::Input(e)
    }
}

impl From<CalculationError> for Error {
    fn from(e: CalculationError) -> Self {
        Error::Calculation(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for InputError {}

#[cfg(feature = "std")]
impl std::error::Error for CalculationError {}
