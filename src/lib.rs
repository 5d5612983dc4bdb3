//! # jerk-motion
//!
//! Time-optimal, jerk-limited trajectory generation for multi-axis motion
//! control.
//!
//! ## Features
//!
//! - **Time-optimal**: per-axis seven-segment constant-jerk profiles from an
//!   analytic shape catalogue, globally synchronized to the smallest
//!   reachable duration
//! - **Arbitrary boundary states**: non-zero initial/target velocity and
//!   acceleration, with brake pre-profiles when the current state violates a
//!   limit
//! - **Asymmetric limits**: independent minimum velocity and acceleration
//! - **Synchronization modes**: time, phase (scaled identical profiles),
//!   time-if-necessary, or none, per axis
//! - **no_std compatible**: core library needs only an allocator; all
//!   buffers are sized at construction
//!
//! ## Quick Start
//!
//! ```rust
//! use jerk_motion::{MotionInput, Trajectory};
//!
//! let mut input = MotionInput::new(1);
//! input.target_position = vec![1.0];
//! input.max_velocity = vec![1.0];
//! input.max_acceleration = vec![1.0];
//! input.max_jerk = vec![1.0];
//!
//! let mut trajectory = Trajectory::new(1);
//! trajectory.calculate(&input, 0.01).expect("solvable input");
//!
//! let (mut p, mut v, mut a) = (vec![0.0], vec![0.0], vec![0.0]);
//! trajectory.at_time(0.5 * trajectory.duration(), &mut p, &mut v, &mut a).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML input parsing
//! - `defmt`: Enables defmt formatting of public types for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

extern crate alloc;

// Core modules
pub mod error;
pub mod input;
mod math;
pub mod profile;
mod solve;
pub mod trajectory;

// Re-exports for ergonomic API
pub use error::{CalculationError, Error, InputError, Result};
pub use input::{
    validate_input, ControlInterface, DurationDiscretization, MotionInput, Synchronization,
};
pub use profile::{BrakeProfile, Direction, JerkSigns, PositionExtrema, Profile, ReachedLimits};
pub use trajectory::{Section, Trajectory};

// Input loading (std only)
#[cfg(feature = "std")]
pub use input::{load_input, parse_input};
