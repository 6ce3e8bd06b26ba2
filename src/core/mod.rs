//! Core foundation: shared types and angle math.
//!
//! This layer has no internal dependencies.

pub mod math;
pub mod types;

pub use types::{ChassisVector, PoseSample, WheelCorner};
