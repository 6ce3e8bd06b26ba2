//! Drivetrain components.
//!
//! A [`SwerveModule`] wraps one wheel pod (drive motor, steering motor,
//! absolute steering encoder, optional drive encoder). [`SwerveDrive`]
//! owns the four modules plus the gyro and turns chassis motion requests
//! into per-wheel speed and angle commands.

pub mod module;
pub mod swerve;

pub use module::{SwerveModule, SwerveModuleConfig};
pub use swerve::{SwerveDrive, SwerveDriveConfig, WheelCommand};
