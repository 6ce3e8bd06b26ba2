//! ChakraDrive - Motion-control core for a four-wheel swerve drivetrain
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   control/                          │  ← Closed-loop controllers
//! │           (pid, heading, position)                  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  odometry/                          │  ← Dead reckoning
//! │              (tracker, history)                     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    drive/                           │  ← Drivetrain
//! │              (module, swerve)                       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     hal/                            │  ← Hardware abstraction
//! │     (actuators, encoders, gyro, telemetry)          │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Control cycle
//!
//! Everything above the hal runs inside one synchronous periodic loop
//! (the position history sampler is the single background thread):
//!
//! 1. Controllers are given their per-cycle setpoints (`align_to`,
//!    `move_to`) and stepped against live measurements; their outputs land
//!    in the drive's raw command channels. A controller whose setpoint is
//!    not refreshed disables itself and stops commanding.
//! 2. `SwerveDrive::execute` resolves the pending chassis request into
//!    per-wheel speed/angle commands and runs every wheel module.
//! 3. Odometry (`PositionTracker::update`) integrates the cycle's encoder
//!    travel.
//!
//! Commands are consumed on use. Nothing is latched across cycles except
//! wheel angles (wheels hold their heading at rest) and the odometry
//! accumulators.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Hardware abstraction (depends on core)
// ============================================================================
pub mod hal;

// ============================================================================
// Layer 3: Drivetrain (depends on core, hal)
// ============================================================================
pub mod drive;

// ============================================================================
// Layer 4: Odometry (depends on core, drive)
// ============================================================================
pub mod odometry;

// ============================================================================
// Layer 5: Closed-loop controllers (depends on core, drive)
// ============================================================================
pub mod control;

pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::types::{ChassisVector, PoseSample, WheelCorner};

// Hardware abstraction
pub use hal::{
    Actuator, Clock, DriveEncoder, Gyro, NullTelemetry, SteeringEncoder, SystemClock, Telemetry,
    TelemetryHandle,
};

// Drivetrain
pub use drive::{SwerveDrive, SwerveDriveConfig, SwerveModule, SwerveModuleConfig, WheelCommand};

// Odometry
pub use odometry::{
    HistoryBuffer, HistoryConfig, PositionHistory, PositionTracker, ReferenceFrame, TrackerConfig,
};

// Controllers
pub use control::{
    Axis, AxisController, AxisGains, ErrorMode, HeadingController, HeadingGains, PidConfig,
    PidController,
};

// Configuration and errors
pub use config::{ModulesConfig, RobotConfig};
pub use error::{DriveError, Result};
