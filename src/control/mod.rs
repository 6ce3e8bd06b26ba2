//! Closed-loop controllers.
//!
//! The PID primitive produces a bounded, deadband-compensated output rate
//! from a setpoint and a per-cycle measurement. The heading and axis
//! controllers wrap it with domain-specific error folding and route their
//! output into the drive's raw command channels.

pub mod heading;
pub mod pid;
pub mod position;

pub use heading::{HeadingController, HeadingGains};
pub use pid::{ErrorMode, PidConfig, PidController};
pub use position::{Axis, AxisController, AxisGains};
