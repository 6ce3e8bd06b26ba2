//! Hardware abstraction for the drive core.
//!
//! Motors, encoders, the gyro, the telemetry sink, and the wall clock are
//! opaque interfaces consumed by the control components. The composition
//! root wires concrete drivers (or mocks) in at construction; nothing in
//! this crate reaches for hardware by name.

pub mod mock;

use std::sync::Arc;

/// An open-loop actuator: drive motor or continuous-rotation steering motor.
pub trait Actuator: Send {
    /// Command the actuator with a normalized value in [-1, 1].
    fn set(&mut self, value: f32);
}

/// Absolute steering-position sensor for one wheel module.
pub trait SteeringEncoder: Send {
    /// Current absolute position, normalized to `[0, 1)` per full steering
    /// revolution. The reading wraps at the sensor's full range.
    fn position(&self) -> f32;
}

/// Incremental drive-distance encoder for one wheel module.
pub trait DriveEncoder: Send {
    /// Accumulated tick count. Returns `None` when the reading is
    /// unavailable this cycle (transient sensor gap); callers drop the
    /// wheel's contribution for the cycle rather than guessing.
    fn ticks(&self) -> Option<f32>;
}

/// Chassis yaw sensor.
pub trait Gyro: Send {
    /// Continuous yaw in degrees, `[0, 360)` wrapping.
    fn yaw_deg(&self) -> f32;

    /// Re-zero the yaw reading.
    fn reset(&mut self);
}

/// Write-only sink for named numeric/boolean values.
///
/// Purely observational: control behavior must be identical whether values
/// land on a dashboard or in [`NullTelemetry`].
pub trait Telemetry: Send + Sync {
    /// Publish a numeric value under a key.
    fn put_number(&self, key: &str, value: f32);

    /// Publish a boolean value under a key.
    fn put_bool(&self, key: &str, value: bool);
}

/// Shared handle to a telemetry sink.
pub type TelemetryHandle = Arc<dyn Telemetry>;

/// Telemetry sink that discards everything.
#[derive(Debug, Default)]
pub struct NullTelemetry;

impl Telemetry for NullTelemetry {
    fn put_number(&self, _key: &str, _value: f32) {}
    fn put_bool(&self, _key: &str, _value: bool) {}
}

/// Monotonic-enough wall clock, abstracted so tests can control time.
pub trait Clock: Send + Sync {
    /// Current time in microseconds since epoch.
    fn now_us(&self) -> u64;
}

/// System clock backed by [`std::time::SystemTime`].
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_us(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}
