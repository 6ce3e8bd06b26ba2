//! Mock devices for hardware-free testing.
//!
//! Each mock splits into the boxed device handed to a component and a shared
//! handle the test keeps, so sensor values can be driven and actuator
//! commands observed while the component owns the box.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{Actuator, Clock, DriveEncoder, Gyro, SteeringEncoder, Telemetry};

/// Shared mutable f32 cell used by the mock devices.
#[derive(Debug, Clone, Default)]
pub struct SharedValue(Arc<Mutex<f32>>);

impl SharedValue {
    /// Create a cell holding `initial`.
    pub fn new(initial: f32) -> Self {
        Self(Arc::new(Mutex::new(initial)))
    }

    /// Read the current value.
    pub fn get(&self) -> f32 {
        *self.0.lock().unwrap()
    }

    /// Overwrite the value.
    pub fn set(&self, value: f32) {
        *self.0.lock().unwrap() = value;
    }

    /// Add `delta` to the value.
    pub fn add(&self, delta: f32) {
        *self.0.lock().unwrap() += delta;
    }
}

/// Actuator that records the last commanded value.
pub struct MockActuator {
    last: SharedValue,
}

impl MockActuator {
    /// Create an actuator and the handle observing its last command.
    pub fn new() -> (Self, SharedValue) {
        let last = SharedValue::new(0.0);
        (Self { last: last.clone() }, last)
    }
}

impl Actuator for MockActuator {
    fn set(&mut self, value: f32) {
        self.last.set(value);
    }
}

/// Absolute steering encoder with an externally settable position.
pub struct MockSteeringEncoder {
    position: SharedValue,
}

impl MockSteeringEncoder {
    /// Create an encoder at `initial` (normalized turns) and its handle.
    pub fn new(initial: f32) -> (Self, SharedValue) {
        let position = SharedValue::new(initial);
        (
            Self {
                position: position.clone(),
            },
            position,
        )
    }
}

impl SteeringEncoder for MockSteeringEncoder {
    fn position(&self) -> f32 {
        self.position.get().rem_euclid(1.0)
    }
}

/// Drive encoder with an externally settable tick count.
///
/// Setting `available` to false simulates a transient read gap.
pub struct MockDriveEncoder {
    inner: Arc<Mutex<DriveEncoderState>>,
}

#[derive(Debug, Default)]
struct DriveEncoderState {
    ticks: f32,
    available: bool,
}

/// Test-side handle for a [`MockDriveEncoder`].
#[derive(Clone)]
pub struct DriveEncoderHandle {
    inner: Arc<Mutex<DriveEncoderState>>,
}

impl DriveEncoderHandle {
    /// Advance the accumulated tick count.
    pub fn add_ticks(&self, delta: f32) {
        self.inner.lock().unwrap().ticks += delta;
    }

    /// Set the accumulated tick count.
    pub fn set_ticks(&self, ticks: f32) {
        self.inner.lock().unwrap().ticks = ticks;
    }

    /// Toggle reading availability (false = transient sensor gap).
    pub fn set_available(&self, available: bool) {
        self.inner.lock().unwrap().available = available;
    }
}

impl MockDriveEncoder {
    /// Create an encoder starting at zero ticks and its handle.
    pub fn new() -> (Self, DriveEncoderHandle) {
        let inner = Arc::new(Mutex::new(DriveEncoderState {
            ticks: 0.0,
            available: true,
        }));
        (
            Self {
                inner: inner.clone(),
            },
            DriveEncoderHandle { inner },
        )
    }
}

impl DriveEncoder for MockDriveEncoder {
    fn ticks(&self) -> Option<f32> {
        let state = self.inner.lock().unwrap();
        state.available.then_some(state.ticks)
    }
}

/// Gyro with an externally settable yaw.
pub struct MockGyro {
    yaw: SharedValue,
}

impl MockGyro {
    /// Create a gyro at `initial_deg` and its handle.
    pub fn new(initial_deg: f32) -> (Self, SharedValue) {
        let yaw = SharedValue::new(initial_deg);
        (Self { yaw: yaw.clone() }, yaw)
    }
}

impl Gyro for MockGyro {
    fn yaw_deg(&self) -> f32 {
        self.yaw.get().rem_euclid(360.0)
    }

    fn reset(&mut self) {
        self.yaw.set(0.0);
    }
}

/// Telemetry sink that records the last value published under each key.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    numbers: Mutex<HashMap<String, f32>>,
    bools: Mutex<HashMap<String, bool>>,
}

impl RecordingTelemetry {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last numeric value published under `key`, if any.
    pub fn number(&self, key: &str) -> Option<f32> {
        self.numbers.lock().unwrap().get(key).copied()
    }

    /// Last boolean value published under `key`, if any.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.bools.lock().unwrap().get(key).copied()
    }
}

impl Telemetry for RecordingTelemetry {
    fn put_number(&self, key: &str, value: f32) {
        self.numbers.lock().unwrap().insert(key.to_string(), value);
    }

    fn put_bool(&self, key: &str, value: bool) {
        self.bools.lock().unwrap().insert(key.to_string(), value);
    }
}

/// Clock that advances only when told to.
#[derive(Debug, Default)]
pub struct MockClock {
    now_us: AtomicU64,
}

impl MockClock {
    /// Create a clock starting at `start_us`.
    pub fn new(start_us: u64) -> Self {
        Self {
            now_us: AtomicU64::new(start_us),
        }
    }

    /// Advance the clock.
    pub fn advance_us(&self, delta: u64) {
        self.now_us.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> u64 {
        self.now_us.load(Ordering::SeqCst)
    }
}
