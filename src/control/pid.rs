//! Scalar PID feedback primitive.
//!
//! Designed for a hard real-time periodic loop: `step()` runs exactly once
//! per control cycle, and the setpoint must be re-supplied every cycle or
//! the controller auto-disables. A disabled controller reports `None`
//! instead of a rate: "no command, leave prior actuator state" is a
//! different signal than "command zero".

use serde::{Deserialize, Serialize};

use crate::core::math::wrap_error;

/// How the error between setpoint and measurement is computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ErrorMode {
    /// Plain subtraction `setpoint - measurement`.
    Linear,
    /// Subtraction folded into `(-period/2, period/2]` for circular
    /// quantities (360 for degrees, 1 for normalized encoder turns).
    Wrapped {
        /// Full range of the circular quantity
        period: f32,
    },
}

impl Default for ErrorMode {
    fn default() -> Self {
        ErrorMode::Linear
    }
}

/// Gains and output shaping for a [`PidController`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    /// Error band around zero inside which the integral accumulator is
    /// reset, preventing windup near the target.
    pub izone: f32,
    /// Lower clamp on the raw PID output
    pub raw_min: f32,
    /// Upper clamp on the raw PID output
    pub raw_max: f32,
    /// Minimum magnitude of a nonzero scaled output. Models the actuator
    /// deadband: a motor below some PWM floor does not move.
    pub abs_min: f32,
    /// Maximum magnitude of the scaled output
    pub abs_max: f32,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            izone: 0.0,
            raw_min: -1.0,
            raw_max: 1.0,
            abs_min: 0.0,
            abs_max: 1.0,
        }
    }
}

/// Generic scalar feedback controller.
///
/// Lifecycle per cycle:
/// 1. caller supplies a setpoint via [`set_setpoint`](Self::set_setpoint)
///    (or doesn't, which disables the controller this cycle)
/// 2. caller invokes [`step`](Self::step) with the live measurement
/// 3. the returned rate (if any) is routed to an actuator
///
/// The first step after re-enable clears the integral and derivative
/// history so stale data cannot spike the output.
#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,
    error_mode: ErrorMode,
    setpoint: Option<f32>,
    has_setpoint: bool,
    enabled: bool,
    err_sum: f32,
    last_err: f32,
    rate: Option<f32>,
}

impl PidController {
    /// Create a controller with the given shaping and error mode.
    pub fn new(config: PidConfig, error_mode: ErrorMode) -> Self {
        Self {
            config,
            error_mode,
            setpoint: None,
            has_setpoint: false,
            enabled: false,
            err_sum: 0.0,
            last_err: 0.0,
            rate: None,
        }
    }

    /// Supply the setpoint for the current cycle, marking the controller
    /// active. Must be called every cycle the controller should run.
    pub fn set_setpoint(&mut self, value: f32) {
        self.setpoint = Some(value);
        self.has_setpoint = true;
    }

    /// Last supplied setpoint, if any.
    pub fn setpoint(&self) -> Option<f32> {
        self.setpoint
    }

    /// True while the controller has an active setpoint.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Output rate computed by the latest step; `None` while disabled.
    pub fn rate(&self) -> Option<f32> {
        self.rate
    }

    /// Error between setpoint and measurement under this controller's
    /// error mode.
    pub fn compute_error(&self, setpoint: f32, measurement: f32) -> f32 {
        match self.error_mode {
            ErrorMode::Linear => setpoint - measurement,
            ErrorMode::Wrapped { period } => wrap_error(setpoint - measurement, period),
        }
    }

    /// Run one control cycle against `measurement`.
    ///
    /// Returns the scaled output rate, or `None` when no setpoint was
    /// supplied this cycle. Consumes the setpoint flag: the caller must
    /// re-supply the setpoint before the next step.
    pub fn step(&mut self, measurement: f32) -> Option<f32> {
        match (self.has_setpoint, self.setpoint) {
            (true, Some(setpoint)) => {
                if !self.enabled {
                    self.enabled = true;
                    self.err_sum = 0.0;
                    self.last_err = 0.0;
                }

                let err = self.compute_error(setpoint, measurement);
                if err.abs() < self.config.izone {
                    self.err_sum = 0.0;
                } else {
                    self.err_sum += err;
                }

                let raw = (err * self.config.kp
                    + self.err_sum * self.config.ki
                    + (err - self.last_err) * self.config.kd)
                    .clamp(self.config.raw_min, self.config.raw_max);

                let output = self.scale_output(raw);

                self.last_err = err;
                self.rate = Some(output);
            }
            _ => {
                if self.enabled {
                    self.enabled = false;
                    self.rate = None;
                }
            }
        }

        self.has_setpoint = false;
        self.rate
    }

    /// Rescale the magnitude of a nonzero raw output into
    /// `[abs_min, abs_max]`, preserving sign. Zero stays zero.
    fn scale_output(&self, raw: f32) -> f32 {
        if raw == 0.0 {
            return 0.0;
        }
        let span = self.config.abs_max - self.config.abs_min;
        (raw.abs() * span + self.config.abs_min).copysign(raw)
    }
}
