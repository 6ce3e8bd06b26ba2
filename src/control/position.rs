//! Closed-loop field-axis position controller.
//!
//! One instance per translation axis. The caller feeds in the live tracked
//! coordinate each cycle and the controller routes its PID output into the
//! matching raw translation channel of the drive.

use serde::{Deserialize, Serialize};

use crate::control::pid::{ErrorMode, PidConfig, PidController};
use crate::drive::SwerveDrive;

/// Which translation channel a controller commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Left/right (x coordinate).
    Strafe,
    /// Forward/backward (y coordinate).
    Forward,
}

/// Gains and tolerance for an [`AxisController`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisGains {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    /// Arrival tolerance in feet
    pub tolerance_ft: f32,
    /// Integral reset band in feet
    pub izone_ft: f32,
    /// Raw output clamp magnitude; translation commands are kept gentle so
    /// the heading controller can run concurrently.
    pub raw_limit: f32,
}

impl Default for AxisGains {
    fn default() -> Self {
        Self {
            kp: 0.05,
            ki: 0.0004,
            kd: 0.0,
            tolerance_ft: 0.25,
            izone_ft: 0.25,
            raw_limit: 0.5,
        }
    }
}

/// Drives one translation axis toward an absolute field coordinate.
#[derive(Debug, Clone)]
pub struct AxisController {
    axis: Axis,
    pid: PidController,
    tolerance_ft: f32,
}

impl AxisController {
    /// Create a controller for `axis`.
    pub fn new(axis: Axis, gains: AxisGains) -> Self {
        let config = PidConfig {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            izone: gains.izone_ft,
            raw_min: -gains.raw_limit,
            raw_max: gains.raw_limit,
            abs_min: 0.0,
            abs_max: 1.0,
        };
        Self {
            axis,
            pid: PidController::new(config, ErrorMode::Linear),
            tolerance_ft: gains.tolerance_ft,
        }
    }

    /// Axis this controller commands.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Request motion toward an absolute coordinate (feet). Must be called
    /// every cycle the controller should stay active.
    pub fn move_to(&mut self, position_ft: f32) {
        self.pid.set_setpoint(position_ft);
    }

    /// True while a setpoint is active.
    pub fn enabled(&self) -> bool {
        self.pid.enabled()
    }

    /// Translation rate computed by the latest cycle; `None` while disabled.
    pub fn rate(&self) -> Option<f32> {
        self.pid.rate()
    }

    /// True iff the controller is enabled and `position_ft` is within
    /// tolerance of its setpoint.
    pub fn is_at_location(&self, position_ft: f32) -> bool {
        match (self.pid.enabled(), self.pid.setpoint()) {
            (true, Some(setpoint)) => (setpoint - position_ft).abs() < self.tolerance_ft,
            _ => false,
        }
    }

    /// Run one control cycle: step the PID against the tracked coordinate
    /// and route the result into the drive's raw translation command.
    pub fn run(&mut self, position_ft: f32, drive: &mut SwerveDrive) {
        if let Some(rate) = self.pid.step(position_ft) {
            let command = if self.is_at_location(position_ft) {
                0.0
            } else {
                rate
            };
            match self.axis {
                Axis::Strafe => drive.set_raw_strafe(command),
                Axis::Forward => drive.set_raw_fwd(command),
            }
        }
    }
}
