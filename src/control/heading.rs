//! Closed-loop chassis heading controller.
//!
//! Wraps the PID primitive with wraparound-aware angular error and routes
//! its output into the drive's raw rotation channel. Gain presets exist for
//! the stationary and translating cases: a moving chassis has less steering
//! friction, so it wants softer gains and a tighter tolerance.

use serde::{Deserialize, Serialize};

use crate::control::pid::{ErrorMode, PidConfig, PidController};
use crate::core::math::{heading_error_deg, normalize_deg};
use crate::drive::SwerveDrive;

/// Gains and tolerances for a [`HeadingController`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingGains {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    /// Alignment tolerance in degrees
    pub tolerance_deg: f32,
    /// Integral reset band in degrees
    pub izone_deg: f32,
    /// Minimum magnitude of a nonzero output (motor deadband floor)
    pub abs_min: f32,
    /// Maximum output magnitude
    pub abs_max: f32,
}

impl HeadingGains {
    /// Tuning for a chassis that is rotating in place.
    pub fn stationary() -> Self {
        Self {
            kp: 0.0025,
            ki: 0.0,
            kd: 0.0,
            tolerance_deg: 3.0,
            izone_deg: 3.0,
            abs_min: 0.18,
            abs_max: 0.6,
        }
    }

    /// Tuning for a chassis that is translating while it rotates.
    pub fn moving() -> Self {
        Self {
            kp: 0.002,
            ki: 0.0,
            kd: 0.0,
            tolerance_deg: 2.0,
            izone_deg: 2.0,
            abs_min: 0.06,
            abs_max: 0.5,
        }
    }
}

impl Default for HeadingGains {
    fn default() -> Self {
        Self::stationary()
    }
}

/// Drives the chassis toward an absolute heading.
///
/// The caller supplies the live heading each cycle; the composition root
/// decides where that heading comes from (gyro yaw in practice).
#[derive(Debug, Clone)]
pub struct HeadingController {
    pid: PidController,
    tolerance_deg: f32,
}

impl HeadingController {
    /// Create a controller from a gain preset.
    pub fn new(gains: HeadingGains) -> Self {
        let config = PidConfig {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            izone: gains.izone_deg,
            raw_min: -1.0,
            raw_max: 1.0,
            abs_min: gains.abs_min,
            abs_max: gains.abs_max,
        };
        Self {
            pid: PidController::new(config, ErrorMode::Wrapped { period: 360.0 }),
            tolerance_deg: gains.tolerance_deg,
        }
    }

    /// Request rotation toward an absolute heading (degrees). Must be
    /// called every cycle the controller should stay active.
    pub fn align_to(&mut self, angle_deg: f32) {
        self.pid.set_setpoint(normalize_deg(angle_deg));
    }

    /// True while a setpoint is active.
    pub fn enabled(&self) -> bool {
        self.pid.enabled()
    }

    /// Rotation rate computed by the latest cycle; `None` while disabled.
    pub fn rate(&self) -> Option<f32> {
        self.pid.rate()
    }

    /// True iff the controller is enabled and the folded error between its
    /// setpoint and `heading_deg` is within tolerance.
    ///
    /// Deterministically false while no setpoint was supplied this cycle;
    /// never a stale true.
    pub fn is_aligned(&self, heading_deg: f32) -> bool {
        match (self.pid.enabled(), self.pid.setpoint()) {
            (true, Some(setpoint)) => {
                heading_error_deg(setpoint, heading_deg).abs() < self.tolerance_deg
            }
            _ => false,
        }
    }

    /// Tolerance check against an arbitrary target, independent of whether
    /// the controller is enabled.
    pub fn is_aligned_to(&self, heading_deg: f32, target_deg: f32) -> bool {
        heading_error_deg(target_deg, heading_deg).abs() < self.tolerance_deg
    }

    /// Run one control cycle: step the PID against `heading_deg` and route
    /// the result into the drive's raw rotation command.
    ///
    /// Emits zero rotation once aligned, and leaves the drive untouched
    /// entirely while disabled.
    pub fn run(&mut self, heading_deg: f32, drive: &mut SwerveDrive) {
        if let Some(rate) = self.pid.step(heading_deg) {
            if self.is_aligned(heading_deg) {
                drive.set_raw_rcw(0.0);
            } else {
                drive.set_raw_rcw(rate);
            }
        }
    }
}
