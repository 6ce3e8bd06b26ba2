//! Single swerve wheel pod.
//!
//! Each module pairs a drive motor with a continuous-rotation steering
//! motor and an absolute steering encoder. Steering positions are handled
//! in normalized turns `[0, 1)` internally and degrees at the API boundary.

use std::f32::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::control::pid::{ErrorMode, PidConfig, PidController};
use crate::core::math::{heading_error_deg, normalize_deg};
use crate::hal::{Actuator, DriveEncoder, SteeringEncoder, TelemetryHandle};

/// Per-module mechanical and tuning parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SwerveModuleConfig {
    /// Encoder reading (normalized turns) at which the wheel points forward.
    pub zero_offset: f32,
    /// Invert the drive motor direction.
    pub inverted: bool,
    /// Spin the wheel backwards instead of steering more than 90 degrees.
    pub allow_reverse: bool,
    /// Steering feedback gains. Error is in degrees of steering rotation.
    pub steer: PidConfig,
    /// Steering error (degrees) below which the module reports aligned.
    pub alignment_tolerance_deg: f32,
    /// Wheel diameter in feet.
    pub wheel_diameter_ft: f32,
    /// Drive encoder ticks per wheel revolution.
    pub ticks_per_rev: f32,
}

impl Default for SwerveModuleConfig {
    fn default() -> Self {
        Self {
            zero_offset: 0.0,
            inverted: false,
            allow_reverse: true,
            steer: PidConfig {
                // 1.5 per normalized turn of a 5-unit-per-rev sensor,
                // re-expressed per degree.
                kp: 0.0208,
                ..Default::default()
            },
            alignment_tolerance_deg: 7.2,
            wheel_diameter_ft: 4.0 / 12.0,
            ticks_per_rev: 55_000.0,
        }
    }
}

/// One wheel pod: drive motor, steering motor, absolute steering encoder,
/// optional drive-distance encoder.
///
/// Per-cycle protocol: the drive calls [`move_to`](Self::move_to) with the
/// wheel's target, then [`execute`](Self::execute) pushes commands to the
/// motors. The requested speed is consumed by `execute`, so a wheel whose
/// command is not refreshed coasts to zero the next cycle.
pub struct SwerveModule {
    label: &'static str,
    config: SwerveModuleConfig,
    drive_motor: Box<dyn Actuator>,
    steer_motor: Box<dyn Actuator>,
    encoder: Box<dyn SteeringEncoder>,
    drive_encoder: Option<Box<dyn DriveEncoder>>,
    steer_pid: PidController,
    requested_speed: f32,
    /// Steering target in normalized turns, zero offset already applied.
    requested_position: f32,
    /// Drive distance origin in feet, subtracted from the raw reading.
    drive_zero_ft: f32,
    telemetry: TelemetryHandle,
}

impl SwerveModule {
    /// Assemble a module from its devices.
    pub fn new(
        label: &'static str,
        drive_motor: Box<dyn Actuator>,
        steer_motor: Box<dyn Actuator>,
        encoder: Box<dyn SteeringEncoder>,
        drive_encoder: Option<Box<dyn DriveEncoder>>,
        config: SwerveModuleConfig,
        telemetry: TelemetryHandle,
    ) -> Self {
        let requested_position = encoder.position();
        Self {
            label,
            config,
            drive_motor,
            steer_motor,
            encoder,
            drive_encoder,
            steer_pid: PidController::new(config.steer, ErrorMode::Wrapped { period: 360.0 }),
            requested_speed: 0.0,
            requested_position,
            drive_zero_ft: 0.0,
            telemetry,
        }
    }

    /// Label used in telemetry keys (e.g. `front_left`).
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Wheel circumference in feet.
    pub fn wheel_circumference_ft(&self) -> f32 {
        self.config.wheel_diameter_ft * PI
    }

    /// Zero-offset-corrected wheel heading in degrees `[0, 360)`.
    pub fn heading_deg(&self) -> f32 {
        (self.encoder.position() - self.config.zero_offset).rem_euclid(1.0) * 360.0
    }

    /// Wheel heading in radians, used by the odometry decomposition.
    pub fn heading_rad(&self) -> f32 {
        self.heading_deg().to_radians()
    }

    /// True when this module carries a drive-distance encoder.
    pub fn has_drive_encoder(&self) -> bool {
        self.drive_encoder.is_some()
    }

    /// Drive distance in feet since the last [`zero_drive_encoder`] call
    /// (construction if never zeroed). `None` without a drive encoder or
    /// when the reading is unavailable this cycle.
    ///
    /// [`zero_drive_encoder`]: Self::zero_drive_encoder
    pub fn drive_distance_ft(&self) -> Option<f32> {
        Some(self.raw_drive_distance_ft()? - self.drive_zero_ft)
    }

    fn raw_drive_distance_ft(&self) -> Option<f32> {
        let ticks = self.drive_encoder.as_ref()?.ticks()?;
        Some(ticks * self.wheel_circumference_ft() / self.config.ticks_per_rev)
    }

    /// Make the current drive reading the new distance origin, so
    /// [`drive_distance_ft`](Self::drive_distance_ft) reports travel from
    /// here on. With no drive encoder, or with the reading unavailable
    /// this cycle, the origin is left unchanged.
    pub fn zero_drive_encoder(&mut self) {
        if let Some(raw) = self.raw_drive_distance_ft() {
            self.drive_zero_ft = raw;
        }
    }

    /// Toggle reverse optimization.
    pub fn set_allow_reverse(&mut self, allow: bool) {
        self.config.allow_reverse = allow;
    }

    /// Current reverse optimization setting.
    pub fn allow_reverse(&self) -> bool {
        self.config.allow_reverse
    }

    /// Capture the current encoder reading as the new forward zero.
    pub fn recalibrate_zero(&mut self) {
        self.config.zero_offset = self.encoder.position();
        debug!(
            "{}: steering zero recalibrated to {:.4}",
            self.label, self.config.zero_offset
        );
    }

    /// Folded steering error against an arbitrary target, within tolerance.
    pub fn is_aligned_to(&self, angle_deg: f32) -> bool {
        heading_error_deg(angle_deg, self.heading_deg()).abs() < self.config.alignment_tolerance_deg
    }

    /// True when the wheel has reached its requested steering target.
    pub fn is_aligned(&self) -> bool {
        let target_deg =
            (self.requested_position - self.config.zero_offset).rem_euclid(1.0) * 360.0;
        self.is_aligned_to(target_deg)
    }

    /// Request a wheel state for this cycle: normalized speed in [-1, 1]
    /// and heading in degrees (0 = chassis forward).
    ///
    /// With `allow_reverse`, a target more than 90 degrees of shortest-path
    /// rotation away is served by reversing the wheel and steering to the
    /// opposite heading instead.
    pub fn move_to(&mut self, speed: f32, angle_deg: f32) {
        let mut speed = speed;
        let mut angle_deg = normalize_deg(angle_deg);

        if self.config.allow_reverse
            && heading_error_deg(angle_deg, self.heading_deg()).abs() > 90.0
        {
            speed = -speed;
            angle_deg = normalize_deg(angle_deg + 180.0);
        }

        self.requested_speed = speed;
        self.requested_position =
            (angle_deg / 360.0 + self.config.zero_offset).rem_euclid(1.0);
    }

    /// Park the steering target at the current reading and drop any
    /// requested speed.
    pub fn flush(&mut self) {
        self.requested_position = self.encoder.position();
        self.requested_speed = 0.0;
    }

    /// Run one control cycle: steer toward the requested position, command
    /// the drive motor, consume the requested speed, publish telemetry.
    pub fn execute(&mut self) {
        self.steer_pid.set_setpoint(self.requested_position * 360.0);
        if let Some(rate) = self.steer_pid.step(self.encoder.position() * 360.0) {
            self.steer_motor.set(rate);
        }

        let speed = if self.config.inverted {
            -self.requested_speed
        } else {
            self.requested_speed
        };
        self.drive_motor.set(speed);

        self.requested_speed = 0.0;

        self.publish_telemetry();
    }

    fn publish_telemetry(&self) {
        let prefix = self.label;
        self.telemetry
            .put_number(&format!("drive/{prefix}/degrees"), self.heading_deg());
        self.telemetry.put_number(
            &format!("drive/{prefix}/requested_position"),
            self.requested_position,
        );
        self.telemetry
            .put_bool(&format!("drive/{prefix}/aligned"), self.is_aligned());
        if let Some(dist) = self.drive_distance_ft() {
            self.telemetry
                .put_number(&format!("drive/{prefix}/drive_distance_ft"), dist);
        }
    }
}
