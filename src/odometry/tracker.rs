//! Encoder-based chassis position tracker.
//!
//! Standalone odometry strategy, separate from the drive's internal
//! predictor: it reads the same wheel encoders but owns its own
//! checkpoints and accumulator, and can decompose displacement in either
//! the chassis frame or the field frame (gyro-rotated wheel headings).

use std::f32::consts::TAU;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::types::WheelCorner;
use crate::drive::SwerveDrive;
use crate::error::{DriveError, Result};

/// Coordinate frame the tracked position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceFrame {
    /// x/y follow the chassis orientation at each instant.
    Chassis,
    /// Wheel headings are rotated by the gyro yaw before decomposition, so
    /// x/y stay fixed to the field.
    Field,
}

/// Tracker parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Decomposition frame.
    pub frame: ReferenceFrame,
    /// Track width in feet (matches the drive config).
    pub width_ft: f32,
    /// Wheel base in feet (matches the drive config).
    pub length_ft: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            frame: ReferenceFrame::Chassis,
            width_ft: 22.0 / 12.0,
            length_ft: 18.5 / 12.0,
        }
    }
}

/// Accumulates wheel encoder travel into an {x, y, rotation} estimate.
///
/// Call [`update`](Self::update) once per control cycle while enabled.
/// Between enablement and the first update no distance is integrated: the
/// per-wheel checkpoints are re-seeded on enable, so travel that happened
/// while the tracker was off never leaks in.
#[derive(Debug)]
pub struct PositionTracker {
    config: TrackerConfig,
    enabled: bool,
    x: f32,
    y: f32,
    rcw: f32,
    /// Per-wheel distance origin; `None` until the wheel produces a
    /// reading, so pre-enable travel is never integrated.
    checkpoints: [Option<f32>; 4],
}

impl PositionTracker {
    /// Create a disabled tracker at the origin.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            enabled: false,
            x: 0.0,
            y: 0.0,
            rcw: 0.0,
            checkpoints: [None; 4],
        }
    }

    /// Tracked strafe position in feet (positive = left).
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Tracked forward position in feet.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Accumulated rotation estimate.
    pub fn rcw(&self) -> f32 {
        self.rcw
    }

    /// True while the tracker integrates updates.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start tracking. Fails without a complete diagonal pair of drive
    /// encoders (rotation would be unobservable). Checkpoints are seeded
    /// from the current readings; `zero` additionally resets the estimate.
    pub fn enable(&mut self, drive: &SwerveDrive, zero: bool) -> Result<()> {
        let has = |corner: WheelCorner| drive.module(corner).has_drive_encoder();
        let diagonal_complete = (has(WheelCorner::FrontLeft) && has(WheelCorner::RearRight))
            || (has(WheelCorner::FrontRight) && has(WheelCorner::RearLeft));
        if !diagonal_complete {
            warn!("position tracker refused: no complete diagonal encoder pair");
            return Err(DriveError::InsufficientDriveEncoders);
        }

        for corner in WheelCorner::ALL {
            // A wheel whose reading is gapped right now stays unseeded and
            // is skipped until it produces one.
            self.checkpoints[corner.index()] = drive.module(corner).drive_distance_ft();
        }

        self.enabled = true;
        if zero {
            self.reset();
        }
        info!("position tracker enabled ({:?} frame)", self.config.frame);
        Ok(())
    }

    /// Stop tracking; the estimate freezes unless `zero` is set.
    pub fn disable(&mut self, zero: bool) {
        self.enabled = false;
        if zero {
            self.reset();
        }
    }

    /// Zero the estimate without touching enablement.
    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.rcw = 0.0;
    }

    /// Integrate one cycle of wheel travel.
    ///
    /// Each encoder-bearing wheel contributes its displacement since the
    /// previous update, decomposed along its measured heading; in the Field
    /// frame the heading is first rotated by `yaw_deg`. The rotation
    /// component projects the displacement onto the wheel's mount-diagonal
    /// tangent, sign-flipped on the right side. Contributions are averaged
    /// over the wheels that actually produced a reading this cycle.
    pub fn update(&mut self, drive: &SwerveDrive, yaw_deg: f32) {
        if !self.enabled {
            return;
        }

        let radius = (self.config.width_ft / 2.0).hypot(self.config.length_ft / 2.0);
        let yaw_rad = yaw_deg.to_radians();

        let mut x = 0.0;
        let mut y = 0.0;
        let mut rcw = 0.0;
        let mut wheels = 0u32;

        for corner in WheelCorner::ALL {
            let module = drive.module(corner);
            let Some(distance) = module.drive_distance_ft() else {
                continue;
            };

            let checkpoint = &mut self.checkpoints[corner.index()];
            let Some(previous) = *checkpoint else {
                // First reading since enablement seeds the origin only.
                *checkpoint = Some(distance);
                continue;
            };
            let mut dist = distance - previous;
            *checkpoint = Some(distance);

            let heading = module.heading_rad();
            let theta = match self.config.frame {
                ReferenceFrame::Chassis => heading,
                ReferenceFrame::Field => (heading - yaw_rad).rem_euclid(TAU),
            };

            x += -theta.sin() * dist;
            y += theta.cos() * dist;

            // Rotation is chassis-relative regardless of frame.
            let tangent = heading + corner.mount_diagonal_rad();
            if corner.is_right_side() {
                dist = -dist;
            }
            rcw += radius * tangent.cos() * dist;

            wheels += 1;
        }

        if wheels > 0 {
            let scale = 1.0 / wheels as f32;
            self.x += x * scale;
            self.y += y * scale;
            self.rcw += rcw * scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_relative_eq;

    use crate::drive::module::SwerveModuleConfig;
    use crate::drive::swerve::SwerveDriveConfig;
    use crate::drive::SwerveModule;
    use crate::hal::mock::{
        DriveEncoderHandle, MockActuator, MockDriveEncoder, MockGyro, MockSteeringEncoder,
        SharedValue,
    };
    use crate::hal::NullTelemetry;

    struct Rig {
        drive: SwerveDrive,
        steering: [SharedValue; 4],
        encoders: [DriveEncoderHandle; 4],
    }

    fn rig(with_encoders: [bool; 4]) -> Rig {
        let mut steering = Vec::new();
        let mut encoders = Vec::new();
        let mut modules = Vec::new();

        for corner in WheelCorner::ALL {
            let (drive_motor, _) = MockActuator::new();
            let (steer_motor, _) = MockActuator::new();
            let (encoder, position) = MockSteeringEncoder::new(0.0);
            let (drive_encoder, ticks) = MockDriveEncoder::new();

            let boxed = with_encoders[corner.index()]
                .then(|| Box::new(drive_encoder) as Box<dyn crate::hal::DriveEncoder>);

            modules.push(SwerveModule::new(
                corner.label(),
                Box::new(drive_motor),
                Box::new(steer_motor),
                Box::new(encoder),
                boxed,
                SwerveModuleConfig::default(),
                Arc::new(NullTelemetry),
            ));
            steering.push(position);
            encoders.push(ticks);
        }

        let modules: [SwerveModule; 4] = modules
            .try_into()
            .unwrap_or_else(|_| unreachable!("exactly four modules"));
        let (gyro, _) = MockGyro::new(0.0);

        Rig {
            drive: SwerveDrive::new(
                modules,
                Box::new(gyro),
                SwerveDriveConfig::default(),
                Arc::new(NullTelemetry),
            ),
            steering: steering.try_into().unwrap_or_else(|_| unreachable!()),
            encoders: encoders.try_into().unwrap_or_else(|_| unreachable!()),
        }
    }

    fn rev_ft() -> f32 {
        (4.0 / 12.0) * std::f32::consts::PI
    }

    #[test]
    fn test_enable_requires_diagonal_pair() {
        let r = rig([true, true, false, false]);
        let mut tracker = PositionTracker::new(TrackerConfig::default());
        assert!(matches!(
            tracker.enable(&r.drive, true),
            Err(DriveError::InsufficientDriveEncoders)
        ));
        assert!(!tracker.is_enabled());

        let r = rig([false, true, true, false]);
        assert!(tracker.enable(&r.drive, true).is_ok());
        assert!(tracker.is_enabled());
    }

    #[test]
    fn test_forward_travel_accumulates_y() {
        let r = rig([true, true, true, true]);
        let mut tracker = PositionTracker::new(TrackerConfig::default());
        tracker.enable(&r.drive, true).unwrap();

        for enc in &r.encoders {
            enc.set_ticks(55_000.0);
        }
        tracker.update(&r.drive, 0.0);

        assert_relative_eq!(tracker.y(), rev_ft(), epsilon = 1e-4);
        assert_relative_eq!(tracker.x(), 0.0, epsilon = 1e-4);
        assert_relative_eq!(tracker.rcw(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_sideways_travel_accumulates_x() {
        let r = rig([true, true, true, true]);
        let mut tracker = PositionTracker::new(TrackerConfig::default());
        tracker.enable(&r.drive, true).unwrap();

        for pos in &r.steering {
            pos.set(0.25); // 90°
        }
        for enc in &r.encoders {
            enc.set_ticks(55_000.0);
        }
        tracker.update(&r.drive, 0.0);

        assert_relative_eq!(tracker.x(), -rev_ft(), epsilon = 1e-4);
        assert_relative_eq!(tracker.y(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_gapped_wheel_shrinks_denominator() {
        let r = rig([true, true, true, true]);
        let mut tracker = PositionTracker::new(TrackerConfig::default());
        tracker.enable(&r.drive, true).unwrap();

        r.encoders[0].set_available(false);
        for enc in &r.encoders[1..] {
            enc.set_ticks(55_000.0);
        }
        tracker.update(&r.drive, 0.0);

        // Average over the three live wheels, not the nominal four.
        assert_relative_eq!(tracker.y(), rev_ft(), epsilon = 1e-4);
    }

    #[test]
    fn test_enable_seeds_checkpoints() {
        let r = rig([true, true, true, true]);
        let mut tracker = PositionTracker::new(TrackerConfig::default());

        // Travel before enablement must not be integrated.
        for enc in &r.encoders {
            enc.set_ticks(30_000.0);
        }
        tracker.enable(&r.drive, true).unwrap();
        tracker.update(&r.drive, 0.0);
        assert_relative_eq!(tracker.y(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gap_during_enable_never_integrates_prior_travel() {
        let r = rig([true, true, true, true]);
        let mut tracker = PositionTracker::new(TrackerConfig::default());

        // Ten revolutions of pre-enable travel on every wheel, with one
        // wheel unreadable at the moment of enablement.
        for enc in &r.encoders {
            enc.set_ticks(550_000.0);
        }
        r.encoders[0].set_available(false);
        tracker.enable(&r.drive, true).unwrap();

        // The gap clears; the robot has not moved. The first reading from
        // the gapped wheel must seed its origin, not count as displacement.
        r.encoders[0].set_available(true);
        tracker.update(&r.drive, 0.0);
        assert_relative_eq!(tracker.y(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(tracker.x(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(tracker.rcw(), 0.0, epsilon = 1e-6);

        // Real travel after seeding is integrated normally.
        for enc in &r.encoders {
            enc.add_ticks(55_000.0);
        }
        tracker.update(&r.drive, 0.0);
        assert_relative_eq!(tracker.y(), rev_ft(), epsilon = 1e-4);
    }

    #[test]
    fn test_disable_freezes_estimate() {
        let r = rig([true, true, true, true]);
        let mut tracker = PositionTracker::new(TrackerConfig::default());
        tracker.enable(&r.drive, true).unwrap();

        for enc in &r.encoders {
            enc.set_ticks(55_000.0);
        }
        tracker.update(&r.drive, 0.0);
        let frozen = tracker.y();

        tracker.disable(false);
        for enc in &r.encoders {
            enc.set_ticks(110_000.0);
        }
        tracker.update(&r.drive, 0.0);
        assert_relative_eq!(tracker.y(), frozen);

        tracker.disable(true);
        assert_relative_eq!(tracker.y(), 0.0);
    }

    #[test]
    fn test_field_frame_counter_rotates_by_yaw() {
        let r = rig([true, true, true, true]);
        let mut tracker = PositionTracker::new(TrackerConfig {
            frame: ReferenceFrame::Field,
            ..Default::default()
        });
        tracker.enable(&r.drive, true).unwrap();

        // Chassis rotated 90°, wheels pointing chassis-forward: travel is
        // field-sideways.
        for enc in &r.encoders {
            enc.set_ticks(55_000.0);
        }
        tracker.update(&r.drive, 90.0);

        assert_relative_eq!(tracker.y(), 0.0, epsilon = 1e-4);
        assert_relative_eq!(tracker.x().abs(), rev_ft(), epsilon = 1e-4);
    }
}
