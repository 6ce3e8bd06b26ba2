//! Four-wheel swerve drive coordinator.
//!
//! Turns a chassis motion request (fwd, strafe, rcw) into per-wheel speed
//! and angle commands via the rectangular-chassis quadrant decomposition,
//! applies the driver-assist behavior flags, and optionally dead-reckons a
//! chassis position estimate from the wheels' drive encoders.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::math::{normalize_magnitudes, snap_to_axis, square_input};
use crate::core::types::{ChassisVector, WheelCorner};
use crate::drive::module::SwerveModule;
use crate::error::{DriveError, Result};
use crate::hal::{Gyro, TelemetryHandle};

/// Chassis geometry and input shaping parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SwerveDriveConfig {
    /// Track width (left-right wheel separation) in feet.
    pub width_ft: f32,
    /// Wheel base (front-rear wheel separation) in feet.
    pub length_ft: f32,
    /// Square joystick inputs for finer low-speed control.
    pub squared_inputs: bool,
    /// Scale applied to filtered translation inputs.
    pub xy_multiplier: f32,
    /// Scale applied to filtered rotation inputs.
    pub rotation_multiplier: f32,
    /// Inputs below this magnitude are treated as zero.
    pub lower_input_threshold: f32,
    /// Apply the input deadband at all.
    pub threshold_inputs: bool,
    /// Number of compass directions translation snaps to when snapping is
    /// enabled. Zero disables snapping outright.
    pub snap_rotation_axes: u32,
}

impl Default for SwerveDriveConfig {
    fn default() -> Self {
        Self {
            width_ft: 22.0 / 12.0,
            length_ft: 18.5 / 12.0,
            squared_inputs: true,
            xy_multiplier: 0.85,
            rotation_multiplier: 0.5,
            lower_input_threshold: 0.06,
            threshold_inputs: true,
            snap_rotation_axes: 8,
        }
    }
}

/// Speed and heading command for one wheel, produced by the kinematics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelCommand {
    /// Normalized wheel speed in [-1, 1]
    pub speed: f32,
    /// Wheel heading in degrees, 0 = chassis forward
    pub angle_deg: f32,
}

/// Decompose a chassis motion request into four wheel commands, in
/// [`WheelCorner::ALL`] order.
///
/// Quadrant construction for a rectangular chassis: the rotation component
/// shifts the left/right wheel columns along the chassis y axis and the
/// front/rear wheel rows along x, scaled by the chassis diagonal. Wheel
/// speeds are jointly renormalized so the fastest wheel never exceeds 1
/// while the ratios between wheels are preserved.
pub fn compute_wheel_commands(
    request: ChassisVector,
    width_ft: f32,
    length_ft: f32,
) -> [WheelCommand; 4] {
    let ratio = width_ft.hypot(length_ft);

    let left_y = request.fwd - request.rcw * (width_ft / ratio);
    let right_y = request.fwd + request.rcw * (width_ft / ratio);
    let front_x = request.strafe + request.rcw * (length_ft / ratio);
    let rear_x = request.strafe - request.rcw * (length_ft / ratio);

    // (y, x) per corner in ALL order: FL, FR, RL, RR.
    let quadrants = [
        (left_y, front_x),
        (right_y, front_x),
        (left_y, rear_x),
        (right_y, rear_x),
    ];

    let mut speeds = quadrants.map(|(y, x)| y.hypot(x));
    normalize_magnitudes(&mut speeds);

    let mut commands = [WheelCommand {
        speed: 0.0,
        angle_deg: 0.0,
    }; 4];
    for (i, (y, x)) in quadrants.into_iter().enumerate() {
        commands[i] = WheelCommand {
            speed: speeds[i],
            angle_deg: x.atan2(y).to_degrees(),
        };
    }
    commands
}

/// Internal encoder-based position estimate, integrated during `execute`.
///
/// A checkpoint of `None` means the wheel has no distance origin yet (its
/// encoder was unreadable when prediction was enabled); the wheel is
/// skipped until a reading arrives to seed it, never defaulted.
#[derive(Debug, Default)]
struct PositionPredictor {
    enabled: bool,
    position: ChassisVector,
    checkpoints: [Option<f32>; 4],
}

/// The full drivetrain: four wheel modules, the gyro, and the behavior
/// flags that shape incoming motion requests.
///
/// Per-cycle protocol: callers feed a request through [`move_to`]
/// (filtered) or the `set_raw_*` channels (unfiltered, used by the
/// closed-loop controllers), then [`execute`] consumes it. The request is
/// zeroed on consumption.
///
/// [`move_to`]: Self::move_to
/// [`execute`]: Self::execute
pub struct SwerveDrive {
    modules: [SwerveModule; 4],
    gyro: Box<dyn Gyro>,
    config: SwerveDriveConfig,
    telemetry: TelemetryHandle,
    request: ChassisVector,
    /// Last computed wheel angles; retained across cycles so wheels hold
    /// their heading while the chassis is idle.
    wheel_angles: [f32; 4],
    field_centric: bool,
    snap_rotation: bool,
    request_wheel_lock: bool,
    predictor: PositionPredictor,
}

impl SwerveDrive {
    /// Assemble the drive. Modules are given in [`WheelCorner::ALL`] order.
    pub fn new(
        modules: [SwerveModule; 4],
        gyro: Box<dyn Gyro>,
        config: SwerveDriveConfig,
        telemetry: TelemetryHandle,
    ) -> Self {
        Self {
            modules,
            gyro,
            config,
            telemetry,
            request: ChassisVector::zero(),
            wheel_angles: [0.0; 4],
            field_centric: false,
            snap_rotation: false,
            request_wheel_lock: false,
            predictor: PositionPredictor::default(),
        }
    }

    /// Access one wheel module.
    pub fn module(&self, corner: WheelCorner) -> &SwerveModule {
        &self.modules[corner.index()]
    }

    /// Mutable access to one wheel module (calibration, tuning).
    pub fn module_mut(&mut self, corner: WheelCorner) -> &mut SwerveModule {
        &mut self.modules[corner.index()]
    }

    /// Current gyro yaw in degrees `[0, 360)`.
    pub fn yaw_deg(&self) -> f32 {
        self.gyro.yaw_deg()
    }

    /// Re-zero the gyro yaw.
    pub fn reset_gyro(&mut self) {
        self.gyro.reset();
    }

    /// Toggle field-centric driving. Enabling re-zeroes the gyro so the
    /// chassis's current heading becomes field-forward.
    pub fn set_field_centric(&mut self, enabled: bool) {
        if enabled && !self.field_centric {
            self.gyro.reset();
            info!("field-centric driving enabled, gyro re-zeroed");
        }
        self.field_centric = enabled;
    }

    /// Current field-centric setting.
    pub fn field_centric(&self) -> bool {
        self.field_centric
    }

    /// Toggle translation snapping to the configured compass axes.
    pub fn set_snap_rotation(&mut self, enabled: bool) {
        self.snap_rotation = enabled;
    }

    /// Toggle reverse optimization on all four modules.
    pub fn set_allow_reverse(&mut self, allow: bool) {
        for module in &mut self.modules {
            module.set_allow_reverse(allow);
        }
    }

    /// Request the defensive wheel-lock pattern. One-shot: applied on the
    /// next idle cycle, then cleared.
    pub fn request_wheel_lock(&mut self) {
        self.request_wheel_lock = true;
    }

    /// Filtered forward input: squared (when enabled) and scaled.
    pub fn set_fwd(&mut self, fwd: f32) {
        let fwd = if self.config.squared_inputs {
            square_input(fwd)
        } else {
            fwd
        };
        self.request.fwd = fwd * self.config.xy_multiplier;
    }

    /// Filtered strafe input: squared (when enabled) and scaled.
    pub fn set_strafe(&mut self, strafe: f32) {
        let strafe = if self.config.squared_inputs {
            square_input(strafe)
        } else {
            strafe
        };
        self.request.strafe = strafe * self.config.xy_multiplier;
    }

    /// Filtered rotation input: squared (when enabled) and scaled.
    pub fn set_rcw(&mut self, rcw: f32) {
        let rcw = if self.config.squared_inputs {
            square_input(rcw)
        } else {
            rcw
        };
        self.request.rcw = rcw * self.config.rotation_multiplier;
    }

    /// Raw forward command, bypassing all input shaping.
    pub fn set_raw_fwd(&mut self, fwd: f32) {
        self.request.fwd = fwd;
    }

    /// Raw strafe command, bypassing all input shaping.
    pub fn set_raw_strafe(&mut self, strafe: f32) {
        self.request.strafe = strafe;
    }

    /// Raw rotation command, bypassing all input shaping.
    pub fn set_raw_rcw(&mut self, rcw: f32) {
        self.request.rcw = rcw;
    }

    /// Request chassis motion for this cycle from driver-style inputs.
    ///
    /// Translation is optionally snapped to the configured compass axes,
    /// then rotated into the chassis frame when field-centric driving is
    /// active, then passed through the input filters.
    pub fn move_to(&mut self, fwd: f32, strafe: f32, rcw: f32) {
        let (mut fwd, mut strafe) = if self.snap_rotation {
            snap_to_axis(fwd, strafe, self.config.snap_rotation_axes)
        } else {
            (fwd, strafe)
        };

        if self.field_centric {
            let theta = (360.0 - self.gyro.yaw_deg()).to_radians();
            let (sin, cos) = theta.sin_cos();
            let field_fwd = fwd * cos + strafe * sin;
            let field_strafe = fwd * sin + strafe * cos;
            fwd = field_fwd;
            strafe = field_strafe;
        }

        self.set_fwd(fwd);
        self.set_strafe(strafe);
        self.set_rcw(rcw);
    }

    /// Drop all requested motion and park every wheel where it points.
    pub fn flush(&mut self) {
        self.request = ChassisVector::zero();
        for module in &mut self.modules {
            module.flush();
        }
    }

    /// Start integrating the encoder-based position estimate.
    ///
    /// Requires at least one complete diagonal pair of drive encoders so
    /// the rotation component is observable; fails otherwise. Resets the
    /// estimate and re-seeds the per-wheel checkpoints so no pre-existing
    /// travel is integrated.
    pub fn enable_position_prediction(&mut self) -> Result<()> {
        let has = |corner: WheelCorner| self.module(corner).has_drive_encoder();
        let diagonal_complete = (has(WheelCorner::FrontLeft) && has(WheelCorner::RearRight))
            || (has(WheelCorner::FrontRight) && has(WheelCorner::RearLeft));
        if !diagonal_complete {
            warn!("position prediction refused: no complete diagonal encoder pair");
            return Err(DriveError::InsufficientDriveEncoders);
        }

        self.predictor.position = ChassisVector::zero();
        for corner in WheelCorner::ALL {
            // A wheel whose reading is gapped right now stays unseeded and
            // is skipped until it produces one.
            self.predictor.checkpoints[corner.index()] =
                self.module(corner).drive_distance_ft();
        }
        self.predictor.enabled = true;
        info!("position prediction enabled");
        Ok(())
    }

    /// Stop integrating; the estimate freezes at its current value.
    pub fn disable_position_prediction(&mut self) {
        self.predictor.enabled = false;
    }

    /// Zero the position estimate without touching enablement.
    pub fn reset_position_prediction(&mut self) {
        self.predictor.position = ChassisVector::zero();
    }

    /// Predicted forward travel in feet since enablement.
    pub fn predicted_fwd(&self) -> f32 {
        self.predictor.position.fwd
    }

    /// Predicted strafe travel in feet since enablement.
    pub fn predicted_strafe(&self) -> f32 {
        self.predictor.position.strafe
    }

    /// Predicted accumulated rotation since enablement.
    pub fn predicted_rcw(&self) -> f32 {
        self.predictor.position.rcw
    }

    /// Integrate one cycle of encoder travel into the position estimate.
    ///
    /// Each wheel's displacement since its checkpoint is decomposed along
    /// its measured heading; the rotation component is the projection onto
    /// the wheel's mount-diagonal tangent, sign-flipped on the right side.
    /// Contributions are averaged over the wheels that produced a reading
    /// this cycle, so a transient encoder gap shrinks the denominator
    /// instead of biasing the estimate toward zero.
    fn predict_position(&mut self) {
        let radius = (self.config.width_ft / 2.0).hypot(self.config.length_ft / 2.0);

        let mut fwd = 0.0;
        let mut strafe = 0.0;
        let mut rcw = 0.0;
        let mut wheels = 0u32;

        for corner in WheelCorner::ALL {
            let module = &self.modules[corner.index()];
            let Some(distance) = module.drive_distance_ft() else {
                continue;
            };

            let checkpoint = &mut self.predictor.checkpoints[corner.index()];
            let Some(previous) = *checkpoint else {
                // First reading since enablement seeds the origin only.
                *checkpoint = Some(distance);
                continue;
            };
            let mut dist = distance - previous;
            *checkpoint = Some(distance);

            let theta = module.heading_rad();
            strafe += -theta.sin() * dist;
            fwd += theta.cos() * dist;

            let tangent = theta + corner.mount_diagonal_rad();
            if corner.is_right_side() {
                dist = -dist;
            }
            rcw += radius * tangent.cos() * dist;

            wheels += 1;
        }

        if wheels > 0 {
            let scale = 1.0 / wheels as f32;
            self.predictor.position.fwd += fwd * scale;
            self.predictor.position.strafe += strafe * scale;
            self.predictor.position.rcw += rcw * scale;
        }
    }

    /// Resolve the pending request into per-wheel speeds, consuming it.
    ///
    /// An all-zero request (after thresholding) leaves the wheel angles
    /// untouched so the chassis does not twitch at rest; a pending
    /// wheel-lock request is consumed at that point into the crossed ±45°
    /// pattern.
    fn calculate_vectors(&mut self) -> [f32; 4] {
        let mut triple = [self.request.fwd, self.request.strafe, self.request.rcw];
        normalize_magnitudes(&mut triple);

        if self.config.threshold_inputs {
            for v in &mut triple {
                if v.abs() < self.config.lower_input_threshold {
                    *v = 0.0;
                }
            }

            if triple == [0.0; 3] {
                if self.request_wheel_lock {
                    self.wheel_angles = [45.0, -45.0, -45.0, 45.0];
                    self.request_wheel_lock = false;
                }
                self.request = ChassisVector::zero();
                return [0.0; 4];
            }
        }

        let commands = compute_wheel_commands(
            ChassisVector::new(triple[0], triple[1], triple[2]),
            self.config.width_ft,
            self.config.length_ft,
        );

        let mut speeds = [0.0; 4];
        for (i, command) in commands.iter().enumerate() {
            speeds[i] = command.speed;
            self.wheel_angles[i] = command.angle_deg;
        }

        self.request = ChassisVector::zero();
        speeds
    }

    /// Run one drive cycle: publish telemetry, integrate the predictor,
    /// resolve the request into wheel commands, and execute every module.
    pub fn execute(&mut self) {
        self.publish_telemetry();

        if self.predictor.enabled {
            self.predict_position();
        }

        let speeds = self.calculate_vectors();
        for corner in WheelCorner::ALL {
            let i = corner.index();
            self.modules[i].move_to(speeds[i], self.wheel_angles[i]);
        }

        for module in &mut self.modules {
            module.execute();
        }
    }

    fn publish_telemetry(&self) {
        self.telemetry.put_number("drive/yaw", self.gyro.yaw_deg());
        self.telemetry
            .put_bool("drive/field_centric", self.field_centric);
        self.telemetry
            .put_bool("drive/predict_position", self.predictor.enabled);

        if self.predictor.enabled {
            self.telemetry
                .put_number("drive/predicted/x", self.predictor.position.strafe);
            self.telemetry
                .put_number("drive/predicted/y", self.predictor.position.fwd);
            self.telemetry
                .put_number("drive/predicted/rot", self.predictor.position.rcw);
        }

        for corner in WheelCorner::ALL {
            self.telemetry.put_number(
                &format!("drive/{}/angle", corner.label()),
                self.wheel_angles[corner.index()],
            );
        }
    }
}
