//! Swerve Kinematics Property Tests
//!
//! Exercises the chassis-to-wheel decomposition and the input shaping
//! pipeline without hardware:
//! - Joint renormalization never lets a wheel exceed full speed
//! - Pure translation steers all wheels identically
//! - Pure rotation produces the tangential wheel pattern
//! - Sub-deadband requests stop the wheels without disturbing their angles
//! - The defensive wheel-lock pattern is applied once, when idle
//!
//! Run with: `cargo test --test kinematics`

use std::sync::Arc;

use approx::assert_relative_eq;
use chakra_drive::drive::swerve::compute_wheel_commands;
use chakra_drive::hal::mock::{MockActuator, MockDriveEncoder, MockGyro, MockSteeringEncoder};
use chakra_drive::hal::DriveEncoder;
use chakra_drive::{
    ChassisVector, NullTelemetry, SwerveDrive, SwerveDriveConfig, SwerveModule,
    SwerveModuleConfig, WheelCorner,
};

const WIDTH_FT: f32 = 22.0 / 12.0;
const LENGTH_FT: f32 = 18.5 / 12.0;

// ============================================================================
// Test rig
// ============================================================================

struct Rig {
    drive: SwerveDrive,
    drive_cmds: [chakra_drive::hal::mock::SharedValue; 4],
    steer_cmds: [chakra_drive::hal::mock::SharedValue; 4],
}

fn rig() -> Rig {
    let mut drive_cmds = Vec::new();
    let mut steer_cmds = Vec::new();
    let mut modules = Vec::new();

    for corner in WheelCorner::ALL {
        let (drive_motor, drive_cmd) = MockActuator::new();
        let (steer_motor, steer_cmd) = MockActuator::new();
        let (encoder, _) = MockSteeringEncoder::new(0.0);
        let (drive_encoder, _) = MockDriveEncoder::new();

        modules.push(SwerveModule::new(
            corner.label(),
            Box::new(drive_motor),
            Box::new(steer_motor),
            Box::new(encoder),
            Some(Box::new(drive_encoder) as Box<dyn DriveEncoder>),
            SwerveModuleConfig::default(),
            Arc::new(NullTelemetry),
        ));
        drive_cmds.push(drive_cmd);
        steer_cmds.push(steer_cmd);
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
        drive_cmds: drive_cmds.try_into().unwrap_or_else(|_| unreachable!()),
        steer_cmds: steer_cmds.try_into().unwrap_or_else(|_| unreachable!()),
    }
}

// ============================================================================
// Pure decomposition properties
// ============================================================================

#[test]
fn test_speeds_never_exceed_one_across_input_grid() {
    let steps = [-1.0f32, -0.6, -0.2, 0.0, 0.2, 0.6, 1.0];
    for &fwd in &steps {
        for &strafe in &steps {
            for &rcw in &steps {
                let commands = compute_wheel_commands(
                    ChassisVector::new(fwd, strafe, rcw),
                    WIDTH_FT,
                    LENGTH_FT,
                );
                for command in commands {
                    assert!(
                        command.speed.abs() <= 1.0 + 1e-5,
                        "speed {} out of range for ({fwd}, {strafe}, {rcw})",
                        command.speed
                    );
                }
            }
        }
    }
}

#[test]
fn test_renormalization_preserves_speed_ratios() {
    let saturated =
        compute_wheel_commands(ChassisVector::new(1.0, 0.0, 1.0), WIDTH_FT, LENGTH_FT);
    let scaled =
        compute_wheel_commands(ChassisVector::new(0.5, 0.0, 0.5), WIDTH_FT, LENGTH_FT);

    // The half-magnitude request is in range, so it is untouched; the
    // saturated one must keep the same wheel-to-wheel proportions.
    let ratio_full = saturated[0].speed / saturated[1].speed;
    let ratio_half = scaled[0].speed / scaled[1].speed;
    assert_relative_eq!(ratio_full, ratio_half, epsilon = 1e-4);
}

#[test]
fn test_pure_translation_uniform_wheels() {
    for (fwd, strafe, expected_deg) in [
        (1.0, 0.0, 0.0),
        (0.0, 1.0, 90.0),
        (-0.5, 0.0, 180.0),
        (0.5, 0.5, 45.0),
        (0.5, -0.5, -45.0),
    ] {
        let commands = compute_wheel_commands(
            ChassisVector::new(fwd, strafe, 0.0),
            WIDTH_FT,
            LENGTH_FT,
        );
        let speed = commands[0].speed;
        for command in commands {
            assert_relative_eq!(
                command.angle_deg.rem_euclid(360.0),
                (expected_deg as f32).rem_euclid(360.0),
                epsilon = 1e-3
            );
            assert_relative_eq!(command.speed, speed, epsilon = 1e-5);
        }
    }
}

#[test]
fn test_pure_rotation_tangential_pattern() {
    let commands =
        compute_wheel_commands(ChassisVector::new(0.0, 0.0, 1.0), WIDTH_FT, LENGTH_FT);

    // Every wheel at full speed: the geometry ratio makes the tangential
    // magnitude exactly 1 for a unit rotation request.
    for command in commands {
        assert_relative_eq!(command.speed, 1.0, epsilon = 1e-5);
    }

    // Diagonal wheels point opposite ways.
    let fl = commands[WheelCorner::FrontLeft.index()].angle_deg;
    let fr = commands[WheelCorner::FrontRight.index()].angle_deg;
    let rl = commands[WheelCorner::RearLeft.index()].angle_deg;
    let rr = commands[WheelCorner::RearRight.index()].angle_deg;
    assert_relative_eq!((fl - rr).abs(), 180.0, epsilon = 1e-3);
    assert_relative_eq!((fr - rl).abs(), 180.0, epsilon = 1e-3);

    // Opposite rotation mirrors the pattern.
    let reversed =
        compute_wheel_commands(ChassisVector::new(0.0, 0.0, -1.0), WIDTH_FT, LENGTH_FT);
    assert_relative_eq!(
        reversed[WheelCorner::FrontLeft.index()].angle_deg,
        commands[WheelCorner::RearRight.index()].angle_deg,
        epsilon = 1e-3
    );
}

#[test]
fn test_rotation_translation_mix_is_asymmetric() {
    let commands =
        compute_wheel_commands(ChassisVector::new(0.5, 0.0, 0.3), WIDTH_FT, LENGTH_FT);
    // Rotating while translating: the right column runs faster than the
    // left for a clockwise component.
    assert!(
        commands[WheelCorner::FrontRight.index()].speed
            > commands[WheelCorner::FrontLeft.index()].speed
    );
    assert!(
        commands[WheelCorner::RearRight.index()].speed
            > commands[WheelCorner::RearLeft.index()].speed
    );
}

// ============================================================================
// Full-drive behavior: thresholding and wheel lock
// ============================================================================

#[test]
fn test_sub_threshold_request_stops_chassis() {
    let mut r = rig();

    r.drive.set_raw_fwd(0.04);
    r.drive.set_raw_strafe(0.05);
    r.drive.set_raw_rcw(0.03);
    r.drive.execute();

    for cmd in &r.drive_cmds {
        assert_relative_eq!(cmd.get(), 0.0, epsilon = 1e-6);
    }
}

#[test]
fn test_threshold_applies_after_renormalization() {
    let mut r = rig();

    // Raw components above 1 are renormalized jointly before the deadband
    // comparison, so a large vector passes even if one component would not.
    r.drive.set_raw_fwd(2.0);
    r.drive.set_raw_strafe(0.2);
    r.drive.execute();

    let max_cmd = r.drive_cmds.iter().fold(0.0f32, |m, c| m.max(c.get().abs()));
    assert!(max_cmd > 0.5);
}

#[test]
fn test_wheel_angles_survive_stop() {
    let mut r = rig();

    r.drive.set_raw_fwd(0.5);
    r.drive.set_raw_strafe(0.5);
    r.drive.execute();

    // The mock wheels never actually reach 45°, so the steering motors are
    // being pushed toward it.
    let pushing: Vec<f32> = r.steer_cmds.iter().map(|c| c.get()).collect();
    for cmd in &pushing {
        assert!(cmd.abs() > 0.0);
    }

    // An idle cycle keeps steering toward the retained 45°, not back to 0.
    r.drive.execute();
    for (cmd, prev) in r.steer_cmds.iter().zip(&pushing) {
        assert_relative_eq!(cmd.get(), *prev, epsilon = 1e-5);
    }
    for cmd in &r.drive_cmds {
        assert_relative_eq!(cmd.get(), 0.0, epsilon = 1e-6);
    }
}

#[test]
fn test_wheel_lock_crossed_pattern() {
    let mut r = rig();
    r.drive.request_wheel_lock();
    r.drive.execute();

    // All wheels sit at 0°; the lock pattern steers FL/RR toward +45 and
    // FR/RL toward -45, so the steer commands show the crossed signs.
    assert!(r.steer_cmds[WheelCorner::FrontLeft.index()].get() > 0.0);
    assert!(r.steer_cmds[WheelCorner::FrontRight.index()].get() < 0.0);
    assert!(r.steer_cmds[WheelCorner::RearLeft.index()].get() < 0.0);
    assert!(r.steer_cmds[WheelCorner::RearRight.index()].get() > 0.0);

    // No drive motion while locked.
    for cmd in &r.drive_cmds {
        assert_relative_eq!(cmd.get(), 0.0, epsilon = 1e-6);
    }
}
