//! Shared drivetrain types.

use serde::{Deserialize, Serialize};

use std::f32::consts::FRAC_PI_4;

/// A chassis-relative motion command: normalized magnitudes in [-1, 1].
///
/// `fwd` and `strafe` are linear components, `rcw` is the clockwise rotation
/// component. Instances are ephemeral: the drive recomputes and zeroes the
/// active command every cycle after consumption so a stale command can never
/// replay.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisVector {
    /// Forward component (positive = robot forward)
    pub fwd: f32,
    /// Strafe component (positive = robot left)
    pub strafe: f32,
    /// Rotation component (positive = clockwise)
    pub rcw: f32,
}

impl ChassisVector {
    /// Create a new chassis vector.
    #[inline]
    pub fn new(fwd: f32, strafe: f32, rcw: f32) -> Self {
        Self { fwd, strafe, rcw }
    }

    /// The zero command.
    #[inline]
    pub fn zero() -> Self {
        Self::default()
    }

    /// True when all three components are exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.fwd == 0.0 && self.strafe == 0.0 && self.rcw == 0.0
    }
}

/// Identity of one wheel module on the chassis.
///
/// The four mount positions form a rectangle around the chassis center;
/// kinematics and odometry index per-wheel state by corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelCorner {
    /// Front left wheel
    FrontLeft,
    /// Front right wheel
    FrontRight,
    /// Rear left wheel
    RearLeft,
    /// Rear right wheel
    RearRight,
}

impl WheelCorner {
    /// All four corners in canonical order (matches array indexing).
    pub const ALL: [WheelCorner; 4] = [
        WheelCorner::FrontLeft,
        WheelCorner::FrontRight,
        WheelCorner::RearLeft,
        WheelCorner::RearRight,
    ];

    /// Canonical array index for this corner.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            WheelCorner::FrontLeft => 0,
            WheelCorner::FrontRight => 1,
            WheelCorner::RearLeft => 2,
            WheelCorner::RearRight => 3,
        }
    }

    /// Telemetry key segment for this corner.
    pub fn label(self) -> &'static str {
        match self {
            WheelCorner::FrontLeft => "front_left",
            WheelCorner::FrontRight => "front_right",
            WheelCorner::RearLeft => "rear_left",
            WheelCorner::RearRight => "rear_right",
        }
    }

    /// The diagonally opposite corner.
    pub fn diagonal(self) -> WheelCorner {
        match self {
            WheelCorner::FrontLeft => WheelCorner::RearRight,
            WheelCorner::FrontRight => WheelCorner::RearLeft,
            WheelCorner::RearLeft => WheelCorner::FrontRight,
            WheelCorner::RearRight => WheelCorner::FrontLeft,
        }
    }

    /// True for wheels mounted on the right side of the chassis.
    #[inline]
    pub fn is_right_side(self) -> bool {
        matches!(self, WheelCorner::FrontRight | WheelCorner::RearRight)
    }

    /// Angle (radians) from this wheel's forward direction to its
    /// rotation-tangential direction, given the rectangular mount geometry.
    ///
    /// Odometry uses this to extract the rotation contribution of a wheel's
    /// displacement.
    pub fn mount_diagonal_rad(self) -> f32 {
        match self {
            WheelCorner::FrontRight | WheelCorner::RearLeft => FRAC_PI_4,
            WheelCorner::FrontLeft | WheelCorner::RearRight => -FRAC_PI_4,
        }
    }
}

/// One pose snapshot recorded by the position history sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Heading in degrees at sample time
    pub heading_deg: f32,
    /// Odometric x position (feet) at sample time
    pub x: f32,
    /// Odometric y position (feet) at sample time
    pub y: f32,
    /// Timestamp in microseconds since epoch
    pub timestamp_us: u64,
}
