//! Mathematical primitives for drivetrain control.
//!
//! Functions for degree-domain angle normalization, wraparound-aware error
//! computation, input shaping, and joint magnitude renormalization.

/// Normalize an angle in degrees to `[0, 360)`.
///
/// # Example
/// ```
/// use chakra_drive::core::math::normalize_deg;
///
/// assert!((normalize_deg(-90.0) - 270.0).abs() < 1e-6);
/// assert!((normalize_deg(725.0) - 5.0).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_deg(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

/// Fold a raw difference into `(-period/2, period/2]`.
///
/// Used for wraparound-aware error computation on circular quantities:
/// degrees (period 360) and normalized encoder turns (period 1).
#[inline]
pub fn wrap_error(diff: f32, period: f32) -> f32 {
    let half = period / 2.0;
    let mut e = diff % period;
    if e > half {
        e -= period;
    } else if e <= -half {
        e += period;
    }
    e
}

/// Signed shortest-path error from a measured heading to a setpoint, degrees.
///
/// Raw subtraction of compass headings is discontinuous at the 0°/360°
/// boundary; this folds the result into `(-180, 180]`.
///
/// # Example
/// ```
/// use chakra_drive::core::math::heading_error_deg;
///
/// // Shortest path from 350° to 10° is +20°, not -340°.
/// assert!((heading_error_deg(10.0, 350.0) - 20.0).abs() < 1e-4);
/// ```
#[inline]
pub fn heading_error_deg(setpoint: f32, measurement: f32) -> f32 {
    wrap_error(setpoint - measurement, 360.0)
}

/// Square an input magnitude while preserving sign.
///
/// Gives finer low-speed control without giving up full-speed authority.
#[inline]
pub fn square_input(input: f32) -> f32 {
    (input * input).copysign(input)
}

/// Jointly rescale components so that no magnitude exceeds 1.
///
/// Proportions between components are preserved; values already within
/// [-1, 1] are left untouched. Used for both the chassis command triple and
/// the four computed wheel speeds (a pure-rotation command must not get
/// clipped asymmetrically).
pub fn normalize_magnitudes(values: &mut [f32]) {
    let max_magnitude = values.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    if max_magnitude > 1.0 {
        for v in values.iter_mut() {
            *v /= max_magnitude;
        }
    }
}

/// Snap a (fwd, strafe) vector to the nearest of `axes` evenly spaced
/// compass directions, preserving magnitude.
///
/// Rotation-invariant rounding: convert to polar, round the angle to the
/// nearest `360/axes` interval, convert back. A zero vector is returned
/// unchanged.
pub fn snap_to_axis(fwd: f32, strafe: f32, axes: u32) -> (f32, f32) {
    if axes == 0 {
        return (fwd, strafe);
    }

    let magnitude = fwd.hypot(strafe);
    if magnitude < f32::EPSILON {
        return (fwd, strafe);
    }

    let step = 360.0 / axes as f32;
    let angle_deg = strafe.atan2(fwd).to_degrees();
    let snapped = (angle_deg / step).round() * step;
    let rad = snapped.to_radians();

    (magnitude * rad.cos(), magnitude * rad.sin())
}
