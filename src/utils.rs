//! Checked conversion of gaze points to integer marker positions.

use crate::{display_profile::DeviceDisplayProfile, smoothing::GazePoint};

/// Round and clamp f64 to `[min, max]`; non-finite values map to `min`
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.round().clamp(f64::from(min), f64::from(max));
    (clamped as i32).clamp(min, max)
}

/// Pixel at which to draw a marker for `point`, kept inside the display
#[must_use]
pub fn marker_position(point: &GazePoint, profile: &DeviceDisplayProfile) -> (i32, i32) {
    let (width, height) = profile.pixel_resolution();
    let max_x = f64_to_i32_clamp(width - 1.0, 0, i32::MAX);
    let max_y = f64_to_i32_clamp(height - 1.0, 0, i32::MAX);
    (
        f64_to_i32_clamp(point.x, 0, max_x),
        f64_to_i32_clamp(point.y, 0, max_y),
    )
}
