//! Conversion from plane-local meters to display pixels.

use crate::{display_profile::DeviceDisplayProfile, ray_caster::PlaneIntersectionPoint};

/// Pixel-space gaze estimate for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GazeSample {
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate
    pub y: f64,
}

impl GazeSample {
    /// Create a sample
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Maps plane intersections to pixels using a fixed display profile
///
/// The plane's vertical axis points the opposite way to pixel rows, but no
/// flip happens here; callers negate the combined binocular value once.
#[derive(Debug, Clone, Copy)]
pub struct ScreenCoordinateMapper {
    profile: DeviceDisplayProfile,
}

impl ScreenCoordinateMapper {
    /// Create a mapper for the given display
    #[must_use]
    pub const fn new(profile: DeviceDisplayProfile) -> Self {
        Self { profile }
    }

    /// Display profile used for the conversion
    #[must_use]
    pub const fn profile(&self) -> &DeviceDisplayProfile {
        &self.profile
    }

    /// Convert a plane-local point in meters to pixels
    #[must_use]
    pub fn map(&self, point: &PlaneIntersectionPoint) -> GazeSample {
        let (meter_w, meter_h) = self.profile.physical_size_m();
        let (pixel_w, pixel_h) = self.profile.pixel_resolution();

        GazeSample {
            x: point.x / meter_w * pixel_w,
            y: point.y / meter_h * pixel_h,
        }
    }
}
