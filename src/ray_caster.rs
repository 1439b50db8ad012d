//! Eye gaze rays and their intersection with the virtual display plane.
//!
//! Each eye looks along its local +z axis. A point a fixed distance ahead of
//! the eye is taken as the far end of a segment that runs back to the eye; the
//! point where that segment crosses the display plane is where the eye is
//! looking, expressed in the plane's own 2D frame.

use crate::{
    constants::{EPSILON, EYE_TARGET_DISTANCE_M, VIRTUAL_PLANE_SIZE_M},
    pose::Pose,
};
use nalgebra::{Point2, Point3};

/// Point on the display plane, in plane-local meters from its center
pub type PlaneIntersectionPoint = Point2<f64>;

/// Segment from the eye's far target point back to the eye
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeTargetRay {
    /// World-space target point ahead of the eye
    pub from: Point3<f64>,
    /// World-space eye position
    pub to: Point3<f64>,
}

/// Finite planar proxy for the device display
///
/// The plane spans the local x/y axes with its normal along local z, and
/// follows the device pose verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualDisplayPlane {
    pose: Pose,
    width: f64,
    height: f64,
}

impl VirtualDisplayPlane {
    /// Create a square plane with the given side length, at the world origin
    #[must_use]
    pub fn new(size_m: f64) -> Self {
        Self {
            pose: Pose::identity(),
            width: size_m,
            height: size_m,
        }
    }

    /// Current plane pose
    #[must_use]
    pub const fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Replace the plane pose
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// `(width, height)` in meters
    #[must_use]
    pub const fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

impl Default for VirtualDisplayPlane {
    fn default() -> Self {
        Self::new(VIRTUAL_PLANE_SIZE_M)
    }
}

/// Builds eye target rays and intersects them with the display plane
#[derive(Debug, Clone, Copy)]
pub struct GazeRayCaster {
    target_distance: f64,
}

impl GazeRayCaster {
    /// Create a caster placing the eye target `target_distance` meters ahead of the eye
    #[must_use]
    pub const fn new(target_distance: f64) -> Self {
        Self { target_distance }
    }

    /// Segment from the target point ahead of `eye` back to the eye itself
    #[must_use]
    pub fn eye_target_ray(&self, eye: &Pose) -> EyeTargetRay {
        EyeTargetRay {
            from: eye.transform_point(&Point3::new(0.0, 0.0, self.target_distance)),
            to: eye.position(),
        }
    }

    /// Intersect a ray segment with the plane
    ///
    /// Returns `None` when the segment is parallel to the plane, does not
    /// reach it, or crosses it outside the plane's extent.
    #[must_use]
    pub fn intersect(&self, ray: &EyeTargetRay, plane: &VirtualDisplayPlane) -> Option<PlaneIntersectionPoint> {
        let from = plane.pose().inverse_transform_point(&ray.from);
        let to = plane.pose().inverse_transform_point(&ray.to);

        let dz = to.z - from.z;
        if dz.abs() < EPSILON {
            return None;
        }

        let t = -from.z / dz;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        let hit = from + (to - from) * t;
        let (width, height) = plane.size();
        if hit.x.abs() > width / 2.0 || hit.y.abs() > height / 2.0 {
            return None;
        }

        Some(Point2::new(hit.x, hit.y))
    }

    /// Where on the plane `eye` is looking, if anywhere
    #[must_use]
    pub fn cast(&self, eye: &Pose, plane: &VirtualDisplayPlane) -> Option<PlaneIntersectionPoint> {
        self.intersect(&self.eye_target_ray(eye), plane)
    }
}

impl Default for GazeRayCaster {
    fn default() -> Self {
        Self::new(EYE_TARGET_DISTANCE_M)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};
    use std::f64::consts::FRAC_PI_2;

    fn eye_looking_at(eye: Point3<f64>, target: Point3<f64>) -> Pose {
        Pose::looking_at(eye, target, Vector3::y())
    }

    #[test]
    fn test_eye_target_ray_endpoints() {
        let caster = GazeRayCaster::default();
        let eye = eye_looking_at(Point3::new(0.1, 0.0, 0.3), Point3::new(0.1, 0.0, 0.0));

        let ray = caster.eye_target_ray(&eye);
        assert_relative_eq!(ray.from, Point3::new(0.1, 0.0, -1.7), epsilon = 1e-12);
        assert_relative_eq!(ray.to, Point3::new(0.1, 0.0, 0.3), epsilon = 1e-12);
    }

    #[test]
    fn test_straight_gaze_hits_under_eye() {
        let caster = GazeRayCaster::default();
        let plane = VirtualDisplayPlane::default();
        let eye = eye_looking_at(Point3::new(0.015, 0.02, 0.3), Point3::new(0.015, 0.02, 0.0));

        let hit = caster.cast(&eye, &plane).unwrap();
        assert_relative_eq!(hit, Point2::new(0.015, 0.02), epsilon = 1e-12);
    }

    #[test]
    fn test_oblique_gaze_hits_target() {
        let caster = GazeRayCaster::default();
        let plane = VirtualDisplayPlane::default();
        let target = Point3::new(0.03, -0.07, 0.0);
        let eye = eye_looking_at(Point3::new(-0.015, 0.0, 0.3), target);

        let hit = caster.cast(&eye, &plane).unwrap();
        assert_relative_eq!(hit, Point2::new(0.03, -0.07), epsilon = 1e-12);
    }

    #[test]
    fn test_looking_away_misses() {
        let caster = GazeRayCaster::default();
        let plane = VirtualDisplayPlane::default();
        let eye = eye_looking_at(Point3::new(0.0, 0.0, 0.3), Point3::new(0.0, 0.0, 1.0));

        assert!(caster.cast(&eye, &plane).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let caster = GazeRayCaster::default();
        let plane = VirtualDisplayPlane::default();
        let eye = eye_looking_at(Point3::new(0.0, 0.0, 0.3), Point3::new(1.0, 0.0, 0.3));

        assert!(caster.cast(&eye, &plane).is_none());
    }

    #[test]
    fn test_segment_too_short_misses() {
        // Plane is 2.5 m away, beyond the 2 m target point
        let caster = GazeRayCaster::default();
        let plane = VirtualDisplayPlane::default();
        let eye = eye_looking_at(Point3::new(0.0, 0.0, 2.5), Point3::origin());

        assert!(caster.cast(&eye, &plane).is_none());
    }

    #[test]
    fn test_hit_outside_plane_extent_misses() {
        let caster = GazeRayCaster::default();
        let plane = VirtualDisplayPlane::default();
        let eye = eye_looking_at(Point3::new(0.0, 0.0, 0.3), Point3::new(0.6, 0.0, 0.0));

        assert!(caster.cast(&eye, &plane).is_none());
    }

    #[test]
    fn test_intersection_uses_plane_pose() {
        let caster = GazeRayCaster::default();
        let mut plane = VirtualDisplayPlane::default();
        plane.set_pose(Pose::new(
            Point3::new(0.1, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        ));

        // World (0.1, 0.05) is plane-local (0.05, 0.0) after the quarter turn about z
        let eye = eye_looking_at(Point3::new(0.1, 0.05, 0.3), Point3::new(0.1, 0.05, 0.0));
        let hit = caster.cast(&eye, &plane).unwrap();
        assert_relative_eq!(hit, Point2::new(0.05, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_custom_target_distance() {
        let caster = GazeRayCaster::new(0.2);
        let plane = VirtualDisplayPlane::default();
        let eye = eye_looking_at(Point3::new(0.0, 0.0, 0.3), Point3::origin());

        assert!(caster.cast(&eye, &plane).is_none());
        assert!(GazeRayCaster::new(0.4).cast(&eye, &plane).is_some());
    }
}
