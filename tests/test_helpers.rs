//! Helper functions and utilities for tests

#![allow(dead_code)]

use gaze_point_estimation::{
    pipeline::GazeListener,
    pose::{FaceUpdate, Pose},
    smoothing::GazePoint,
};
use nalgebra::{Point3, Vector3};
use std::sync::Mutex;

/// Interpupillary distance used by the synthetic faces (meters)
pub const EYE_SEPARATION_M: f64 = 0.03;

/// Distance of the synthetic face from the display (meters)
pub const FACE_DISTANCE_M: f64 = 0.3;

/// Plane-local point at the centre of the phone display, relative to the camera origin
pub fn phone_display_center() -> Point3<f64> {
    Point3::new(0.064_992_3 / 2.0, -0.140_65 / 2.0, 0.0)
}

/// A point the eyes cannot reach: behind the face, away from the display
pub fn behind_face() -> Point3<f64> {
    Point3::new(0.0, 0.0, 1.0)
}

/// Eye pose at `(x, 0, FACE_DISTANCE_M)` looking at `target`
pub fn eye_at(x: f64, target: Point3<f64>) -> Pose {
    Pose::looking_at(Point3::new(x, 0.0, FACE_DISTANCE_M), target, Vector3::y())
}

/// Face update with each eye looking at its own target
pub fn face_looking_at(left_target: Point3<f64>, right_target: Point3<f64>) -> FaceUpdate {
    FaceUpdate::new(
        Pose::from_position(Point3::new(0.0, 0.0, FACE_DISTANCE_M)),
        eye_at(-EYE_SEPARATION_M / 2.0, left_target),
        eye_at(EYE_SEPARATION_M / 2.0, right_target),
    )
}

/// Listener recording every point it receives
#[derive(Default)]
pub struct RecordingListener {
    points: Mutex<Vec<GazePoint>>,
}

impl RecordingListener {
    /// Points received so far
    pub fn points(&self) -> Vec<GazePoint> {
        self.points.lock().unwrap().clone()
    }
}

impl GazeListener for RecordingListener {
    fn did_update(&self, point: GazePoint) {
        self.points.lock().unwrap().push(point);
    }
}
