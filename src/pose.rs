//! Rigid poses for the tracked device, face and eyes.
//!
//! A [`Pose`] is a position plus orientation snapshot in world space. Poses
//! are plain values: the tracker hands in fresh ones every update and nothing
//! keeps a parent/child relationship between them.

use crate::{constants::EPSILON, Error, Result};
use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid 3D transform (position + orientation) of a tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PoseRecord", into = "PoseRecord")]
pub struct Pose {
    isometry: Isometry3<f64>,
}

impl Pose {
    /// Pose at the world origin with no rotation
    #[must_use]
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
        }
    }

    /// Create a pose from a world position and orientation
    #[must_use]
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(position.coords), orientation),
        }
    }

    /// Create a pose from a translation only
    #[must_use]
    pub fn from_position(position: Point3<f64>) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    /// Pose at `eye` whose local +z axis points toward `target`
    ///
    /// `up` must not be parallel to `target - eye`.
    #[must_use]
    pub fn looking_at(eye: Point3<f64>, target: Point3<f64>, up: Vector3<f64>) -> Self {
        Self {
            isometry: Isometry3::face_towards(&eye, &target, &up),
        }
    }

    /// World-space position
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.isometry.translation.vector)
    }

    /// World-space orientation
    #[must_use]
    pub const fn orientation(&self) -> &UnitQuaternion<f64> {
        &self.isometry.rotation
    }

    /// Underlying rigid transform
    #[must_use]
    pub const fn isometry(&self) -> &Isometry3<f64> {
        &self.isometry
    }

    /// Map a point from this pose's local frame into world space
    #[must_use]
    pub fn transform_point(&self, local: &Point3<f64>) -> Point3<f64> {
        self.isometry.transform_point(local)
    }

    /// Map a world-space point into this pose's local frame
    #[must_use]
    pub fn inverse_transform_point(&self, world: &Point3<f64>) -> Point3<f64> {
        self.isometry.inverse_transform_point(world)
    }

    /// Compose `self ∘ child`, placing a pose expressed in this frame into world space
    #[must_use]
    pub fn compose(&self, child: &Self) -> Self {
        Self {
            isometry: self.isometry * child.isometry,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Isometry3<f64>> for Pose {
    fn from(isometry: Isometry3<f64>) -> Self {
        Self { isometry }
    }
}

/// Serialized form of a [`Pose`]: position in meters, quaternion as `[x, y, z, w]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PoseRecord {
    position: [f64; 3],
    #[serde(default = "identity_orientation")]
    orientation: [f64; 4],
}

const fn identity_orientation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl TryFrom<PoseRecord> for Pose {
    type Error = Error;

    fn try_from(record: PoseRecord) -> Result<Self> {
        if record.position.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Pose position must be finite, got {:?}",
                record.position
            )));
        }

        let [x, y, z, w] = record.orientation;
        let quaternion = Quaternion::new(w, x, y, z);
        if !quaternion.coords.iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Pose orientation must be finite, got {:?}",
                record.orientation
            )));
        }
        let orientation = UnitQuaternion::try_new(quaternion, EPSILON).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Pose orientation is not a rotation: {:?}",
                record.orientation
            ))
        })?;

        let [px, py, pz] = record.position;
        Ok(Self::new(Point3::new(px, py, pz), orientation))
    }
}

impl From<Pose> for PoseRecord {
    fn from(pose: Pose) -> Self {
        let p = pose.position();
        let q = pose.orientation().quaternion();
        Self {
            position: [p.x, p.y, p.z],
            orientation: [q.i, q.j, q.k, q.w],
        }
    }
}

/// One face-tracking update: the face and both eyes, in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceUpdate {
    /// Face anchor pose
    pub face: Pose,
    /// Left eye pose
    pub left_eye: Pose,
    /// Right eye pose
    pub right_eye: Pose,
}

impl FaceUpdate {
    /// Create an update from world-space eye poses
    #[must_use]
    pub const fn new(face: Pose, left_eye: Pose, right_eye: Pose) -> Self {
        Self {
            face,
            left_eye,
            right_eye,
        }
    }

    /// Create an update from eye poses expressed relative to the face anchor
    #[must_use]
    pub fn from_face_local(face: Pose, left_eye: Pose, right_eye: Pose) -> Self {
        Self {
            face,
            left_eye: face.compose(&left_eye),
            right_eye: face.compose(&right_eye),
        }
    }
}
