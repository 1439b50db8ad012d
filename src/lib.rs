//! Gaze point estimation library for tracked-eye displays.
//!
//! Given per-frame poses for a face, its two eyes and the device holding the
//! display, this library estimates where on the display the user is looking:
//!
//! 1. The virtual display plane follows the device pose every render tick
//! 2. Each eye casts a ray along its forward axis onto that plane
//! 3. Plane hits are converted from meters to display pixels
//! 4. Both eyes are averaged and smoothed over a short rolling window
//! 5. The smoothed point is delivered to a registered listener
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use gaze_point_estimation::{
//!     display_profile::DeviceDisplayProfile,
//!     pipeline::{ChannelListener, GazeEstimationPipeline, PipelineSettings},
//!     pose::{FaceUpdate, Pose},
//!     tracking::RecordedSession,
//! };
//! use nalgebra::{Point3, Vector3};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (listener, receiver) = ChannelListener::channel();
//! let settings = PipelineSettings::new(DeviceDisplayProfile::phone());
//! let mut pipeline = GazeEstimationPipeline::new(settings, RecordedSession::default(), &listener)?;
//!
//! // Device at the origin, display facing +z
//! pipeline.on_device_pose(&Pose::identity());
//!
//! // Both eyes 30 cm in front of the display, looking at its origin
//! let target = Point3::origin();
//! let eye = |x: f64| Pose::looking_at(Point3::new(x, 0.0, 0.3), target, Vector3::y());
//! let update = FaceUpdate::new(Pose::from_position(Point3::new(0.0, 0.0, 0.3)), eye(-0.015), eye(0.015));
//! pipeline.on_face_update(&update);
//!
//! let point = receiver.recv()?;
//! println!("Looking at ({:.1}, {:.1})", point.x, point.y);
//! # Ok(())
//! # }
//! ```
//!
//! ## Smoothing Only
//!
//! ```
//! use gaze_point_estimation::smoothing::GazeSmoother;
//!
//! let mut smoother = GazeSmoother::new(10);
//! assert!(smoother.current_average().is_none());
//!
//! smoother.push(100.0, 200.0);
//! smoother.push(110.0, 210.0);
//! let point = smoother.current_average().unwrap();
//! assert_eq!((point.x, point.y), (105.0, 205.0));
//! ```

/// Rigid poses for the device, face and eyes
pub mod pose;

/// Physical and pixel geometry of supported displays
pub mod display_profile;

/// Eye gaze rays and plane intersection
pub mod ray_caster;

/// Plane-local meters to display pixels
pub mod screen_mapper;

/// Rolling-average smoothing of gaze samples
pub mod smoothing;

/// Gaze estimation pipeline and listener
pub mod pipeline;

/// Tracking session interface and recorded sessions
pub mod tracking;

/// Marker placement helpers
pub mod utils;

/// Error types and result handling
pub mod error;

/// Replay application module
pub mod app;

/// Constants used throughout the crate
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
