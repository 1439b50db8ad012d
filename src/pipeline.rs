//! Gaze estimation pipeline.
//!
//! The pipeline consumes two independent streams from the tracker:
//!
//! 1. Device pose updates, once per render tick. The virtual display plane is
//!    moved to the device pose and nothing else happens.
//! 2. Face updates, carrying both eye poses. Each eye is ray cast against the
//!    plane, hits are mapped to pixels, the two eyes are averaged, and the
//!    result is pushed through the smoother and handed to the listener.
//!
//! All state is mutated through `&mut self`, so updates against one pipeline
//! never overlap.

use crate::{
    constants::{DEFAULT_SMOOTHING_WINDOW, EYE_TARGET_DISTANCE_M, VIRTUAL_PLANE_SIZE_M},
    display_profile::DeviceDisplayProfile,
    pose::{FaceUpdate, Pose},
    ray_caster::{GazeRayCaster, PlaneIntersectionPoint, VirtualDisplayPlane},
    screen_mapper::{GazeSample, ScreenCoordinateMapper},
    smoothing::{GazePoint, GazeSmoother},
    tracking::{TrackingEvent, TrackingSession},
    Error, Result,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{
    mpsc::{self, Receiver, Sender},
    Arc, Mutex, Weak,
};

/// Receiver of smoothed gaze points
pub trait GazeListener: Send + Sync {
    /// Called with the new smoothed gaze point
    fn did_update(&self, point: GazePoint);
}

/// Listener forwarding gaze points into a single-consumer channel
pub struct ChannelListener {
    sender: Mutex<Sender<GazePoint>>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel
    #[must_use]
    pub fn channel() -> (Arc<Self>, Receiver<GazePoint>) {
        let (sender, receiver) = mpsc::channel();
        (
            Arc::new(Self {
                sender: Mutex::new(sender),
            }),
            receiver,
        )
    }
}

impl GazeListener for ChannelListener {
    fn did_update(&self, point: GazePoint) {
        let Ok(sender) = self.sender.lock() else {
            warn!("Gaze channel lock poisoned, dropping point");
            return;
        };
        if sender.send(point).is_err() {
            debug!("Gaze channel receiver dropped");
        }
    }
}

/// Contribution of an eye whose ray missed the plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEyeFallback {
    /// The eye's last mapped sample, or zero before its first hit
    #[default]
    LastSample,
    /// Always zero
    Zero,
}

/// Construction-time settings, fixed for the pipeline's lifetime
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Display the gaze point is mapped onto
    pub profile: DeviceDisplayProfile,
    /// Samples averaged per axis
    pub window_size: usize,
    /// Distance of the eye target point (meters)
    pub target_distance_m: f64,
    /// Side length of the virtual display plane (meters)
    pub plane_size_m: f64,
    /// What a missing eye contributes to the binocular mean
    pub missing_eye_fallback: MissingEyeFallback,
    /// Clear smoothing history on every `start()`
    pub reset_on_start: bool,
}

impl PipelineSettings {
    /// Default settings for a display profile
    #[must_use]
    pub const fn new(profile: DeviceDisplayProfile) -> Self {
        Self {
            profile,
            window_size: DEFAULT_SMOOTHING_WINDOW,
            target_distance_m: EYE_TARGET_DISTANCE_M,
            plane_size_m: VIRTUAL_PLANE_SIZE_M,
            missing_eye_fallback: MissingEyeFallback::LastSample,
            reset_on_start: false,
        }
    }

    /// Validate settings
    ///
    /// # Errors
    ///
    /// Returns an error if the window is empty or a distance is not positive
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidInput(
                "Smoothing window size must be greater than 0".to_string(),
            ));
        }
        if !self.target_distance_m.is_finite() || self.target_distance_m <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Eye target distance must be positive, got {}",
                self.target_distance_m
            )));
        }
        if !self.plane_size_m.is_finite() || self.plane_size_m <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Plane size must be positive, got {}",
                self.plane_size_m
            )));
        }
        Ok(())
    }
}

/// Latest poses received from the tracker
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackedPoses {
    /// Face anchor
    pub face: Pose,
    /// Left eye
    pub left_eye: Pose,
    /// Right eye
    pub right_eye: Pose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eye {
    Left = 0,
    Right = 1,
}

/// Orchestrates ray casting, mapping, smoothing and notification
pub struct GazeEstimationPipeline<S: TrackingSession> {
    session: S,
    listener: Weak<dyn GazeListener>,
    ray_caster: GazeRayCaster,
    mapper: ScreenCoordinateMapper,
    smoother: GazeSmoother,
    plane: VirtualDisplayPlane,
    poses: TrackedPoses,
    last_samples: [Option<GazeSample>; 2],
    fallback: MissingEyeFallback,
    reset_on_start: bool,
    running: bool,
}

impl<S: TrackingSession> GazeEstimationPipeline<S> {
    /// Create a pipeline notifying `listener`
    ///
    /// Only a weak reference to the listener is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid
    pub fn new<L: GazeListener + 'static>(settings: PipelineSettings, session: S, listener: &Arc<L>) -> Result<Self> {
        settings.validate()?;

        let (pixel_w, pixel_h) = settings.profile.pixel_resolution();
        info!(
            "Initializing gaze pipeline: {}x{} display, window {}, fallback {:?}",
            pixel_w, pixel_h, settings.window_size, settings.missing_eye_fallback
        );

        let listener: Weak<L> = Arc::downgrade(listener);
        let listener: Weak<dyn GazeListener> = listener;

        Ok(Self {
            session,
            listener,
            ray_caster: GazeRayCaster::new(settings.target_distance_m),
            mapper: ScreenCoordinateMapper::new(settings.profile),
            smoother: GazeSmoother::new(settings.window_size),
            plane: VirtualDisplayPlane::new(settings.plane_size_m),
            poses: TrackedPoses::default(),
            last_samples: [None, None],
            fallback: settings.missing_eye_fallback,
            reset_on_start: settings.reset_on_start,
            running: false,
        })
    }

    /// Start the tracking session, discarding its previous tracking state
    ///
    /// Smoothing history is kept unless `reset_on_start` was configured, in
    /// which case it is cleared once the session has started.
    /// Calling this while running does nothing.
    pub fn start(&mut self) {
        if self.running {
            debug!("Pipeline already running");
            return;
        }
        match self.session.run(true) {
            Ok(()) => {
                if self.reset_on_start {
                    self.reset_smoothing();
                }
                info!("Tracking session started");
                self.running = true;
            }
            Err(e) => warn!("Failed to start tracking session: {e}"),
        }
    }

    /// Stop the tracking session. Calling this while stopped does nothing.
    pub fn stop(&mut self) {
        if !self.running {
            debug!("Pipeline already stopped");
            return;
        }
        self.session.pause();
        self.running = false;
        info!("Tracking session stopped");
    }

    /// Whether `start()` succeeded and `stop()` has not been called since
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Clear smoothing history and the per-eye fallback samples
    pub fn reset_smoothing(&mut self) {
        debug!("Resetting gaze smoothing history");
        self.smoother.reset();
        self.last_samples = [None, None];
    }

    /// Dispatch one tracker event
    pub fn handle_event(&mut self, event: &TrackingEvent) -> Option<GazePoint> {
        match event {
            TrackingEvent::DevicePose(pose) => {
                self.on_device_pose(pose);
                None
            }
            TrackingEvent::FaceAdded(update) | TrackingEvent::FaceUpdated(update) => self.on_face_update(update),
        }
    }

    /// Move the virtual display plane to the device pose
    pub fn on_device_pose(&mut self, pose: &Pose) {
        self.plane.set_pose(*pose);
    }

    /// Estimate the gaze point for a face update
    ///
    /// Returns the smoothed point that was sent to the listener, or `None`
    /// when neither eye's ray reached the display plane.
    pub fn on_face_update(&mut self, update: &FaceUpdate) -> Option<GazePoint> {
        self.poses = TrackedPoses {
            face: update.face,
            left_eye: update.left_eye,
            right_eye: update.right_eye,
        };

        let left_hit = self.ray_caster.cast(&self.poses.left_eye, &self.plane);
        let right_hit = self.ray_caster.cast(&self.poses.right_eye, &self.plane);

        if left_hit.is_none() && right_hit.is_none() {
            debug!("Neither eye ray reached the display plane");
            return None;
        }

        let left = self.resolve_sample(Eye::Left, left_hit);
        let right = self.resolve_sample(Eye::Right, right_hit);

        // Plane y grows upward, pixel rows grow downward
        let combined_x = (right.x + left.x) / 2.0;
        let combined_y = -(right.y + left.y) / 2.0;
        self.smoother.push(combined_x, combined_y);

        let point = self.smoother.current_average()?;
        debug!("Gaze sample ({combined_x:.1}, {combined_y:.1}) smoothed to ({:.1}, {:.1})", point.x, point.y);
        self.notify(point);
        Some(point)
    }

    fn resolve_sample(&mut self, eye: Eye, hit: Option<PlaneIntersectionPoint>) -> GazeSample {
        let slot = &mut self.last_samples[eye as usize];
        match hit {
            Some(point) => {
                let sample = self.mapper.map(&point);
                *slot = Some(sample);
                sample
            }
            None => match self.fallback {
                MissingEyeFallback::LastSample => slot.unwrap_or_default(),
                MissingEyeFallback::Zero => GazeSample::default(),
            },
        }
    }

    fn notify(&self, point: GazePoint) {
        match self.listener.upgrade() {
            Some(listener) => listener.did_update(point),
            None => debug!("Gaze listener dropped, skipping notification"),
        }
    }

    /// Current virtual display plane
    #[must_use]
    pub const fn plane(&self) -> &VirtualDisplayPlane {
        &self.plane
    }

    /// Poses from the latest face update
    #[must_use]
    pub const fn poses(&self) -> &TrackedPoses {
        &self.poses
    }

    /// Smoothing history
    #[must_use]
    pub const fn smoother(&self) -> &GazeSmoother {
        &self.smoother
    }

    /// Display profile chosen at construction
    #[must_use]
    pub const fn profile(&self) -> &DeviceDisplayProfile {
        self.mapper.profile()
    }

    /// Tracking session
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Mutable access to the tracking session
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct CountingSession {
        runs: usize,
        pauses: usize,
        running: bool,
        fail: bool,
    }

    impl TrackingSession for CountingSession {
        fn run(&mut self, _reset_tracking: bool) -> Result<()> {
            if self.fail {
                return Err(Error::TrackingError("no camera".to_string()));
            }
            self.runs += 1;
            self.running = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.pauses += 1;
            self.running = false;
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    #[derive(Default)]
    struct Recorder {
        points: StdMutex<Vec<GazePoint>>,
    }

    impl GazeListener for Recorder {
        fn did_update(&self, point: GazePoint) {
            self.points.lock().unwrap().push(point);
        }
    }

    fn eye(x: f64, target: Point3<f64>) -> Pose {
        Pose::looking_at(Point3::new(x, 0.0, 0.3), target, Vector3::y())
    }

    fn face_update(left_target: Point3<f64>, right_target: Point3<f64>) -> FaceUpdate {
        FaceUpdate::new(
            Pose::from_position(Point3::new(0.0, 0.0, 0.3)),
            eye(-0.015, left_target),
            eye(0.015, right_target),
        )
    }

    fn pipeline(recorder: &Arc<Recorder>) -> GazeEstimationPipeline<CountingSession> {
        let settings = PipelineSettings::new(DeviceDisplayProfile::phone());
        GazeEstimationPipeline::new(settings, CountingSession::default(), recorder).unwrap()
    }

    #[test]
    fn test_rejects_zero_window() {
        let recorder = Arc::new(Recorder::default());
        let mut settings = PipelineSettings::new(DeviceDisplayProfile::phone());
        settings.window_size = 0;
        assert!(GazeEstimationPipeline::new(settings, CountingSession::default(), &recorder).is_err());
    }

    #[test]
    fn test_device_pose_moves_plane() {
        let recorder = Arc::new(Recorder::default());
        let mut pipeline = pipeline(&recorder);
        let pose = Pose::from_position(Point3::new(0.0, 0.1, 0.0));

        assert!(pipeline.handle_event(&TrackingEvent::DevicePose(pose)).is_none());
        assert_eq!(*pipeline.plane().pose(), pose);
        assert!(recorder.points.lock().unwrap().is_empty());
    }

    #[test]
    fn test_both_eyes_miss_skips_update() {
        let recorder = Arc::new(Recorder::default());
        let mut pipeline = pipeline(&recorder);
        let away = Point3::new(0.0, 0.0, 1.0);

        assert!(pipeline.on_face_update(&face_update(away, away)).is_none());
        assert!(pipeline.smoother().is_empty());
        assert!(recorder.points.lock().unwrap().is_empty());
    }

    #[test]
    fn test_single_eye_hit_uses_zero_before_first_sample() {
        let recorder = Arc::new(Recorder::default());
        let mut pipeline = pipeline(&recorder);
        let target = Point3::new(0.032_496_15, -0.070_325, 0.0);

        let point = pipeline
            .on_face_update(&face_update(Point3::new(0.0, 0.0, 1.0), target))
            .unwrap();
        assert_relative_eq!(point.x, 97.5, epsilon = 1e-6);
        assert_relative_eq!(point.y, 211.0, epsilon = 1e-6);
        assert_eq!(recorder.points.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_zero_fallback_ignores_previous_sample() {
        let recorder = Arc::new(Recorder::default());
        let mut settings = PipelineSettings::new(DeviceDisplayProfile::phone());
        settings.missing_eye_fallback = MissingEyeFallback::Zero;
        settings.window_size = 1;
        let mut pipeline = GazeEstimationPipeline::new(settings, CountingSession::default(), &recorder).unwrap();
        let target = Point3::new(0.032_496_15, -0.070_325, 0.0);

        pipeline.on_face_update(&face_update(target, target)).unwrap();
        let point = pipeline
            .on_face_update(&face_update(Point3::new(0.0, 0.0, 1.0), target))
            .unwrap();
        assert_relative_eq!(point.x, 97.5, epsilon = 1e-6);
        assert_relative_eq!(point.y, 211.0, epsilon = 1e-6);
    }

    #[test]
    fn test_start_stop_idempotent() {
        let recorder = Arc::new(Recorder::default());
        let mut pipeline = pipeline(&recorder);

        pipeline.start();
        pipeline.start();
        assert!(pipeline.is_running());
        assert_eq!(pipeline.session().runs, 1);

        pipeline.stop();
        pipeline.stop();
        assert!(!pipeline.is_running());
        assert_eq!(pipeline.session().pauses, 1);
    }

    #[test]
    fn test_failed_start_stays_stopped() {
        let recorder = Arc::new(Recorder::default());
        let settings = PipelineSettings::new(DeviceDisplayProfile::phone());
        let session = CountingSession {
            fail: true,
            ..CountingSession::default()
        };
        let mut pipeline = GazeEstimationPipeline::new(settings, session, &recorder).unwrap();

        pipeline.start();
        assert!(!pipeline.is_running());
    }

    #[test]
    fn test_reset_on_start_clears_history() {
        let recorder = Arc::new(Recorder::default());
        let mut settings = PipelineSettings::new(DeviceDisplayProfile::phone());
        settings.reset_on_start = true;
        let mut pipeline = GazeEstimationPipeline::new(settings, CountingSession::default(), &recorder).unwrap();
        let target = Point3::origin();

        pipeline.start();
        pipeline.on_face_update(&face_update(target, target)).unwrap();
        assert_eq!(pipeline.smoother().len(), 1);

        pipeline.stop();
        pipeline.start();
        assert!(pipeline.smoother().is_empty());
    }

    #[test]
    fn test_failed_start_keeps_history() {
        let recorder = Arc::new(Recorder::default());
        let mut settings = PipelineSettings::new(DeviceDisplayProfile::phone());
        settings.reset_on_start = true;
        let session = CountingSession {
            fail: true,
            ..CountingSession::default()
        };
        let mut pipeline = GazeEstimationPipeline::new(settings, session, &recorder).unwrap();
        let target = Point3::origin();

        pipeline.on_face_update(&face_update(target, target)).unwrap();
        pipeline.start();
        assert!(!pipeline.is_running());
        assert_eq!(pipeline.smoother().len(), 1);
    }

    #[test]
    fn test_pipeline_holds_listener_weakly() {
        let recorder = Arc::new(Recorder::default());
        let _pipeline = pipeline(&recorder);

        assert_eq!(Arc::strong_count(&recorder), 1);
        assert_eq!(Arc::weak_count(&recorder), 1);
    }

    #[test]
    fn test_dropped_listener_is_skipped() {
        let recorder = Arc::new(Recorder::default());
        let mut pipeline = pipeline(&recorder);
        drop(recorder);

        let target = Point3::origin();
        assert!(pipeline.on_face_update(&face_update(target, target)).is_some());
    }

    #[test]
    fn test_channel_listener_delivers_points() {
        let (listener, receiver) = ChannelListener::channel();
        let settings = PipelineSettings::new(DeviceDisplayProfile::phone());
        let mut pipeline = GazeEstimationPipeline::new(settings, CountingSession::default(), &listener).unwrap();

        let target = Point3::origin();
        let point = pipeline.on_face_update(&face_update(target, target)).unwrap();
        assert_eq!(receiver.try_recv().unwrap(), point);
        assert!(receiver.try_recv().is_err());
    }
}
