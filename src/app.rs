//! Replay application: drives a recorded tracking session through the pipeline.

use crate::{
    config::Config,
    display_profile::DeviceDisplayProfile,
    error::Result,
    pipeline::{ChannelListener, GazeEstimationPipeline},
    smoothing::GazePoint,
    tracking::RecordedSession,
    utils::marker_position,
};
use log::info;
use std::{path::PathBuf, sync::mpsc::Receiver, sync::Arc};

/// Replay application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Recorded session to replay
    pub session_path: PathBuf,
    /// Pipeline configuration
    pub config: Config,
    /// Print every gaze point, not only the summary
    pub verbose: bool,
}

/// One gaze point delivered to the consumer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeReport {
    /// Smoothed gaze point in display pixels
    pub point: GazePoint,
    /// Marker position clamped to the display
    pub marker: (i32, i32),
}

/// Main application struct
pub struct GazeApp {
    pipeline: GazeEstimationPipeline<RecordedSession>,
    receiver: Receiver<GazePoint>,
    // Owns the listener; the pipeline only holds a weak reference
    _listener: Arc<ChannelListener>,
    verbose: bool,
}

impl GazeApp {
    /// Create the application from a configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the session cannot be loaded
    pub fn new(config: AppConfig) -> Result<Self> {
        info!("Initializing gaze point replay");
        let session = RecordedSession::from_file(&config.session_path)?;
        Self::with_session(&config.config, session, config.verbose)
    }

    /// Create the application around an already loaded session
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn with_session(config: &Config, session: RecordedSession, verbose: bool) -> Result<Self> {
        let settings = config.pipeline_settings()?;
        let (listener, receiver) = ChannelListener::channel();
        let pipeline = GazeEstimationPipeline::new(settings, session, &listener)?;

        Ok(Self {
            pipeline,
            receiver,
            _listener: listener,
            verbose,
        })
    }

    /// Replay the whole session and return every gaze point delivered
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be started
    pub fn run(&mut self) -> Result<Vec<GazeReport>> {
        info!("Starting replay");
        self.pipeline.start();
        if !self.pipeline.is_running() {
            return Err(crate::Error::TrackingError("Session did not start".to_string()));
        }

        let profile = *self.pipeline.profile();
        let mut reports = Vec::new();
        let mut events = 0usize;

        while let Some(event) = self.pipeline.session_mut().next_event() {
            self.pipeline.handle_event(&event);
            events += 1;
            reports.extend(self.drain(&profile));
        }

        self.pipeline.stop();
        info!(
            "Replayed {} events, {} gaze points delivered",
            events,
            reports.len()
        );
        Ok(reports)
    }

    /// Gaze points waiting in the listener channel
    fn drain(&self, profile: &DeviceDisplayProfile) -> Vec<GazeReport> {
        self.receiver
            .try_iter()
            .map(|point| {
                let report = GazeReport {
                    point,
                    marker: marker_position(&point, profile),
                };
                if self.verbose {
                    println!(
                        "gaze ({:8.2}, {:8.2})  marker ({:4}, {:4})",
                        point.x, point.y, report.marker.0, report.marker.1
                    );
                }
                report
            })
            .collect()
    }
}
