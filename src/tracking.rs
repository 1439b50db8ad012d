//! Interface to the face/eye tracking subsystem.
//!
//! The tracker itself lives outside this crate. [`TrackingSession`] is the
//! control surface the pipeline drives, and [`TrackingEvent`] is what the
//! tracker delivers. [`RecordedSession`] replays a captured event stream,
//! which is what the command-line application and the tests run against.

use crate::{pose::FaceUpdate, pose::Pose, Error, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lifecycle control of a tracking session
pub trait TrackingSession {
    /// Begin producing pose updates, optionally discarding prior tracking state
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be started
    fn run(&mut self, reset_tracking: bool) -> Result<()>;

    /// Stop producing pose updates
    fn pause(&mut self);

    /// Whether the session is currently producing updates
    fn is_running(&self) -> bool;
}

/// A single update from the tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingEvent {
    /// Device/camera pose for the current render tick
    DevicePose(Pose),
    /// Face detected for the first time
    FaceAdded(FaceUpdate),
    /// Known face moved
    FaceUpdated(FaceUpdate),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Recording {
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    events: Vec<TrackingEvent>,
}

/// Session replaying a fixed list of tracking events
#[derive(Debug, Default)]
pub struct RecordedSession {
    events: Vec<TrackingEvent>,
    cursor: usize,
    running: bool,
}

impl RecordedSession {
    /// Create a session from in-memory events
    #[must_use]
    pub fn new(events: Vec<TrackingEvent>) -> Self {
        Self {
            events,
            cursor: 0,
            running: false,
        }
    }

    /// Load a recording from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Loading recorded session from {}", path.as_ref().display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a recording from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid recording
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let recording: Recording = serde_yaml::from_str(content)
            .map_err(|e| Error::TrackingError(format!("Failed to parse recording: {e}")))?;
        info!("Recording holds {} events", recording.events.len());
        Ok(Self::new(recording.events))
    }

    /// Save the events as a YAML recording
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let recording = Recording {
            events: self.events.clone(),
        };
        let content = serde_yaml::to_string(&recording)
            .map_err(|e| Error::TrackingError(format!("Failed to serialize recording: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Next event, or `None` when paused or exhausted
    pub fn next_event(&mut self) -> Option<TrackingEvent> {
        if !self.running {
            return None;
        }
        let event = self.events.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(event)
    }

    /// Events not yet delivered
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.events.len().saturating_sub(self.cursor)
    }
}

impl TrackingSession for RecordedSession {
    fn run(&mut self, reset_tracking: bool) -> Result<()> {
        if self.events.is_empty() {
            return Err(Error::TrackingError("Recording contains no events".to_string()));
        }
        if reset_tracking {
            debug!("Rewinding recorded session");
            self.cursor = 0;
        }
        self.running = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
