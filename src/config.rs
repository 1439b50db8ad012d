//! Configuration management for the gaze point estimation application

use crate::{
    display_profile::{DeviceClass, DeviceDisplayProfile},
    pipeline::{MissingEyeFallback, PipelineSettings},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display selection
    pub display: DisplayConfig,

    /// Smoothing configuration
    pub smoothing: SmoothingConfig,

    /// Gaze ray configuration
    pub gaze: GazeConfig,

    /// Session lifecycle configuration
    pub session: SessionConfig,
}

/// Which display profile to map gaze points onto
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Device class: "phone", "tablet", "auto" or "custom"
    pub device: String,

    /// Display width in points, used when `device` is "auto"
    pub screen_width_points: Option<f64>,

    /// Physical `[width, height]` in meters, used when `device` is "custom"
    pub physical_size_m: Option<[f64; 2]>,

    /// Pixel `[width, height]`, used when `device` is "custom"
    pub pixel_resolution: Option<[f64; 2]>,
}

/// Smoothing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of recent samples averaged per axis
    pub window_size: usize,
}

/// Gaze ray configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Distance of the eye target point in meters
    pub target_distance_m: f64,

    /// Side length of the virtual display plane in meters
    pub plane_size_m: f64,

    /// Contribution of an eye that misses the plane
    pub missing_eye_fallback: MissingEyeFallback,
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Clear smoothing history whenever tracking is started
    pub reset_on_start: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: "phone".to_string(),
            screen_width_points: None,
            physical_size_m: None,
            pixel_resolution: None,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window_size: 10 }
    }
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            target_distance_m: 2.0,
            plane_size_m: 1.0,
            missing_eye_fallback: MissingEyeFallback::LastSample,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Resolve the display profile
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown device, a missing width for "auto",
    /// or missing/invalid dimensions for "custom"
    pub fn display_profile(&self) -> Result<DeviceDisplayProfile> {
        match self.display.device.to_lowercase().as_str() {
            "auto" => {
                let width = self.display.screen_width_points.ok_or_else(|| {
                    Error::ConfigError("screen_width_points is required for device \"auto\"".to_string())
                })?;
                Ok(DeviceClass::classify(width).profile())
            }
            "custom" => {
                let (Some([meter_w, meter_h]), Some([pixel_w, pixel_h])) =
                    (self.display.physical_size_m, self.display.pixel_resolution)
                else {
                    return Err(Error::ConfigError(
                        "physical_size_m and pixel_resolution are required for device \"custom\"".to_string(),
                    ));
                };
                DeviceDisplayProfile::new((meter_w, meter_h), (pixel_w, pixel_h))
            }
            name => Ok(name.parse::<DeviceClass>()?.profile()),
        }
    }

    /// Build pipeline settings from this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn pipeline_settings(&self) -> Result<PipelineSettings> {
        self.validate()?;
        let mut settings = PipelineSettings::new(self.display_profile()?);
        settings.window_size = self.smoothing.window_size;
        settings.target_distance_m = self.gaze.target_distance_m;
        settings.plane_size_m = self.gaze.plane_size_m;
        settings.missing_eye_fallback = self.gaze.missing_eye_fallback;
        settings.reset_on_start = self.session.reset_on_start;
        Ok(settings)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.smoothing.window_size == 0 {
            return Err(Error::ConfigError(
                "Smoothing window size must be greater than 0".to_string(),
            ));
        }
        if !self.gaze.target_distance_m.is_finite() || self.gaze.target_distance_m <= 0.0 {
            return Err(Error::ConfigError(
                "Eye target distance must be positive".to_string(),
            ));
        }
        if !self.gaze.plane_size_m.is_finite() || self.gaze.plane_size_m <= 0.0 {
            return Err(Error::ConfigError("Plane size must be positive".to_string()));
        }

        self.display_profile()
            .map_err(|e| Error::ConfigError(format!("Invalid display selection: {e}")))?;

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gaze Point Estimation Configuration

# Display the gaze point is mapped onto
display:
  # phone, tablet, auto (classify by screen_width_points) or custom
  device: "phone"
  # screen_width_points: 390
  # physical_size_m: [0.0649923, 0.14065]
  # pixel_resolution: [390, 844]

# Rolling average over the most recent samples
smoothing:
  window_size: 10

# Gaze rays
gaze:
  target_distance_m: 2.0
  plane_size_m: 1.0
  # last_sample or zero
  missing_eye_fallback: "last_sample"

# Tracking session lifecycle
session:
  reset_on_start: false
"#;
