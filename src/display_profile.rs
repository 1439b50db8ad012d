//! Physical and pixel geometry of the supported device displays.

use crate::{
    constants::{
        PHONE_PHYSICAL_HEIGHT_M, PHONE_PHYSICAL_WIDTH_M, PHONE_PIXEL_HEIGHT, PHONE_PIXEL_WIDTH,
        TABLET_MIN_WIDTH_POINTS, TABLET_PHYSICAL_HEIGHT_M, TABLET_PHYSICAL_WIDTH_M, TABLET_PIXEL_HEIGHT,
        TABLET_PIXEL_WIDTH,
    },
    Error, Result,
};
use log::info;
use std::{fmt, str::FromStr};

/// Physical size and pixel resolution of a display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceDisplayProfile {
    physical_size_m: (f64, f64),
    pixel_resolution: (f64, f64),
}

impl DeviceDisplayProfile {
    /// Create a profile from `(width, height)` pairs
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfile`] if any dimension is not a positive finite number
    pub fn new(physical_size_m: (f64, f64), pixel_resolution: (f64, f64)) -> Result<Self> {
        for (name, value) in [
            ("physical width", physical_size_m.0),
            ("physical height", physical_size_m.1),
            ("pixel width", pixel_resolution.0),
            ("pixel height", pixel_resolution.1),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidProfile(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        Ok(Self {
            physical_size_m,
            pixel_resolution,
        })
    }

    /// Built-in phone profile (390 x 844 points)
    #[must_use]
    pub const fn phone() -> Self {
        Self {
            physical_size_m: (PHONE_PHYSICAL_WIDTH_M, PHONE_PHYSICAL_HEIGHT_M),
            pixel_resolution: (PHONE_PIXEL_WIDTH, PHONE_PIXEL_HEIGHT),
        }
    }

    /// Built-in tablet profile (834 x 1194 points)
    #[must_use]
    pub const fn tablet() -> Self {
        Self {
            physical_size_m: (TABLET_PHYSICAL_WIDTH_M, TABLET_PHYSICAL_HEIGHT_M),
            pixel_resolution: (TABLET_PIXEL_WIDTH, TABLET_PIXEL_HEIGHT),
        }
    }

    /// Physical `(width, height)` in meters
    #[must_use]
    pub const fn physical_size_m(&self) -> (f64, f64) {
        self.physical_size_m
    }

    /// Pixel `(width, height)`
    #[must_use]
    pub const fn pixel_resolution(&self) -> (f64, f64) {
        self.pixel_resolution
    }
}

/// Supported device classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Handheld phone
    Phone,
    /// Tablet
    Tablet,
}

impl DeviceClass {
    /// Classify a device by the width of its display in points
    #[must_use]
    pub fn classify(display_width_points: f64) -> Self {
        let class = if display_width_points >= TABLET_MIN_WIDTH_POINTS {
            Self::Tablet
        } else {
            Self::Phone
        };
        info!("Display width {display_width_points} points classified as {class}");
        class
    }

    /// Display profile for this class
    #[must_use]
    pub const fn profile(self) -> DeviceDisplayProfile {
        match self {
            Self::Phone => DeviceDisplayProfile::phone(),
            Self::Tablet => DeviceDisplayProfile::tablet(),
        }
    }
}

impl Default for DeviceClass {
    fn default() -> Self {
        Self::Phone
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phone => write!(f, "phone"),
            Self::Tablet => write!(f, "tablet"),
        }
    }
}

impl FromStr for DeviceClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "phone" => Ok(Self::Phone),
            "tablet" => Ok(Self::Tablet),
            _ => Err(Error::InvalidInput(format!("Unknown device class: {s}"))),
        }
    }
}
