//! Constants used throughout the crate

/// Distance of the eye target point along the eye's local +z axis (meters)
pub const EYE_TARGET_DISTANCE_M: f64 = 2.0;

/// Side length of the virtual display plane (meters)
pub const VIRTUAL_PLANE_SIZE_M: f64 = 1.0;

/// Number of recent samples averaged per axis
pub const DEFAULT_SMOOTHING_WINDOW: usize = 10;

/// Phone display: physical size in meters and resolution in points
pub const PHONE_PHYSICAL_WIDTH_M: f64 = 0.064_992_3;
pub const PHONE_PHYSICAL_HEIGHT_M: f64 = 0.140_65;
pub const PHONE_PIXEL_WIDTH: f64 = 390.0;
pub const PHONE_PIXEL_HEIGHT: f64 = 844.0;

/// Tablet display: physical size in meters and resolution in points
pub const TABLET_PHYSICAL_WIDTH_M: f64 = 0.1605;
pub const TABLET_PHYSICAL_HEIGHT_M: f64 = 0.2297;
pub const TABLET_PIXEL_WIDTH: f64 = 834.0;
pub const TABLET_PIXEL_HEIGHT: f64 = 1194.0;

/// Displays at least this wide (in points) are classified as tablets
pub const TABLET_MIN_WIDTH_POINTS: f64 = 600.0;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
