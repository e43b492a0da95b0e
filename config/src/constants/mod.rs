//! Centralized configuration values shared across the grid meshing pipeline.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// WELDING
// =============================================================================

/// Distance under which boundary edge endpoints are merged by the pipeline's
/// weld passes.
///
/// # Examples
/// ```
/// use config::constants::WELD_TOLERANCE;
/// assert_eq!(WELD_TOLERANCE, 0.01);
/// ```
pub const WELD_TOLERANCE: f64 = 1.0e-2;

/// Tolerance handed to planar retriangulation by the orchestrator.
///
/// # Examples
/// ```
/// use config::constants::RETRIANGULATION_TOLERANCE;
/// assert!(RETRIANGULATION_TOLERANCE > 0.0);
/// ```
pub const RETRIANGULATION_TOLERANCE: f64 = 0.1;

/// Scale applied to the retriangulation tolerance to obtain its internal
/// weld distance.
///
/// # Examples
/// ```
/// use config::constants::{RETRIANGULATION_TOLERANCE, RETRIANGULATION_WELD_SCALE};
/// let weld = RETRIANGULATION_TOLERANCE * RETRIANGULATION_WELD_SCALE;
/// assert!(weld < 1.0e-3);
/// ```
pub const RETRIANGULATION_WELD_SCALE: f64 = 1.0e-3;

// =============================================================================
// GROUPING
// =============================================================================

/// Maximum angle between adjacent face normals for two triangles to be part
/// of the same coplanar region.
///
/// # Examples
/// ```
/// use config::constants::COPLANAR_ANGLE_TOLERANCE_DEG;
/// assert_eq!(COPLANAR_ANGLE_TOLERANCE_DEG, 2.0);
/// ```
pub const COPLANAR_ANGLE_TOLERANCE_DEG: f64 = 2.0;

/// Opening angle at which recomputed normals split into hard seams.
///
/// # Examples
/// ```
/// use config::constants::NORMAL_OPENING_ANGLE_DEG;
/// assert!(NORMAL_OPENING_ANGLE_DEG > 2.0);
/// ```
pub const NORMAL_OPENING_ANGLE_DEG: f64 = 12.0;

// =============================================================================
// HIDDEN FACE REMOVAL
// =============================================================================

/// Maximum centroid distance between two coplanar regions treated as
/// geometric duplicates.
///
/// # Examples
/// ```
/// use config::constants::COINCIDENT_CENTROID_TOLERANCE;
/// assert_eq!(COINCIDENT_CENTROID_TOLERANCE, 1.0e-3);
/// ```
pub const COINCIDENT_CENTROID_TOLERANCE: f64 = 1.0e-3;

/// Maximum area difference between two coplanar regions treated as
/// geometric duplicates.
///
/// # Examples
/// ```
/// use config::constants::COINCIDENT_AREA_TOLERANCE;
/// assert_eq!(COINCIDENT_AREA_TOLERANCE, 1.0e-3);
/// ```
pub const COINCIDENT_AREA_TOLERANCE: f64 = 1.0e-3;

/// Generalized winding number at which a point counts as inside the solid
/// during self-union.
///
/// # Examples
/// ```
/// use config::constants::SELF_UNION_WINDING_THRESHOLD;
/// assert_eq!(SELF_UNION_WINDING_THRESHOLD, 0.5);
/// ```
pub const SELF_UNION_WINDING_THRESHOLD: f64 = 0.5;

// =============================================================================
// SEAMS
// =============================================================================

/// Absolute per-channel difference above which two vertex colors form a
/// color discontinuity.
///
/// # Examples
/// ```
/// use config::constants::COLOR_CHANNEL_TOLERANCE;
/// assert!((0.5f64 - 0.50005).abs() < COLOR_CHANNEL_TOLERANCE);
/// ```
pub const COLOR_CHANNEL_TOLERANCE: f64 = 1.0e-4;

// =============================================================================
// UV ATLAS
// =============================================================================

/// Smallest square atlas dimension the pixel layout packer will try.
///
/// # Examples
/// ```
/// use config::constants::MIN_ATLAS_DIMENSION;
/// assert!(MIN_ATLAS_DIMENSION.is_power_of_two());
/// ```
pub const MIN_ATLAS_DIMENSION: u32 = 8;

/// Largest square atlas dimension the pixel layout packer will try.
///
/// # Examples
/// ```
/// use config::constants::MAX_ATLAS_DIMENSION;
/// assert_eq!(MAX_ATLAS_DIMENSION, 4096);
/// ```
pub const MAX_ATLAS_DIMENSION: u32 = 4096;

/// Default number of pixels along the smallest grid cell dimension.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_DIMENSION_PIXELS;
/// assert_eq!(DEFAULT_DIMENSION_PIXELS, 4);
/// ```
pub const DEFAULT_DIMENSION_PIXELS: u32 = 4;

/// Upper clamp for pixels per grid cell dimension.
pub const MAX_DIMENSION_PIXELS: u32 = 2048;

/// Default pixel border around every UV island.
pub const DEFAULT_ISLAND_PIXEL_BORDER: u32 = 1;

/// Upper clamp for the pixel border around every UV island.
pub const MAX_ISLAND_PIXEL_BORDER: u32 = 64;

/// Default texture resolution used to size gutters when repacking UVs.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_TARGET_UV_RESOLUTION;
/// assert_eq!(DEFAULT_TARGET_UV_RESOLUTION, 512);
/// ```
pub const DEFAULT_TARGET_UV_RESOLUTION: u32 = 512;

/// Bias subtracted before rounding world sizes up to whole pixels, so
/// floating noise such as `8.000000001` does not become 9 pixels.
pub const PIXEL_ROUNDING_EPSILON: f64 = 1.0e-6;

/// Minimum height/width difference before an island frame is rotated.
pub const ASPECT_EPSILON: f64 = f32::EPSILON as f64;

// =============================================================================
// HELPERS
// =============================================================================

/// Converts an angle tolerance in degrees into the minimum dot product of two
/// unit normals that are within that angle.
///
/// # Examples
/// ```
/// use config::constants::dot_threshold;
/// assert!((dot_threshold(0.0) - 1.0).abs() < 1.0e-12);
/// assert!(dot_threshold(90.0).abs() < 1.0e-12);
/// ```
#[inline]
pub fn dot_threshold(angle_deg: f64) -> f64 {
    angle_deg.to_radians().cos()
}

/// Clamps a requested pixels-per-cell count into the supported range.
///
/// # Examples
/// ```
/// use config::constants::clamp_dimension_pixels;
/// assert_eq!(clamp_dimension_pixels(0), 1);
/// assert_eq!(clamp_dimension_pixels(9000), 2048);
/// ```
#[inline]
pub fn clamp_dimension_pixels(pixels: u32) -> u32 {
    pixels.clamp(1, MAX_DIMENSION_PIXELS)
}

/// Clamps a requested island pixel border into the supported range.
///
/// # Examples
/// ```
/// use config::constants::clamp_island_border;
/// assert_eq!(clamp_island_border(100), 64);
/// ```
#[inline]
pub fn clamp_island_border(border: u32) -> u32 {
    border.min(MAX_ISLAND_PIXEL_BORDER)
}

// =============================================================================
// VALIDATED TOLERANCES
// =============================================================================

/// Tolerances shared by the weld and grouping passes of one pipeline run.
///
/// # Examples
/// ```
/// use config::constants::PipelineTolerances;
/// let tolerances = PipelineTolerances::default();
/// assert!(tolerances.weld_tolerance > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineTolerances {
    /// Distance under which boundary edges are welded.
    pub weld_tolerance: f64,
    /// Angle tolerance in degrees for coplanar grouping.
    pub coplanar_angle_deg: f64,
}

impl PipelineTolerances {
    /// Builds tolerances enforcing strict validation of the supplied values.
    ///
    /// # Examples
    /// ```
    /// use config::constants::PipelineTolerances;
    /// let tolerances = PipelineTolerances::new(1.0e-3, 5.0).expect("valid tolerances");
    /// assert_eq!(tolerances.coplanar_angle_deg, 5.0);
    /// ```
    pub fn new(weld_tolerance: f64, coplanar_angle_deg: f64) -> Result<Self, ConfigError> {
        if !weld_tolerance.is_finite() || weld_tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(weld_tolerance));
        }
        if !(coplanar_angle_deg > 0.0 && coplanar_angle_deg < 180.0) {
            return Err(ConfigError::InvalidAngle(coplanar_angle_deg));
        }
        Ok(Self {
            weld_tolerance,
            coplanar_angle_deg,
        })
    }
}

impl Default for PipelineTolerances {
    fn default() -> Self {
        Self {
            weld_tolerance: WELD_TOLERANCE,
            coplanar_angle_deg: COPLANAR_ANGLE_TOLERANCE_DEG,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Raised when a distance tolerance is zero, negative or not finite.
    InvalidTolerance(f64),
    /// Raised when an angle lies outside the open range (0, 180) degrees.
    InvalidAngle(f64),
    /// Raised when a target texture resolution is zero.
    InvalidResolution(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be positive and finite: {value}")
            }
            ConfigError::InvalidAngle(value) => {
                write!(f, "angle must lie in (0, 180) degrees: {value}")
            }
            ConfigError::InvalidResolution(value) => {
                write!(f, "target resolution must be non-zero: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
