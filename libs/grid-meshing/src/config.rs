//! # Pipeline Configuration
//!
//! The configuration record consumed by [`crate::MeshingPipeline`].
//! Every field has a default, so a partial record deserializes cleanly:
//!
//! ```rust
//! use grid_meshing::{MeshingConfig, UvMode};
//!
//! let config: MeshingConfig = serde_json::from_str(r#"{ "uv_mode": "repack" }"#).unwrap();
//! assert_eq!(config.uv_mode, UvMode::Repack);
//! assert!(config.remove_coincident_faces);
//! ```

use ::config::constants::{
    ConfigError, PipelineTolerances, COPLANAR_ANGLE_TOLERANCE_DEG, DEFAULT_DIMENSION_PIXELS,
    DEFAULT_ISLAND_PIXEL_BORDER, DEFAULT_TARGET_UV_RESOLUTION, WELD_TOLERANCE,
};
use serde::{Deserialize, Serialize};

/// What happens to UV layer 0 at the end of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvMode {
    /// Leave UVs as the earlier stages produced them.
    None,
    /// Replace every UV with zero.
    Discard,
    /// Fit the existing islands into the unit square.
    Repack,
    /// Pixel-exact power-of-two atlas sized from the grid cell dimensions.
    #[default]
    PixelLayoutRepack,
}

/// Flags and parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshingConfig {
    /// Delete pairs of coincident opposite-facing regions.
    ///
    /// Default: `true`
    pub remove_coincident_faces: bool,

    /// Run winding-number self-union after coincident removal.
    ///
    /// Default: `false`
    pub self_union: bool,

    /// Flip every triangle and negate normals.
    ///
    /// Default: `false`
    pub invert_faces: bool,

    /// Retriangulate planar regions and project planar UVs.
    ///
    /// Default: `true`
    pub optimize_planar_areas: bool,

    /// Keep vertex color borders during retriangulation.
    ///
    /// Default: `true`
    pub preserve_color_borders: bool,

    /// Keep material borders during retriangulation.
    ///
    /// Default: `true`
    pub preserve_material_borders: bool,

    /// Regenerate polygroups by normal angle before retriangulation.
    ///
    /// Default: `true`
    pub recompute_groups: bool,

    /// Seed angle for regenerated polygroups, in degrees.
    ///
    /// Default: `2.0`
    pub group_angle_threshold_deg: f64,

    /// Final UV treatment.
    ///
    /// Default: [`UvMode::PixelLayoutRepack`]
    pub uv_mode: UvMode,

    /// Texture resolution used to size gaps in [`UvMode::Repack`].
    ///
    /// Default: `512`
    pub target_uv_resolution: u32,

    /// Pixels along the smallest grid cell axis in
    /// [`UvMode::PixelLayoutRepack`].
    ///
    /// Default: `4`
    pub dimension_pixel_count: u32,

    /// Pixel border around each island in [`UvMode::PixelLayoutRepack`].
    ///
    /// Default: `1`
    pub uv_island_pixel_border: u32,

    /// Distance tolerance of the weld passes.
    ///
    /// Default: `0.01`
    pub weld_tolerance: f64,
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            remove_coincident_faces: true,
            self_union: false,
            invert_faces: false,
            optimize_planar_areas: true,
            preserve_color_borders: true,
            preserve_material_borders: true,
            recompute_groups: true,
            group_angle_threshold_deg: COPLANAR_ANGLE_TOLERANCE_DEG,
            uv_mode: UvMode::default(),
            target_uv_resolution: DEFAULT_TARGET_UV_RESOLUTION,
            dimension_pixel_count: DEFAULT_DIMENSION_PIXELS,
            uv_island_pixel_border: DEFAULT_ISLAND_PIXEL_BORDER,
            weld_tolerance: WELD_TOLERANCE,
        }
    }
}

impl MeshingConfig {
    /// Checks the record and returns the tolerances it describes.
    ///
    /// Pixel counts and borders are clamped at use rather than rejected.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidTolerance`] for a non-positive weld tolerance
    /// - [`ConfigError::InvalidAngle`] for a group angle outside (0, 180)
    /// - [`ConfigError::InvalidResolution`] for a zero target resolution
    pub fn validate(&self) -> Result<PipelineTolerances, ConfigError> {
        let tolerances = PipelineTolerances::new(self.weld_tolerance, self.group_angle_threshold_deg)?;
        if self.target_uv_resolution == 0 {
            return Err(ConfigError::InvalidResolution(self.target_uv_resolution));
        }
        Ok(tolerances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MeshingConfig::default();
        let tolerances = config.validate().unwrap();
        assert_eq!(tolerances, PipelineTolerances::default());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = MeshingConfig::default();
        config.target_uv_resolution = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidResolution(0)));

        let mut config = MeshingConfig::default();
        config.weld_tolerance = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTolerance(-1.0)));

        let mut config = MeshingConfig::default();
        config.group_angle_threshold_deg = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidAngle(0.0)));
    }

    #[test]
    fn test_empty_record_is_default() {
        let config: MeshingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MeshingConfig::default());
    }

    #[test]
    fn test_json_round_trip_keeps_mode() {
        let config = MeshingConfig {
            uv_mode: UvMode::Discard,
            self_union: true,
            ..MeshingConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"discard\""));
        let back: MeshingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(serde_json::from_str::<MeshingConfig>(r#"{ "uv_mode": "spherical" }"#).is_err());
    }
}
