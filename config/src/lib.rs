//! # Config Crate
//!
//! Centralized configuration constants for the grid meshing pipeline.
//! Every tolerance, angle and atlas limit used by the finishing stages is
//! defined here so the pipeline crates never carry bare literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{COPLANAR_ANGLE_TOLERANCE_DEG, WELD_TOLERANCE, dot_threshold};
//!
//! // Two unit normals are "coplanar" when their dot product exceeds the threshold
//! let threshold = dot_threshold(COPLANAR_ANGLE_TOLERANCE_DEG);
//! assert!(threshold < 1.0 && threshold > 0.99);
//! assert!(WELD_TOLERANCE > 0.0);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Grid Aware**: Defaults assume meshes assembled from unit grid cells
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
