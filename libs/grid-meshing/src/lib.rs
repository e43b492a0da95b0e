//! # Grid Meshing
//!
//! Finishing pipeline that turns a raw per-cell triangle soup extracted from a
//! sparse voxel grid into a clean, de-duplicated, optionally simplified and
//! UV-atlas-packed triangle mesh.
//!
//! ## Pipeline
//!
//! ```text
//! raw mesh
//!   -> weld -> compact
//!   -> hidden face removal (coincident pairs, self-union)
//!   -> invert faces -> weld -> compact
//!   -> recompute groups
//!   -> planar retriangulation + planar UV projection
//!   -> UV mode (discard | repack | pixel layout atlas)
//! ```
//!
//! Each stage lives in [`ops`] and can be called on its own.
//!
//! ## Example
//!
//! ```rust
//! use grid_meshing::{MeshingConfig, MeshingPipeline};
//! use grid_meshing::mesh::Mesh;
//! use glam::DVec3;
//!
//! let positions = vec![
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(1.0, 1.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = Mesh::from_indexed(positions, &[[0, 1, 2], [0, 2, 3]]);
//!
//! let pipeline = MeshingPipeline::new(MeshingConfig::default()).unwrap();
//! let output = pipeline.run(mesh, DVec3::ONE).unwrap();
//! assert_eq!(output.mesh.triangle_count(), 2);
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod mesh;
pub mod ops;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::config::{MeshingConfig, UvMode};
pub use crate::error::{MeshingError, MeshingResult, TopologyError};
pub use crate::pipeline::{CancelFlag, MeshingOutput, MeshingPipeline};
