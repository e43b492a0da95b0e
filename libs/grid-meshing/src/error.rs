//! # Error Types
//!
//! Error types for the meshing pipeline.
//!
//! ## Error Policy
//!
//! - Pipeline-level failures are returned, never panicked
//! - Topology errors are local to one face group; retriangulation skips the
//!   group and keeps its original triangles

use ::config::constants::ConfigError;
use thiserror::Error;

use crate::mesh::GroupId;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors returned by [`crate::MeshingPipeline`].
///
/// ## Example
///
/// ```rust
/// use grid_meshing::{MeshingConfig, MeshingError, MeshingPipeline};
/// use grid_meshing::mesh::Mesh;
/// use glam::DVec3;
///
/// let mut config = MeshingConfig::default();
/// config.target_uv_resolution = 0;
/// match MeshingPipeline::new(config) {
///     Err(MeshingError::InvalidConfig(e)) => eprintln!("bad config: {e}"),
///     Err(e) => eprintln!("other error: {e}"),
///     Ok(pipeline) => {
///         let _ = pipeline.run(Mesh::new(), DVec3::ONE);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum MeshingError {
    /// The configuration record failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The input mesh references data that does not exist.
    #[error("Invalid mesh: {message}")]
    InvalidMesh {
        /// What is wrong with the mesh
        message: String,
    },

    /// The caller raised the cancel flag.
    #[error("Pipeline cancelled before stage '{stage}'")]
    Cancelled {
        /// Stage that would have run next
        stage: &'static str,
    },
}

/// Errors raised while building or triangulating one face group.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The group boundary is not a single simple loop.
    #[error("Group {group} has multiple boundary loops")]
    MultipleBoundaryLoops {
        /// Offending group
        group: GroupId,
    },

    /// The group boundary has fewer than three vertices.
    #[error("Group {group} is degenerate")]
    DegenerateFace {
        /// Offending group
        group: GroupId,
    },

    /// Ear clipping could not find a valid ear.
    #[error("Triangulation of group {group} failed")]
    TriangulationFailed {
        /// Offending group
        group: GroupId,
    },
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for pipeline operations.
pub type MeshingResult<T> = Result<T, MeshingError>;

// =============================================================================
// TESTS
// =============================================================================
