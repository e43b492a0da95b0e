//! # Meshing Pipeline
//!
//! Runs the finishing stages in a fixed order over one owned mesh.
//!
//! ```text
//! weld → compact
//!   → coincident face removal?  → self-union?
//!   → invert faces?
//!   → weld → compact
//!   → recompute groups?
//!   → retriangulate + planar UV projection?
//!   → UV mode
//! ```
//!
//! A [`CancelFlag`] is polled before every stage. Cancellation drops the
//! partially processed mesh and returns [`MeshingError::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};

use ::config::constants::PipelineTolerances;
use glam::DVec3;
use tracing::{debug, info, warn};

use crate::config::{MeshingConfig, UvMode};
use crate::error::{MeshingError, MeshingResult};
use crate::mesh::{Mesh, Overlay};
use crate::ops::hidden::remove_coincident_faces;
use crate::ops::polygroups::{compute_polygroups, PolygroupParams};
use crate::ops::retriangulate::{retriangulate, RetriangulateParams};
use crate::ops::self_union::{self_union, SelfUnionParams};
use crate::ops::uv::{pack_pixel_layout, project_planar_uvs, repack_uvs, reset_uvs};
use crate::ops::weld::{weld_edges, WeldParams};

// =============================================================================
// CANCELLATION
// =============================================================================

/// Cooperative cancellation signal shared with the thread running the
/// pipeline.
///
/// # Example
///
/// ```rust
/// use grid_meshing::{CancelFlag, MeshingConfig, MeshingError, MeshingPipeline};
/// use grid_meshing::mesh::Mesh;
/// use glam::DVec3;
///
/// let cancel = CancelFlag::new();
/// cancel.cancel();
/// let pipeline = MeshingPipeline::new(MeshingConfig::default()).unwrap();
/// let result = pipeline.run_with_cancel(Mesh::new(), DVec3::ONE, &cancel);
/// assert!(matches!(result, Err(MeshingError::Cancelled { .. })));
/// ```
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    /// New, unraised flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. The pipeline stops before its next stage.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether the flag has been raised.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshingOutput {
    /// The finished mesh.
    pub mesh: Mesh,
    /// Side of the pixel layout atlas, or 0 when no atlas was produced.
    pub atlas_dimension: u32,
}

/// Validated configuration plus the stage sequence.
#[derive(Debug, Clone)]
pub struct MeshingPipeline {
    config: MeshingConfig,
    tolerances: PipelineTolerances,
}

impl MeshingPipeline {
    /// Validates `config` and builds a pipeline.
    ///
    /// # Errors
    ///
    /// [`MeshingError::InvalidConfig`] when validation fails.
    pub fn new(config: MeshingConfig) -> MeshingResult<Self> {
        let tolerances = config.validate()?;
        Ok(Self { config, tolerances })
    }

    /// The configuration this pipeline runs with.
    #[inline]
    pub fn config(&self) -> &MeshingConfig {
        &self.config
    }

    /// Runs every enabled stage on `mesh`.
    ///
    /// `cell_dims` is the size of one grid cell; only the pixel layout atlas
    /// uses it.
    ///
    /// # Errors
    ///
    /// [`MeshingError::InvalidMesh`] when a triangle references a missing
    /// vertex or overlay element, repeats a vertex, or a position is not
    /// finite.
    pub fn run(&self, mesh: Mesh, cell_dims: DVec3) -> MeshingResult<MeshingOutput> {
        self.run_with_cancel(mesh, cell_dims, &CancelFlag::new())
    }

    /// Same as [`MeshingPipeline::run`], polling `cancel` before every stage.
    ///
    /// # Errors
    ///
    /// As [`MeshingPipeline::run`], plus [`MeshingError::Cancelled`] naming
    /// the stage that would have run next.
    pub fn run_with_cancel(&self, mut mesh: Mesh, cell_dims: DVec3, cancel: &CancelFlag) -> MeshingResult<MeshingOutput> {
        validate_mesh(&mesh)?;
        let config = &self.config;
        let checkpoint = |stage: &'static str| {
            if cancel.is_cancelled() {
                info!("Meshing cancelled before {}", stage);
                return Err(MeshingError::Cancelled { stage });
            }
            debug!("Meshing stage: {}", stage);
            Ok(())
        };
        let weld = WeldParams::with_tolerance(self.tolerances.weld_tolerance);
        let triangles_in = mesh.triangle_count();

        checkpoint("weld")?;
        let report = weld_edges(&mut mesh, &weld);
        mesh.compact();
        debug!("Initial weld merged {} edges", report.merged_edges);

        checkpoint("hidden_faces")?;
        if config.remove_coincident_faces {
            remove_coincident_faces(&mut mesh);
        }
        if config.self_union {
            if self_union(&mut mesh, &SelfUnionParams::default()) {
                mesh.compact();
            } else {
                warn!("Self-union failed, keeping the mesh as it was");
            }
        }

        checkpoint("invert_faces")?;
        if config.invert_faces {
            mesh.invert_faces();
        }

        checkpoint("reweld")?;
        let report = weld_edges(&mut mesh, &weld);
        mesh.compact();
        debug!("Second weld merged {} edges", report.merged_edges);

        checkpoint("groups")?;
        if config.recompute_groups {
            let params = PolygroupParams::default().with_angle_deg(self.tolerances.coplanar_angle_deg);
            let groups = compute_polygroups(&mut mesh, &params);
            debug!("Recomputed {} polygroups", groups);
        }

        checkpoint("retriangulate")?;
        if config.optimize_planar_areas {
            let params = RetriangulateParams::default()
                .with_preserve_uv(false)
                .with_preserve_color(config.preserve_color_borders)
                .with_preserve_material(config.preserve_material_borders);
            retriangulate(&mut mesh, &params);
            project_planar_uvs(&mut mesh);
        }

        checkpoint("uv")?;
        let atlas_dimension = match config.uv_mode {
            UvMode::None => 0,
            UvMode::Discard => {
                reset_uvs(&mut mesh);
                0
            }
            UvMode::Repack => {
                repack_uvs(&mut mesh, config.target_uv_resolution);
                0
            }
            UvMode::PixelLayoutRepack => pack_pixel_layout(
                &mut mesh,
                cell_dims,
                config.dimension_pixel_count,
                config.uv_island_pixel_border,
            )
            .unwrap_or_else(|| {
                warn!("Pixel layout packing failed, UVs left unpacked");
                0
            }),
        };

        info!(
            "Meshing finished: {} -> {} triangles, {} vertices, atlas {}",
            triangles_in,
            mesh.triangle_count(),
            mesh.vertex_count(),
            atlas_dimension
        );
        Ok(MeshingOutput { mesh, atlas_dimension })
    }
}

/// Rejects meshes that reference missing vertices or overlay elements, hold
/// non-finite positions, or contain triangles with a repeated vertex.
fn validate_mesh(mesh: &Mesh) -> MeshingResult<()> {
    let vertex_count = mesh.vertex_count();
    for (tid, tri) in mesh.triangles().iter().enumerate() {
        if let Some(&vid) = tri.vertices.iter().find(|&&vid| vid as usize >= vertex_count) {
            return Err(MeshingError::InvalidMesh {
                message: format!("triangle {tid} references vertex {vid} of {vertex_count}"),
            });
        }
        if tri.is_degenerate() {
            return Err(MeshingError::InvalidMesh {
                message: format!("triangle {tid} repeats a vertex in {:?}", tri.vertices),
            });
        }
    }
    if let Some(vid) = mesh.positions().iter().position(|p| !p.is_finite()) {
        return Err(MeshingError::InvalidMesh {
            message: format!("vertex {vid} has a non-finite position"),
        });
    }

    if let Some(normals) = mesh.normals() {
        validate_overlay(mesh, normals, "normal")?;
    }
    for layer in 0..mesh.uv_layer_count() {
        if let Some(uvs) = mesh.uv_layer(layer) {
            validate_overlay(mesh, uvs, "uv")?;
        }
    }
    if let Some(colors) = mesh.colors() {
        validate_overlay(mesh, colors, "color")?;
    }
    Ok(())
}

/// Checks that every element triple of `overlay` points at existing elements.
fn validate_overlay<T: Copy>(mesh: &Mesh, overlay: &Overlay<T>, name: &str) -> MeshingResult<()> {
    let element_count = overlay.element_count();
    for tid in mesh.triangle_ids() {
        let Some(triple) = overlay.triangle(tid) else {
            continue;
        };
        if let Some(&element) = triple.iter().find(|&&e| e as usize >= element_count) {
            return Err(MeshingError::InvalidMesh {
                message: format!("triangle {tid} references {name} element {element} of {element_count}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
