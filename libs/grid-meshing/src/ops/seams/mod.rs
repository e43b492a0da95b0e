//! # Seam Detection
//!
//! Builds the set of hard edges that planar retriangulation must not cross.
//! Three independent sources contribute:
//!
//! | Source | Edge is hard when |
//! |--------|-------------------|
//! | UV | any UV layer uses different elements on the two sides |
//! | Color | an RGB channel at a shared vertex differs by more than the tolerance |
//! | Material | the two triangles have different material ids |
//!
//! Only manifold edges (exactly two triangles) can be hard.

use hashbrown::HashSet;
use tracing::debug;

use config::constants::COLOR_CHANNEL_TOLERANCE;

use crate::mesh::{EdgeId, EdgeTopology, Mesh};

/// Set of edge ids that split face groups.
pub type HardEdgeSet = HashSet<EdgeId>;

/// Which discontinuities produce hard edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeamOptions {
    /// UV seams of every layer.
    pub preserve_uv: bool,
    /// Vertex color discontinuities.
    pub preserve_color: bool,
    /// Material id changes.
    pub preserve_material: bool,
}

/// Edges that are a seam in any UV layer.
pub fn uv_seam_edges(mesh: &Mesh, topology: &EdgeTopology) -> Vec<EdgeId> {
    (0..topology.edge_count() as EdgeId)
        .filter(|&eid| {
            let edge = topology.edge(eid);
            (0..mesh.uv_layer_count())
                .filter_map(|layer| mesh.uv_layer(layer))
                .any(|uvs| uvs.is_seam_edge(mesh, edge))
        })
        .collect()
}

/// Edges whose vertex colors differ across the edge.
///
/// Edges next to a triangle without color data are skipped.
pub fn color_seam_edges(mesh: &Mesh, topology: &EdgeTopology) -> Vec<EdgeId> {
    let Some(colors) = mesh.colors() else {
        return Vec::new();
    };
    (0..topology.edge_count() as EdgeId)
        .filter(|&eid| {
            let edge = topology.edge(eid);
            let Some((ta, tb)) = edge.manifold_pair() else {
                return false;
            };
            if !colors.is_set_triangle(ta) || !colors.is_set_triangle(tb) {
                return false;
            }
            edge.vertices.iter().any(|&vid| {
                let (Some(ea), Some(eb)) = (
                    colors.element_at_vertex(mesh, ta, vid),
                    colors.element_at_vertex(mesh, tb, vid),
                ) else {
                    return false;
                };
                let diff = (colors.element(ea) - colors.element(eb)).abs();
                diff.truncate().max_element() as f64 > COLOR_CHANNEL_TOLERANCE
            })
        })
        .collect()
}

/// Edges between triangles with different material ids.
pub fn material_seam_edges(mesh: &Mesh, topology: &EdgeTopology) -> Vec<EdgeId> {
    let Some(materials) = mesh.material_ids() else {
        return Vec::new();
    };
    (0..topology.edge_count() as EdgeId)
        .filter(|&eid| {
            topology
                .edge(eid)
                .manifold_pair()
                .is_some_and(|(ta, tb)| materials[ta as usize] != materials[tb as usize])
        })
        .collect()
}

/// Union of the enabled seam sources.
///
/// # Example
///
/// ```rust
/// use grid_meshing::mesh::{EdgeTopology, Mesh};
/// use grid_meshing::ops::seams::{find_hard_edges, SeamOptions};
/// use glam::DVec3;
///
/// let mut mesh = Mesh::from_indexed(
///     vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
///     &[[0, 1, 2], [0, 2, 3]],
/// );
/// mesh.enable_material_ids();
/// mesh.set_material_id(1, 3);
///
/// let topology = EdgeTopology::build(&mesh);
/// let options = SeamOptions { preserve_material: true, ..SeamOptions::default() };
/// let hard = find_hard_edges(&mesh, &topology, &options);
/// assert!(hard.contains(&topology.find_edge(0, 2).unwrap()));
/// ```
pub fn find_hard_edges(mesh: &Mesh, topology: &EdgeTopology, options: &SeamOptions) -> HardEdgeSet {
    let mut hard = HardEdgeSet::new();
    if options.preserve_uv {
        hard.extend(uv_seam_edges(mesh, topology));
    }
    if options.preserve_color {
        hard.extend(color_seam_edges(mesh, topology));
    }
    if options.preserve_material {
        hard.extend(material_seam_edges(mesh, topology));
    }
    debug!("Found {} hard edges", hard.len());
    hard
}
