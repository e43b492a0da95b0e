//! # UV Generation and Packing
//!
//! | Function | UV mode |
//! |----------|---------|
//! | [`reset_uvs`] | `Discard`: one zero UV per vertex |
//! | [`repack_uvs`] | `Repack`: islands scaled into the unit square |
//! | [`project_planar_uvs`] | per-region planar unwrap used after retriangulation |
//! | [`pack_pixel_layout`] | `PixelLayoutRepack`: pixel-exact power-of-two atlas |
//!
//! Everything operates on UV layer 0.

mod atlas;
mod project;
mod repack;

pub use atlas::{pack_pixel_layout, shelf_pack, PixelRect, ShelfLayout};
pub use project::project_planar_uvs;
pub use repack::repack_uvs;

use glam::Vec2;

use crate::mesh::{EdgeTopology, Mesh, TriangleId, VertexId};
use crate::ops::UnionFind;

/// Partitions the triangles with a set UV triple into UV islands.
///
/// Two triangles are in the same island when they share a manifold edge
/// without a UV seam. Islands are ordered by their lowest triangle id and
/// list their triangles in ascending order.
pub fn uv_islands(mesh: &Mesh, layer: usize) -> Vec<Vec<TriangleId>> {
    let Some(uvs) = mesh.uv_layer(layer) else {
        return Vec::new();
    };
    let topology = EdgeTopology::build(mesh);
    let mut islands = UnionFind::new(mesh.triangle_count());
    for edge in topology.edges() {
        if let Some((ta, tb)) = edge.manifold_pair() {
            if uvs.are_triangles_connected(mesh, edge) {
                islands.union(ta, tb);
            }
        }
    }

    let mut slot_of_root = vec![usize::MAX; mesh.triangle_count()];
    let mut result: Vec<Vec<TriangleId>> = Vec::new();
    for tid in mesh.triangle_ids().filter(|&tid| uvs.is_set_triangle(tid)) {
        let root = islands.find(tid) as usize;
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = result.len();
            result.push(Vec::new());
        }
        result[slot_of_root[root]].push(tid);
    }
    result
}

/// Points every triangle of UV layer 0 at a shared zero UV per vertex,
/// creating the layer when missing.
pub fn reset_uvs(mesh: &mut Mesh) {
    mesh.enable_uv_layers(1);
    let triangles = mesh.triangles().to_vec();
    let vertex_count = mesh.vertex_count();
    let Some(uvs) = mesh.uv_layer_mut(0) else {
        return;
    };
    uvs.clear_elements();
    for vid in 0..vertex_count {
        uvs.append_element(Vec2::ZERO, vid as VertexId);
    }
    for (tid, tri) in triangles.iter().enumerate() {
        uvs.set_triangle(tid as TriangleId, Some(tri.vertices));
    }
}

#[cfg(test)]
mod tests;
