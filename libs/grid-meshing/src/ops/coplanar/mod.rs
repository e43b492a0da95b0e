//! # Coplanar Group Finder
//!
//! Flood fill over manifold triangle adjacency that grows a region while the
//! normals of neighbouring triangles stay within an angle tolerance and an
//! injected edge predicate allows the crossing.
//!
//! ## Determinism
//!
//! Seeds are visited in ascending triangle id order and each triangle's edges
//! in corner order, so membership and growth order depend only on the mesh
//! and the predicate.
//!
//! ## Example
//!
//! ```rust
//! use grid_meshing::mesh::Mesh;
//! use grid_meshing::ops::coplanar::find_groups;
//! use glam::DVec3;
//!
//! let mesh = Mesh::from_indexed(
//!     vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
//!     &[[0, 1, 2], [0, 2, 3]],
//! );
//! let groups = find_groups(&mesh, 2.0, |_, _, _| true);
//! assert_eq!(groups, vec![vec![0, 1]]);
//! ```

use crate::mesh::{EdgeId, EdgeTopology, Mesh, TriangleId};
use crate::ops::normals::face_normals;

/// Partitions all triangles into coplanar regions.
///
/// Two edge-adjacent triangles join the same region when the dot product of
/// their face normals exceeds `cos(angle_tolerance_deg)` and
/// `connected(current, neighbour, shared_edge)` returns true.
pub fn find_groups<F>(mesh: &Mesh, angle_tolerance_deg: f64, connected: F) -> Vec<Vec<TriangleId>>
where
    F: Fn(TriangleId, TriangleId, EdgeId) -> bool,
{
    let topology = EdgeTopology::build(mesh);
    find_groups_with_topology(mesh, &topology, angle_tolerance_deg, connected)
}

/// Same as [`find_groups`] with a prebuilt edge table.
pub fn find_groups_with_topology<F>(
    mesh: &Mesh,
    topology: &EdgeTopology,
    angle_tolerance_deg: f64,
    connected: F,
) -> Vec<Vec<TriangleId>>
where
    F: Fn(TriangleId, TriangleId, EdgeId) -> bool,
{
    let threshold = config::constants::dot_threshold(angle_tolerance_deg);
    let normals = face_normals(mesh);
    let mut visited = vec![false; mesh.triangle_count()];
    let mut groups = Vec::new();
    let mut stack = Vec::new();

    for seed in mesh.triangle_ids() {
        if visited[seed as usize] {
            continue;
        }
        visited[seed as usize] = true;
        let mut group = vec![seed];
        stack.push(seed);

        while let Some(current) = stack.pop() {
            for (eid, neighbor) in topology.triangle_neighbors(current) {
                if visited[neighbor as usize] {
                    continue;
                }
                let dot = normals[current as usize].dot(normals[neighbor as usize]);
                if dot > threshold && connected(current, neighbor, eid) {
                    visited[neighbor as usize] = true;
                    group.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }

        groups.push(group);
    }

    groups
}

/// Relabels every triangle with the index of its group.
pub fn assign_groups(mesh: &mut Mesh, groups: &[Vec<TriangleId>]) {
    for (gid, group) in groups.iter().enumerate() {
        for &tid in group {
            mesh.set_triangle_group(tid, gid as u32);
        }
    }
}

#[cfg(test)]
mod tests;
