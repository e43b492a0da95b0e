//! # Normals
//!
//! Face normals and the normal overlay.
//!
//! [`compute_normal_topology`] rebuilds the overlay's element layout: around
//! each vertex, triangles connected through edges whose face normals are
//! within the opening angle share one element. [`recompute_normals`] then
//! fills every element with the area-weighted sum of its triangles' normals.

use glam::DVec3;
use rayon::prelude::*;

use crate::mesh::{vertex_triangles, EdgeTopology, ElementId, Mesh, TriangleId, INVALID_ID};
use crate::ops::UnionFind;

/// Unit face normal of every triangle (zero for degenerate triangles).
pub fn face_normals(mesh: &Mesh) -> Vec<DVec3> {
    (0..mesh.triangle_count() as TriangleId)
        .into_par_iter()
        .map(|tid| mesh.triangle_normal(tid))
        .collect()
}

/// Rebuilds the normal overlay topology with hard seams at the opening angle.
///
/// Creates the normal overlay when missing. Element values are left as the
/// raw face normal of the first triangle of each fan; call
/// [`recompute_normals`] for the final values.
pub fn compute_normal_topology(mesh: &mut Mesh, opening_angle_deg: f64) {
    let threshold = config::constants::dot_threshold(opening_angle_deg);
    let normals = face_normals(mesh);
    let topology = EdgeTopology::build(mesh);
    let incident = vertex_triangles(mesh);

    let mut corners = vec![[INVALID_ID; 3]; mesh.triangle_count()];
    let mut values = Vec::new();
    let mut parents = Vec::new();

    for (vid, tris) in incident.iter().enumerate() {
        if tris.is_empty() {
            continue;
        }
        let vid = vid as u32;
        let mut fans = UnionFind::new(tris.len());
        for (i, &tid) in tris.iter().enumerate() {
            for eid in topology.triangle_edges(tid) {
                if !topology.edge(eid).vertices.contains(&vid) {
                    continue;
                }
                let Some(other) = topology.opposite_triangle(eid, tid) else {
                    continue;
                };
                if normals[tid as usize].dot(normals[other as usize]) < threshold {
                    continue;
                }
                if let Some(j) = tris.iter().position(|&t| t == other) {
                    fans.union(i as u32, j as u32);
                }
            }
        }

        let mut element_of_root = vec![INVALID_ID; tris.len()];
        for (i, &tid) in tris.iter().enumerate() {
            let root = fans.find(i as u32) as usize;
            if element_of_root[root] == INVALID_ID {
                element_of_root[root] = values.len() as ElementId;
                values.push(normals[tid as usize].as_vec3());
                parents.push(vid);
            }
            // A collapsed triangle uses `vid` at more than one corner.
            for (corner, &v) in mesh.triangle(tid).vertices.iter().enumerate() {
                if v == vid {
                    corners[tid as usize][corner] = element_of_root[root];
                }
            }
        }
    }

    let overlay = mesh.enable_normals();
    overlay.clear_elements();
    for (value, parent) in values.into_iter().zip(parents) {
        overlay.append_element(value, parent);
    }
    for (tid, tri) in corners.into_iter().enumerate() {
        overlay.set_triangle(tid as TriangleId, Some(tri));
    }
}

/// Sets every normal element to the normalized area-weighted sum of the face
/// normals of the triangles that reference it.
pub fn recompute_normals(mesh: &mut Mesh) {
    let Some(overlay) = mesh.normals() else {
        return;
    };
    let mut sums = vec![DVec3::ZERO; overlay.element_count()];
    for tid in mesh.triangle_ids() {
        let Some(tri) = overlay.triangle(tid) else {
            continue;
        };
        let [a, b, c] = mesh.triangle_positions(tid);
        let weighted = (b - a).cross(c - a);
        for element in tri {
            sums[element as usize] += weighted;
        }
    }

    if let Some(overlay) = mesh.normals_mut() {
        for (id, sum) in sums.into_iter().enumerate() {
            let normal = sum.normalize_or_zero();
            if normal != DVec3::ZERO {
                overlay.set_element(id as ElementId, normal.as_vec3());
            }
        }
    }
}

/// Rebuilds normal topology at `opening_angle_deg` and recomputes values.
pub fn compute_normals(mesh: &mut Mesh, opening_angle_deg: f64) {
    compute_normal_topology(mesh, opening_angle_deg);
    recompute_normals(mesh);
}
