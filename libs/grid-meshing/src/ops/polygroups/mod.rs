//! # Polygroup Generation
//!
//! Seed-normal flood fill: every region is grown from its lowest unvisited
//! triangle and accepts a neighbour while the neighbour's normal stays close to
//! the *seed* normal. Unlike [`crate::ops::coplanar`], drift along a gently
//! curving surface does not chain into one region.

use tracing::debug;

use crate::mesh::{EdgeTopology, Mesh, TriangleId};
use crate::ops::normals::face_normals;

/// Parameters for [`find_polygroups`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygroupParams {
    /// Maximum angle in degrees between the seed normal and a member normal.
    ///
    /// Default: `2.0`
    pub angle_deg: f64,

    /// Stop at seams of UV layer 0.
    ///
    /// Default: `false`
    pub respect_uv_seams: bool,

    /// Stop at seams of the normal overlay.
    ///
    /// Default: `false`
    pub respect_hard_normals: bool,
}

impl Default for PolygroupParams {
    fn default() -> Self {
        Self {
            angle_deg: config::constants::COPLANAR_ANGLE_TOLERANCE_DEG,
            respect_uv_seams: false,
            respect_hard_normals: false,
        }
    }
}

impl PolygroupParams {
    /// Set the seed angle tolerance in degrees.
    #[must_use]
    pub fn with_angle_deg(mut self, angle_deg: f64) -> Self {
        self.angle_deg = angle_deg;
        self
    }

    /// Set whether UV seams split regions.
    #[must_use]
    pub fn with_respect_uv_seams(mut self, respect: bool) -> Self {
        self.respect_uv_seams = respect;
        self
    }

    /// Set whether hard normal seams split regions.
    #[must_use]
    pub fn with_respect_hard_normals(mut self, respect: bool) -> Self {
        self.respect_hard_normals = respect;
        self
    }

    /// Accepted deviation from a dot product of 1.
    #[inline]
    pub fn dot_tolerance(&self) -> f64 {
        1.0 - config::constants::dot_threshold(self.angle_deg)
    }
}

/// Partitions the mesh into seed-normal regions.
pub fn find_polygroups(mesh: &Mesh, params: &PolygroupParams) -> Vec<Vec<TriangleId>> {
    let topology = EdgeTopology::build(mesh);
    let normals = face_normals(mesh);
    let min_dot = 1.0 - params.dot_tolerance();
    let uv_layer = params.respect_uv_seams.then(|| mesh.uv_layer(0)).flatten();
    let normal_layer = params.respect_hard_normals.then(|| mesh.normals()).flatten();

    let mut visited = vec![false; mesh.triangle_count()];
    let mut groups = Vec::new();
    let mut stack = Vec::new();

    for seed in mesh.triangle_ids() {
        if visited[seed as usize] {
            continue;
        }
        visited[seed as usize] = true;
        let seed_normal = normals[seed as usize];
        let mut group = vec![seed];
        stack.push(seed);

        while let Some(current) = stack.pop() {
            for (eid, neighbor) in topology.triangle_neighbors(current) {
                if visited[neighbor as usize] || seed_normal.dot(normals[neighbor as usize]) < min_dot {
                    continue;
                }
                let edge = topology.edge(eid);
                if uv_layer.is_some_and(|uv| uv.is_seam_edge(mesh, edge)) {
                    continue;
                }
                if normal_layer.is_some_and(|n| n.is_seam_edge(mesh, edge)) {
                    continue;
                }
                visited[neighbor as usize] = true;
                group.push(neighbor);
                stack.push(neighbor);
            }
        }

        groups.push(group);
    }

    groups
}

/// Replaces every triangle's group with a fresh seed-normal region id.
///
/// Returns the number of regions.
pub fn compute_polygroups(mesh: &mut Mesh, params: &PolygroupParams) -> usize {
    let groups = find_polygroups(mesh, params);
    crate::ops::coplanar::assign_groups(mesh, &groups);
    debug!("Computed {} polygroups at {} degrees", groups.len(), params.angle_deg);
    groups.len()
}
