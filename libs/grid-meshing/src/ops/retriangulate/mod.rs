//! # Planar Retriangulation
//!
//! Replaces the dense per-cell triangulation of every planar region with a
//! near-minimal triangulation of the region's outline.
//!
//! ## Stages
//!
//! ```text
//! split bowties → weld (tolerance × 1e-3) → hard edges
//!       ↓
//! coplanar groups that never cross a hard edge
//!       ↓
//! boundary loop per group → collinear span removal → CDT in the group plane
//!       ↓
//! per-group material and color → color seams between groups → normals
//!       ↓
//! compact
//! ```
//!
//! ## Failure handling
//!
//! A group whose boundary is not one simple loop, or whose outline cannot
//! be triangulated, keeps its original triangles. Its boundary vertices are
//! then pinned so that neighbouring groups keep them too, which keeps the
//! shared boundaries watertight.

mod cdt;
mod group_topology;

use glam::{DVec2, DVec3, Vec4};
use hashbrown::HashMap;
use tracing::{debug, info, warn};

use config::constants::{
    COPLANAR_ANGLE_TOLERANCE_DEG, NORMAL_OPENING_ANGLE_DEG, RETRIANGULATION_TOLERANCE, RETRIANGULATION_WELD_SCALE,
};

use crate::error::TopologyError;
use crate::frame::Frame3;
use crate::mesh::{EdgeTopology, ElementId, GroupId, Mesh, TriangleId, VertexId};
use crate::ops::bowtie::split_bowties;
use crate::ops::coplanar::{assign_groups, find_groups_with_topology};
use crate::ops::normals::compute_normals;
use crate::ops::seams::{find_hard_edges, SeamOptions};
use crate::ops::weld::{weld_edges, WeldParams};

use group_topology::{group_boundary, simplify_loop, trace_loop, vertex_groups, BoundaryEdge, BoundaryLoop, NON_MANIFOLD};

/// Parameters for [`retriangulate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetriangulateParams {
    /// Base distance tolerance. The pre-weld uses `tolerance * 1e-3`.
    ///
    /// Default: `0.1`
    pub tolerance: f64,

    /// Keep UV seams as group borders.
    ///
    /// Default: `false`
    pub preserve_uv: bool,

    /// Keep vertex color discontinuities as group borders.
    ///
    /// Default: `true`
    pub preserve_color: bool,

    /// Keep material changes as group borders.
    ///
    /// Default: `true`
    pub preserve_material: bool,

    /// Opening angle for hard normal seams on the result, in degrees.
    ///
    /// Default: `12.0`
    pub normal_angle_deg: f64,

    /// Maximum turn at a boundary vertex that may be dropped, in degrees.
    ///
    /// Default: `2.0`
    pub simplify_angle_deg: f64,
}

impl Default for RetriangulateParams {
    fn default() -> Self {
        Self {
            tolerance: RETRIANGULATION_TOLERANCE,
            preserve_uv: false,
            preserve_color: true,
            preserve_material: true,
            normal_angle_deg: NORMAL_OPENING_ANGLE_DEG,
            simplify_angle_deg: COPLANAR_ANGLE_TOLERANCE_DEG,
        }
    }
}

impl RetriangulateParams {
    /// Set whether UV seams bound groups.
    #[must_use]
    pub fn with_preserve_uv(mut self, preserve: bool) -> Self {
        self.preserve_uv = preserve;
        self
    }

    /// Set whether color discontinuities bound groups.
    #[must_use]
    pub fn with_preserve_color(mut self, preserve: bool) -> Self {
        self.preserve_color = preserve;
        self
    }

    /// Set whether material changes bound groups.
    #[must_use]
    pub fn with_preserve_material(mut self, preserve: bool) -> Self {
        self.preserve_material = preserve;
        self
    }

    /// Set the hard normal opening angle.
    #[must_use]
    pub fn with_normal_angle_deg(mut self, angle_deg: f64) -> Self {
        self.normal_angle_deg = angle_deg;
        self
    }

    fn seam_options(&self) -> SeamOptions {
        SeamOptions {
            preserve_uv: self.preserve_uv,
            preserve_color: self.preserve_color,
            preserve_material: self.preserve_material,
        }
    }
}

/// Outcome of [`retriangulate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetriangulationReport {
    /// Number of planar groups found.
    pub groups: usize,
    /// Groups whose triangles were replaced.
    pub retriangulated_groups: usize,
    /// Groups left as they were, with the reason.
    pub skipped_groups: Vec<(GroupId, TopologyError)>,
    /// Triangle count on entry.
    pub triangles_before: usize,
    /// Triangle count on exit.
    pub triangles_after: usize,
}

/// Per-group decision of one planning pass.
enum GroupPlan {
    /// The outline cannot be reduced and has no interior vertices.
    Unchanged,
    /// New triangles over the simplified outline.
    Replace(Vec<[VertexId; 3]>),
}

/// Attribute values captured per group before triangles are replaced.
struct GroupAttributes {
    materials: Option<Vec<i32>>,
    colors: Option<Vec<Vec4>>,
}

impl GroupAttributes {
    fn capture(mesh: &Mesh, groups: &[Vec<TriangleId>]) -> Self {
        let materials = mesh.material_ids().map(|_| {
            groups
                .iter()
                .map(|tris| tris.first().and_then(|&tid| mesh.material_id(tid)).unwrap_or(0))
                .collect()
        });

        let colors = mesh.colors().map(|colors| {
            groups
                .iter()
                .map(|tris| {
                    let (sum, count) = tris
                        .iter()
                        .filter_map(|&tid| colors.triangle_values(tid))
                        .fold((Vec4::ZERO, 0u32), |(sum, count), [a, b, c]| {
                            (sum + (a + b + c) / 3.0, count + 1)
                        });
                    if count == 0 {
                        Vec4::ZERO
                    } else {
                        (sum / count as f32).truncate().extend(1.0)
                    }
                })
                .collect()
        });

        Self { materials, colors }
    }
}

/// Retriangulates every planar region of `mesh` in place.
///
/// # Example
///
/// ```rust
/// use grid_meshing::mesh::Mesh;
/// use grid_meshing::ops::retriangulate::{retriangulate, RetriangulateParams};
/// use glam::DVec3;
///
/// // 2x1 strip of quads: four triangles covering one rectangle.
/// let mut mesh = Mesh::from_indexed(
///     vec![
///         DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0),
///         DVec3::Y, DVec3::new(1.0, 1.0, 0.0), DVec3::new(2.0, 1.0, 0.0),
///     ],
///     &[[0, 1, 4], [0, 4, 3], [1, 2, 5], [1, 5, 4]],
/// );
/// let report = retriangulate(&mut mesh, &RetriangulateParams::default());
/// assert_eq!(report.triangles_after, 2);
/// assert_eq!(mesh.vertex_count(), 4);
/// ```
pub fn retriangulate(mesh: &mut Mesh, params: &RetriangulateParams) -> RetriangulationReport {
    let mut report = RetriangulationReport {
        triangles_before: mesh.triangle_count(),
        ..RetriangulationReport::default()
    };

    let split = split_bowties(mesh);
    let weld = weld_edges(mesh, &WeldParams::with_tolerance(params.tolerance * RETRIANGULATION_WELD_SCALE));
    debug!(
        "Retriangulation prepass: {} bowtie vertices split, {} edges welded",
        split, weld.merged_edges
    );

    let topology = EdgeTopology::build(mesh);
    let hard = find_hard_edges(mesh, &topology, &params.seam_options());
    let groups = find_groups_with_topology(mesh, &topology, COPLANAR_ANGLE_TOLERANCE_DEG, |_, _, eid| {
        !hard.contains(&eid)
    });
    assign_groups(mesh, &groups);
    report.groups = groups.len();

    let attributes = GroupAttributes::capture(mesh, &groups);
    let plans = plan_groups(mesh, &topology, &groups, params, &mut report);
    report.retriangulated_groups = plans.iter().filter(|p| matches!(p, Some(GroupPlan::Replace(_)))).count();
    apply_plans(mesh, &groups, plans);

    if let Some(materials) = &attributes.materials {
        for tid in 0..mesh.triangle_count() as TriangleId {
            let group = mesh.triangle_group(tid) as usize;
            mesh.set_material_id(tid, materials[group]);
        }
    }
    if let Some(colors) = &attributes.colors {
        rebuild_group_colors(mesh, colors);
    }
    compute_normals(mesh, params.normal_angle_deg);
    mesh.compact();

    report.triangles_after = mesh.triangle_count();
    info!(
        "Retriangulated {} of {} groups: {} -> {} triangles",
        report.retriangulated_groups, report.groups, report.triangles_before, report.triangles_after
    );
    report
}

/// Plans every group, pinning the outlines of failed groups until no new
/// failure appears.
fn plan_groups(
    mesh: &Mesh,
    topology: &EdgeTopology,
    groups: &[Vec<TriangleId>],
    params: &RetriangulateParams,
    report: &mut RetriangulationReport,
) -> Vec<Option<GroupPlan>> {
    let min_dot = config::constants::dot_threshold(params.simplify_angle_deg);
    let incident_groups = vertex_groups(mesh);
    let boundaries: Vec<Vec<BoundaryEdge>> = groups
        .iter()
        .enumerate()
        .map(|(g, tris)| group_boundary(mesh, topology, g as GroupId, tris))
        .collect();

    let mut pinned = vec![false; mesh.vertex_count()];
    for boundary in &boundaries {
        let fins: Vec<BoundaryEdge> = boundary.iter().copied().filter(|e| e.label == NON_MANIFOLD).collect();
        pin_boundary(&mut pinned, &fins);
    }

    let loops: Vec<Result<BoundaryLoop, TopologyError>> = boundaries
        .iter()
        .enumerate()
        .map(|(g, boundary)| trace_loop(g as GroupId, boundary))
        .collect();
    let mut failed: Vec<Option<TopologyError>> = loops.iter().map(|l| l.as_ref().err().cloned()).collect();
    for (g, _) in failed.iter().enumerate().filter(|(_, f)| f.is_some()) {
        pin_boundary(&mut pinned, &boundaries[g]);
    }

    let plans = loop {
        let mut plans = Vec::with_capacity(groups.len());
        let mut new_failure = false;
        for (g, tris) in groups.iter().enumerate() {
            let Ok(boundary_loop) = &loops[g] else {
                plans.push(None);
                continue;
            };
            if failed[g].is_some() {
                plans.push(None);
                continue;
            }
            let kept = simplify_loop(mesh, g as GroupId, boundary_loop, &incident_groups, &pinned, min_dot);
            match plan_group(mesh, g as GroupId, tris, boundary_loop, &kept) {
                Ok(plan) => plans.push(Some(plan)),
                Err(err) => {
                    pin_boundary(&mut pinned, &boundaries[g]);
                    failed[g] = Some(err);
                    new_failure = true;
                    plans.push(None);
                }
            }
        }
        if !new_failure {
            break plans;
        }
        debug!("Group failure pinned new boundary vertices, replanning");
    };

    for (g, err) in failed.into_iter().enumerate() {
        if let Some(err) = err {
            warn!("Skipping group {} during retriangulation: {}", g, err);
            report.skipped_groups.push((g as GroupId, err));
        }
    }
    plans
}

fn pin_boundary(pinned: &mut [bool], boundary: &[BoundaryEdge]) {
    for edge in boundary {
        pinned[edge.from as usize] = true;
        pinned[edge.to as usize] = true;
    }
}

/// Triangulates one group's simplified outline in the group's plane.
fn plan_group(
    mesh: &Mesh,
    group: GroupId,
    triangles: &[TriangleId],
    boundary_loop: &BoundaryLoop,
    kept: &[VertexId],
) -> Result<GroupPlan, TopologyError> {
    if kept.len() < 3 {
        return Err(TopologyError::DegenerateFace { group });
    }
    if kept.len() == boundary_loop.vertices.len() && triangles.len() + 2 == kept.len() {
        return Ok(GroupPlan::Unchanged);
    }

    let normal = triangles.iter().fold(DVec3::ZERO, |acc, &tid| {
        let [a, b, c] = mesh.triangle_positions(tid);
        acc + (b - a).cross(c - a)
    });
    if normal.length_squared() == 0.0 {
        return Err(TopologyError::DegenerateFace { group });
    }

    let frame = Frame3::from_normal(mesh.position(kept[0]), normal);
    let points: Vec<DVec2> = kept.iter().map(|&v| frame.to_plane_uv(mesh.position(v))).collect();
    let local = cdt::triangulate_polygon(&points).ok_or(TopologyError::TriangulationFailed { group })?;
    Ok(GroupPlan::Replace(
        local.into_iter().map(|[a, b, c]| [kept[a], kept[b], kept[c]]).collect(),
    ))
}

/// Appends the planned triangles and removes the ones they replace.
///
/// UV elements of a new corner come from the first original triangle of the
/// group at that vertex.
fn apply_plans(mesh: &mut Mesh, groups: &[Vec<TriangleId>], plans: Vec<Option<GroupPlan>>) {
    let mut replaced = Vec::new();
    for ((g, tris), plan) in groups.iter().enumerate().zip(plans) {
        let Some(GroupPlan::Replace(new_triangles)) = plan else {
            continue;
        };

        let mut source: HashMap<VertexId, TriangleId> = HashMap::new();
        for &tid in tris {
            for vid in mesh.triangle(tid).vertices {
                source.entry(vid).or_insert(tid);
            }
        }

        for vertices in new_triangles {
            let uv_triples: Vec<Option<[ElementId; 3]>> = (0..mesh.uv_layer_count())
                .map(|layer| {
                    let uvs = mesh.uv_layer(layer)?;
                    let mut triple = [0; 3];
                    for (slot, &vid) in triple.iter_mut().zip(&vertices) {
                        let &src = source.get(&vid)?;
                        *slot = uvs.element_at_vertex(mesh, src, vid)?;
                    }
                    Some(triple)
                })
                .collect();

            let tid = mesh.append_triangle(vertices, g as GroupId);
            for (layer, triple) in uv_triples.into_iter().enumerate() {
                if let Some(uvs) = mesh.uv_layer_mut(layer) {
                    uvs.set_triangle(tid, triple);
                }
            }
        }
        replaced.extend_from_slice(tris);
    }
    mesh.remove_triangles(&replaced);
}

/// Gives every triangle its group color, with one element per
/// (vertex, group) so that group borders become color seams.
fn rebuild_group_colors(mesh: &mut Mesh, group_colors: &[Vec4]) {
    let triangles = mesh.triangles().to_vec();
    let colors = mesh.enable_colors();
    colors.clear_elements();

    let mut elements: HashMap<(VertexId, GroupId), ElementId> = HashMap::new();
    for (tid, tri) in triangles.iter().enumerate() {
        let color = group_colors[tri.group as usize];
        let triple = tri.vertices.map(|vid| {
            *elements
                .entry((vid, tri.group))
                .or_insert_with(|| colors.append_element(color, vid))
        });
        colors.set_triangle(tid as TriangleId, Some(triple));
    }
}

#[cfg(test)]
mod tests;
