//! # Edge Welding
//!
//! Merges pairs of boundary edges that lie on top of each other with opposite
//! orientation, the way neighbouring cells of a voxel grid emit the two halves
//! of one surface.
//!
//! ## Algorithm
//!
//! 1. Collect boundary edges (one incident triangle) in edge order, directed as
//!    their triangle traverses them.
//! 2. Bucket edge midpoints in a spatial hash with cell size `tolerance`.
//! 3. For each unmatched edge `(a, b)`, the first unmatched edge `(c, d)` in
//!    edge order with `|a - d| <= tolerance` and `|b - c| <= tolerance` is its
//!    partner. With `only_unique_pairs`, a pair is merged only when neither
//!    edge has another candidate.
//! 4. Matched endpoints are merged; the lowest vertex id survives.
//! 5. Triangles that collapse are removed.
//!
//! Vertices are not compacted; call [`Mesh::compact`] afterwards.

use glam::DVec3;
use hashbrown::HashMap;
use tracing::debug;

use crate::mesh::{EdgeTopology, Mesh, Overlay, TriangleId, VertexId};
use crate::ops::UnionFind;

/// Parameters for [`weld_edges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeldParams {
    /// Maximum endpoint distance between two merged edges.
    ///
    /// Default: [`config::constants::WELD_TOLERANCE`]
    pub tolerance: f64,

    /// Only merge edges that have exactly one candidate partner.
    ///
    /// Default: `false`
    pub only_unique_pairs: bool,

    /// Merge overlay elements with equal values across welded edges.
    ///
    /// Default: `true`
    pub weld_attributes: bool,
}

impl Default for WeldParams {
    fn default() -> Self {
        Self {
            tolerance: config::constants::WELD_TOLERANCE,
            only_unique_pairs: false,
            weld_attributes: true,
        }
    }
}

impl WeldParams {
    /// Params with the given tolerance and default flags.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Set whether only unambiguous pairs are merged.
    #[must_use]
    pub fn with_only_unique_pairs(mut self, unique: bool) -> Self {
        self.only_unique_pairs = unique;
        self
    }

    /// Set whether overlay elements are merged.
    #[must_use]
    pub fn with_weld_attributes(mut self, weld: bool) -> Self {
        self.weld_attributes = weld;
        self
    }
}

/// Outcome of [`weld_edges`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeldReport {
    /// Number of boundary edge pairs merged.
    pub merged_edges: usize,
    /// Triangles removed because they collapsed.
    pub removed_triangles: usize,
}

/// Boundary edge as traversed by its only triangle.
#[derive(Debug, Clone, Copy)]
struct BoundaryEdge {
    from: VertexId,
    to: VertexId,
    triangle: TriangleId,
    corner: usize,
}

type CellKey = (i64, i64, i64);

#[inline]
fn cell_of(point: DVec3, inv_cell: f64) -> CellKey {
    let scaled = (point * inv_cell).floor();
    (scaled.x as i64, scaled.y as i64, scaled.z as i64)
}

/// Welds coincident, oppositely oriented boundary edges.
///
/// # Example
///
/// ```rust
/// use grid_meshing::mesh::Mesh;
/// use grid_meshing::ops::weld::{weld_edges, WeldParams};
/// use glam::DVec3;
///
/// // Two triangles forming a quad, but with duplicated diagonal vertices.
/// let mut mesh = Mesh::from_indexed(
///     vec![
///         DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0),
///         DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0), DVec3::Y,
///     ],
///     &[[0, 1, 2], [3, 4, 5]],
/// );
/// let report = weld_edges(&mut mesh, &WeldParams::default());
/// assert_eq!(report.merged_edges, 1);
/// mesh.compact();
/// assert_eq!(mesh.vertex_count(), 4);
/// ```
pub fn weld_edges(mesh: &mut Mesh, params: &WeldParams) -> WeldReport {
    let topology = EdgeTopology::build(mesh);
    let boundary: Vec<BoundaryEdge> = topology
        .edges()
        .iter()
        .filter(|edge| edge.is_boundary())
        .filter_map(|edge| {
            let tid = edge.triangles[0];
            let tri = mesh.triangle(tid);
            (0..3).find_map(|corner| {
                let (from, to) = tri.directed_edge(corner);
                let matches = (from.min(to), from.max(to)) == (edge.vertices[0], edge.vertices[1]);
                matches.then_some(BoundaryEdge {
                    from,
                    to,
                    triangle: tid,
                    corner,
                })
            })
        })
        .collect();

    if boundary.len() < 2 {
        return WeldReport::default();
    }

    let tolerance = params.tolerance.max(f64::EPSILON);
    let inv_cell = 1.0 / tolerance;
    let midpoint = |edge: &BoundaryEdge| (mesh.position(edge.from) + mesh.position(edge.to)) * 0.5;

    let mut grid: HashMap<CellKey, Vec<usize>> = HashMap::new();
    for (index, edge) in boundary.iter().enumerate() {
        grid.entry(cell_of(midpoint(edge), inv_cell)).or_default().push(index);
    }

    let tolerance_sq = tolerance * tolerance;
    let is_partner = |a: &BoundaryEdge, b: &BoundaryEdge| {
        a.triangle != b.triangle
            && mesh.position(a.from).distance_squared(mesh.position(b.to)) <= tolerance_sq
            && mesh.position(a.to).distance_squared(mesh.position(b.from)) <= tolerance_sq
    };

    let collect_candidates = |i: usize, matched: &[bool], out: &mut Vec<usize>| {
        out.clear();
        let edge = &boundary[i];
        let (cx, cy, cz) = cell_of(midpoint(edge), inv_cell);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    out.extend(
                        bucket
                            .iter()
                            .copied()
                            .filter(|&j| j != i && !matched[j] && is_partner(edge, &boundary[j])),
                    );
                }
            }
        }
    };

    let mut matched = vec![false; boundary.len()];
    let mut pairs = Vec::new();
    let mut candidates = Vec::new();
    let mut reverse = Vec::new();

    for i in 0..boundary.len() {
        if matched[i] {
            continue;
        }
        collect_candidates(i, &matched, &mut candidates);
        let Some(&j) = candidates.iter().min() else {
            continue;
        };
        if params.only_unique_pairs {
            collect_candidates(j, &matched, &mut reverse);
            if candidates.len() > 1 || reverse.len() > 1 {
                continue;
            }
        }
        matched[i] = true;
        matched[j] = true;
        pairs.push((i, j));
    }

    if pairs.is_empty() {
        return WeldReport::default();
    }

    let mut vertices = UnionFind::new(mesh.vertex_count());
    for &(i, j) in &pairs {
        vertices.union(boundary[i].from, boundary[j].to);
        vertices.union(boundary[i].to, boundary[j].from);
    }

    if params.weld_attributes {
        // Corner correspondences across each merged edge.
        let mut corners = Vec::with_capacity(pairs.len() * 2);
        for &(i, j) in &pairs {
            let (a, b) = (&boundary[i], &boundary[j]);
            corners.push(((a.triangle, a.corner), (b.triangle, (b.corner + 1) % 3)));
            corners.push(((a.triangle, (a.corner + 1) % 3), (b.triangle, b.corner)));
        }
        let (normals, uv_layers, colors) = mesh.overlays_mut();
        if let Some(overlay) = normals {
            weld_overlay(overlay, &corners, &mut vertices);
        }
        for overlay in uv_layers {
            weld_overlay(overlay, &corners, &mut vertices);
        }
        if let Some(overlay) = colors {
            weld_overlay(overlay, &corners, &mut vertices);
        }
    }

    let mut keep = vec![true; mesh.triangle_count()];
    for tid in mesh.triangle_ids() {
        let tri = mesh.triangle(tid);
        let remapped = tri.vertices.map(|v| vertices.find(v));
        mesh.set_triangle_vertices(tid, remapped);
        keep[tid as usize] = !mesh.triangle(tid).is_degenerate();
    }
    let removed_triangles = mesh.retain_triangles(&keep);

    debug!(
        "Welded {} boundary edge pairs, removed {} collapsed triangles",
        pairs.len(),
        removed_triangles
    );

    WeldReport {
        merged_edges: pairs.len(),
        removed_triangles,
    }
}

/// Unifies equal-valued elements facing each other across welded edges and
/// moves every element to its vertex's surviving id.
fn weld_overlay<T: Copy + PartialEq>(
    overlay: &mut Overlay<T>,
    corners: &[((TriangleId, usize), (TriangleId, usize))],
    vertices: &mut UnionFind,
) {
    let mut elements = UnionFind::new(overlay.element_count());
    for &((ta, ca), (tb, cb)) in corners {
        let (Some(ea), Some(eb)) = (overlay.triangle(ta), overlay.triangle(tb)) else {
            continue;
        };
        let (ea, eb) = (ea[ca], eb[cb]);
        if overlay.element(ea) == overlay.element(eb) {
            elements.union(ea, eb);
        }
    }

    let remap: Vec<u32> = (0..overlay.element_count() as u32).map(|e| elements.find(e)).collect();
    overlay.remap_triangle_elements(&remap);
    for id in 0..overlay.element_count() as u32 {
        let parent = overlay.parent_vertex(id);
        overlay.set_parent_vertex(id, vertices.find(parent));
    }
}
