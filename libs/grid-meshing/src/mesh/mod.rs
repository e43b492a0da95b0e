//! # Triangle Mesh
//!
//! Indexed triangle mesh with per-triangle polygroups and optional attribute
//! overlays (normals, UV layers, vertex colors) plus per-triangle material ids.
//!
//! ## Identity
//!
//! Vertex and triangle ids are dense `u32` indices. Removing triangles keeps the
//! remaining triangles in order and renumbers them densely; [`Mesh::compact`]
//! does the same for vertices and overlay elements. Ids are therefore only
//! stable between mutations.
//!
//! ## Example
//!
//! ```rust
//! use grid_meshing::mesh::Mesh;
//! use glam::DVec3;
//!
//! let mut mesh = Mesh::new();
//! let a = mesh.append_vertex(DVec3::ZERO);
//! let b = mesh.append_vertex(DVec3::X);
//! let c = mesh.append_vertex(DVec3::Y);
//! mesh.append_triangle([a, b, c], 0);
//! assert_eq!(mesh.triangle_count(), 1);
//! assert!((mesh.triangle_area(0) - 0.5).abs() < 1e-12);
//! ```

mod overlay;
mod topology;

pub use overlay::Overlay;
pub use topology::{vertex_triangles, Edge, EdgeTopology};

use glam::{DVec3, Vec2, Vec3, Vec4};

/// Dense vertex index.
pub type VertexId = u32;
/// Dense triangle index.
pub type TriangleId = u32;
/// Dense edge index inside an [`EdgeTopology`].
pub type EdgeId = u32;
/// Dense overlay element index.
pub type ElementId = u32;
/// Polygroup label.
pub type GroupId = u32;

/// Sentinel used in remap tables for removed entries.
pub const INVALID_ID: u32 = u32::MAX;

/// Normal overlay.
pub type NormalOverlay = Overlay<Vec3>;
/// UV overlay.
pub type UvOverlay = Overlay<Vec2>;
/// RGBA color overlay.
pub type ColorOverlay = Overlay<Vec4>;

// =============================================================================
// TRIANGLE
// =============================================================================

/// Triangle record: three vertex ids in counter-clockwise order and a polygroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Corner vertex ids.
    pub vertices: [VertexId; 3],
    /// Polygroup label.
    pub group: GroupId,
}

impl Triangle {
    /// Corner index (0..3) of `vid`, if the triangle uses it.
    #[inline]
    pub fn corner_of(&self, vid: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vid)
    }

    /// Directed edge `k` as `(vertices[k], vertices[k + 1])`.
    #[inline]
    pub fn directed_edge(&self, k: usize) -> (VertexId, VertexId) {
        (self.vertices[k], self.vertices[(k + 1) % 3])
    }

    /// Whether two corners share a vertex.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.vertices;
        a == b || b == c || a == c
    }
}

// =============================================================================
// MESH
// =============================================================================

/// Indexed triangle mesh with polygroups and attribute overlays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<DVec3>,
    triangles: Vec<Triangle>,
    normals: Option<NormalOverlay>,
    uv_layers: Vec<UvOverlay>,
    colors: Option<ColorOverlay>,
    material_ids: Option<Vec<i32>>,
}

impl Mesh {
    /// Creates an empty mesh with no attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from raw positions and triangle indices, all in group 0.
    pub fn from_indexed(positions: Vec<DVec3>, indices: &[[VertexId; 3]]) -> Self {
        let mut mesh = Self {
            positions,
            ..Self::default()
        };
        for &tri in indices {
            mesh.append_triangle(tri, 0);
        }
        mesh
    }

    // -------------------------------------------------------------------------
    // Counts and geometry
    // -------------------------------------------------------------------------

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// All vertex positions.
    #[inline]
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Position of one vertex.
    #[inline]
    pub fn position(&self, vid: VertexId) -> DVec3 {
        self.positions[vid as usize]
    }

    /// Moves one vertex.
    #[inline]
    pub fn set_position(&mut self, vid: VertexId, position: DVec3) {
        self.positions[vid as usize] = position;
    }

    /// All triangles.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// One triangle.
    #[inline]
    pub fn triangle(&self, tid: TriangleId) -> Triangle {
        self.triangles[tid as usize]
    }

    /// Iterator over all triangle ids.
    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId> {
        0..self.triangles.len() as TriangleId
    }

    /// Appends a vertex and returns its id.
    pub fn append_vertex(&mut self, position: DVec3) -> VertexId {
        self.positions.push(position);
        (self.positions.len() - 1) as VertexId
    }

    /// Appends a triangle and returns its id.
    ///
    /// Every enabled overlay gets an unset entry and the material id defaults
    /// to 0.
    pub fn append_triangle(&mut self, vertices: [VertexId; 3], group: GroupId) -> TriangleId {
        self.triangles.push(Triangle { vertices, group });
        if let Some(normals) = &mut self.normals {
            normals.push_unset_triangle();
        }
        for layer in &mut self.uv_layers {
            layer.push_unset_triangle();
        }
        if let Some(colors) = &mut self.colors {
            colors.push_unset_triangle();
        }
        if let Some(materials) = &mut self.material_ids {
            materials.push(0);
        }
        (self.triangles.len() - 1) as TriangleId
    }

    /// Replaces the corner vertices of a triangle.
    #[inline]
    pub fn set_triangle_vertices(&mut self, tid: TriangleId, vertices: [VertexId; 3]) {
        self.triangles[tid as usize].vertices = vertices;
    }

    /// Polygroup of one triangle.
    #[inline]
    pub fn triangle_group(&self, tid: TriangleId) -> GroupId {
        self.triangles[tid as usize].group
    }

    /// Relabels one triangle.
    #[inline]
    pub fn set_triangle_group(&mut self, tid: TriangleId, group: GroupId) {
        self.triangles[tid as usize].group = group;
    }

    /// One past the largest group id in use (0 for an empty mesh).
    pub fn group_id_bound(&self) -> GroupId {
        self.triangles.iter().map(|t| t.group + 1).max().unwrap_or(0)
    }

    /// Corner positions of a triangle.
    #[inline]
    pub fn triangle_positions(&self, tid: TriangleId) -> [DVec3; 3] {
        let [a, b, c] = self.triangle(tid).vertices;
        [self.position(a), self.position(b), self.position(c)]
    }

    /// Unit face normal, or zero for a degenerate triangle.
    pub fn triangle_normal(&self, tid: TriangleId) -> DVec3 {
        let [a, b, c] = self.triangle_positions(tid);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Triangle area.
    pub fn triangle_area(&self, tid: TriangleId) -> f64 {
        let [a, b, c] = self.triangle_positions(tid);
        0.5 * (b - a).cross(c - a).length()
    }

    /// Triangle centroid.
    pub fn triangle_centroid(&self, tid: TriangleId) -> DVec3 {
        let [a, b, c] = self.triangle_positions(tid);
        (a + b + c) / 3.0
    }

    /// Axis-aligned bounds of all vertices referenced by triangles.
    ///
    /// Returns `None` when the mesh has no triangles.
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let mut iter = self.triangles.iter().flat_map(|t| t.vertices);
        let first = self.position(iter.next()?);
        Some(iter.fold((first, first), |(min, max), vid| {
            let p = self.position(vid);
            (min.min(p), max.max(p))
        }))
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    /// Normal overlay, if enabled.
    #[inline]
    pub fn normals(&self) -> Option<&NormalOverlay> {
        self.normals.as_ref()
    }

    /// Mutable normal overlay, if enabled.
    #[inline]
    pub fn normals_mut(&mut self) -> Option<&mut NormalOverlay> {
        self.normals.as_mut()
    }

    /// Enables the normal overlay (no-op when already enabled).
    pub fn enable_normals(&mut self) -> &mut NormalOverlay {
        let count = self.triangles.len();
        self.normals.get_or_insert_with(|| Overlay::new(count))
    }

    /// Number of UV layers.
    #[inline]
    pub fn uv_layer_count(&self) -> usize {
        self.uv_layers.len()
    }

    /// UV layer `index`, if present.
    #[inline]
    pub fn uv_layer(&self, index: usize) -> Option<&UvOverlay> {
        self.uv_layers.get(index)
    }

    /// Mutable UV layer `index`, if present.
    #[inline]
    pub fn uv_layer_mut(&mut self, index: usize) -> Option<&mut UvOverlay> {
        self.uv_layers.get_mut(index)
    }

    /// Ensures at least `count` UV layers exist.
    pub fn enable_uv_layers(&mut self, count: usize) {
        while self.uv_layers.len() < count {
            self.uv_layers.push(Overlay::new(self.triangles.len()));
        }
    }

    /// Color overlay, if enabled.
    #[inline]
    pub fn colors(&self) -> Option<&ColorOverlay> {
        self.colors.as_ref()
    }

    /// Mutable color overlay, if enabled.
    #[inline]
    pub fn colors_mut(&mut self) -> Option<&mut ColorOverlay> {
        self.colors.as_mut()
    }

    /// Enables the color overlay (no-op when already enabled).
    pub fn enable_colors(&mut self) -> &mut ColorOverlay {
        let count = self.triangles.len();
        self.colors.get_or_insert_with(|| Overlay::new(count))
    }

    /// Per-triangle material ids, if enabled.
    #[inline]
    pub fn material_ids(&self) -> Option<&[i32]> {
        self.material_ids.as_deref()
    }

    /// Material id of one triangle, if materials are enabled.
    #[inline]
    pub fn material_id(&self, tid: TriangleId) -> Option<i32> {
        self.material_ids.as_ref().map(|m| m[tid as usize])
    }

    /// Sets the material id of one triangle. No-op when materials are disabled.
    #[inline]
    pub fn set_material_id(&mut self, tid: TriangleId, material: i32) {
        if let Some(materials) = &mut self.material_ids {
            materials[tid as usize] = material;
        }
    }

    /// Enables per-triangle material ids, all 0 initially.
    pub fn enable_material_ids(&mut self) {
        if self.material_ids.is_none() {
            self.material_ids = Some(vec![0; self.triangles.len()]);
        }
    }

    pub(crate) fn overlays_mut(
        &mut self,
    ) -> (Option<&mut NormalOverlay>, &mut [UvOverlay], Option<&mut ColorOverlay>) {
        (self.normals.as_mut(), &mut self.uv_layers, self.colors.as_mut())
    }

    // -------------------------------------------------------------------------
    // Structural edits
    // -------------------------------------------------------------------------

    /// Removes the listed triangles, keeping the survivors in order.
    ///
    /// Vertices are left in place; call [`Mesh::compact`] to drop the ones no
    /// longer referenced. Returns the number of triangles removed.
    pub fn remove_triangles(&mut self, remove: &[TriangleId]) -> usize {
        let mut keep = vec![true; self.triangles.len()];
        for &tid in remove {
            keep[tid as usize] = false;
        }
        self.retain_triangles(&keep)
    }

    /// Keeps only triangles whose entry in `keep` is true. Returns the number
    /// of triangles removed.
    pub fn retain_triangles(&mut self, keep: &[bool]) -> usize {
        let before = self.triangles.len();
        let mut index = 0;
        self.triangles.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });
        if let Some(normals) = &mut self.normals {
            normals.retain_triangles(keep);
        }
        for layer in &mut self.uv_layers {
            layer.retain_triangles(keep);
        }
        if let Some(colors) = &mut self.colors {
            colors.retain_triangles(keep);
        }
        if let Some(materials) = &mut self.material_ids {
            let mut index = 0;
            materials.retain(|_| {
                let kept = keep[index];
                index += 1;
                kept
            });
        }
        before - self.triangles.len()
    }

    /// Drops vertices and overlay elements no triangle references.
    ///
    /// Relative order of the survivors is preserved. Returns the old-to-new
    /// vertex remap ([`INVALID_ID`] for removed vertices).
    pub fn compact(&mut self) -> Vec<VertexId> {
        let mut used = vec![false; self.positions.len()];
        for tri in &self.triangles {
            for &vid in &tri.vertices {
                used[vid as usize] = true;
            }
        }

        let mut remap = vec![INVALID_ID; self.positions.len()];
        let mut positions = Vec::with_capacity(self.positions.len());
        for (old, &is_used) in used.iter().enumerate() {
            if is_used {
                remap[old] = positions.len() as VertexId;
                positions.push(self.positions[old]);
            }
        }
        self.positions = positions;

        for tri in &mut self.triangles {
            for vid in &mut tri.vertices {
                *vid = remap[*vid as usize];
            }
        }
        if let Some(normals) = &mut self.normals {
            normals.compact(&remap);
        }
        for layer in &mut self.uv_layers {
            layer.compact(&remap);
        }
        if let Some(colors) = &mut self.colors {
            colors.compact(&remap);
        }
        remap
    }

    /// Reverses the winding of every triangle and its overlay triples.
    ///
    /// Normal element values are not touched; see [`Mesh::invert_faces`].
    pub fn reverse_orientation(&mut self) {
        for tri in &mut self.triangles {
            tri.vertices.swap(1, 2);
        }
        if let Some(normals) = &mut self.normals {
            normals.reverse_triangles();
        }
        for layer in &mut self.uv_layers {
            layer.reverse_triangles();
        }
        if let Some(colors) = &mut self.colors {
            colors.reverse_triangles();
        }
    }

    /// Reverses orientation and negates every stored normal.
    pub fn invert_faces(&mut self) {
        self.reverse_orientation();
        if let Some(normals) = &mut self.normals {
            normals.map_elements(|n| -n);
        }
    }
}
