//! # Indexed Attribute Overlay
//!
//! Per-attribute element storage decoupled from vertex indexing.
//!
//! ## Layout
//!
//! ```text
//! elements:  [e0, e1, e2, ...]         attribute values
//! parents:   [v0, v0, v3, ...]         vertex each element belongs to
//! triangles: [Some([e0, e2, e5]), None, ...]   per-triangle element triple
//! ```
//!
//! A vertex may own several elements, one per side of a hard seam. An edge is
//! a seam for the overlay when its two triangles reference different elements
//! at a shared vertex.

use super::topology::Edge;
use super::{ElementId, Mesh, TriangleId, VertexId};

/// Indexed attribute overlay (normals, UVs, colors).
///
/// ## Example
///
/// ```rust
/// use grid_meshing::mesh::Overlay;
/// use glam::Vec2;
///
/// let mut uvs: Overlay<Vec2> = Overlay::new(1);
/// let a = uvs.append_element(Vec2::ZERO, 0);
/// let b = uvs.append_element(Vec2::X, 1);
/// let c = uvs.append_element(Vec2::Y, 2);
/// uvs.set_triangle(0, Some([a, b, c]));
/// assert!(uvs.is_set_triangle(0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay<T> {
    elements: Vec<T>,
    parents: Vec<VertexId>,
    triangles: Vec<Option<[ElementId; 3]>>,
}

impl<T: Copy> Overlay<T> {
    /// Creates an overlay with `triangle_count` unset triangles and no elements.
    #[must_use]
    pub fn new(triangle_count: usize) -> Self {
        Self {
            elements: Vec::new(),
            parents: Vec::new(),
            triangles: vec![None; triangle_count],
        }
    }

    /// Number of elements.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// All element values.
    #[inline]
    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Value of one element.
    #[inline]
    pub fn element(&self, id: ElementId) -> T {
        self.elements[id as usize]
    }

    /// Overwrites the value of one element.
    #[inline]
    pub fn set_element(&mut self, id: ElementId, value: T) {
        self.elements[id as usize] = value;
    }

    /// Vertex that owns the element.
    #[inline]
    pub fn parent_vertex(&self, id: ElementId) -> VertexId {
        self.parents[id as usize]
    }

    /// Appends a new element owned by `parent` and returns its id.
    pub fn append_element(&mut self, value: T, parent: VertexId) -> ElementId {
        let id = self.elements.len() as ElementId;
        self.elements.push(value);
        self.parents.push(parent);
        id
    }

    /// Element triple of a triangle, `None` when the triangle is unset.
    #[inline]
    pub fn triangle(&self, tid: TriangleId) -> Option<[ElementId; 3]> {
        self.triangles[tid as usize]
    }

    /// Whether the triangle references elements in this overlay.
    #[inline]
    pub fn is_set_triangle(&self, tid: TriangleId) -> bool {
        self.triangles[tid as usize].is_some()
    }

    /// Assigns (or clears) the element triple of a triangle.
    #[inline]
    pub fn set_triangle(&mut self, tid: TriangleId, elements: Option<[ElementId; 3]>) {
        self.triangles[tid as usize] = elements;
    }

    /// Values at the three corners of a triangle.
    pub fn triangle_values(&self, tid: TriangleId) -> Option<[T; 3]> {
        self.triangle(tid)
            .map(|tri| [self.element(tri[0]), self.element(tri[1]), self.element(tri[2])])
    }

    /// Removes every element and unsets every triangle.
    pub fn clear_elements(&mut self) {
        self.elements.clear();
        self.parents.clear();
        for tri in &mut self.triangles {
            *tri = None;
        }
    }

    /// Applies `f` to every element value in place.
    pub fn map_elements(&mut self, mut f: impl FnMut(T) -> T) {
        for value in &mut self.elements {
            *value = f(*value);
        }
    }

    /// Element used by triangle `tid` at mesh vertex `vid`.
    pub fn element_at_vertex(&self, mesh: &Mesh, tid: TriangleId, vid: VertexId) -> Option<ElementId> {
        let corner = mesh.triangle(tid).corner_of(vid)?;
        self.triangle(tid).map(|tri| tri[corner])
    }

    /// Whether `edge` separates different elements of this overlay.
    ///
    /// Boundary and non-manifold edges are never seams. A set triangle facing
    /// an unset one counts as a seam; two unset triangles do not.
    pub fn is_seam_edge(&self, mesh: &Mesh, edge: &Edge) -> bool {
        let Some((ta, tb)) = edge.manifold_pair() else {
            return false;
        };
        match (self.is_set_triangle(ta), self.is_set_triangle(tb)) {
            (false, false) => false,
            (true, true) => edge.vertices.iter().any(|&vid| {
                self.element_at_vertex(mesh, ta, vid) != self.element_at_vertex(mesh, tb, vid)
            }),
            _ => true,
        }
    }

    /// Whether two edge-adjacent triangles share elements across `edge`.
    pub fn are_triangles_connected(&self, mesh: &Mesh, edge: &Edge) -> bool {
        match edge.manifold_pair() {
            Some((ta, tb)) => {
                self.is_set_triangle(ta) && self.is_set_triangle(tb) && !self.is_seam_edge(mesh, edge)
            }
            None => false,
        }
    }

    // =========================================================================
    // CRATE-INTERNAL MAINTENANCE
    // =========================================================================

    pub(crate) fn push_unset_triangle(&mut self) {
        self.triangles.push(None);
    }

    pub(crate) fn retain_triangles(&mut self, keep: &[bool]) {
        let mut index = 0;
        self.triangles.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });
    }

    pub(crate) fn reverse_triangles(&mut self) {
        for tri in self.triangles.iter_mut().flatten() {
            tri.swap(1, 2);
        }
    }

    pub(crate) fn set_parent_vertex(&mut self, id: ElementId, parent: VertexId) {
        self.parents[id as usize] = parent;
    }

    /// Rewrites every triangle reference through `remap` (element -> element).
    pub(crate) fn remap_triangle_elements(&mut self, remap: &[ElementId]) {
        for tri in self.triangles.iter_mut().flatten() {
            for element in tri.iter_mut() {
                *element = remap[*element as usize];
            }
        }
    }

    /// Drops unreferenced elements and rewrites parents through `vertex_remap`.
    pub(crate) fn compact(&mut self, vertex_remap: &[VertexId]) {
        let mut used = vec![false; self.elements.len()];
        for tri in self.triangles.iter().flatten() {
            for &element in tri {
                used[element as usize] = true;
            }
        }

        let mut element_remap = vec![super::INVALID_ID; self.elements.len()];
        let mut elements = Vec::with_capacity(self.elements.len());
        let mut parents = Vec::with_capacity(self.parents.len());
        for (old, &is_used) in used.iter().enumerate() {
            if is_used {
                element_remap[old] = elements.len() as ElementId;
                elements.push(self.elements[old]);
                parents.push(vertex_remap[self.parents[old] as usize]);
            }
        }

        self.elements = elements;
        self.parents = parents;
        self.remap_triangle_elements(&element_remap);
    }
}
