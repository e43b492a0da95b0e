//! # Edge Topology
//!
//! Undirected edge table built from triangle corners.
//!
//! Edges are created in triangle order, corner order `(a,b)`, `(b,c)`, `(c,a)`,
//! so edge ids are deterministic for a given mesh. An edge carries every
//! triangle that uses it; only edges with exactly two triangles produce
//! adjacency, so non-manifold interfaces (three or more triangles) split
//! connected regions.

use hashbrown::HashMap;

use super::{EdgeId, Mesh, TriangleId, VertexId};

/// Undirected mesh edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Endpoints, smaller id first.
    pub vertices: [VertexId; 2],
    /// Triangles using this edge, in triangle order.
    pub triangles: Vec<TriangleId>,
}

impl Edge {
    /// Edge used by exactly one triangle.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.triangles.len() == 1
    }

    /// The two triangles of a manifold edge.
    #[inline]
    pub fn manifold_pair(&self) -> Option<(TriangleId, TriangleId)> {
        match self.triangles.as_slice() {
            &[a, b] => Some((a, b)),
            _ => None,
        }
    }
}

/// Edge table with per-triangle edge ids.
#[derive(Debug, Clone, Default)]
pub struct EdgeTopology {
    edges: Vec<Edge>,
    triangle_edges: Vec<[EdgeId; 3]>,
    lookup: HashMap<(VertexId, VertexId), EdgeId>,
}

#[inline]
fn edge_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl EdgeTopology {
    /// Builds the edge table for `mesh`.
    pub fn build(mesh: &Mesh) -> Self {
        let mut topology = Self {
            edges: Vec::with_capacity(mesh.triangle_count() * 3 / 2),
            triangle_edges: Vec::with_capacity(mesh.triangle_count()),
            lookup: HashMap::with_capacity(mesh.triangle_count() * 3 / 2),
        };

        for tid in mesh.triangle_ids() {
            let tri = mesh.triangle(tid);
            let mut ids = [0; 3];
            for (k, id) in ids.iter_mut().enumerate() {
                let (a, b) = tri.directed_edge(k);
                let key = edge_key(a, b);
                let edges = &mut topology.edges;
                let eid = *topology.lookup.entry(key).or_insert_with(|| {
                    edges.push(Edge {
                        vertices: [key.0, key.1],
                        triangles: Vec::with_capacity(2),
                    });
                    (edges.len() - 1) as EdgeId
                });
                topology.edges[eid as usize].triangles.push(tid);
                *id = eid;
            }
            topology.triangle_edges.push(ids);
        }

        topology
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// One edge.
    #[inline]
    pub fn edge(&self, eid: EdgeId) -> &Edge {
        &self.edges[eid as usize]
    }

    /// Edge ids of a triangle; entry `k` is the edge from corner `k` to `k + 1`.
    #[inline]
    pub fn triangle_edges(&self, tid: TriangleId) -> [EdgeId; 3] {
        self.triangle_edges[tid as usize]
    }

    /// Edge between two vertices, if any triangle uses it.
    #[inline]
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.lookup.get(&edge_key(a, b)).copied()
    }

    /// Triangle across a manifold edge from `tid`.
    #[inline]
    pub fn opposite_triangle(&self, eid: EdgeId, tid: TriangleId) -> Option<TriangleId> {
        let (a, b) = self.edge(eid).manifold_pair()?;
        if a == tid {
            Some(b)
        } else if b == tid {
            Some(a)
        } else {
            None
        }
    }

    /// Manifold neighbours of a triangle, paired with the shared edge id.
    pub fn triangle_neighbors(&self, tid: TriangleId) -> impl Iterator<Item = (EdgeId, TriangleId)> + '_ {
        self.triangle_edges(tid)
            .into_iter()
            .filter_map(move |eid| self.opposite_triangle(eid, tid).map(|nbr| (eid, nbr)))
    }
}

/// Triangles incident to each vertex, in triangle order.
pub fn vertex_triangles(mesh: &Mesh) -> Vec<Vec<TriangleId>> {
    let mut incident = vec![Vec::new(); mesh.vertex_count()];
    for tid in mesh.triangle_ids() {
        for vid in mesh.triangle(tid).vertices {
            incident[vid as usize].push(tid);
        }
    }
    incident
}
