//! Boundary loops of face groups.
//!
//! A group's boundary consists of the directed triangle edges whose opposite
//! side is not in the same group. Every boundary edge carries a label naming
//! what lies across it: another group, the open mesh boundary, or a
//! non-manifold fin.

use hashbrown::HashMap;

use crate::error::TopologyError;
use crate::mesh::{EdgeTopology, GroupId, Mesh, TriangleId, VertexId};

/// Label of a boundary edge on the open mesh boundary.
pub(crate) const OPEN_BOUNDARY: u32 = u32::MAX;
/// Label of a boundary edge shared by three or more triangles.
pub(crate) const NON_MANIFOLD: u32 = u32::MAX - 1;

/// Directed boundary edge of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BoundaryEdge {
    pub from: VertexId,
    pub to: VertexId,
    /// Group across the edge, [`OPEN_BOUNDARY`] or [`NON_MANIFOLD`].
    pub label: u32,
}

/// Boundary edges of one group, in triangle order.
pub(crate) fn group_boundary(
    mesh: &Mesh,
    topology: &EdgeTopology,
    group: GroupId,
    triangles: &[TriangleId],
) -> Vec<BoundaryEdge> {
    let mut boundary = Vec::new();
    for &tid in triangles {
        let tri = mesh.triangle(tid);
        for (k, eid) in topology.triangle_edges(tid).into_iter().enumerate() {
            let edge = topology.edge(eid);
            let label = match edge.triangles.len() {
                1 => OPEN_BOUNDARY,
                2 => match topology.opposite_triangle(eid, tid) {
                    Some(other) if mesh.triangle_group(other) == group => continue,
                    Some(other) => mesh.triangle_group(other),
                    None => NON_MANIFOLD,
                },
                _ => NON_MANIFOLD,
            };
            let (from, to) = tri.directed_edge(k);
            boundary.push(BoundaryEdge { from, to, label });
        }
    }
    boundary
}

/// Closed boundary loop. `labels[i]` belongs to the edge from `vertices[i]`
/// to `vertices[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundaryLoop {
    pub vertices: Vec<VertexId>,
    pub labels: Vec<u32>,
}

/// Chains the boundary edges of `group` into one loop.
///
/// Fails with [`TopologyError::MultipleBoundaryLoops`] when a vertex has two
/// outgoing boundary edges, the chain does not close, or edges are left over,
/// and with [`TopologyError::DegenerateFace`] when fewer than three edges
/// remain.
pub(crate) fn trace_loop(group: GroupId, boundary: &[BoundaryEdge]) -> Result<BoundaryLoop, TopologyError> {
    if boundary.len() < 3 {
        return Err(TopologyError::DegenerateFace { group });
    }

    let mut outgoing: HashMap<VertexId, usize> = HashMap::with_capacity(boundary.len());
    for (index, edge) in boundary.iter().enumerate() {
        if outgoing.insert(edge.from, index).is_some() {
            return Err(TopologyError::MultipleBoundaryLoops { group });
        }
    }

    let start = boundary[0].from;
    let mut vertices = Vec::with_capacity(boundary.len());
    let mut labels = Vec::with_capacity(boundary.len());
    let mut current = 0;
    loop {
        let edge = boundary[current];
        vertices.push(edge.from);
        labels.push(edge.label);
        if edge.to == start {
            break;
        }
        if vertices.len() >= boundary.len() {
            return Err(TopologyError::MultipleBoundaryLoops { group });
        }
        current = *outgoing
            .get(&edge.to)
            .ok_or(TopologyError::MultipleBoundaryLoops { group })?;
    }

    if vertices.len() != boundary.len() {
        return Err(TopologyError::MultipleBoundaryLoops { group });
    }
    Ok(BoundaryLoop { vertices, labels })
}

/// Drops loop vertices that sit on a straight span between the same two
/// regions.
///
/// A vertex goes when it is not pinned, both adjacent edges carry the same
/// label, every triangle around it belongs to `group` or that label, and the
/// loop turns by less than the angle whose cosine is `min_dot` there. The
/// test only looks at original neighbours, so the group on the other side of
/// the span reaches the same decision.
pub(crate) fn simplify_loop(
    mesh: &Mesh,
    group: GroupId,
    boundary_loop: &BoundaryLoop,
    vertex_groups: &[Vec<GroupId>],
    pinned: &[bool],
    min_dot: f64,
) -> Vec<VertexId> {
    let vertices = &boundary_loop.vertices;
    let labels = &boundary_loop.labels;
    let n = vertices.len();

    (0..n)
        .filter(|&i| {
            let v = vertices[i];
            let (prev, next) = (vertices[(i + n - 1) % n], vertices[(i + 1) % n]);
            let (label_in, label_out) = (labels[(i + n - 1) % n], labels[i]);
            if pinned[v as usize] || label_in != label_out || label_in == NON_MANIFOLD {
                return true;
            }
            let foreign = vertex_groups[v as usize]
                .iter()
                .any(|&g| g != group && g != label_in);
            if foreign {
                return true;
            }
            let d_in = (mesh.position(v) - mesh.position(prev)).normalize_or_zero();
            let d_out = (mesh.position(next) - mesh.position(v)).normalize_or_zero();
            d_in.dot(d_out) <= min_dot
        })
        .map(|i| vertices[i])
        .collect()
}

/// Sorted, deduplicated groups around every vertex.
pub(crate) fn vertex_groups(mesh: &Mesh) -> Vec<Vec<GroupId>> {
    let mut groups: Vec<Vec<GroupId>> = vec![Vec::new(); mesh.vertex_count()];
    for tri in mesh.triangles() {
        for vid in tri.vertices {
            let list = &mut groups[vid as usize];
            if let Err(slot) = list.binary_search(&tri.group) {
                list.insert(slot, tri.group);
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::flat_grid;

    #[test]
    fn test_single_group_loop() {
        let mesh = flat_grid(2, 1, 1.0);
        let topology = EdgeTopology::build(&mesh);
        let tris: Vec<_> = mesh.triangle_ids().collect();
        let boundary = group_boundary(&mesh, &topology, 0, &tris);
        assert_eq!(boundary.len(), 6);
        assert!(boundary.iter().all(|e| e.label == OPEN_BOUNDARY));

        let lp = trace_loop(0, &boundary).unwrap();
        assert_eq!(lp.vertices.len(), 6);

        let pinned = vec![false; mesh.vertex_count()];
        let simplified = simplify_loop(&mesh, 0, &lp, &vertex_groups(&mesh), &pinned, 2.0f64.to_radians().cos());
        assert_eq!(simplified.len(), 4);
    }

    #[test]
    fn test_pinned_vertex_is_kept() {
        let mesh = flat_grid(2, 1, 1.0);
        let topology = EdgeTopology::build(&mesh);
        let tris: Vec<_> = mesh.triangle_ids().collect();
        let lp = trace_loop(0, &group_boundary(&mesh, &topology, 0, &tris)).unwrap();

        let mut pinned = vec![false; mesh.vertex_count()];
        pinned[1] = true;
        let simplified = simplify_loop(&mesh, 0, &lp, &vertex_groups(&mesh), &pinned, 2.0f64.to_radians().cos());
        assert_eq!(simplified.len(), 5);
        assert!(simplified.contains(&1));
    }

    #[test]
    fn test_hole_gives_multiple_loops() {
        // 3x3 grid with the middle quad removed.
        let mut mesh = flat_grid(3, 3, 1.0);
        mesh.remove_triangles(&[8, 9]);
        let topology = EdgeTopology::build(&mesh);
        let tris: Vec<_> = mesh.triangle_ids().collect();
        let boundary = group_boundary(&mesh, &topology, 0, &tris);
        assert_eq!(
            trace_loop(0, &boundary),
            Err(TopologyError::MultipleBoundaryLoops { group: 0 })
        );
    }

    #[test]
    fn test_too_few_edges_is_degenerate() {
        assert_eq!(trace_loop(4, &[]), Err(TopologyError::DegenerateFace { group: 4 }));
    }

    #[test]
    fn test_labels_name_neighbor_group() {
        let mut mesh = flat_grid(2, 1, 1.0);
        mesh.set_triangle_group(2, 1);
        mesh.set_triangle_group(3, 1);
        let topology = EdgeTopology::build(&mesh);
        let boundary = group_boundary(&mesh, &topology, 0, &[0, 1]);
        assert_eq!(boundary.iter().filter(|e| e.label == 1).count(), 1);
        assert_eq!(boundary.len(), 4);
    }
}
