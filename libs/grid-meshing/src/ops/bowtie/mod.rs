//! # Bowtie Splitting
//!
//! A bowtie vertex is shared by two or more triangle fans that are not
//! connected through edges around it. Splitting gives every fan after the
//! first its own vertex (or overlay element), so later passes see a manifold
//! neighbourhood.

use hashbrown::HashMap;
use tracing::debug;

use crate::mesh::{vertex_triangles, EdgeId, EdgeTopology, ElementId, Mesh, Overlay, TriangleId, VertexId};
use crate::ops::UnionFind;

/// Groups the triangles around `vid` into fans linked through edges incident
/// to `vid` for which `linked` holds. Fans are ordered by their first member.
fn fan_components<F>(topology: &EdgeTopology, vid: VertexId, tris: &[TriangleId], linked: F) -> Vec<Vec<TriangleId>>
where
    F: Fn(EdgeId, TriangleId, TriangleId) -> bool,
{
    let mut fans = UnionFind::new(tris.len());
    for (i, &tid) in tris.iter().enumerate() {
        for (eid, other) in topology.triangle_neighbors(tid) {
            if !topology.edge(eid).vertices.contains(&vid) || !linked(eid, tid, other) {
                continue;
            }
            if let Some(j) = tris.iter().position(|&t| t == other) {
                fans.union(i as u32, j as u32);
            }
        }
    }

    let mut slot_of_root: HashMap<u32, usize> = HashMap::new();
    let mut components: Vec<Vec<TriangleId>> = Vec::new();
    for (i, &tid) in tris.iter().enumerate() {
        let root = fans.find(i as u32);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(tid);
    }
    components
}

/// Splits bowtie vertices. Returns the number of vertices created.
///
/// Overlay elements at a moved corner are duplicated onto the new vertex, so
/// no element is shared between two fans afterwards.
pub fn split_bowties(mesh: &mut Mesh) -> usize {
    let topology = EdgeTopology::build(mesh);
    let incident = vertex_triangles(mesh);

    let mut moves: Vec<(VertexId, Vec<TriangleId>)> = Vec::new();
    for (vid, tris) in incident.iter().enumerate() {
        if tris.len() < 2 {
            continue;
        }
        let fans = fan_components(&topology, vid as VertexId, tris, |_, _, _| true);
        moves.extend(fans.into_iter().skip(1).map(|fan| (vid as VertexId, fan)));
    }

    for (vid, fan) in &moves {
        let new_vid = mesh.append_vertex(mesh.position(*vid));
        let corners: Vec<(TriangleId, usize)> = fan
            .iter()
            .filter_map(|&tid| mesh.triangle(tid).corner_of(*vid).map(|c| (tid, c)))
            .collect();

        for &(tid, corner) in &corners {
            let mut vertices = mesh.triangle(tid).vertices;
            vertices[corner] = new_vid;
            mesh.set_triangle_vertices(tid, vertices);
        }

        let (normals, uv_layers, colors) = mesh.overlays_mut();
        if let Some(overlay) = normals {
            move_corners(overlay, &corners, new_vid);
        }
        for overlay in uv_layers {
            move_corners(overlay, &corners, new_vid);
        }
        if let Some(overlay) = colors {
            move_corners(overlay, &corners, new_vid);
        }
    }

    if !moves.is_empty() {
        debug!("Split {} bowtie fans", moves.len());
    }
    moves.len()
}

/// Points the given corners at fresh copies of their elements owned by `vid`.
fn move_corners<T: Copy>(overlay: &mut Overlay<T>, corners: &[(TriangleId, usize)], vid: VertexId) {
    let mut copies: HashMap<ElementId, ElementId> = HashMap::new();
    for &(tid, corner) in corners {
        let Some(mut tri) = overlay.triangle(tid) else {
            continue;
        };
        let old = tri[corner];
        let new = match copies.get(&old) {
            Some(&copy) => copy,
            None => {
                let value = overlay.element(old);
                let copy = overlay.append_element(value, vid);
                copies.insert(old, copy);
                copy
            }
        };
        tri[corner] = new;
        overlay.set_triangle(tid, Some(tri));
    }
}

/// Splits overlay elements shared by fans that are not connected through
/// the overlay. Returns the number of elements created.
pub fn split_overlay_bowties<T: Copy>(mesh: &Mesh, overlay: &mut Overlay<T>) -> usize {
    let topology = EdgeTopology::build(mesh);
    let incident = vertex_triangles(mesh);

    let mut created = 0;
    for (vid, tris) in incident.iter().enumerate() {
        let vid = vid as VertexId;
        let set: Vec<TriangleId> = tris.iter().copied().filter(|&t| overlay.is_set_triangle(t)).collect();
        if set.len() < 2 {
            continue;
        }
        let fans = {
            let view: &Overlay<T> = overlay;
            fan_components(&topology, vid, &set, |eid, a, b| {
                view.element_at_vertex(mesh, a, vid) == view.element_at_vertex(mesh, b, vid)
                    && !view.is_seam_edge(mesh, topology.edge(eid))
            })
        };

        let mut seen: Vec<ElementId> = Vec::new();
        for fan in fans {
            let Some(element) = overlay.element_at_vertex(mesh, fan[0], vid) else {
                continue;
            };
            if !seen.contains(&element) {
                seen.push(element);
                continue;
            }
            let value = overlay.element(element);
            let copy = overlay.append_element(value, vid);
            created += 1;
            for tid in fan {
                let (Some(corner), Some(mut tri)) = (mesh.triangle(tid).corner_of(vid), overlay.triangle(tid)) else {
                    continue;
                };
                tri[corner] = copy;
                overlay.set_triangle(tid, Some(tri));
            }
        }
    }

    if created > 0 {
        debug!("Split {} overlay bowtie elements", created);
    }
    created
}

/// Splits bowtie elements of UV layer `layer`. Returns the number created.
pub fn split_uv_bowties(mesh: &mut Mesh, layer: usize) -> usize {
    let Some(mut overlay) = mesh.uv_layer(layer).cloned() else {
        return 0;
    };
    let created = split_overlay_bowties(mesh, &mut overlay);
    if let Some(target) = mesh.uv_layer_mut(layer) {
        *target = overlay;
    }
    created
}
