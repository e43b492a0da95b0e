//! Planar UV projection per seed-normal region.

use glam::DVec3;
use hashbrown::HashMap;
use tracing::debug;

use config::constants::COPLANAR_ANGLE_TOLERANCE_DEG;

use crate::frame::Frame3;
use crate::mesh::{ElementId, Mesh, VertexId};
use crate::ops::polygroups::{find_polygroups, PolygroupParams};

/// Replaces UV layer 0 with a planar projection of every region.
///
/// Regions come from a fresh polygroup pass at 2° that respects hard normal
/// seams. Each region is projected onto the plane through the center of its
/// world bounding box, oriented along its area-weighted normal. Vertices
/// shared between regions get one UV element per region. Returns the number
/// of regions.
///
/// # Example
///
/// ```rust
/// use grid_meshing::mesh::Mesh;
/// use grid_meshing::ops::uv::project_planar_uvs;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::from_indexed(
///     vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
///     &[[0, 1, 2], [0, 2, 3]],
/// );
/// assert_eq!(project_planar_uvs(&mut mesh), 1);
/// assert_eq!(mesh.uv_layer(0).unwrap().element_count(), 4);
/// ```
pub fn project_planar_uvs(mesh: &mut Mesh) -> usize {
    let params = PolygroupParams::default()
        .with_angle_deg(COPLANAR_ANGLE_TOLERANCE_DEG)
        .with_respect_hard_normals(true);
    let regions = find_polygroups(mesh, &params);

    let frames: Vec<Frame3> = regions
        .iter()
        .map(|region| {
            let mut normal = DVec3::ZERO;
            let mut min = DVec3::splat(f64::INFINITY);
            let mut max = DVec3::splat(f64::NEG_INFINITY);
            for &tid in region {
                let [a, b, c] = mesh.triangle_positions(tid);
                normal += (b - a).cross(c - a);
                for p in [a, b, c] {
                    min = min.min(p);
                    max = max.max(p);
                }
            }
            Frame3::from_normal((min + max) * 0.5, normal)
        })
        .collect();

    mesh.enable_uv_layers(1);
    let triangles = mesh.triangles().to_vec();
    let positions = mesh.positions().to_vec();
    let Some(uvs) = mesh.uv_layer_mut(0) else {
        return 0;
    };
    uvs.clear_elements();

    for (region, frame) in regions.iter().zip(&frames) {
        let mut elements: HashMap<VertexId, ElementId> = HashMap::new();
        for &tid in region {
            let triple = triangles[tid as usize].vertices.map(|vid| {
                *elements.entry(vid).or_insert_with(|| {
                    let uv = frame.to_plane_uv(positions[vid as usize]).as_vec2();
                    uvs.append_element(uv, vid)
                })
            });
            uvs.set_triangle(tid, Some(triple));
        }
    }

    debug!("Projected planar UVs for {} regions", regions.len());
    regions.len()
}
