//! Unit-square repacking of existing UV islands.

use glam::{DVec2, Vec2};
use tracing::debug;

use crate::mesh::{ElementId, Mesh};
use crate::ops::bowtie::split_uv_bowties;

use super::uv_islands;

/// Growth factor of the square side between packing trials.
const SIDE_GROWTH: f64 = 1.05;
/// Upper bound on packing trials.
const MAX_TRIALS: usize = 1000;

/// Island bounds in the island's current UV space.
#[derive(Debug, Clone)]
struct IslandBox {
    elements: Vec<ElementId>,
    min: DVec2,
    size: DVec2,
}

/// Rescales and translates the UV islands of layer 0 so that they sit side
/// by side inside the unit square.
///
/// Island proportions are preserved; islands keep a gap of two texels at
/// `target_resolution`. Returns the number of islands, or 0 when there is no
/// UV layer or the gap leaves no room at a very low resolution.
///
/// # Example
///
/// ```rust
/// use grid_meshing::mesh::Mesh;
/// use grid_meshing::ops::uv::{project_planar_uvs, repack_uvs};
/// use glam::DVec3;
///
/// let mut mesh = Mesh::from_indexed(
///     vec![DVec3::ZERO, DVec3::new(3.0, 0.0, 0.0), DVec3::new(3.0, 3.0, 0.0)],
///     &[[0, 1, 2]],
/// );
/// project_planar_uvs(&mut mesh);
/// assert_eq!(repack_uvs(&mut mesh, 512), 1);
/// let uvs = mesh.uv_layer(0).unwrap();
/// assert!(uvs.elements().iter().all(|uv| uv.min_element() >= 0.0 && uv.max_element() <= 1.0));
/// ```
pub fn repack_uvs(mesh: &mut Mesh, target_resolution: u32) -> usize {
    if mesh.uv_layer(0).is_none() {
        return 0;
    }
    split_uv_bowties(mesh, 0);
    let islands = uv_islands(mesh, 0);
    let Some(uvs) = mesh.uv_layer(0) else {
        return 0;
    };

    let boxes: Vec<IslandBox> = islands
        .iter()
        .map(|triangles| {
            let mut elements: Vec<ElementId> = triangles.iter().filter_map(|&tid| uvs.triangle(tid)).flatten().collect();
            elements.sort_unstable();
            elements.dedup();
            let mut min = DVec2::splat(f64::INFINITY);
            let mut max = DVec2::splat(f64::NEG_INFINITY);
            for &element in &elements {
                let uv = uvs.element(element).as_dvec2();
                min = min.min(uv);
                max = max.max(uv);
            }
            IslandBox {
                elements,
                min,
                size: (max - min).max(DVec2::ZERO),
            }
        })
        .collect();
    if boxes.is_empty() {
        return 0;
    }

    let gap_texels = 2.0 / f64::from(target_resolution.max(1));
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| boxes[b].size.y.total_cmp(&boxes[a].size.y));

    let area: f64 = boxes.iter().map(|b| b.size.x * b.size.y).sum();
    let widest = boxes.iter().map(|b| b.size.x.max(b.size.y)).fold(0.0, f64::max);
    let mut side = area.sqrt().max(widest).max(f64::MIN_POSITIVE);

    let mut offsets = None;
    for _ in 0..MAX_TRIALS {
        if let Some(found) = try_square(&boxes, &order, side, gap_texels * side) {
            offsets = Some(found);
            break;
        }
        side *= SIDE_GROWTH;
    }
    let Some(offsets) = offsets else {
        debug!("UV repack found no square for {} islands", boxes.len());
        return 0;
    };

    if let Some(uvs) = mesh.uv_layer_mut(0) {
        for (island, offset) in boxes.iter().zip(offsets) {
            for &element in &island.elements {
                let uv = uvs.element(element).as_dvec2();
                let packed = (uv - island.min + offset) / side;
                uvs.set_element(element, packed.as_vec2().clamp(Vec2::ZERO, Vec2::ONE));
            }
        }
    }
    debug!("Repacked {} UV islands", boxes.len());
    boxes.len()
}

/// Shelf placement in a square of the given side, or `None` when it does
/// not fit.
fn try_square(boxes: &[IslandBox], order: &[usize], side: f64, gap: f64) -> Option<Vec<DVec2>> {
    let mut offsets = vec![DVec2::ZERO; boxes.len()];
    let (mut x, mut y) = (gap, gap);
    let mut row_height = 0.0;
    for &index in order {
        let size = boxes[index].size;
        if x + size.x + gap > side && x > gap {
            y += row_height + gap;
            x = gap;
            row_height = 0.0;
        }
        if x + size.x + gap > side || y + size.y + gap > side {
            return None;
        }
        offsets[index] = DVec2::new(x, y);
        x += size.x + gap;
        row_height = f64::max(row_height, size.y);
    }
    Some(offsets)
}
