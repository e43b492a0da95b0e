//! Pixel-exact UV atlas packing.
//!
//! Every UV island is unwrapped flat at a fixed world size per pixel, so one
//! grid cell always covers the same number of texels. Islands are rounded up
//! to whole pixels and shelf-packed into the smallest power-of-two square
//! atlas that holds them.

use std::f64::consts::FRAC_PI_2;

use glam::{DVec2, DVec3};
use tracing::{debug, info};

use config::constants::{
    clamp_dimension_pixels, clamp_island_border, ASPECT_EPSILON, MAX_ATLAS_DIMENSION, MIN_ATLAS_DIMENSION,
    PIXEL_ROUNDING_EPSILON,
};

use crate::frame::Frame3;
use crate::mesh::{Mesh, TriangleId};
use crate::ops::bowtie::split_uv_bowties;

use super::uv_islands;

/// Pixel rectangle allocated to one island, excluding its border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: u32,
    /// Bottom edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Result of [`shelf_pack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfLayout {
    /// Side length of the square atlas, a power of two.
    pub dimension: u32,
    /// One rectangle per input size, in input order.
    pub rects: Vec<PixelRect>,
}

/// Shelf-packs `(width, height)` pixel sizes into a square power-of-two atlas.
///
/// Sizes are placed tallest first (ties keep input order) in rows starting
/// at `(border, border)`; each island is separated from its neighbours by
/// `2 * border` pixels. The first trial dimension is the smallest power of
/// two in `[8, 4096]` greater than the square root of the bordered area; it
/// doubles until the layout fits. Returns `None` for an empty input or when
/// even a 4096 atlas overflows.
///
/// # Example
///
/// ```rust
/// use grid_meshing::ops::uv::shelf_pack;
///
/// let layout = shelf_pack(&[(8, 4)], 1).unwrap();
/// assert_eq!(layout.dimension, 16);
/// assert_eq!((layout.rects[0].x, layout.rects[0].y), (1, 1));
/// ```
pub fn shelf_pack(sizes: &[(u32, u32)], border: u32) -> Option<ShelfLayout> {
    if sizes.is_empty() {
        return None;
    }

    let padding = 2 * u64::from(border);
    let area: u64 = sizes
        .iter()
        .map(|&(w, h)| (u64::from(w) + padding) * (u64::from(h) + padding))
        .sum();
    let side = (area as f64).sqrt();
    let mut dimension = MIN_ATLAS_DIMENSION;
    while f64::from(dimension) <= side {
        dimension *= 2;
        if dimension > MAX_ATLAS_DIMENSION {
            debug!("UV islands need more than {} pixels per side", MAX_ATLAS_DIMENSION);
            return None;
        }
    }

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| sizes[b].1.cmp(&sizes[a].1));

    loop {
        if let Some(rects) = try_shelves(sizes, &order, border, dimension) {
            return Some(ShelfLayout { dimension, rects });
        }
        debug!("UV islands overflow a {}x{} atlas", dimension, dimension);
        dimension *= 2;
        if dimension > MAX_ATLAS_DIMENSION {
            return None;
        }
    }
}

/// One packing trial at a fixed dimension.
fn try_shelves(sizes: &[(u32, u32)], order: &[usize], border: u32, dimension: u32) -> Option<Vec<PixelRect>> {
    let dim = u64::from(dimension);
    let padding = 2 * u64::from(border);
    let mut rects = vec![PixelRect::default(); sizes.len()];

    let (mut x, mut y) = (u64::from(border), u64::from(border));
    let mut row_height = u64::from(sizes[order[0]].1);
    let mut max_y = 0;

    for &index in order {
        let (w, h) = (u64::from(sizes[index].0), u64::from(sizes[index].1));
        if x + w + padding >= dim {
            y += row_height + padding;
            row_height = h;
            x = 0;
        }
        if x + w >= dim {
            return None;
        }
        max_y = max_y.max(y + h);
        if max_y >= dim {
            return None;
        }
        rects[index] = PixelRect {
            x: x as u32,
            y: y as u32,
            width: w as u32,
            height: h as u32,
        };
        x += w + padding;
    }
    Some(rects)
}

/// One island during packing.
#[derive(Debug, Clone)]
struct IslandBin {
    triangles: Vec<TriangleId>,
    frame: Frame3,
    min: DVec2,
    width: u32,
    height: u32,
}

impl IslandBin {
    fn new(mesh: &Mesh, triangles: Vec<TriangleId>, world_per_pixel: f64) -> Self {
        let normal = triangles
            .iter()
            .fold(DVec3::ZERO, |acc, &tid| acc + mesh.triangle_normal(tid));
        let origin = triangles
            .first()
            .map_or(DVec3::ZERO, |&tid| mesh.position(mesh.triangle(tid).vertices[0]));
        let mut frame = Frame3::from_normal(origin, normal);

        let (mut min, mut max) = plane_bounds(mesh, &triangles, &frame);
        let size = max - min;
        if size.y > size.x + ASPECT_EPSILON {
            frame.rotate_about_z(FRAC_PI_2);
            (min, max) = plane_bounds(mesh, &triangles, &frame);
        }
        let size = max - min;

        Self {
            triangles,
            frame,
            min,
            width: pixel_extent(size.x, world_per_pixel),
            height: pixel_extent(size.y, world_per_pixel),
        }
    }
}

fn plane_bounds(mesh: &Mesh, triangles: &[TriangleId], frame: &Frame3) -> (DVec2, DVec2) {
    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    for &tid in triangles {
        for p in mesh.triangle_positions(tid) {
            let uv = frame.to_plane_uv(p);
            min = min.min(uv);
            max = max.max(uv);
        }
    }
    if min.x > max.x {
        return (DVec2::ZERO, DVec2::ZERO);
    }
    (min, max)
}

/// Whole pixels covering `extent`; at least one.
#[inline]
fn pixel_extent(extent: f64, world_per_pixel: f64) -> u32 {
    (extent / world_per_pixel - PIXEL_ROUNDING_EPSILON).ceil().max(1.0) as u32
}

/// Lays out the UV islands of layer 0 on a pixel-exact square atlas.
///
/// One pixel covers `min(abs(cell_dims)) / dimension_pixels` world units.
/// `dimension_pixels` is clamped to `[1, 2048]` and `face_pixel_border` to
/// `[0, 64]`. Returns the atlas dimension, or `None` when the mesh has no
/// UV layer, no UV islands, a non-positive cell size, or the islands do not
/// fit a 4096 atlas. UV values are only written on success.
///
/// # Example
///
/// ```rust
/// use grid_meshing::mesh::Mesh;
/// use grid_meshing::ops::uv::{pack_pixel_layout, project_planar_uvs};
/// use glam::DVec3;
///
/// let mut mesh = Mesh::from_indexed(
///     vec![
///         DVec3::ZERO, DVec3::new(100.0, 0.0, 0.0),
///         DVec3::new(100.0, 50.0, 0.0), DVec3::new(0.0, 50.0, 0.0),
///     ],
///     &[[0, 1, 2], [0, 2, 3]],
/// );
/// assert_eq!(pack_pixel_layout(&mut mesh, DVec3::splat(50.0), 4, 1), None);
///
/// project_planar_uvs(&mut mesh);
/// assert_eq!(pack_pixel_layout(&mut mesh, DVec3::splat(50.0), 4, 1), Some(16));
/// ```
pub fn pack_pixel_layout(mesh: &mut Mesh, cell_dims: DVec3, dimension_pixels: u32, face_pixel_border: u32) -> Option<u32> {
    if mesh.uv_layer(0).is_none() {
        debug!("No UV layer to pack");
        return None;
    }
    let dimension_pixels = clamp_dimension_pixels(dimension_pixels);
    let border = clamp_island_border(face_pixel_border);
    let world_per_pixel = cell_dims.abs().min_element() / f64::from(dimension_pixels);
    if !(world_per_pixel.is_finite() && world_per_pixel > 0.0) {
        debug!("Cell dimensions {:?} give no usable pixel size", cell_dims);
        return None;
    }

    split_uv_bowties(mesh, 0);
    let bins: Vec<IslandBin> = uv_islands(mesh, 0)
        .into_iter()
        .map(|triangles| IslandBin::new(mesh, triangles, world_per_pixel))
        .collect();
    let sizes: Vec<(u32, u32)> = bins.iter().map(|bin| (bin.width, bin.height)).collect();
    let layout = shelf_pack(&sizes, border)?;

    let dim = f64::from(layout.dimension);
    let triangles = mesh.triangles().to_vec();
    let positions = mesh.positions().to_vec();
    let uvs = mesh.uv_layer_mut(0)?;
    let mut written = vec![false; uvs.element_count()];

    for (bin, rect) in bins.iter().zip(&layout.rects) {
        let offset = DVec2::new(f64::from(rect.x), f64::from(rect.y));
        for &tid in &bin.triangles {
            let Some(elements) = uvs.triangle(tid) else {
                continue;
            };
            for (element, vid) in elements.into_iter().zip(triangles[tid as usize].vertices) {
                if std::mem::replace(&mut written[element as usize], true) {
                    continue;
                }
                let local = bin.frame.to_plane_uv(positions[vid as usize]) - bin.min;
                let uv = (local / world_per_pixel + offset) / dim;
                uvs.set_element(element, uv.as_vec2());
            }
        }
    }

    info!(
        "Packed {} UV islands into a {}x{} atlas",
        bins.len(),
        layout.dimension,
        layout.dimension
    );
    Some(layout.dimension)
}
