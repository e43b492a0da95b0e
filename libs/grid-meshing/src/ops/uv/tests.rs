//! Tests for UV projection and packing.

use super::*;
use crate::testing::{flat_grid, rectangle, unit_cube};
use approx::assert_relative_eq;
use glam::DVec3;
use proptest::prelude::*;

fn uv_bounds(mesh: &Mesh) -> (Vec2, Vec2) {
    let uvs = mesh.uv_layer(0).unwrap();
    uvs.elements()
        .iter()
        .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), &uv| (lo.min(uv), hi.max(uv)))
}

#[test]
fn test_reset_uvs_shares_zero_per_vertex() {
    let mut mesh = flat_grid(2, 2, 1.0);
    reset_uvs(&mut mesh);
    let uvs = mesh.uv_layer(0).unwrap();
    assert_eq!(uvs.element_count(), mesh.vertex_count());
    assert!(uvs.elements().iter().all(|&uv| uv == Vec2::ZERO));
    for tid in mesh.triangle_ids() {
        assert_eq!(uvs.triangle(tid), Some(mesh.triangle(tid).vertices));
    }
}

#[test]
fn test_projection_matches_world_scale() {
    let mut mesh = rectangle(4.0, 2.0);
    assert_eq!(project_planar_uvs(&mut mesh), 1);
    let (lo, hi) = uv_bounds(&mesh);
    assert_relative_eq!(hi.x - lo.x, 4.0, epsilon = 1e-5);
    assert_relative_eq!(hi.y - lo.y, 2.0, epsilon = 1e-5);
    // The frame sits at the box center.
    assert_relative_eq!(lo.x + hi.x, 0.0, epsilon = 1e-5);
}

#[test]
fn test_cube_projects_to_six_islands() {
    let mut mesh = unit_cube(DVec3::ZERO);
    assert_eq!(project_planar_uvs(&mut mesh), 6);
    assert_eq!(mesh.uv_layer(0).unwrap().element_count(), 24);
    assert_eq!(uv_islands(&mesh, 0).len(), 6);
}

#[test]
fn test_islands_of_missing_layer() {
    let mesh = flat_grid(1, 1, 1.0);
    assert!(uv_islands(&mesh, 0).is_empty());
}

#[test]
fn test_pack_without_uvs_is_a_no_op() {
    let mut mesh = rectangle(1.0, 1.0);
    let before = mesh.clone();
    assert_eq!(pack_pixel_layout(&mut mesh, DVec3::ONE, 4, 1), None);
    assert_eq!(mesh, before);
}

#[test]
fn test_wide_face_footprint() {
    let mut mesh = rectangle(100.0, 50.0);
    project_planar_uvs(&mut mesh);
    assert_eq!(pack_pixel_layout(&mut mesh, DVec3::splat(50.0), 4, 1), Some(16));

    // 8x4 pixels at (1, 1) in a 16 pixel atlas.
    let (lo, hi) = uv_bounds(&mesh);
    assert_relative_eq!(lo.x, 1.0 / 16.0, epsilon = 1e-6);
    assert_relative_eq!(lo.y, 1.0 / 16.0, epsilon = 1e-6);
    assert_relative_eq!(hi.x, 9.0 / 16.0, epsilon = 1e-6);
    assert_relative_eq!(hi.y, 5.0 / 16.0, epsilon = 1e-6);
}

#[test]
fn test_cube_atlas_dimension() {
    let mut mesh = unit_cube(DVec3::ZERO);
    project_planar_uvs(&mut mesh);
    assert_eq!(pack_pixel_layout(&mut mesh, DVec3::ONE, 4, 1), Some(32));
    let (lo, hi) = uv_bounds(&mesh);
    assert!(lo.min_element() >= 0.0);
    assert!(hi.max_element() <= 1.0);
}

#[test]
fn test_smallest_cell_axis_sets_pixel_size() {
    let mut mesh = rectangle(100.0, 50.0);
    project_planar_uvs(&mut mesh);
    // 25 / 4 world units per pixel: 16x8 island, bordered area 180.
    assert_eq!(pack_pixel_layout(&mut mesh, DVec3::new(50.0, 25.0, 50.0), 4, 1), Some(32));
}

#[test]
fn test_mirrored_cell_axis_still_packs() {
    let mut mesh = rectangle(100.0, 50.0);
    project_planar_uvs(&mut mesh);
    assert_eq!(pack_pixel_layout(&mut mesh, DVec3::new(-50.0, 50.0, 50.0), 4, 1), Some(16));
}

#[test]
fn test_failed_pack_leaves_uvs() {
    let mut mesh = rectangle(100_000.0, 1.0);
    project_planar_uvs(&mut mesh);
    let before = mesh.clone();
    assert_eq!(pack_pixel_layout(&mut mesh, DVec3::ONE, 4, 1), None);
    assert_eq!(mesh, before);
}

#[test]
fn test_repack_fits_unit_square() {
    let mut mesh = unit_cube(DVec3::ZERO);
    project_planar_uvs(&mut mesh);
    assert_eq!(repack_uvs(&mut mesh, 512), 6);

    let uvs = mesh.uv_layer(0).unwrap();
    let boxes: Vec<(Vec2, Vec2)> = uv_islands(&mesh, 0)
        .iter()
        .map(|island| {
            island
                .iter()
                .flat_map(|&tid| uvs.triangle_values(tid).unwrap())
                .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), uv| (lo.min(uv), hi.max(uv)))
        })
        .collect();
    for (i, a) in boxes.iter().enumerate() {
        assert!(a.0.min_element() >= 0.0 && a.1.max_element() <= 1.0);
        for b in &boxes[i + 1..] {
            let overlap = a.0.x < b.1.x - 1e-6 && b.0.x < a.1.x - 1e-6 && a.0.y < b.1.y - 1e-6 && b.0.y < a.1.y - 1e-6;
            assert!(!overlap);
        }
    }
}

#[test]
fn test_repack_without_uvs() {
    let mut mesh = rectangle(1.0, 1.0);
    assert_eq!(repack_uvs(&mut mesh, 512), 0);
    assert_eq!(mesh.uv_layer_count(), 0);
}

proptest! {
    #[test]
    fn shelf_layout_has_no_overlap(
        sizes in prop::collection::vec((1u32..64, 1u32..64), 1..40),
        border in 0u32..4,
    ) {
        if let Some(layout) = shelf_pack(&sizes, border) {
            let d = layout.dimension;
            prop_assert!(d.is_power_of_two() && (8..=4096).contains(&d));
            prop_assert_eq!(layout.rects.len(), sizes.len());

            let b = i64::from(border);
            for (rect, &(w, h)) in layout.rects.iter().zip(&sizes) {
                prop_assert_eq!((rect.width, rect.height), (w, h));
                prop_assert!(rect.x + rect.width <= d);
                prop_assert!(rect.y + rect.height <= d);
            }
            for (i, a) in layout.rects.iter().enumerate() {
                for c in &layout.rects[i + 1..] {
                    let (ax0, ay0) = (i64::from(a.x) - b, i64::from(a.y) - b);
                    let (ax1, ay1) = (i64::from(a.x + a.width) + b, i64::from(a.y + a.height) + b);
                    let (cx0, cy0) = (i64::from(c.x) - b, i64::from(c.y) - b);
                    let (cx1, cy1) = (i64::from(c.x + c.width) + b, i64::from(c.y + c.height) + b);
                    prop_assert!(!(ax0 < cx1 && cx0 < ax1 && ay0 < cy1 && cy0 < ay1));
                }
            }
        }
    }
}
