//! Tests for planar retriangulation.

use super::*;
use crate::testing::{flat_grid, rectangle, unit_cube};
use approx::assert_relative_eq;
use glam::Vec2;

fn no_seams() -> RetriangulateParams {
    RetriangulateParams::default()
        .with_preserve_color(false)
        .with_preserve_material(false)
}

fn total_area(mesh: &Mesh) -> f64 {
    mesh.triangle_ids().map(|tid| mesh.triangle_area(tid)).sum()
}

#[test]
fn test_quad_stays_two_triangles_for_either_diagonal() {
    let mut first = rectangle(2.0, 1.0);
    let mut second = Mesh::from_indexed(first.positions().to_vec(), &[[0, 1, 3], [1, 2, 3]]);

    for mesh in [&mut first, &mut second] {
        let report = retriangulate(mesh, &no_seams());
        assert_eq!(report.triangles_after, 2);
        assert!(report.skipped_groups.is_empty());
        assert_relative_eq!(total_area(mesh), 2.0, epsilon = 1e-12);
    }
}

#[test]
fn test_dense_grid_collapses_to_two_triangles() {
    let mut mesh = flat_grid(4, 4, 0.5);
    let report = retriangulate(&mut mesh, &no_seams());
    assert_eq!(report.groups, 1);
    assert_eq!(report.retriangulated_groups, 1);
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.vertex_count(), 4);
    assert_relative_eq!(total_area(&mesh), 4.0, epsilon = 1e-12);
}

#[test]
fn test_concave_outline() {
    // 2x2 grid with the top right quad removed.
    let mut mesh = flat_grid(2, 2, 1.0);
    mesh.remove_triangles(&[6, 7]);
    retriangulate(&mut mesh, &no_seams());
    assert_eq!(mesh.triangle_count(), 4);
    assert_eq!(mesh.vertex_count(), 6);
    assert_relative_eq!(total_area(&mesh), 3.0, epsilon = 1e-12);
    for tid in mesh.triangle_ids() {
        assert!(mesh.triangle_normal(tid).z > 0.99);
    }
}

#[test]
fn test_second_pass_removes_nothing() {
    let mut mesh = flat_grid(4, 3, 1.0);
    mesh.enable_material_ids();
    for tid in 0..12 {
        mesh.set_material_id(tid, 7);
    }
    retriangulate(&mut mesh, &RetriangulateParams::default());
    let first = mesh.triangle_count();
    let report = retriangulate(&mut mesh, &RetriangulateParams::default());
    assert_eq!(report.triangles_after, first);
    assert_eq!(report.retriangulated_groups, 0);
}

#[test]
fn test_material_border_is_preserved() {
    let mut mesh = flat_grid(2, 1, 1.0);
    mesh.enable_material_ids();
    mesh.set_material_id(2, 5);
    mesh.set_material_id(3, 5);

    let mut merged = mesh.clone();
    retriangulate(&mut mesh, &RetriangulateParams::default());
    assert_eq!(mesh.triangle_count(), 4);
    let mut materials = mesh.material_ids().unwrap().to_vec();
    materials.sort_unstable();
    assert_eq!(materials, vec![0, 0, 5, 5]);

    retriangulate(&mut merged, &no_seams());
    assert_eq!(merged.triangle_count(), 2);
    assert_eq!(merged.material_ids().unwrap(), &[0, 0]);
}

#[test]
fn test_shared_span_is_simplified_on_both_sides() {
    // Bottom row and top row carry different materials; the span between
    // them loses its middle vertex in both groups.
    let mut mesh = flat_grid(2, 2, 1.0);
    mesh.enable_material_ids();
    for tid in 0..4 {
        mesh.set_material_id(tid, 1);
    }
    let report = retriangulate(&mut mesh, &RetriangulateParams::default());
    assert_eq!(report.groups, 2);
    assert_eq!(mesh.triangle_count(), 4);
    assert_eq!(mesh.vertex_count(), 6);

    let topology = EdgeTopology::build(&mesh);
    assert_eq!(topology.edge_count(), 9);
    assert_eq!(topology.edges().iter().filter(|e| e.is_boundary()).count(), 6);
}

#[test]
fn test_group_with_hole_is_skipped() {
    let mut mesh = flat_grid(3, 3, 1.0);
    mesh.remove_triangles(&[8, 9]);
    let report = retriangulate(&mut mesh, &no_seams());
    assert_eq!(report.skipped_groups, vec![(0, TopologyError::MultipleBoundaryLoops { group: 0 })]);
    assert_eq!(mesh.triangle_count(), 16);
}

#[test]
fn test_closed_cube_keeps_its_faces() {
    let mut mesh = unit_cube(DVec3::ZERO);
    let report = retriangulate(&mut mesh, &no_seams());
    assert_eq!(report.groups, 6);
    assert_eq!(mesh.triangle_count(), 12);
    assert_eq!(mesh.vertex_count(), 8);
}

#[test]
fn test_group_colors_and_color_seams() {
    let mut mesh = flat_grid(2, 1, 1.0);
    let red = Vec4::new(1.0, 0.0, 0.0, 0.5);
    let blue = Vec4::new(0.0, 0.0, 1.0, 0.5);
    let colors = mesh.enable_colors();
    let reds: Vec<_> = (0..6).map(|v| colors.append_element(red, v)).collect();
    let blues: Vec<_> = (0..6).map(|v| colors.append_element(blue, v)).collect();
    colors.set_triangle(0, Some([reds[0], reds[1], reds[4]]));
    colors.set_triangle(1, Some([reds[0], reds[4], reds[3]]));
    colors.set_triangle(2, Some([blues[1], blues[2], blues[5]]));
    colors.set_triangle(3, Some([blues[1], blues[5], blues[4]]));

    retriangulate(&mut mesh, &RetriangulateParams::default());
    assert_eq!(mesh.triangle_count(), 4);

    let colors = mesh.colors().unwrap();
    assert_eq!(colors.element_count(), 8);
    for tid in mesh.triangle_ids() {
        let values = colors.triangle_values(tid).unwrap();
        let expected = if mesh.triangle_centroid(tid).x < 1.0 { red } else { blue };
        for value in values {
            assert_eq!(value, expected.truncate().extend(1.0));
        }
    }
}

#[test]
fn test_uvs_follow_their_vertices() {
    let mut mesh = flat_grid(2, 1, 1.0);
    mesh.enable_uv_layers(1);
    let positions = mesh.positions().to_vec();
    let uvs = mesh.uv_layer_mut(0).unwrap();
    for (vid, p) in positions.iter().enumerate() {
        uvs.append_element(Vec2::new(p.x as f32, p.y as f32), vid as VertexId);
    }
    for tid in 0..4 {
        let tri = mesh.triangle(tid).vertices;
        mesh.uv_layer_mut(0).unwrap().set_triangle(tid, Some(tri));
    }

    retriangulate(&mut mesh, &no_seams().with_preserve_uv(true));
    assert_eq!(mesh.triangle_count(), 2);
    let uvs = mesh.uv_layer(0).unwrap();
    for tid in mesh.triangle_ids() {
        let values = uvs.triangle_values(tid).unwrap();
        for (value, vid) in values.iter().zip(mesh.triangle(tid).vertices) {
            let p = mesh.position(vid);
            assert_eq!(*value, Vec2::new(p.x as f32, p.y as f32));
        }
    }
}

#[test]
fn test_normals_are_recomputed() {
    let mut mesh = flat_grid(3, 2, 1.0);
    retriangulate(&mut mesh, &no_seams());
    let normals = mesh.normals().unwrap();
    for tid in mesh.triangle_ids() {
        for n in normals.triangle_values(tid).unwrap() {
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-6);
        }
    }
}
