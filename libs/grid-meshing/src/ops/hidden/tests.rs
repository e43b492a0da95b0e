//! Tests for coincident face removal.

use super::*;
use crate::testing::{append_box, two_cubes, unit_cube};
use approx::assert_relative_eq;

#[test]
fn test_region_stats_are_area_weighted() {
    let mesh = Mesh::from_indexed(
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ],
        &[[0, 1, 2], [0, 2, 3]],
    );
    let stats = RegionStats::of(&mesh, &[0, 1]);
    assert_relative_eq!(stats.area, 2.0);
    assert_relative_eq!(stats.centroid.x, 1.0, epsilon = 1e-12);
    assert_relative_eq!(stats.centroid.y, 0.5, epsilon = 1e-12);
}

#[test]
fn test_shared_face_of_two_cubes_is_removed() {
    let mut mesh = two_cubes();
    assert_eq!(mesh.triangle_count(), 24);

    let report = remove_coincident_faces(&mut mesh);
    assert_eq!(report.removed_groups, 2);
    assert_eq!(report.removed_triangles, 4);
    assert_eq!(mesh.triangle_count(), 20);
    assert_eq!(mesh.vertex_count(), 16);

    // No surviving coplanar region has a duplicate.
    let groups = find_groups(&mesh, 2.0, |_, _, _| true);
    let stats: Vec<_> = groups.iter().map(|g| RegionStats::of(&mesh, g)).collect();
    for i in 0..stats.len() {
        for j in (i + 1)..stats.len() {
            assert!(!stats[i].coincides_with(&stats[j]));
        }
    }
}

#[test]
fn test_separate_cubes_are_untouched() {
    let mut mesh = unit_cube(DVec3::ZERO);
    append_box(&mut mesh, DVec3::new(3.0, 0.0, 0.0), DVec3::ONE, 0);
    let before = mesh.clone();
    assert_eq!(remove_coincident_faces(&mut mesh), CoincidentReport::default());
    assert_eq!(mesh, before);
}

#[test]
fn test_three_coincident_regions_remove_first_pair_only() {
    let positions = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
    let mut mesh = Mesh::from_indexed(positions, &[[0, 1, 2], [0, 2, 1]]);
    let a = mesh.append_vertex(DVec3::ZERO);
    let b = mesh.append_vertex(DVec3::X);
    let c = mesh.append_vertex(DVec3::Y);
    mesh.append_triangle([a, b, c], 0);

    let report = remove_coincident_faces(&mut mesh);
    assert_eq!(report.removed_groups, 2);
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn test_same_area_different_location_is_kept() {
    let mut mesh = unit_cube(DVec3::ZERO);
    append_box(&mut mesh, DVec3::new(1.0, 0.0005, 0.0), DVec3::ONE, 0);
    // Interface centroids are 5e-4 apart: still within tolerance.
    assert_eq!(remove_coincident_faces(&mut mesh).removed_triangles, 4);

    let mut mesh = unit_cube(DVec3::ZERO);
    append_box(&mut mesh, DVec3::new(1.0, 0.5, 0.0), DVec3::ONE, 0);
    assert_eq!(remove_coincident_faces(&mut mesh).removed_triangles, 0);
}
