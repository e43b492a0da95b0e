//! Tests for the coplanar group finder.

use super::*;
use glam::DVec3;

/// 2x1 strip of quads in the XY plane followed by a quad folded down.
fn strip_with_fold() -> Mesh {
    Mesh::from_indexed(
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(3.0, 0.0, -1.0),
            DVec3::new(3.0, 1.0, -1.0),
        ],
        &[
            [0, 1, 4],
            [0, 4, 3],
            [1, 2, 5],
            [1, 5, 4],
            [2, 6, 7],
            [2, 7, 5],
        ],
    )
}

#[test]
fn test_angle_splits_fold() {
    let mesh = strip_with_fold();
    let groups = find_groups(&mesh, 2.0, |_, _, _| true);
    assert_eq!(groups.len(), 2);
    let mut flat = groups[0].clone();
    flat.sort_unstable();
    assert_eq!(flat, vec![0, 1, 2, 3]);
    assert_eq!(groups[1], vec![4, 5]);
}

#[test]
fn test_wide_tolerance_merges_fold() {
    let mesh = strip_with_fold();
    let groups = find_groups(&mesh, 60.0, |_, _, _| true);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 6);
}

#[test]
fn test_predicate_blocks_crossing() {
    let mesh = strip_with_fold();
    let topology = EdgeTopology::build(&mesh);
    let blocked = topology.find_edge(1, 4).unwrap();
    let groups = find_groups_with_topology(&mesh, &topology, 2.0, |_, _, e| e != blocked);
    assert_eq!(groups.len(), 3);
    let mut left = groups[0].clone();
    left.sort_unstable();
    assert_eq!(left, vec![0, 1]);
}

#[test]
fn test_groups_are_deterministic() {
    let mesh = strip_with_fold();
    let a = find_groups(&mesh, 2.0, |_, _, _| true);
    let b = find_groups(&mesh, 2.0, |_, _, _| true);
    assert_eq!(a, b);
}

#[test]
fn test_assign_groups_relabels() {
    let mut mesh = strip_with_fold();
    let groups = find_groups(&mesh, 2.0, |_, _, _| true);
    assign_groups(&mut mesh, &groups);
    assert_eq!(mesh.triangle_group(0), 0);
    assert_eq!(mesh.triangle_group(5), 1);
    assert_eq!(mesh.group_id_bound(), 2);
}
