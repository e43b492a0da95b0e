//! End-to-end tests for the meshing pipeline.

use super::*;
use crate::mesh::EdgeTopology;
use crate::testing::{flat_grid, rectangle, two_cubes};
use glam::Vec2;

fn config() -> MeshingConfig {
    MeshingConfig {
        optimize_planar_areas: false,
        uv_mode: UvMode::None,
        ..MeshingConfig::default()
    }
}

fn run(config: MeshingConfig, mesh: Mesh, cell_dims: DVec3) -> MeshingOutput {
    MeshingPipeline::new(config).unwrap().run(mesh, cell_dims).unwrap()
}

#[test]
fn test_quad_passes_through() {
    let output = run(MeshingConfig::default(), rectangle(1.0, 1.0), DVec3::ONE);
    assert_eq!(output.mesh.triangle_count(), 2);
    assert_eq!(output.atlas_dimension, 8);
    assert!(output.mesh.uv_layer(0).is_some());
}

#[test]
fn test_coincident_interface_is_removed() {
    let output = run(config(), two_cubes(), DVec3::ONE);
    let mesh = &output.mesh;
    assert_eq!(mesh.triangle_count(), 20);

    // The second weld closes the seam left by the removed interface.
    assert_eq!(mesh.vertex_count(), 12);
    let topology = EdgeTopology::build(mesh);
    assert!(topology.edges().iter().all(|e| e.triangles.len() == 2));

    let stats: Vec<(DVec3, f64)> = mesh
        .triangle_ids()
        .map(|tid| (mesh.triangle_centroid(tid), mesh.triangle_area(tid)))
        .collect();
    for (i, a) in stats.iter().enumerate() {
        for b in &stats[i + 1..] {
            assert!(a.0.distance(b.0) > 1e-6 || (a.1 - b.1).abs() > 1e-6);
        }
    }
}

#[test]
fn test_self_union_stage() {
    let config = MeshingConfig {
        remove_coincident_faces: false,
        self_union: true,
        ..config()
    };
    let output = run(config, two_cubes(), DVec3::ONE);
    assert_eq!(output.mesh.triangle_count(), 20);
}

#[test]
fn test_full_pipeline_on_two_cubes() {
    let output = run(MeshingConfig::default(), two_cubes(), DVec3::ONE);
    assert_eq!(output.mesh.triangle_count(), 12);
    assert_eq!(output.mesh.vertex_count(), 8);
    assert_eq!(output.atlas_dimension, 32);
}

#[test]
fn test_pixel_layout_dimension() {
    let output = run(MeshingConfig::default(), rectangle(100.0, 50.0), DVec3::splat(50.0));
    assert_eq!(output.atlas_dimension, 16);
}

#[test]
fn test_pixel_layout_without_uvs_reports_zero() {
    let config = MeshingConfig {
        uv_mode: UvMode::PixelLayoutRepack,
        ..config()
    };
    let output = run(config, rectangle(1.0, 1.0), DVec3::ONE);
    assert_eq!(output.atlas_dimension, 0);
    assert!(output.mesh.uv_layer(0).is_none());
}

#[test]
fn test_discard_mode_zeroes_uvs() {
    let config = MeshingConfig {
        uv_mode: UvMode::Discard,
        ..MeshingConfig::default()
    };
    let output = run(config, flat_grid(2, 2, 1.0), DVec3::ONE);
    let uvs = output.mesh.uv_layer(0).unwrap();
    assert!(uvs.elements().iter().all(|&uv| uv == Vec2::ZERO));
    assert_eq!(output.atlas_dimension, 0);
}

#[test]
fn test_repack_mode_stays_in_unit_square() {
    let config = MeshingConfig {
        uv_mode: UvMode::Repack,
        ..MeshingConfig::default()
    };
    let output = run(config, two_cubes(), DVec3::ONE);
    let uvs = output.mesh.uv_layer(0).unwrap();
    assert!(uvs
        .elements()
        .iter()
        .all(|uv| uv.min_element() >= 0.0 && uv.max_element() <= 1.0));
}

#[test]
fn test_invert_faces() {
    let config = MeshingConfig {
        invert_faces: true,
        ..config()
    };
    let output = run(config, rectangle(1.0, 1.0), DVec3::ONE);
    for tid in output.mesh.triangle_ids() {
        assert!(output.mesh.triangle_normal(tid).z < -0.99);
    }
}

#[test]
fn test_split_grid_is_welded() {
    // Two quads that do not share their middle vertices.
    let mesh = Mesh::from_indexed(
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
        ],
        &[[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]],
    );
    let output = run(MeshingConfig::default(), mesh, DVec3::ONE);
    assert_eq!(output.mesh.triangle_count(), 2);
    assert_eq!(output.mesh.vertex_count(), 4);
}

#[test]
fn test_cancelled_before_first_stage() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let pipeline = MeshingPipeline::new(MeshingConfig::default()).unwrap();
    let result = pipeline.run_with_cancel(rectangle(1.0, 1.0), DVec3::ONE, &cancel);
    assert!(matches!(result, Err(MeshingError::Cancelled { stage: "weld" })));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = MeshingConfig {
        target_uv_resolution: 0,
        ..MeshingConfig::default()
    };
    assert!(matches!(MeshingPipeline::new(config), Err(MeshingError::InvalidConfig(_))));
}

#[test]
fn test_invalid_mesh_is_rejected() {
    let pipeline = MeshingPipeline::new(MeshingConfig::default()).unwrap();
    let mesh = Mesh::from_indexed(vec![DVec3::ZERO, DVec3::X], &[[0, 1, 2]]);
    assert!(matches!(
        pipeline.run(mesh, DVec3::ONE),
        Err(MeshingError::InvalidMesh { .. })
    ));

    let mesh = Mesh::from_indexed(vec![DVec3::ZERO, DVec3::X, DVec3::splat(f64::NAN)], &[[0, 1, 2]]);
    assert!(matches!(
        pipeline.run(mesh, DVec3::ONE),
        Err(MeshingError::InvalidMesh { .. })
    ));
}

#[test]
fn test_empty_mesh() {
    let output = run(MeshingConfig::default(), Mesh::new(), DVec3::ONE);
    assert!(output.mesh.is_empty());
    assert_eq!(output.atlas_dimension, 0);
}

#[test]
fn test_collapsed_triangle_is_rejected() {
    let pipeline = MeshingPipeline::new(MeshingConfig::default()).unwrap();
    let mut mesh = rectangle(1.0, 1.0);
    mesh.append_triangle([0, 0, 2], 0);
    assert!(matches!(
        pipeline.run(mesh, DVec3::ONE),
        Err(MeshingError::InvalidMesh { .. })
    ));
}

#[test]
fn test_dangling_overlay_elements_are_rejected() {
    let pipeline = MeshingPipeline::new(MeshingConfig::default()).unwrap();

    let mut mesh = rectangle(1.0, 1.0);
    mesh.enable_colors().set_triangle(0, Some([0, 1, 2]));
    assert!(matches!(
        pipeline.run(mesh, DVec3::ONE),
        Err(MeshingError::InvalidMesh { .. })
    ));

    let mut mesh = rectangle(1.0, 1.0);
    mesh.enable_uv_layers(1);
    if let Some(uvs) = mesh.uv_layer_mut(0) {
        uvs.append_element(Vec2::ZERO, 0);
        uvs.set_triangle(1, Some([0, 0, 3]));
    }
    assert!(matches!(
        pipeline.run(mesh, DVec3::ONE),
        Err(MeshingError::InvalidMesh { .. })
    ));
}
