//! Mesh builders shared by unit tests.

use glam::DVec3;

use crate::mesh::{GroupId, Mesh};

/// Corner triangles of a unit cube with outward winding, indexed as
/// `i + 2j + 4k` for the corner at `(i, j, k)`.
const CUBE_TRIANGLES: [[u32; 3]; 12] = [
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
];

/// Appends a closed axis-aligned box with its own eight vertices.
pub(crate) fn append_box(mesh: &mut Mesh, min: DVec3, size: DVec3, group: GroupId) {
    let base = mesh.vertex_count() as u32;
    for index in 0..8u32 {
        let corner = DVec3::new((index & 1) as f64, ((index >> 1) & 1) as f64, ((index >> 2) & 1) as f64);
        mesh.append_vertex(min + corner * size);
    }
    for tri in CUBE_TRIANGLES {
        mesh.append_triangle(tri.map(|v| base + v), group);
    }
}

/// Unit cube with its minimum corner at `min`.
pub(crate) fn unit_cube(min: DVec3) -> Mesh {
    let mut mesh = Mesh::new();
    append_box(&mut mesh, min, DVec3::ONE, 0);
    mesh
}

/// Two unit cubes side by side along +x, each closed, sharing no vertices.
pub(crate) fn two_cubes() -> Mesh {
    let mut mesh = unit_cube(DVec3::ZERO);
    append_box(&mut mesh, DVec3::X, DVec3::ONE, 0);
    mesh
}

/// Flat `nx` by `ny` grid of quads in the XY plane facing +z, with shared
/// vertices, each quad split along its `(i, j) - (i+1, j+1)` diagonal.
pub(crate) fn flat_grid(nx: u32, ny: u32, cell: f64) -> Mesh {
    let mut mesh = Mesh::new();
    for j in 0..=ny {
        for i in 0..=nx {
            mesh.append_vertex(DVec3::new(i as f64 * cell, j as f64 * cell, 0.0));
        }
    }
    let index = |i: u32, j: u32| j * (nx + 1) + i;
    for j in 0..ny {
        for i in 0..nx {
            let (a, b, c, d) = (index(i, j), index(i + 1, j), index(i + 1, j + 1), index(i, j + 1));
            mesh.append_triangle([a, b, c], 0);
            mesh.append_triangle([a, c, d], 0);
        }
    }
    mesh
}

/// Single `width` by `height` rectangle in the XY plane facing +z.
pub(crate) fn rectangle(width: f64, height: f64) -> Mesh {
    Mesh::from_indexed(
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(width, 0.0, 0.0),
            DVec3::new(width, height, 0.0),
            DVec3::new(0.0, height, 0.0),
        ],
        &[[0, 1, 2], [0, 2, 3]],
    )
}
