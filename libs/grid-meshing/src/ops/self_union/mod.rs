//! # Self-Union
//!
//! Unions a mesh with itself by classifying every triangle with the
//! generalized winding number of the whole mesh.
//!
//! A triangle lies on the union's surface when the point just in front of it
//! is outside the solid (`w < threshold`) and the point just behind it is
//! inside (`w >= threshold`). Internal walls, coincident interface pairs and
//! faces buried inside overlapping solids fail that test and are removed.
//!
//! ## Limits
//!
//! Triangles are kept or dropped whole. Nothing is split along the curves
//! where two solids intersect, and no edge-aligned simplification follows,
//! so intersecting solids are not resolved into a clean union surface. The
//! result is exact only when solids meet along shared faces, as grid cell
//! geometry does.
//!
//! ## Winding Number
//!
//! `w(p) = sum(solid_angle(t, p)) / 4pi`, with each solid angle from the
//! Van Oosterom and Strackee formula. Closed outward-facing solids give 1
//! inside and 0 outside; overlapping solids add up.

use std::f64::consts::PI;

use glam::DVec3;
use hashbrown::HashSet;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::mesh::{Mesh, TriangleId};

/// Parameters for [`self_union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfUnionParams {
    /// Winding number at which a point counts as inside.
    ///
    /// Default: [`config::constants::SELF_UNION_WINDING_THRESHOLD`]
    pub winding_threshold: f64,

    /// Remove exact duplicate triangles with the same orientation before
    /// classification.
    ///
    /// Default: `true`
    pub trim_flaps: bool,

    /// Sample offset from each triangle as a fraction of the bounding box
    /// diagonal.
    ///
    /// Default: `1e-6`
    pub sample_offset: f64,
}

impl Default for SelfUnionParams {
    fn default() -> Self {
        Self {
            winding_threshold: config::constants::SELF_UNION_WINDING_THRESHOLD,
            trim_flaps: true,
            sample_offset: 1e-6,
        }
    }
}

/// Solid angle subtended by triangle `(a, b, c)` as seen from `p`.
///
/// Positive when `p` is behind the triangle (on the side opposite its
/// counter-clockwise normal).
pub fn solid_angle(p: DVec3, a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let (a, b, c) = (a - p, b - p, c - p);
    let (la, lb, lc) = (a.length(), b.length(), c.length());
    let numerator = a.dot(b.cross(c));
    let denominator = la * lb * lc + a.dot(b) * lc + b.dot(c) * la + c.dot(a) * lb;
    2.0 * numerator.atan2(denominator)
}

/// Generalized winding number of `point` with respect to the mesh.
pub fn winding_number(mesh: &Mesh, point: DVec3) -> f64 {
    let total: f64 = mesh
        .triangle_ids()
        .map(|tid| {
            let [a, b, c] = mesh.triangle_positions(tid);
            solid_angle(point, a, b, c)
        })
        .sum();
    total / (4.0 * PI)
}

/// Triangles that repeat an earlier triangle with the same orientation.
fn flap_duplicates(mesh: &Mesh) -> Vec<TriangleId> {
    let mut seen: HashSet<[u32; 3]> = HashSet::new();
    mesh.triangle_ids()
        .filter(|&tid| {
            let v = mesh.triangle(tid).vertices;
            // Rotate so the smallest id leads; keeps orientation.
            let lead = (0..3).min_by_key(|&k| v[k]).unwrap_or(0);
            let key = [v[lead], v[(lead + 1) % 3], v[(lead + 2) % 3]];
            !seen.insert(key)
        })
        .collect()
}

/// Unions the mesh with itself.
///
/// Returns `false` and leaves the mesh untouched when it is empty or when no
/// triangle would survive. On success the mesh is compacted.
///
/// # Example
///
/// ```rust
/// use grid_meshing::mesh::Mesh;
/// use grid_meshing::ops::self_union::{self_union, SelfUnionParams};
///
/// let mut empty = Mesh::new();
/// assert!(!self_union(&mut empty, &SelfUnionParams::default()));
/// ```
pub fn self_union(mesh: &mut Mesh, params: &SelfUnionParams) -> bool {
    let Some((min, max)) = mesh.bounds() else {
        warn!("Self-union skipped: mesh is empty");
        return false;
    };

    let mut working = mesh.clone();
    if params.trim_flaps {
        let flaps = flap_duplicates(&working);
        if !flaps.is_empty() {
            debug!("Trimming {} duplicate flap triangles", flaps.len());
            working.remove_triangles(&flaps);
        }
    }

    let offset = (max - min).length().max(1.0) * params.sample_offset;
    let threshold = params.winding_threshold;
    let keep: Vec<bool> = (0..working.triangle_count() as TriangleId)
        .into_par_iter()
        .map(|tid| {
            let normal = working.triangle_normal(tid);
            if normal == DVec3::ZERO {
                return false;
            }
            let centroid = working.triangle_centroid(tid);
            let outside = winding_number(&working, centroid + normal * offset);
            let inside = winding_number(&working, centroid - normal * offset);
            outside < threshold && inside >= threshold
        })
        .collect();

    let survivors = keep.iter().filter(|&&k| k).count();
    if survivors == 0 {
        warn!("Self-union skipped: no triangle lies on the union surface");
        return false;
    }

    let removed = working.retain_triangles(&keep);
    working.compact();
    info!("Self-union kept {} triangles, removed {}", survivors, removed);
    *mesh = working;
    true
}
