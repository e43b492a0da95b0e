//! # Coincident Face Removal
//!
//! Neighbouring voxel cells each emit their half of a shared interface, which
//! leaves two coplanar, coincident, opposite-facing regions inside the solid.
//! This pass finds coplanar regions, pairs regions whose area-weighted
//! centroids and areas match, and deletes both members of each pair.
//!
//! ## Pairing
//!
//! Regions are scanned in ascending index order. The first unmarked partner
//! `j > i` within tolerance is paired with `i` and the scan moves on to
//! `i + 1`. With three or more coincident regions at one location only the
//! first pair is removed.

use glam::DVec3;
use tracing::{debug, info};

use config::constants::{COINCIDENT_AREA_TOLERANCE, COINCIDENT_CENTROID_TOLERANCE, COPLANAR_ANGLE_TOLERANCE_DEG};

use crate::mesh::{Mesh, TriangleId};
use crate::ops::coplanar::find_groups;

/// Outcome of [`remove_coincident_faces`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoincidentReport {
    /// Number of regions deleted (always even).
    pub removed_groups: usize,
    /// Number of triangles deleted.
    pub removed_triangles: usize,
}

/// Area and area-weighted centroid of one coplanar region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    /// Area-weighted centroid.
    pub centroid: DVec3,
    /// Total area.
    pub area: f64,
}

impl RegionStats {
    /// Computes stats over the given triangles.
    ///
    /// A region without area falls back to the mean of triangle centroids.
    pub fn of(mesh: &Mesh, triangles: &[TriangleId]) -> Self {
        let mut weighted = DVec3::ZERO;
        let mut plain = DVec3::ZERO;
        let mut area = 0.0;
        for &tid in triangles {
            let a = mesh.triangle_area(tid);
            let c = mesh.triangle_centroid(tid);
            weighted += c * a;
            plain += c;
            area += a;
        }
        let centroid = if area > 0.0 {
            weighted / area
        } else {
            plain / triangles.len().max(1) as f64
        };
        Self { centroid, area }
    }

    /// Whether two regions are geometric duplicates.
    #[inline]
    pub fn coincides_with(&self, other: &Self) -> bool {
        self.centroid.distance(other.centroid) < COINCIDENT_CENTROID_TOLERANCE
            && (self.area - other.area).abs() < COINCIDENT_AREA_TOLERANCE
    }
}

/// Deletes pairs of coincident coplanar regions and compacts the mesh.
///
/// # Example
///
/// ```rust
/// use grid_meshing::mesh::Mesh;
/// use grid_meshing::ops::hidden::remove_coincident_faces;
/// use glam::DVec3;
///
/// // The same triangle twice with opposite winding.
/// let mut mesh = Mesh::from_indexed(
///     vec![DVec3::ZERO, DVec3::X, DVec3::Y],
///     &[[0, 1, 2], [0, 2, 1]],
/// );
/// let report = remove_coincident_faces(&mut mesh);
/// assert_eq!(report.removed_triangles, 2);
/// assert!(mesh.is_empty());
/// ```
pub fn remove_coincident_faces(mesh: &mut Mesh) -> CoincidentReport {
    let groups = find_groups(mesh, COPLANAR_ANGLE_TOLERANCE_DEG, |_, _, _| true);
    let stats: Vec<RegionStats> = groups.iter().map(|g| RegionStats::of(mesh, g)).collect();
    debug!("Found {} coplanar regions for coincident pairing", groups.len());

    let mut removed = vec![false; groups.len()];
    for i in 0..groups.len() {
        if removed[i] {
            continue;
        }
        for j in (i + 1)..groups.len() {
            if removed[j] {
                continue;
            }
            if stats[i].coincides_with(&stats[j]) {
                removed[i] = true;
                removed[j] = true;
                break;
            }
        }
    }

    let doomed: Vec<TriangleId> = groups
        .iter()
        .zip(&removed)
        .filter(|(_, &gone)| gone)
        .flat_map(|(group, _)| group.iter().copied())
        .collect();

    let report = CoincidentReport {
        removed_groups: removed.iter().filter(|&&gone| gone).count(),
        removed_triangles: doomed.len(),
    };

    if !doomed.is_empty() {
        mesh.remove_triangles(&doomed);
        mesh.compact();
        info!(
            "Removed {} coincident regions ({} triangles)",
            report.removed_groups, report.removed_triangles
        );
    }

    report
}

#[cfg(test)]
mod tests;
