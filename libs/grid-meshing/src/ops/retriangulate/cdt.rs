//! Constrained triangulation of a simple polygon.
//!
//! Ear clipping with exact orientation predicates produces an initial
//! triangulation that uses only polygon vertices; Lawson flips then restore
//! the Delaunay property on every diagonal while polygon edges stay fixed.

use std::f64::consts::PI;

use glam::DVec2;
use hashbrown::{HashMap, HashSet};
use robust::Coord;

/// Exact sign of the signed area of `(a, b, c)`; positive when
/// counter-clockwise.
#[inline]
fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    robust::orient2d(Coord { x: a.x, y: a.y }, Coord { x: b.x, y: b.y }, Coord { x: c.x, y: c.y })
}

/// Twice the signed area of a polygon.
pub(crate) fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    (0..n).map(|i| points[i].perp_dot(points[(i + 1) % n])).sum()
}

/// Whether `p` lies inside or on the counter-clockwise triangle `(a, b, c)`.
#[inline]
fn in_triangle(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> bool {
    orient(a, b, p) >= 0.0 && orient(b, c, p) >= 0.0 && orient(c, a, p) >= 0.0
}

/// Triangulates a counter-clockwise simple polygon.
///
/// Returns triangles as index triples into `points`, or `None` when the
/// polygon has fewer than three vertices, is not counter-clockwise, or no
/// valid ear can be found.
pub(crate) fn triangulate_polygon(points: &[DVec2]) -> Option<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 || signed_area(points) <= 0.0 {
        return None;
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let (prev, cur, next) = (remaining[(i + m - 1) % m], remaining[i], remaining[(i + 1) % m]);
            let (a, b, c) = (points[prev], points[cur], points[next]);
            if orient(a, b, c) <= 0.0 {
                return false;
            }
            remaining.iter().all(|&k| {
                if k == prev || k == cur || k == next {
                    return true;
                }
                let p = points[k];
                p == a || p == b || p == c || !in_triangle(p, a, b, c)
            })
        })?;

        let (prev, cur, next) = (remaining[(ear + m - 1) % m], remaining[ear], remaining[(ear + 1) % m]);
        triangles.push([prev, cur, next]);
        remaining.remove(ear);
    }

    if orient(points[remaining[0]], points[remaining[1]], points[remaining[2]]) <= 0.0 {
        return None;
    }
    triangles.push([remaining[0], remaining[1], remaining[2]]);

    delaunay_flips(&mut triangles, points);
    Some(triangles)
}

/// Interior angle at `apex` of triangle `(a, apex, b)`.
fn angle_at(a: DVec2, apex: DVec2, b: DVec2) -> f64 {
    let (u, v) = (a - apex, b - apex);
    u.perp_dot(v).atan2(u.dot(v)).abs()
}

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Flips non-Delaunay diagonals until none remain. Polygon edges
/// `(i, i + 1)` are constraints and never flip. Returns the number of flips.
pub(crate) fn delaunay_flips(triangles: &mut [[usize; 3]], points: &[DVec2]) -> usize {
    let n = points.len();
    let constrained: HashSet<(usize, usize)> = (0..n).map(|i| edge_key(i, (i + 1) % n)).collect();
    let max_flips = triangles.len() * triangles.len() + 16;
    let mut flips = 0;

    loop {
        let mut edge_triangles: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (ti, tri) in triangles.iter().enumerate() {
            for k in 0..3 {
                edge_triangles.entry(edge_key(tri[k], tri[(k + 1) % 3])).or_default().push(ti);
            }
        }

        let mut keys: Vec<_> = edge_triangles
            .iter()
            .filter(|(key, tris)| tris.len() == 2 && !constrained.contains(*key))
            .map(|(key, _)| *key)
            .collect();
        keys.sort_unstable();

        let mut flipped = false;
        for key in keys {
            let (t0, t1) = (edge_triangles[&key][0], edge_triangles[&key][1]);
            if try_flip(triangles, points, t0, t1, key) {
                flips += 1;
                flipped = true;
                break;
            }
        }

        if !flipped || flips >= max_flips {
            return flips;
        }
    }
}

/// Flips the shared edge of `t0` and `t1` when the opposite angles sum past
/// pi and the quad is strictly convex.
fn try_flip(triangles: &mut [[usize; 3]], points: &[DVec2], t0: usize, t1: usize, edge: (usize, usize)) -> bool {
    // Rotate t0 so it reads (a, b, c) with (a, b) the shared edge.
    let Some(k) = (0..3).find(|&k| edge_key(triangles[t0][k], triangles[t0][(k + 1) % 3]) == edge) else {
        return false;
    };
    let a = triangles[t0][k];
    let b = triangles[t0][(k + 1) % 3];
    let c = triangles[t0][(k + 2) % 3];
    let Some(&d) = triangles[t1].iter().find(|&&v| v != a && v != b) else {
        return false;
    };

    let (pa, pb, pc, pd) = (points[a], points[b], points[c], points[d]);
    if angle_at(pa, pc, pb) + angle_at(pa, pd, pb) <= PI + 1e-12 {
        return false;
    }
    if orient(pa, pd, pc) <= 0.0 || orient(pd, pb, pc) <= 0.0 {
        return false;
    }

    triangles[t0] = [a, d, c];
    triangles[t1] = [d, b, c];
    true
}
