//! # Mesh Operations
//!
//! One module per pipeline stage. Every operation takes the mesh by mutable
//! reference (or shared reference for pure queries) and is usable on its own.
//!
//! | Module | Operation |
//! |--------|-----------|
//! | [`weld`] | merge coincident boundary edges |
//! | [`bowtie`] | split non-manifold vertex fans |
//! | [`normals`] | face normals, normal overlay topology and values |
//! | [`coplanar`] | predicate-driven coplanar region flood fill |
//! | [`polygroups`] | seed-normal polygroup generation |
//! | [`hidden`] | coincident face pair removal |
//! | [`self_union`] | winding-number self-union |
//! | [`seams`] | hard edge detection for retriangulation |
//! | [`retriangulate`] | seam-preserving planar retriangulation |
//! | [`uv`] | planar projection, atlas packing, repack, discard |

pub mod bowtie;
pub mod coplanar;
pub mod hidden;
pub mod normals;
pub mod polygroups;
pub mod retriangulate;
pub mod seams;
pub mod self_union;
pub mod uv;
pub mod weld;

mod union_find;

pub(crate) use union_find::UnionFind;
