//! # Planar Frame
//!
//! Orthonormal 3D frame used to project planar regions into 2D.
//!
//! The frame's Z axis is the plane normal; X and Y span the plane. Local
//! coordinates are `(dot(p - origin, x), dot(p - origin, y), dot(p - origin, z))`.

use glam::{DQuat, DVec2, DVec3};

/// Origin plus rotation mapping the canonical axes onto the frame axes.
///
/// # Examples
/// ```
/// use grid_meshing::frame::Frame3;
/// use glam::{DVec2, DVec3};
///
/// let frame = Frame3::from_normal(DVec3::new(0.0, 0.0, 5.0), DVec3::Z);
/// let uv = frame.to_plane_uv(DVec3::new(1.0, 2.0, 5.0));
/// assert!((uv - DVec2::new(1.0, 2.0)).length() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame3 {
    /// Frame origin in world space.
    pub origin: DVec3,
    /// Rotation from canonical axes to frame axes.
    pub rotation: DQuat,
}

impl Frame3 {
    /// Frame at `origin` whose Z axis is `normal`.
    ///
    /// A zero normal yields the world-aligned frame.
    pub fn from_normal(origin: DVec3, normal: DVec3) -> Self {
        let normal = normal.normalize_or_zero();
        let rotation = if normal == DVec3::ZERO {
            DQuat::IDENTITY
        } else {
            DQuat::from_rotation_arc(DVec3::Z, normal)
        };
        Self { origin, rotation }
    }

    /// Frame X axis.
    #[inline]
    pub fn x(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    /// Frame Y axis.
    #[inline]
    pub fn y(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// Frame Z axis (the plane normal).
    #[inline]
    pub fn z(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    /// Rotates the frame about its own Z axis by `angle` radians.
    pub fn rotate_about_z(&mut self, angle: f64) {
        self.rotation = self.rotation * DQuat::from_rotation_z(angle);
    }

    /// World point expressed in frame coordinates.
    #[inline]
    pub fn to_local(&self, point: DVec3) -> DVec3 {
        self.rotation.inverse() * (point - self.origin)
    }

    /// World point projected onto the frame plane.
    #[inline]
    pub fn to_plane_uv(&self, point: DVec3) -> DVec2 {
        self.to_local(point).truncate()
    }
}
