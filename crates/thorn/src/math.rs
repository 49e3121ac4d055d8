//! 2D transform math and glam re-exports.
//!
//! Matrices follow the row-vector convention: a point is the row `[x y 1]`
//! and is transformed as `p' = p * M`. The local matrix of a [`Transform`]
//! is `S * R * T`, and a child's world matrix is `local * parent_world`.
//!
//! glam stores `Mat3` by columns, so the math row `i` of `M` is
//! `(x_axis[i], y_axis[i], z_axis[i])`. The helpers below hide that.

pub use glam::{Mat3, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Local placement of an entity relative to its parent.
///
/// `rotation` is in degrees, counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
    };

    pub fn new(position: Vec2, scale: Vec2, rotation: f32) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// The local matrix `S * R * T`.
    ///
    /// ```text
    /// ┌                              ┐
    /// │  sx·cos   sx·sin   0         │
    /// │ -sy·sin   sy·cos   0         │
    /// │  px       py       1         │
    /// └                              ┘
    /// ```
    pub fn matrix(&self) -> Mat3 {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let (sx, sy) = (self.scale.x, self.scale.y);
        from_rows(
            Vec3::new(sx * cos, sx * sin, 0.0),
            Vec3::new(-sy * sin, sy * cos, 0.0),
            Vec3::new(self.position.x, self.position.y, 1.0),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Builds a `Mat3` from its three math rows.
pub fn from_rows(r0: Vec3, r1: Vec3, r2: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(r0.x, r1.x, r2.x),
        Vec3::new(r0.y, r1.y, r2.y),
        Vec3::new(r0.z, r1.z, r2.z),
    )
}

/// Math row `i` of `m`.
pub fn row(m: &Mat3, i: usize) -> Vec3 {
    Vec3::new(m.x_axis[i], m.y_axis[i], m.z_axis[i])
}

/// Transforms the point `[x y 1]` by `m`.
pub fn transform_point(m: &Mat3, point: Vec2) -> Vec2 {
    let p = point.extend(1.0);
    Vec2::new(p.dot(m.x_axis), p.dot(m.y_axis))
}

/// Transforms the direction `[x y 0]` by `m`. Translation is ignored.
pub fn transform_vector(m: &Mat3, vector: Vec2) -> Vec2 {
    let v = vector.extend(0.0);
    Vec2::new(v.dot(m.x_axis), v.dot(m.y_axis))
}

/// Translation part of a world matrix (row 2).
pub fn matrix_position(m: &Mat3) -> Vec2 {
    row(m, 2).truncate()
}

/// Per-axis scale of a world matrix: the lengths of rows 0 and 1.
///
/// Magnitudes are always non-negative, so a mirrored matrix reports a
/// positive scale and folds the flip into the rotation.
pub fn matrix_scale(m: &Mat3) -> Vec2 {
    Vec2::new(row(m, 0).truncate().length(), row(m, 1).truncate().length())
}

/// Rotation of a world matrix in degrees, in `(-180, 180]`.
pub fn matrix_rotation(m: &Mat3) -> f32 {
    let r0 = row(m, 0);
    let degrees = r0.y.atan2(r0.x).to_degrees();
    if degrees <= -180.0 { degrees + 360.0 } else { degrees }
}
