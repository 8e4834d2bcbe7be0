//! Mathematical types shared between the registry and the scene.
//!
//! The registry uses a right-handed, z-up frame. The scene's box primitive
//! names its axes differently (see `stage_registry::object`), but every type
//! in this module stays in registry coordinates.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Below this squared magnitude a rotation axis is treated as undefined.
const AXIS_EPSILON: f64 = 1.0e-12;

/// 3D Vector - points, offsets, rotation axes
///
/// Equality and hashing compare bit patterns, so two points are equal only
/// when they are bit-identical. That keeps snapshots holding points usable as
/// hash keys.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit X vector
    pub const X: Self = Self::new(1.0, 0.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Unit Z vector
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector pointing the same way, or `None` for a
    /// (near) zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len_sq = self.length_squared();
        if len_sq <= AXIS_EPSILON {
            return None;
        }
        Some(self * (1.0 / len_sq.sqrt()))
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    fn bits(self) -> [u64; 3] {
        [self.x.to_bits(), self.y.to_bits(), self.z.to_bits()]
    }
}

impl PartialEq for Vec3 {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Vec3 {}

impl Hash for Vec3 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Quaternion for rotations
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Quaternion {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
    /// W component
    pub w: f64,
}

impl Quaternion {
    /// Creates a new quaternion
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Rotation of `angle` radians around `axis`.
    ///
    /// A zero axis yields the identity.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let Some(axis) = axis.normalized() else {
            return Self::IDENTITY;
        };
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    /// Returns the unit quaternion, or the identity for a zero quaternion.
    #[must_use]
    pub fn normalized(self) -> Self {
        let norm = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if norm <= AXIS_EPSILON {
            return Self::IDENTITY;
        }
        Self::new(self.x / norm, self.y / norm, self.z / norm, self.w / norm)
    }

    fn bits(self) -> [u64; 4] {
        [self.x.to_bits(), self.y.to_bits(), self.z.to_bits(), self.w.to_bits()]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hamilton product: `a * b` rotates by `b` first, then by `a`.
impl std::ops::Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl PartialEq for Quaternion {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Quaternion {}

impl Hash for Quaternion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// Rotation expressed as a unit axis plus an angle in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisAngle {
    /// Rotation axis (unit length)
    pub axis: Vec3,
    /// Rotation angle in radians
    pub angle: f64,
}

impl AxisAngle {
    /// Creates an axis-angle rotation.
    #[must_use]
    pub const fn new(axis: Vec3, angle: f64) -> Self {
        Self { axis, angle }
    }

    /// No rotation. The axis is arbitrary but must be non-zero for the box
    /// primitive, so it points up the y axis.
    pub const IDENTITY: Self = Self::new(Vec3::Y, 0.0);

    /// Converts a quaternion. Quaternions without a defined axis (no
    /// rotation) yield [`AxisAngle::IDENTITY`].
    #[must_use]
    pub fn from_quaternion(q: Quaternion) -> Self {
        let mag_sq = q.x * q.x + q.y * q.y + q.z * q.z;
        if mag_sq <= AXIS_EPSILON {
            return Self::IDENTITY;
        }
        let mag = mag_sq.sqrt();
        Self {
            axis: Vec3::new(q.x / mag, q.y / mag, q.z / mag),
            angle: 2.0 * mag.atan2(q.w),
        }
    }

    /// Angle in degrees, as the scene's rotate property expects it.
    #[must_use]
    pub fn degrees(self) -> f64 {
        self.angle / std::f64::consts::PI * 180.0
    }
}

impl Default for AxisAngle {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis aligned bounding box in registry coordinates.
///
/// `width` runs along x, `depth` along y and `height` along z.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Corner with the smallest coordinate on every axis
    pub left_front_bottom: Vec3,
    /// Extent along x
    pub width: f64,
    /// Extent along z
    pub height: f64,
    /// Extent along y
    pub depth: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its minimum corner and extents.
    #[must_use]
    pub const fn new(left_front_bottom: Vec3, width: f64, height: f64, depth: f64) -> Self {
        Self { left_front_bottom, width, height, depth }
    }

    /// The registry's "no shape known" box: every extent is
    /// [`crate::PLACEHOLDER_EXTENT`].
    pub const PLACEHOLDER: Self = Self::new(
        Vec3::ZERO,
        crate::PLACEHOLDER_EXTENT,
        crate::PLACEHOLDER_EXTENT,
        crate::PLACEHOLDER_EXTENT,
    );

    /// Center of the box in the same frame as `left_front_bottom`.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.left_front_bottom + Vec3::new(self.width * 0.5, self.depth * 0.5, self.height * 0.5)
    }

    /// True when all three extents carry the placeholder value exactly.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_placeholder(&self) -> bool {
        self.width == crate::PLACEHOLDER_EXTENT
            && self.height == crate::PLACEHOLDER_EXTENT
            && self.depth == crate::PLACEHOLDER_EXTENT
    }

    fn bits(&self) -> ([u64; 3], [u64; 3]) {
        (
            self.left_front_bottom.bits(),
            [self.width.to_bits(), self.height.to_bits(), self.depth.to_bits()],
        )
    }
}

impl PartialEq for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for BoundingBox {}

impl Hash for BoundingBox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// Affine transform stored as a row-major 4x4 matrix.
///
/// Points are column vectors: `p' = M * [p, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    /// Matrix rows
    pub m: [[f64; 4]; 4],
}

impl Transform3D {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Pure translation.
    #[must_use]
    pub const fn from_translation(t: Vec3) -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, t.x],
                [0.0, 1.0, 0.0, t.y],
                [0.0, 0.0, 1.0, t.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation followed by translation.
    #[must_use]
    pub fn from_rotation_translation(rotation: Quaternion, t: Vec3) -> Self {
        let Quaternion { x, y, z, w } = rotation.normalized();
        Self {
            m: [
                [1.0 - 2.0 * (y * y + z * z), 2.0 * (x * y - z * w), 2.0 * (x * z + y * w), t.x],
                [2.0 * (x * y + z * w), 1.0 - 2.0 * (x * x + z * z), 2.0 * (y * z - x * w), t.y],
                [2.0 * (x * z - y * w), 2.0 * (y * z + x * w), 1.0 - 2.0 * (x * x + y * y), t.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Transform that applies `self` first and then `next`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (row, out) in m.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = (0..4).map(|k| next.m[row][k] * self.m[k][col]).sum();
            }
        }
        Self { m }
    }

    /// Translation part of the transform.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// Maps one point.
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }

    /// Maps every point, keeping order and count.
    #[must_use]
    pub fn transform_points(&self, points: &[Vec3]) -> Vec<Vec3> {
        points.iter().map(|p| self.transform_point(*p)).collect()
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}
