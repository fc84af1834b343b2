use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};

/// A 3-component vector used for positions, directions, and colors in the ray tracer.
///
/// This type implements all standard arithmetic operations with operator overloading,
/// and provides geometric utilities (dot product, cross product, normalization)
/// needed for physically-based light transport simulation.
#[derive(Debug, Clone, Copy)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Point3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Squared Euclidean length — avoids the sqrt for performance-critical paths
    /// such as BVH traversal and intersection culling.
    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector. Panics on zero-length vectors in debug mode.
    #[inline(always)]
    pub fn normalized(self) -> Self {
        let len = self.length();
        debug_assert!(len > 1e-12, "Attempted to normalize a zero-length vector");
        self / len
    }

    /// The standard Euclidean inner product, fundamental to all geometric queries
    /// in the ray tracer (projection, angle computation, Lambertian shading).
    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Cross product — used for constructing orthonormal camera bases and computing
    /// surface tangent frames for normal mapping.
    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Component-wise (Hadamard) product — used for color modulation where each
    /// channel is attenuated independently by the surface albedo.
    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Component-wise linear interpolation: self·(1-t) + other·t
    #[inline(always)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Clamps each component to [0, 1] — used before quantizing HDR radiance values
    /// to 8-bit sRGB for terminal display.
    #[inline(always)]
    pub fn saturate(self) -> Self {
        Self::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
        )
    }

    /// Applies the sRGB gamma curve (γ = 2.2 approximated as sqrt) for perceptually
    /// correct display on standard monitors / terminals with true-color support.
    #[inline(always)]
    pub fn gamma_correct(self) -> Self {
        Self::new(self.x.sqrt(), self.y.sqrt(), self.z.sqrt())
    }

    /// Checks if the vector is near-zero in all components, used to avoid
    /// degenerate scatter directions that would produce NaN in subsequent math.
    #[inline(always)]
    pub fn near_zero(self) -> bool {
        const EPS: f64 = 1e-8;
        self.x.abs() < EPS && self.y.abs() < EPS && self.z.abs() < EPS
    }

    /// Replaces any non-finite component with zero — applied once per pixel
    /// before gamma correction rather than scattered through the hot path.
    #[inline(always)]
    pub fn nan_to_zero(self) -> Self {
        Self::new(
            if self.x.is_finite() { self.x } else { 0.0 },
            if self.y.is_finite() { self.y } else { 0.0 },
            if self.z.is_finite() { self.z } else { 0.0 },
        )
    }

    /// Converts a [0,1] color to an 8-bit RGB triple for ANSI true-color output.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let c = self.saturate();
        (
            (c.x * 255.999) as u8,
            (c.y * 255.999) as u8,
            (c.z * 255.999) as u8,
        )
    }

}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl MulAssign<f64> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, t: f64) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl DivAssign<f64> for Vec3 {
    #[inline(always)]
    fn div_assign(&mut self, t: f64) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of bounds: {i}"),
        }
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A parametric ray R(t) = origin + t · direction, the fundamental geometric
/// primitive for all intersection queries in the path tracer.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    #[inline(always)]
    pub const fn new(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Evaluates the ray at parameter t. Positive t gives points ahead of the origin.
    #[inline(always)]
    pub fn at(self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

// ─── Axis-Aligned Bounding Box ──────────────────────────────────────────────

/// An axis-aligned bounding box (AABB) used as the bounding volume in the BVH.
/// Intersection is tested via the slab method, which checks overlap of the ray's
/// parameter intervals across all three axes simultaneously.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Slab-method ray-AABB intersection test. Returns true if the ray hits the box
    /// within [t_min, t_max]. The branchless min/max formulation handles NaN and
    /// axis-aligned rays correctly.
    pub fn hit(&self, ray: &Ray, mut t_min: f64, mut t_max: f64) -> bool {
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max <= t_min {
                return false;
            }
        }
        true
    }

    /// An empty box, ready to be grown by repeated point/box insertion.
    pub fn empty() -> Self {
        Self::new(
            Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        )
    }

    pub fn grow_point(&mut self, p: Point3) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_size(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn contains_point(&self, p: Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Cheap AABB-vs-AABB overlap test, used when building the octree (the exact
    /// separating-axis test is reserved for per-triangle intersection).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Splits this box into its eight child octants at the center, in the fixed
    /// order (-x-y-z, +x-y-z, +x+y-z, -x+y-z, -x-y+z, +x-y+z, +x+y+z, -x+y+z).
    pub fn octant_split(&self) -> [Aabb; 8] {
        let c = self.center();
        let corners = [
            (self.min.x, c.x, self.min.y, c.y, self.min.z, c.z),
            (c.x, self.max.x, self.min.y, c.y, self.min.z, c.z),
            (c.x, self.max.x, c.y, self.max.y, self.min.z, c.z),
            (self.min.x, c.x, c.y, self.max.y, self.min.z, c.z),
            (self.min.x, c.x, self.min.y, c.y, c.z, self.max.z),
            (c.x, self.max.x, self.min.y, c.y, c.z, self.max.z),
            (c.x, self.max.x, c.y, self.max.y, c.z, self.max.z),
            (self.min.x, c.x, c.y, self.max.y, c.z, self.max.z),
        ];
        corners.map(|(x0, x1, y0, y1, z0, z1)| {
            Aabb::new(Point3::new(x0, y0, z0), Point3::new(x1, y1, z1))
        })
    }

    /// Slab-method intersection that also returns the entry distance, needed to
    /// order octree children front-to-back during traversal.
    pub fn hit_t(&self, ray: &Ray, mut t_min: f64, mut t_max: f64) -> Option<f64> {
        let mut entry = t_min;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max <= t_min {
                return None;
            }
            entry = t_min;
        }
        Some(entry)
    }
}

// ─── Vec4 ───────────────────────────────────────────────────────────────────

/// A 4-component vector, used for RGBA texture samples.
#[derive(Debug, Clone, Copy)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vec4 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    #[inline(always)]
    pub const fn from_rgb(rgb: Vec3, w: f64) -> Self {
        Self::new(rgb.x, rgb.y, rgb.z, w)
    }

    #[inline(always)]
    pub fn rgb(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl Mul<f64> for Vec4 {
    type Output = Self;
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t, self.w * t)
    }
}

impl Mul<Vec4> for Vec4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.x * rhs.x,
            self.y * rhs.y,
            self.z * rhs.z,
            self.w * rhs.w,
        )
    }
}

// ─── Mat3 ───────────────────────────────────────────────────────────────────

/// A 3×3 matrix, used to compose the mesh load-time transform (rotation and
/// non-uniform scale) and its inverse-scale counterpart for normals.
#[derive(Debug, Clone, Copy)]
pub struct Mat3 {
    /// Stored column-major: `cols[c]` is column `c`.
    pub cols: [Vec3; 3],
}

impl Mat3 {
    pub const fn from_columns(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    pub const fn identity() -> Self {
        Self::from_columns(Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z())
    }

    pub const fn diagonal(s: Vec3) -> Self {
        Self::from_columns(
            Vec3::new(s.x, 0.0, 0.0),
            Vec3::new(0.0, s.y, 0.0),
            Vec3::new(0.0, 0.0, s.z),
        )
    }

    pub fn rotation_x(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_columns(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, c, s),
            Vec3::new(0.0, -s, c),
        )
    }

    pub fn rotation_y(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_columns(
            Vec3::new(c, 0.0, -s),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(s, 0.0, c),
        )
    }

    pub fn rotation_z(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self::from_columns(
            Vec3::new(c, s, 0.0),
            Vec3::new(-s, c, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
    }

    /// Composite rotation from Euler angles (radians), applied X then Y then Z.
    pub fn rotation_xyz(euler: Vec3) -> Self {
        Self::rotation_z(euler.z) * Self::rotation_y(euler.y) * Self::rotation_x(euler.x)
    }

    pub fn row(&self, r: usize) -> Vec3 {
        Vec3::new(self.cols[0][r], self.cols[1][r], self.cols[2][r])
    }

    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }

    pub fn transpose(&self) -> Self {
        Self::from_columns(self.row(0), self.row(1), self.row(2))
    }

    pub fn determinant(&self) -> f64 {
        self.cols[0].dot(self.cols[1].cross(self.cols[2]))
    }

    /// General 3×3 inverse via the adjugate method. Panics on a singular matrix;
    /// the transforms this crate builds (rotation composed with nonzero scale)
    /// are never singular.
    pub fn inverse(&self) -> Self {
        let det = self.determinant();
        debug_assert!(det.abs() > 1e-12, "Mat3::inverse of a singular matrix");
        let inv_det = 1.0 / det;
        let r0 = self.cols[1].cross(self.cols[2]) * inv_det;
        let r1 = self.cols[2].cross(self.cols[0]) * inv_det;
        let r2 = self.cols[0].cross(self.cols[1]) * inv_det;
        // r0..r2 are the rows of the inverse; transpose into column-major storage.
        Self::from_columns(
            Vec3::new(r0.x, r1.x, r2.x),
            Vec3::new(r0.y, r1.y, r2.y),
            Vec3::new(r0.z, r1.z, r2.z),
        )
    }
}

impl Mul for Mat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::from_columns(
            self.mul_vec(rhs.cols[0]),
            self.mul_vec(rhs.cols[1]),
            self.mul_vec(rhs.cols[2]),
        )
    }
}

/// Builds an orthonormal basis (tangent, bitangent, normal) around a unit normal,
/// choosing the auxiliary axis least parallel to it to avoid a degenerate cross
/// product.
pub fn coordinate_system(normal: Vec3) -> Mat3 {
    let aux = if normal.x.abs() > 0.9 {
        Vec3::unit_y()
    } else {
        Vec3::unit_x()
    };
    let tangent = aux.cross(normal).normalized();
    let bitangent = normal.cross(tangent);
    Mat3::from_columns(tangent, normal, bitangent)
}
