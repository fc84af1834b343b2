use crate::math::{Point3, Vec3};

/// A mesh vertex: position, accumulated shading normal, and texture coordinate.
///
/// The normal starts as the zero vector and is grown by summing the
/// un-normalized face normals of adjacent triangles at load time; a final
/// normalization pass runs once the mesh is fully populated.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3,
    pub normal: Vec3,
    pub uv: (f64, f64),
}

impl Vertex {
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            normal: Vec3::zero(),
            uv: (0.0, 0.0),
        }
    }

    pub fn with_normal_uv(position: Point3, normal: Vec3, uv: (f64, f64)) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn accumulate_normal(&mut self, n: Vec3) {
        self.normal += n;
    }

    pub fn normalize(&mut self) {
        if !self.normal.near_zero() {
            self.normal = self.normal.normalized();
        }
    }
}
