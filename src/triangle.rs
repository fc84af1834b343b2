use crate::math::{Aabb, Point3, Ray, Vec3};
use rand::rngs::SmallRng;
use rand::Rng;

const EPSILON: f64 = 1e-6;

/// Precomputed triangle geometry: edge vectors, unit normal, area, and its own
/// bounding box. Vertex positions are stored here (not just indices) so the
/// intersection test and the acceleration-structure build never have to chase
/// a separate vertex buffer.
#[derive(Debug, Clone, Copy)]
pub struct TriangleGeom {
    pub v0: Point3,
    pub v1: Point3,
    pub v2: Point3,
    pub e1: Vec3,
    pub e2: Vec3,
    pub normal: Vec3,
    pub area: f64,
    pub bounds: Aabb,
}

impl TriangleGeom {
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let cross = e1.cross(e2);
        let area = cross.length() * 0.5;
        debug_assert!(area > 0.0, "degenerate zero-area triangle in mesh input");
        let normal = cross.normalized();
        let mut bounds = Aabb::empty();
        bounds.grow_point(v0);
        bounds.grow_point(v1);
        bounds.grow_point(v2);
        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal,
            area,
            bounds,
        }
    }

    /// Single-sided Möller–Trumbore intersection. Only front faces (the ray
    /// approaching against the normal) are accepted; back-face hits are
    /// rejected outright. Returns the hit distance and barycentric (u, v)
    /// weights for vertices v1 and v2 respectively (v0's weight is `1-u-v`).
    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<(f64, f64, f64)> {
        if self.normal.dot(ray.direction) >= -EPSILON {
            return None;
        }
        let pvec = ray.direction.cross(self.e2);
        let det = self.e1.dot(pvec);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = ray.origin - self.v0;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let qvec = tvec.cross(self.e1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = self.e2.dot(qvec) * inv_det;
        if t < t_min || t > t_max {
            return None;
        }
        Some((t, u, v))
    }

    /// Cheap AABB-vs-AABB overlap, used while building the octree.
    pub fn overlaps_aabb_fast(&self, node: &Aabb) -> bool {
        self.bounds.overlaps(node)
    }

    /// Exact separating-axis triangle/AABB overlap test (Akenine-Möller).
    /// Tests, in order: the nine edge-cross-axis separating axes, the cheap
    /// AABB reject, and the triangle's own plane against the box.
    pub fn overlaps_aabb_exact(&self, node: &Aabb) -> bool {
        let c = node.center();
        let h = node.half_size();
        let v0 = self.v0 - c;
        let v1 = self.v1 - c;
        let v2 = self.v2 - c;
        let e0 = v1 - v0;
        let e1 = v2 - v1;
        let e2 = v0 - v2;

        let edges = [e0, e1, e2];
        let verts = [v0, v1, v2];
        for axis in 0..3 {
            for e in &edges {
                let comp = [e[(axis + 1) % 3], e[(axis + 2) % 3]];
                let (fa, fb, cross_axis) = match axis {
                    0 => (comp[0].abs(), comp[1].abs(), Vec3::new(0.0, -e.z, e.y)),
                    1 => (comp[0].abs(), comp[1].abs(), Vec3::new(e.z, 0.0, -e.x)),
                    _ => (comp[0].abs(), comp[1].abs(), Vec3::new(-e.y, e.x, 0.0)),
                };
                let p0 = verts[0].dot(cross_axis);
                let p1 = verts[1].dot(cross_axis);
                let p2 = verts[2].dot(cross_axis);
                let min_p = p0.min(p1).min(p2);
                let max_p = p0.max(p1).max(p2);
                let rad = fa * h[(axis + 2) % 3] + fb * h[(axis + 1) % 3];
                if min_p > rad || max_p < -rad {
                    return false;
                }
            }
        }

        if !self.overlaps_aabb_fast(node) {
            return false;
        }

        let normal = self.normal;
        let mut vmin = Vec3::zero();
        let mut vmax = Vec3::zero();
        for axis in 0..3 {
            let vert_axis = v0[axis];
            if normal[axis] > 0.0 {
                vmin = set_axis(vmin, axis, -h[axis] - vert_axis);
                vmax = set_axis(vmax, axis, h[axis] - vert_axis);
            } else {
                vmin = set_axis(vmin, axis, h[axis] - vert_axis);
                vmax = set_axis(vmax, axis, -h[axis] - vert_axis);
            }
        }
        if normal.dot(vmin) > 0.0 {
            return false;
        }
        if normal.dot(vmax) < 0.0 {
            return false;
        }
        true
    }

    /// Uniform sample over the triangle's area via the standard
    /// square-root barycentric construction.
    pub fn random_area(&self, rng: &mut SmallRng) -> Point3 {
        let r1: f64 = rng.gen_range(0.0..1.0);
        let r2: f64 = rng.gen_range(0.0..1.0);
        let sqrt_r1 = r1.sqrt();
        let alpha = 1.0 - sqrt_r1;
        let beta = sqrt_r1 * (1.0 - r2);
        let gamma = sqrt_r1 * r2;
        self.v0 * alpha + self.v1 * beta + self.v2 * gamma
    }
}

fn set_axis(mut v: Vec3, axis: usize, value: f64) -> Vec3 {
    match axis {
        0 => v.x = value,
        1 => v.y = value,
        _ => v.z = value,
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_face_hit_reports_expected_t_and_normal() {
        let tri = TriangleGeom::new(
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(1.0, -1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        );
        // Approach from the side the precomputed normal faces, travelling
        // against it (the front-face convention), aimed at the centroid.
        let centroid = (tri.v0 + tri.v1 + tri.v2) * (1.0 / 3.0);
        let origin = centroid + tri.normal * 4.0;
        let ray = Ray::new(origin, -tri.normal);
        let hit = tri.intersect(&ray, 0.001, f64::INFINITY);
        assert!(hit.is_some());
        let (t, _, _) = hit.unwrap();
        assert!((t - 4.0).abs() < 1e-6);
    }

    #[test]
    fn back_face_is_rejected() {
        let tri = TriangleGeom::new(
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(1.0, -1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        );
        // A ray travelling in the same direction as the normal is, by
        // definition, striking the back face.
        let origin = tri.v0 - tri.normal * 5.0;
        let ray = Ray::new(origin, tri.normal);
        let hit = tri.intersect(&ray, 0.001, f64::INFINITY);
        assert!(hit.is_none());
    }

    #[test]
    fn exact_overlap_rejects_corner_hugging_false_positive() {
        let node = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(0.0, 0.0, 0.0));
        // A triangle whose AABB overlaps the node, but whose actual plane
        // passes entirely outside it (diagonal sliver near the far corner).
        let tri = TriangleGeom::new(
            Point3::new(-1.0, -1.0, 5.0),
            Point3::new(5.0, -1.0, -1.0),
            Point3::new(-1.0, 5.0, -1.0),
        );
        assert!(tri.overlaps_aabb_fast(&node));
        assert!(!tri.overlaps_aabb_exact(&node));
    }

    #[test]
    fn exact_overlap_accepts_triangle_needing_correct_edge_axis_radius() {
        // An anisotropic box (half-size (1, 1, 3)) paired with a triangle
        // whose edge-cross-axis radius depends on which box half-extent is
        // paired with which edge-component magnitude. Swapping that pairing
        // makes one of the nine edge-axis tests falsely report separation on
        // a triangle that does overlap the box.
        let node = Aabb::new(Point3::new(-1.0, -1.0, -3.0), Point3::new(1.0, 1.0, 3.0));
        let tri = TriangleGeom::new(
            Point3::new(3.2114196608918686, -3.7552801357315717, -3.7964331120523136),
            Point3::new(0.33129978234797264, 3.5131933022280846, -0.9503660984943005),
            Point3::new(-2.267204822955093, -0.6230673953382615, -3.7676736994010565),
        );
        assert!(tri.overlaps_aabb_exact(&node));
    }
}
