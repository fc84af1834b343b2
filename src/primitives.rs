use crate::material::Material;
use crate::math::{Aabb, Point3, Ray, Vec3};
use crate::pdf::{uniform_cone_pdf, uniform_cone_sample, ObjectSampler};
use rand::rngs::SmallRng;
use rand::Rng;
use std::f64::consts::PI;

const EPSILON: f64 = 1e-6;

/// Intersection record. Callers only interpret the fields when an
/// intersection call returns `Some`.
pub struct Hit<'a> {
    pub t: f64,
    pub point: Point3,
    pub normal: Vec3,
    pub uv: (f64, f64),
    pub material: &'a Material,
}

/// A sphere light/surface. Texture coordinates follow the standard
/// spherical parameterization from the normalized hit position.
#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Point3, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        let r = Vec3::new(self.radius, self.radius, self.radius);
        Aabb::new(self.center - r, self.center + r)
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<Hit<'_>> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let mut root = (-half_b - sqrt_d) / a;
        if root < t_min || root > t_max {
            root = (-half_b + sqrt_d) / a;
            if root < t_min || root > t_max {
                return None;
            }
        }
        let point = ray.at(root);
        let normal = (point - self.center) / self.radius;
        Some(Hit {
            t: root,
            point,
            normal,
            uv: sphere_uv(normal),
            material: &self.material,
        })
    }

    pub fn area_sampler(&self) -> ObjectSampler {
        ObjectSampler::Sphere {
            center: self.center,
            radius: self.radius,
        }
    }

    pub fn pdf_value(&self, from: Point3, dir: Vec3) -> f64 {
        let d2 = (self.center - from).length_squared();
        if d2 <= self.radius * self.radius {
            return 1.0 / (4.0 * PI);
        }
        let cos_theta_max = (1.0 - self.radius * self.radius / d2).max(0.0).sqrt();
        let _ = dir;
        uniform_cone_pdf(cos_theta_max)
    }

    pub fn random_direction(&self, from: Point3, rng: &mut SmallRng) -> Vec3 {
        let d2 = (self.center - from).length_squared();
        let cos_theta_max = (1.0 - self.radius * self.radius / d2).max(0.0).sqrt();
        let r1: f64 = rng.gen_range(0.0..1.0);
        let r2: f64 = rng.gen_range(0.0..1.0);
        let local = uniform_cone_sample(r1, r2, cos_theta_max);
        crate::math::coordinate_system((self.center - from).normalized()).mul_vec(local)
    }
}

fn sphere_uv(p: Vec3) -> (f64, f64) {
    let u = 1.0 - (p.z.atan2(p.x) + PI) / (2.0 * PI);
    let v = (p.y.clamp(-1.0, 1.0).asin() + PI / 2.0) / PI;
    (u, v)
}

/// A parallelogram spanned by `origin + u*e1 + v*e2`, `u, v in [0, 1]`.
#[derive(Debug, Clone)]
pub struct Parallelogram {
    pub origin: Point3,
    pub e1: Vec3,
    pub e2: Vec3,
    pub normal: Vec3,
    pub material: Material,
}

impl Parallelogram {
    pub fn new(origin: Point3, e1: Vec3, e2: Vec3, material: Material) -> Self {
        let normal = e1.cross(e2).normalized();
        Self {
            origin,
            e1,
            e2,
            normal,
            material,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        let mut b = Aabb::empty();
        b.grow_point(self.origin);
        b.grow_point(self.origin + self.e1);
        b.grow_point(self.origin + self.e2);
        b.grow_point(self.origin + self.e1 + self.e2);
        // Guard against a degenerate zero-thickness box on an axis-aligned
        // quad, which would otherwise fail every slab test.
        let pad = Vec3::new(EPSILON, EPSILON, EPSILON);
        Aabb::new(b.min - pad, b.max + pad)
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<Hit<'_>> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = self.normal.dot(self.origin - ray.origin) / denom;
        if t < t_min || t > t_max {
            return None;
        }
        let p = ray.at(t) - self.origin;

        let cross = self.e1.cross(self.e2);
        let (ax, ay) = largest_component_axes(cross);
        let e1p = (self.e1[ax], self.e1[ay]);
        let e2p = (self.e2[ax], self.e2[ay]);
        let pp = (p[ax], p[ay]);
        let det = e1p.0 * e2p.1 - e1p.1 * e2p.0;
        if det.abs() < EPSILON {
            return None;
        }
        let u = (pp.0 * e2p.1 - pp.1 * e2p.0) / det;
        let v = (e1p.0 * pp.1 - e1p.1 * pp.0) / det;
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }

        Some(Hit {
            t,
            point: ray.at(t),
            normal: self.normal,
            uv: (u, v),
            material: &self.material,
        })
    }

    pub fn area(&self) -> f64 {
        self.e1.cross(self.e2).length()
    }

    pub fn random_area(&self, rng: &mut SmallRng) -> Point3 {
        let u: f64 = rng.gen_range(0.0..1.0);
        let v: f64 = rng.gen_range(0.0..1.0);
        self.origin + self.e1 * u + self.e2 * v
    }

    pub fn area_sampler(&self, rng: &mut SmallRng) -> ObjectSampler {
        ObjectSampler::Area {
            sample: self.random_area(rng),
            normal: self.normal,
            area: self.area(),
        }
    }
}

/// Picks the coordinate pair (as axis indices) from `e1 x e2` with the
/// strictly largest-magnitude component, avoiding divide-by-near-zero when
/// the parallelogram is axis-aligned.
fn largest_component_axes(cross: Vec3) -> (usize, usize) {
    let ax = cross.x.abs();
    let ay = cross.y.abs();
    let az = cross.z.abs();
    if ax >= ay && ax >= az {
        (1, 2)
    } else if ay >= ax && ay >= az {
        (0, 2)
    } else {
        (0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::Texture;

    fn white_lambertian() -> Material {
        Material::lambertian(Texture::constant(crate::math::Vec4::new(1.0, 1.0, 1.0, 1.0)))
    }

    #[test]
    fn sphere_nearer_root_preferred_over_farther() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0, white_lambertian());
        let ray = Ray::new(Point3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = sphere.intersect(&ray, 0.001, f64::INFINITY).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn parallelogram_rejects_outside_unit_square() {
        let quad = Parallelogram::new(
            Point3::new(-1.0, -1.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            white_lambertian(),
        );
        let miss_ray = Ray::new(Point3::new(5.0, 5.0, -1.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(quad.intersect(&miss_ray, 0.001, f64::INFINITY).is_none());

        let hit_ray = Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(quad.intersect(&hit_ray, 0.001, f64::INFINITY).is_some());
    }

    #[test]
    fn aabb_point_inside_is_always_hit() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let p = Point3::new(0.2, -0.3, 0.5);
        assert!(aabb.contains_point(p));
        for dir in [
            Vec3::new(1.0, 0.3, -0.2),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ] {
            let ray = Ray::new(p, dir.normalized());
            assert!(aabb.hit(&ray, 0.0, f64::INFINITY));
        }
    }
}
