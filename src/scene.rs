use crate::material::Material;
use crate::math::{Aabb, Point3, Ray, Vec3};
use crate::mesh::{TriangleMesh, TriangleOctreeMesh};
use crate::pdf::ObjectSampler;
use crate::primitives::{Hit, Parallelogram, Sphere};
use crate::triangle::TriangleGeom;
use rand::rngs::SmallRng;

/// A scene object: tagged variant over the primitive/mesh case set, rather
/// than a trait-object hierarchy (the set is small and closed).
#[derive(Debug)]
pub enum Object {
    Sphere(Sphere),
    Parallelogram(Parallelogram),
    Mesh(TriangleMesh),
    OctreeMesh(TriangleOctreeMesh),
}

impl Object {
    pub fn material(&self) -> &Material {
        match self {
            Object::Sphere(s) => &s.material,
            Object::Parallelogram(p) => &p.material,
            Object::Mesh(m) => &m.material,
            Object::OctreeMesh(m) => &m.material,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Object::Sphere(s) => s.bounding_box(),
            Object::Parallelogram(p) => p.bounding_box(),
            Object::Mesh(m) => m.bounds(),
            Object::OctreeMesh(m) => m.bounds(),
        }
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<Hit<'_>> {
        match self {
            Object::Sphere(s) => s.intersect(ray, t_min, t_max),
            Object::Parallelogram(p) => p.intersect(ray, t_min, t_max),
            Object::Mesh(m) => mesh_hit(m.intersect(ray, t_min, t_max), &m.data, &m.material),
            Object::OctreeMesh(m) => mesh_hit(m.intersect(ray, t_min, t_max), &m.data, &m.material),
        }
    }

    /// Evaluated solid-angle PDF for sampling this object as a light from
    /// `from` toward `dir`, used by next-event estimation.
    pub fn pdf_value(&self, from: Point3, dir: Vec3) -> f64 {
        match self {
            Object::Sphere(s) => s.pdf_value(from, dir),
            Object::Parallelogram(p) => {
                let area = p.area();
                // Solid-angle conversion for a uniformly-area-sampled quad,
                // evaluated at the point the ray actually hits the plane.
                let denom = p.normal.dot(dir);
                if denom.abs() < 1e-8 {
                    return 0.0;
                }
                let t = p.normal.dot(p.origin - from) / denom;
                if t <= 0.0 {
                    return 0.0;
                }
                let distance_sq = t * t * dir.length_squared();
                let cosine = p.normal.dot(dir).abs() / dir.length();
                if cosine < 1e-8 {
                    return 0.0;
                }
                distance_sq / (cosine * area)
            }
            Object::Mesh(m) => {
                let ray = Ray::new(from, dir);
                mesh_pdf_value(m.data.total_area, &m.data.triangles, m.intersect(&ray, 1e-4, f64::INFINITY), dir)
            }
            Object::OctreeMesh(m) => {
                let ray = Ray::new(from, dir);
                mesh_pdf_value(m.data.total_area, &m.data.triangles, m.intersect(&ray, 1e-4, f64::INFINITY), dir)
            }
        }
    }

    /// Samples a direction from `from` toward this object, for next-event
    /// estimation and for [`crate::pdf::Pdf::Object`] indirect sampling.
    pub fn random_direction(&self, from: Point3, rng: &mut SmallRng) -> Vec3 {
        match self {
            Object::Sphere(s) => s.random_direction(from, rng),
            Object::Parallelogram(p) => (p.random_area(rng) - from).normalized(),
            Object::Mesh(m) => (m.data.sample_area(rng).0 - from).normalized(),
            Object::OctreeMesh(m) => (m.data.sample_area(rng).0 - from).normalized(),
        }
    }

    pub fn area_sampler(&self, rng: &mut SmallRng) -> ObjectSampler {
        match self {
            Object::Sphere(s) => s.area_sampler(),
            Object::Parallelogram(p) => p.area_sampler(rng),
            Object::Mesh(m) => {
                let (sample, normal) = m.data.sample_area(rng);
                ObjectSampler::Area { sample, normal, area: m.data.total_area }
            }
            Object::OctreeMesh(m) => {
                let (sample, normal) = m.data.sample_area(rng);
                ObjectSampler::Area { sample, normal, area: m.data.total_area }
            }
        }
    }
}

/// Solid-angle PDF for a mesh light: the ray from `from` toward `dir` is
/// intersected against the mesh's own triangles, then the hit triangle's
/// area-weighted selection probability collapses against its uniform
/// within-triangle density to `1/total_area`, converted to solid angle the
/// same way as a single-triangle or parallelogram light.
fn mesh_pdf_value(total_area: f64, triangles: &[TriangleGeom], hit: Option<(f64, f64, f64, usize)>, dir: Vec3) -> f64 {
    let Some((t, _, _, tri_index)) = hit else {
        return 0.0;
    };
    let geom = &triangles[tri_index];
    let distance_sq = t * t * dir.length_squared();
    let cosine = geom.normal.dot(dir).abs() / dir.length();
    if cosine < 1e-8 {
        return 0.0;
    }
    distance_sq / (cosine * total_area)
}

fn mesh_hit<'a>(
    raw: Option<(f64, f64, f64, usize)>,
    data: &crate::mesh::MeshData,
    material: &'a Material,
) -> Option<Hit<'a>> {
    let (t, u, v, tri_index) = raw?;
    let [i0, i1, i2] = data.triangle_indices[tri_index];
    let v0 = &data.vertices[i0];
    let v1 = &data.vertices[i1];
    let v2 = &data.vertices[i2];
    let w = 1.0 - u - v;
    let uv = (
        w * v0.uv.0 + u * v1.uv.0 + v * v2.uv.0,
        w * v0.uv.1 + u * v1.uv.1 + v * v2.uv.1,
    );
    let geom = &data.triangles[tri_index];
    Some(Hit {
        t,
        point: geom.v0 * w + geom.v1 * u + geom.v2 * v,
        // The face unit normal is returned, not the barycentric-interpolated
        // vertex normal; the interpolated form was tried and reverted.
        normal: geom.normal,
        uv,
        material,
    })
}

/// Background radiance sampled when a primary or bounce ray misses the scene.
#[derive(Debug, Clone)]
pub enum Sky {
    Solid(Vec3),
    Gradient { horizon: Vec3, zenith: Vec3 },
    Black,
}

impl Sky {
    pub fn sample(&self, ray: &Ray) -> Vec3 {
        match self {
            Sky::Solid(c) => *c,
            Sky::Black => Vec3::zero(),
            Sky::Gradient { horizon, zenith } => {
                let unit = ray.direction.normalized();
                let t = 0.5 * (unit.y + 1.0);
                horizon.lerp(*zenith, t)
            }
        }
    }
}

/// A flat list of scene objects; intersection is a linear search tightening
/// `t_max` as closer hits are found.
pub struct Scene {
    pub objects: Vec<Object>,
    pub background: Sky,
}

impl Scene {
    pub fn new(objects: Vec<Object>, background: Sky) -> Self {
        Self { objects, background }
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<(Hit<'_>, &Object)> {
        let mut closest = t_max;
        let mut best: Option<(Hit<'_>, &Object)> = None;
        for object in &self.objects {
            if let Some(hit) = object.intersect(ray, t_min, closest) {
                closest = hit.t;
                best = Some((hit, object));
            }
        }
        best
    }

    pub fn emitters(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter().filter(|o| o.material().emits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::Texture;

    #[test]
    fn brute_force_and_scene_intersect_agree() {
        let mat = Material::lambertian(Texture::constant(crate::math::Vec4::new(
            0.8, 0.8, 0.8, 1.0,
        )));
        let a = Sphere::new(Point3::new(-2.0, 0.0, 0.0), 1.0, mat.clone());
        let b = Sphere::new(Point3::new(2.0, 0.0, 0.0), 1.0, mat);
        let scene = Scene::new(vec![Object::Sphere(a), Object::Sphere(b)], Sky::Black);
        let ray = Ray::new(Point3::new(2.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let hit = scene.intersect(&ray, 0.001, f64::INFINITY);
        assert!(hit.is_some());
        let (h, _) = hit.unwrap();
        assert!((h.t - 4.0).abs() < 1e-9);
    }

    #[test]
    fn empty_scene_returns_background_only() {
        let scene = Scene::new(vec![], Sky::Solid(Vec3::zero()));
        let ray = Ray::new(Point3::zero(), Vec3::unit_z());
        assert!(scene.intersect(&ray, 0.001, f64::INFINITY).is_none());
        assert_eq!(scene.background.sample(&ray).x, 0.0);
    }
}
