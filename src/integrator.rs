use crate::material::Material;
use crate::math::{Color, Point3, Ray, Vec3};
use crate::scene::{Object, Scene};
use rand::rngs::SmallRng;
use rand::Rng;

const EPSILON: f64 = 1e-6;
const RAY_T_MIN: f64 = 1e-3;

/// Russian-roulette clamp and scale, user-configurable via the CLI / scene
/// options. Defaults match the textbook formulation (`alpha = 2`).
#[derive(Debug, Clone, Copy)]
pub struct RouletteOptions {
    pub min_p: f64,
    pub max_p: f64,
    pub mul_factor: f64,
}

impl Default for RouletteOptions {
    fn default() -> Self {
        Self {
            min_p: 0.0,
            max_p: 1.0,
            mul_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IntegratorConfig {
    pub shadow_rays: usize,
    pub bounces: usize,
    pub roulette: RouletteOptions,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            shadow_rays: 1,
            bounces: 8,
            roulette: RouletteOptions::default(),
        }
    }
}

/// Traces one primary ray and returns `(direct, indirect)`. Their sum is the
/// pixel estimate; keeping them separate lets a post-pass denoise only the
/// high-variance indirect channel.
///
/// Next-event estimation runs exactly once per path vertex, including the
/// primary hit, inside a single loop — not once before the loop and again at
/// the loop's first iteration for the same point.
pub fn cast_ray(ray: &Ray, scene: &Scene, config: &IntegratorConfig, rng: &mut SmallRng) -> (Color, Color) {
    let mut direct = Color::zero();
    let mut indirect = Color::zero();

    let Some((mut hit, mut object)) = scene.intersect(ray, RAY_T_MIN, f64::INFINITY) else {
        direct += scene.background.sample(ray);
        return (direct, indirect);
    };

    let le = object.material().emitted(hit.uv, hit.point);
    if !object.material().scatters() {
        direct += le;
        return (direct, indirect);
    }
    direct += le;

    let mut throughput = Color::ones();

    for bounce in 0..=config.bounces {
        let ld = next_event_estimation(
            scene,
            hit.point,
            hit.normal,
            object.material(),
            hit.uv,
            config.shadow_rays,
            rng,
        );
        if bounce == 0 {
            direct += ld;
        } else {
            indirect += throughput.hadamard(ld);
        }

        if bounce == config.bounces {
            break;
        }

        // Russian roulette: survive with probability p, compensating by
        // scaling throughput by 1/p to keep the estimator unbiased.
        let p = (config.roulette.mul_factor * max_component(throughput))
            .clamp(config.roulette.min_p, config.roulette.max_p);
        let u: f64 = rng.gen_range(0.0..1.0);
        if u >= p || p <= 0.0 {
            return (direct, indirect);
        }
        throughput /= p;

        let normal = hit.normal;
        let local_pdf = match object.material().indirect_pdf() {
            Some(pdf) => pdf,
            None => return (direct, indirect),
        };
        let sample = local_pdf.sample(hit.point, normal, rng);
        let cos_theta = sample.direction.dot(normal);
        if cos_theta <= 0.0 || sample.value <= 0.0 {
            return (direct, indirect);
        }
        let brdf = object.material().brdf(hit.uv, hit.point);
        throughput = throughput.hadamard(brdf) * (cos_theta / sample.value);

        let origin = hit.point + normal * EPSILON;
        let next_ray = Ray::new(origin, sample.direction);
        match scene.intersect(&next_ray, RAY_T_MIN, f64::INFINITY) {
            None => {
                indirect += throughput.hadamard(scene.background.sample(&next_ray));
                return (direct, indirect);
            }
            Some((next_hit, next_object)) => {
                if !next_object.material().scatters() {
                    // Emission was already captured by the next iteration's
                    // NEE owning this vertex; don't double-count it here.
                    break;
                }
                hit = next_hit;
                object = next_object;
            }
        }
    }

    (direct, indirect)
}

fn max_component(c: Color) -> f64 {
    c.x.max(c.y).max(c.z)
}

/// Samples every emitting object `shadow_rays` times, accumulating the
/// cosine-weighted, BRDF-weighted, PDF-divided contribution, then dividing by
/// the number of shadow rays actually cast (rays rejected by the cosine test
/// before tracing don't count).
fn next_event_estimation(
    scene: &Scene,
    point: Point3,
    normal: Vec3,
    material: &Material,
    uv: (f64, f64),
    shadow_rays: usize,
    rng: &mut SmallRng,
) -> Color {
    let mut ld = Color::zero();
    let mut cast_count = 0usize;
    let origin = point + normal * EPSILON;

    for emitter in scene.emitters() {
        for _ in 0..shadow_rays {
            let direction = emitter.random_direction(origin, rng);
            let cos_theta = normal.dot(direction);
            if cos_theta <= 0.0 {
                continue;
            }
            cast_count += 1;

            let shadow_ray = Ray::new(origin, direction);
            let Some((shadow_hit, hit_object)) = scene.intersect(&shadow_ray, RAY_T_MIN, f64::INFINITY) else {
                continue;
            };
            if !std::ptr::eq(hit_object, emitter) {
                continue;
            }
            let pdf = emitter.pdf_value(origin, direction);
            if pdf <= 0.0 {
                continue;
            }
            let le = hit_object.material().emitted(shadow_hit.uv, shadow_hit.point);
            let brdf = material.brdf(uv, point);
            ld += brdf.hadamard(le) * (cos_theta / pdf);
        }
    }

    if cast_count > 0 {
        ld / cast_count as f64
    } else {
        Color::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;
    use crate::primitives::Sphere;
    use crate::scene::Sky;
    use crate::texture::Texture;
    use rand::SeedableRng;

    #[test]
    fn pure_emitter_hit_directly_yields_zero_indirect() {
        let emitter = Material::emitter(Texture::constant(Vec4::new(3.0, 3.0, 3.0, 1.0)));
        let sphere = Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0, emitter);
        let scene = Scene::new(vec![Object::Sphere(sphere)], Sky::Black);
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let config = IntegratorConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let (direct, indirect) = cast_ray(&ray, &scene, &config, &mut rng);
        assert!(indirect.length_squared() < 1e-12);
        assert!(direct.x > 0.0);
    }

    #[test]
    fn empty_scene_returns_black_background_pixel() {
        let scene = Scene::new(vec![], Sky::Black);
        let ray = Ray::new(Point3::zero(), Vec3::unit_z());
        let config = IntegratorConfig::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let (direct, indirect) = cast_ray(&ray, &scene, &config, &mut rng);
        assert_eq!(direct.x, 0.0);
        assert_eq!(indirect.x, 0.0);
    }

    #[test]
    fn diffuse_sphere_under_white_background_receives_nonzero_indirect_light() {
        let lambertian = Material::lambertian(Texture::constant(Vec4::new(0.8, 0.8, 0.8, 1.0)));
        let sphere = Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0, lambertian);
        let scene = Scene::new(
            vec![Object::Sphere(sphere)],
            Sky::Solid(Color::new(1.0, 1.0, 1.0)),
        );
        let ray = Ray::new(Point3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));
        let config = IntegratorConfig {
            shadow_rays: 0,
            bounces: 4,
            roulette: RouletteOptions {
                min_p: 1.0,
                max_p: 1.0,
                mul_factor: 1.0,
            },
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let (direct, indirect) = cast_ray(&ray, &scene, &config, &mut rng);
        assert_eq!(direct.x, 0.0);
        assert!(indirect.x > 0.0);
    }
}
