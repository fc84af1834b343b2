use crate::camera::CameraConfig;
use crate::material::Material;
use crate::math::{Point3, Vec3, Vec4};
use crate::primitives::{Parallelogram, Sphere};
use crate::scene::{Object, Sky};
use crate::texture::Texture;
use rand::Rng;

/// A complete scene description bundling geometry, camera, and background.
/// Built-in presets let users render demonstration images without writing a
/// scene file.
pub struct SceneDescription {
    pub name: &'static str,
    pub objects: Vec<Object>,
    pub camera_config: CameraConfig,
    pub background: Sky,
}

/// Available built-in scene presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScenePreset {
    /// The classic "Ray Tracing in One Weekend" spheres scene — a random
    /// arrangement of diffuse spheres on a matte ground plane, lit by an
    /// overhead area light.
    Showcase,
    /// A Cornell box with parallelogram walls, an area light, and diffuse spheres.
    Cornell,
    /// A single diffuse sphere on a ground plane — useful for quick checks.
    Minimal,
    /// A gallery scene demonstrating spheres and parallelogram panels together.
    Gallery,
    /// A stress-test scene with many random spheres to exercise the linear
    /// scene intersect.
    Stress,
}

impl ScenePreset {
    pub fn build(self) -> SceneDescription {
        match self {
            ScenePreset::Showcase => build_showcase(),
            ScenePreset::Cornell => build_cornell(),
            ScenePreset::Minimal => build_minimal(),
            ScenePreset::Gallery => build_gallery(),
            ScenePreset::Stress => build_stress(),
        }
    }
}

fn lambertian(rgb: Vec3) -> Material {
    Material::lambertian(Texture::constant(Vec4::from_rgb(rgb, 1.0)))
}

fn emitter(rgb: Vec3, intensity: f64) -> Material {
    Material::emitter(Texture::constant(Vec4::from_rgb(rgb * intensity, 1.0)))
}

fn build_showcase() -> SceneDescription {
    let mut objects = Vec::new();
    let mut rng = rand::thread_rng();

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        lambertian(Vec3::new(0.5, 0.5, 0.5)),
    )));

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Vec3::new(0.7, 0.15, 0.15)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        lambertian(Vec3::new(0.35, 0.4, 0.45)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        lambertian(Vec3::new(0.6, 0.6, 0.65)),
    )));

    for a in -8..8 {
        for b in -8..8 {
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - Point3::new(4.0, 0.2, 0.0)).length() < 0.9
                || (center - Point3::new(-4.0, 0.2, 0.0)).length() < 0.9
                || (center - Point3::new(0.0, 0.2, 0.0)).length() < 0.9
            {
                continue;
            }
            let albedo = Vec3::new(
                rng.gen::<f64>() * rng.gen::<f64>(),
                rng.gen::<f64>() * rng.gen::<f64>(),
                rng.gen::<f64>() * rng.gen::<f64>(),
            );
            objects.push(Object::Sphere(Sphere::new(center, 0.2, lambertian(albedo))));
        }
    }

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, 14.0, 0.0),
        4.0,
        emitter(Vec3::new(1.0, 0.98, 0.92), 6.0),
    )));

    SceneDescription {
        name: "Showcase",
        objects,
        camera_config: CameraConfig {
            look_from: Point3::new(13.0, 2.0, 3.0),
            look_at: Point3::new(0.0, 0.5, 0.0),
            up: Vec3::unit_y(),
            vfov_degrees: 20.0,
            aspect_ratio: 2.0,
        },
        background: Sky::Gradient {
            horizon: Vec3::new(1.0, 1.0, 1.0),
            zenith: Vec3::new(0.5, 0.7, 1.0),
        },
    }
}

fn build_cornell() -> SceneDescription {
    let mut objects = Vec::new();

    let white = Vec3::new(0.73, 0.73, 0.73);
    let red = Vec3::new(0.65, 0.05, 0.05);
    let green = Vec3::new(0.12, 0.45, 0.15);

    // Floor
    objects.push(Object::Parallelogram(Parallelogram::new(
        Point3::new(-2.0, 0.0, -4.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
        lambertian(white),
    )));
    // Ceiling
    objects.push(Object::Parallelogram(Parallelogram::new(
        Point3::new(-2.0, 4.0, -4.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
        lambertian(white),
    )));
    // Back wall
    objects.push(Object::Parallelogram(Parallelogram::new(
        Point3::new(-2.0, 0.0, -4.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 4.0, 0.0),
        lambertian(white),
    )));
    // Left wall (red)
    objects.push(Object::Parallelogram(Parallelogram::new(
        Point3::new(-2.0, 0.0, -4.0),
        Vec3::new(0.0, 0.0, 4.0),
        Vec3::new(0.0, 4.0, 0.0),
        lambertian(red),
    )));
    // Right wall (green)
    objects.push(Object::Parallelogram(Parallelogram::new(
        Point3::new(2.0, 0.0, -4.0),
        Vec3::new(0.0, 0.0, 4.0),
        Vec3::new(0.0, 4.0, 0.0),
        lambertian(green),
    )));

    // Area light: a flattened sphere just under the ceiling (spheres are the
    // only emitter primitive the sampling core supports).
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, 3.6, -2.5),
        0.45,
        emitter(Vec3::new(1.0, 0.95, 0.85), 14.0),
    )));

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(-0.7, 0.6, -2.2),
        0.6,
        lambertian(Vec3::new(0.5, 0.5, 0.55)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.7, 0.45, -1.5),
        0.45,
        lambertian(Vec3::new(0.75, 0.75, 0.8)),
    )));

    SceneDescription {
        name: "Cornell Box",
        objects,
        camera_config: CameraConfig {
            look_from: Point3::new(0.0, 2.0, 3.5),
            look_at: Point3::new(0.0, 1.5, -2.0),
            up: Vec3::unit_y(),
            vfov_degrees: 50.0,
            aspect_ratio: 1.0,
        },
        background: Sky::Black,
    }
}

fn build_minimal() -> SceneDescription {
    let mut objects = Vec::new();

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, -100.5, -1.0),
        100.0,
        lambertian(Vec3::new(0.5, 0.5, 0.5)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, 0.5, -1.0),
        0.5,
        lambertian(Vec3::new(0.6, 0.6, 0.65)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(-1.2, 0.25, -0.5),
        0.25,
        lambertian(Vec3::new(0.9, 0.2, 0.1)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(1.0, 0.3, -0.8),
        0.3,
        lambertian(Vec3::new(0.2, 0.4, 0.9)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, 5.0, 1.0),
        1.5,
        emitter(Vec3::new(1.0, 1.0, 1.0), 5.0),
    )));

    SceneDescription {
        name: "Minimal",
        objects,
        camera_config: CameraConfig {
            look_from: Point3::new(0.0, 1.5, 2.0),
            look_at: Point3::new(0.0, 0.3, -1.0),
            up: Vec3::unit_y(),
            vfov_degrees: 40.0,
            aspect_ratio: 2.0,
        },
        background: Sky::Gradient {
            horizon: Vec3::new(1.0, 1.0, 1.0),
            zenith: Vec3::new(0.3, 0.5, 1.0),
        },
    }
}

/// Gallery scene — a ground plane, a backdrop panel, and a handful of
/// spheres lit by two floating area lights.
fn build_gallery() -> SceneDescription {
    let mut objects = Vec::new();

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        lambertian(Vec3::new(0.5, 0.5, 0.45)),
    )));

    objects.push(Object::Parallelogram(Parallelogram::new(
        Point3::new(-6.0, 0.0, -5.0),
        Vec3::new(12.0, 0.0, 0.0),
        Vec3::new(0.0, 6.0, 0.0),
        lambertian(Vec3::new(0.15, 0.15, 0.2)),
    )));

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, 1.0, -1.0),
        1.0,
        lambertian(Vec3::new(0.8, 0.8, 0.82)),
    )));

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(-2.8, 0.7, -0.5),
        0.7,
        lambertian(Vec3::new(0.95, 0.55, 0.15)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(2.8, 0.8, -0.8),
        0.8,
        lambertian(Vec3::new(0.9, 0.75, 0.6)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(-1.2, 0.3, 0.8),
        0.3,
        lambertian(Vec3::new(0.1, 0.4, 0.85)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(1.5, 0.25, 1.0),
        0.25,
        lambertian(Vec3::new(0.95, 0.95, 0.95)),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.8, 0.2, 0.5),
        0.2,
        lambertian(Vec3::new(0.8, 0.15, 0.5)),
    )));

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(-1.0, 3.5, -2.0),
        0.3,
        emitter(Vec3::new(1.0, 0.9, 0.7), 12.0),
    )));
    objects.push(Object::Sphere(Sphere::new(
        Point3::new(2.0, 2.5, 0.0),
        0.2,
        emitter(Vec3::new(0.5, 0.7, 1.0), 10.0),
    )));

    SceneDescription {
        name: "Gallery",
        objects,
        camera_config: CameraConfig {
            look_from: Point3::new(0.0, 2.5, 6.0),
            look_at: Point3::new(0.0, 0.8, -1.0),
            up: Vec3::unit_y(),
            vfov_degrees: 35.0,
            aspect_ratio: 16.0 / 9.0,
        },
        background: Sky::Gradient {
            horizon: Vec3::new(0.15, 0.15, 0.2),
            zenith: Vec3::new(0.02, 0.02, 0.08),
        },
    }
}

fn build_stress() -> SceneDescription {
    let mut objects = Vec::new();
    let mut rng = rand::thread_rng();

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        lambertian(Vec3::new(0.5, 0.5, 0.5)),
    )));

    for _ in 0..500 {
        let center = Point3::new(
            rng.gen_range(-15.0..15.0),
            rng.gen_range(0.1..0.4),
            rng.gen_range(-15.0..15.0),
        );
        let radius = rng.gen_range(0.08..0.35);
        let albedo = Vec3::new(rng.gen(), rng.gen(), rng.gen());
        objects.push(Object::Sphere(Sphere::new(center, radius, lambertian(albedo))));
    }

    objects.push(Object::Sphere(Sphere::new(
        Point3::new(0.0, 20.0, 0.0),
        5.0,
        emitter(Vec3::new(1.0, 0.95, 0.88), 4.0),
    )));

    SceneDescription {
        name: "Stress Test (500 spheres)",
        objects,
        camera_config: CameraConfig {
            look_from: Point3::new(10.0, 4.0, 10.0),
            look_at: Point3::zero(),
            up: Vec3::unit_y(),
            vfov_degrees: 30.0,
            aspect_ratio: 2.0,
        },
        background: Sky::Gradient {
            horizon: Vec3::new(1.0, 0.95, 0.88),
            zenith: Vec3::new(0.4, 0.6, 1.0),
        },
    }
}
