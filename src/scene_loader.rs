//! Resolves a [`crate::scene_text::ParsedScene`] into a runnable [`Scene`] and
//! [`CameraConfig`] by loading every referenced texture/mesh file. Replaces
//! the original's process-wide mesh registry with an owned store: every mesh
//! literal's `Arc<MeshData>` lives in `LoadedScene` for as long as the scene
//! objects borrowing it do.

use crate::camera::CameraConfig;
use crate::error::{AssetLoadError, MeshLoadError};
use crate::material::Material;
use crate::math::{Point3, Vec3, Vec4};
use crate::mesh::{MeshTransform, TriangleMesh, TriangleOctreeMesh};
use crate::ply;
use crate::scene::{Object, Scene, Sky};
use crate::scene_text::{BackgroundSpec, LiteralDef, ObjectStmt, ParsedScene};
use crate::texture::Texture;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
enum Literal {
    Texture(Texture),
    MeshData(Arc<crate::mesh::MeshData>),
    Material(Material),
}

pub struct SceneLoadOptions {
    pub aspect_ratio: f64,
    pub vfov_degrees: f64,
    pub octree_max_depth: usize,
    pub octree_max_elements: usize,
}

pub struct LoadedScene {
    pub scene: Scene,
    pub camera_config: CameraConfig,
}

pub fn load_scene(parsed: &ParsedScene, options: &SceneLoadOptions) -> Result<LoadedScene, AssetLoadError> {
    let mut literals: HashMap<String, Literal> = HashMap::new();

    for (name, def) in &parsed.literals {
        let resolved = match def {
            LiteralDef::ConstantTexture { rgb } => {
                Literal::Texture(Texture::constant(Vec4::from_rgb(Vec3::new(rgb.0, rgb.1, rgb.2), 1.0)))
            }
            LiteralDef::ImageTexture { path, intensity } => {
                let image = image::open(path)
                    .map_err(|source| AssetLoadError::Image {
                        path: path.clone(),
                        source,
                    })?
                    .to_rgb8();
                Literal::Texture(Texture::image(
                    Arc::new(image),
                    Vec4::from_rgb(Vec3::new(intensity.0, intensity.1, intensity.2), 1.0),
                ))
            }
            LiteralDef::MeshData { path, transform } => {
                let text = std::fs::read_to_string(path).map_err(|source| AssetLoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                let builder = ply::load_ascii_ply(&text).map_err(|source| AssetLoadError::Mesh {
                    path: path.clone(),
                    source,
                })?;
                let mesh_transform = MeshTransform {
                    position: Point3::new(transform.position.0, transform.position.1, transform.position.2),
                    rotation_euler: Vec3::new(
                        transform.rotation_euler_degrees.0.to_radians(),
                        transform.rotation_euler_degrees.1.to_radians(),
                        transform.rotation_euler_degrees.2.to_radians(),
                    ),
                    scale: Vec3::new(transform.scale.0, transform.scale.1, transform.scale.2),
                };
                let data = builder.finalize(&mesh_transform).ok_or_else(|| AssetLoadError::Mesh {
                    path: path.clone(),
                    source: MeshLoadError::MalformedHeader("degenerate mesh (zero triangles or vertices)".into()),
                })?;
                Literal::MeshData(Arc::new(data))
            }
            LiteralDef::Material { texture_literal } => {
                let texture = texture_of(&literals, texture_literal);
                Literal::Material(Material::lambertian(texture))
            }
        };
        literals.insert(name.clone(), resolved);
    }

    let mut objects = Vec::with_capacity(parsed.objects.len());
    for stmt in &parsed.objects {
        match stmt {
            ObjectStmt::Mesh {
                meshdata_literal,
                material_literal,
            } => {
                let data = mesh_of(&literals, meshdata_literal);
                let material = material_of(&literals, material_literal);
                objects.push(Object::Mesh(TriangleMesh::new(data, material)));
            }
            ObjectStmt::OctreeMesh {
                meshdata_literal,
                material_literal,
            } => {
                let data = mesh_of(&literals, meshdata_literal);
                let material = material_of(&literals, material_literal);
                objects.push(Object::OctreeMesh(TriangleOctreeMesh::build(
                    data,
                    options.octree_max_depth,
                    options.octree_max_elements,
                    material,
                )));
            }
            ObjectStmt::Light {
                center,
                radius,
                texture_literal,
            } => {
                let texture = texture_of(&literals, texture_literal);
                let material = Material::emitter(texture);
                let sphere = crate::primitives::Sphere::new(
                    Point3::new(center.0, center.1, center.2),
                    *radius,
                    material,
                );
                objects.push(Object::Sphere(sphere));
            }
        }
    }

    let background = match &parsed.background {
        None => Sky::Black,
        Some(BackgroundSpec::Solid(rgb)) => Sky::Solid(Vec3::new(rgb.0, rgb.1, rgb.2)),
        Some(BackgroundSpec::Gradient { horizon, zenith }) => Sky::Gradient {
            horizon: Vec3::new(horizon.0, horizon.1, horizon.2),
            zenith: Vec3::new(zenith.0, zenith.1, zenith.2),
        },
    };

    let camera_spec = parsed.camera.expect("scene_text::parse guarantees a Camera statement");
    let camera_config = CameraConfig {
        look_from: Point3::new(camera_spec.look_from.0, camera_spec.look_from.1, camera_spec.look_from.2),
        look_at: Point3::new(camera_spec.look_at.0, camera_spec.look_at.1, camera_spec.look_at.2),
        up: Vec3::new(camera_spec.up.0, camera_spec.up.1, camera_spec.up.2),
        aspect_ratio: options.aspect_ratio,
        vfov_degrees: options.vfov_degrees,
    };

    Ok(LoadedScene {
        scene: Scene::new(objects, background),
        camera_config,
    })
}

fn texture_of(literals: &HashMap<String, Literal>, name: &str) -> Texture {
    match literals.get(name) {
        Some(Literal::Texture(t)) => t.clone(),
        _ => unreachable!("scene_text::parse guarantees {name:?} resolves to a texture literal"),
    }
}

fn mesh_of(literals: &HashMap<String, Literal>, name: &str) -> Arc<crate::mesh::MeshData> {
    match literals.get(name) {
        Some(Literal::MeshData(m)) => m.clone(),
        _ => unreachable!("scene_text::parse guarantees {name:?} resolves to a mesh-data literal"),
    }
}

fn material_of(literals: &HashMap<String, Literal>, name: &str) -> Material {
    match literals.get(name) {
        Some(Literal::Material(m)) => m.clone(),
        _ => unreachable!("scene_text::parse guarantees {name:?} resolves to a material literal"),
    }
}
