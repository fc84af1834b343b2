use crate::math::{Color, Point3};
use crate::pdf::Pdf;
use crate::texture::Texture;
use std::f64::consts::PI;

/// Tagged variant replacing the polymorphic `material` hierarchy: every
/// material in this renderer is either a diffuse (Lambertian) surface or a
/// pure emitter, a small, closed case set.
#[derive(Debug, Clone)]
pub enum Material {
    Lambertian { texture: Texture, pdf: Pdf },
    Emitter { texture: Texture },
}

impl Material {
    pub fn lambertian(texture: Texture) -> Self {
        Material::Lambertian {
            texture,
            pdf: Pdf::CosineHemisphere,
        }
    }

    pub fn emitter(texture: Texture) -> Self {
        Material::Emitter { texture }
    }

    pub fn emits(&self) -> bool {
        matches!(self, Material::Emitter { .. })
    }

    /// Whether a path continues past this hit (Lambertian) or terminates
    /// (Emitter — pure light sources don't scatter further).
    pub fn scatters(&self) -> bool {
        matches!(self, Material::Lambertian { .. })
    }

    pub fn emitted(&self, uv: (f64, f64), position: Point3) -> Color {
        match self {
            Material::Lambertian { .. } => Color::zero(),
            Material::Emitter { texture } => texture.value(uv, position).rgb(),
        }
    }

    /// `albedo / pi`, the Lambertian BRDF. Zero for emitters (never invoked
    /// on an emitter hit since emitters don't scatter).
    pub fn brdf(&self, uv: (f64, f64), position: Point3) -> Color {
        match self {
            Material::Lambertian { texture, .. } => texture.value(uv, position).rgb() * (1.0 / PI),
            Material::Emitter { .. } => Color::zero(),
        }
    }

    pub fn indirect_pdf(&self) -> Option<&Pdf> {
        match self {
            Material::Lambertian { pdf, .. } => Some(pdf),
            Material::Emitter { .. } => None,
        }
    }
}
