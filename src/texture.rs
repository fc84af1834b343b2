use crate::math::Vec4;
use std::sync::Arc;

/// A surface texture: either a flat color or an image lookup. Tagged variant
/// rather than a trait object, since the case set is small and closed.
#[derive(Debug, Clone)]
pub enum Texture {
    Constant(Vec4),
    Image {
        image: Arc<image::RgbImage>,
        /// Multiplier applied after the 0..1 pixel sample, used for
        /// HDR-boosted image-backed emitter textures.
        intensity: Vec4,
    },
}

impl Texture {
    pub fn constant(color: Vec4) -> Self {
        Texture::Constant(color)
    }

    pub fn image(image: Arc<image::RgbImage>, intensity: Vec4) -> Self {
        Texture::Image { image, intensity }
    }

    /// Samples the texture at the given uv (each in [0, 1]); the `_position`
    /// parameter exists so procedurally-defined textures could use world
    /// position as well, matching the original's `value(uv, position)` shape.
    pub fn value(&self, uv: (f64, f64), _position: crate::math::Point3) -> Vec4 {
        match self {
            Texture::Constant(c) => *c,
            Texture::Image { image, intensity } => {
                let (w, h) = image.dimensions();
                if w == 0 || h == 0 {
                    return Vec4::new(0.0, 0.0, 0.0, 1.0);
                }
                let x = (uv.0.clamp(0.0, 1.0) * (w - 1) as f64).round() as u32;
                let y = (uv.1.clamp(0.0, 1.0) * (h - 1) as f64).round() as u32;
                let px = image.get_pixel(x.min(w - 1), y.min(h - 1));
                let sample = Vec4::new(
                    px[0] as f64 / 255.0,
                    px[1] as f64 / 255.0,
                    px[2] as f64 / 255.0,
                    1.0,
                );
                sample * *intensity
            }
        }
    }
}
