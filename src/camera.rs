use crate::math::{Point3, Ray, Vec3};

/// A pinhole camera: orthonormal basis built from (position, look-at, up,
/// aspect ratio, vertical FOV), and three precomputed vectors (u, v, w) so a
/// primary ray for NDC (x, y) in [-1, 1]^2 is just
/// `(position, normalize(x*u + y*v + w))`. No lens/aperture term — depth of
/// field is out of scope.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub look_from: Point3,
    pub look_at: Point3,
    pub up: Vec3,
    pub aspect_ratio: f64,
    pub vfov_degrees: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Point3::new(0.0, 0.0, -5.0),
            look_at: Point3::zero(),
            up: Vec3::unit_y(),
            aspect_ratio: 16.0 / 9.0,
            vfov_degrees: 40.0,
        }
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let z = (config.look_at - config.look_from).normalized();
        let x = config.up.cross(z).normalized();
        let y = z.cross(x);
        let theta = config.vfov_degrees.to_radians();
        let u = x * config.aspect_ratio;
        let v = y;
        let w = z * (config.aspect_ratio / (theta / 2.0).tan());
        Self {
            position: config.look_from,
            u,
            v,
            w,
        }
    }

    /// Generates a primary ray for normalized device coordinates in [-1, 1]^2.
    pub fn get_ray(&self, ndc_x: f64, ndc_y: f64) -> Ray {
        let direction = (self.u * ndc_x + self.v * ndc_y + self.w).normalized();
        Ray::new(self.position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_at_ndc_origin_points_toward_look_at() {
        let cfg = CameraConfig {
            look_from: Point3::new(0.0, 0.0, -5.0),
            look_at: Point3::zero(),
            up: Vec3::unit_y(),
            aspect_ratio: 1.0,
            vfov_degrees: 40.0,
        };
        let cam = Camera::new(cfg);
        let ray = cam.get_ray(0.0, 0.0);
        let expected = (cfg.look_at - cfg.look_from).normalized();
        assert!((ray.direction.dot(expected) - 1.0).abs() < 1e-9);
    }
}
