//! The tiled, multi-pass render driver: partitions the image via
//! [`crate::tile::schedule_tiles`], dispatches one `std::thread::scope` of
//! workers per sample pass (the compute barrier), merges their tile-local
//! buffers into the shared accumulators, then pushes the averaged,
//! gamma-corrected frame to a [`DisplaySink`] (the display barrier).

use crate::camera::Camera;
use crate::filters::{median_filter, ColorGrid};
use crate::integrator::{cast_ray, IntegratorConfig};
use crate::math::Color;
use crate::scene::Scene;
use crate::tile::{schedule_tiles, Tile};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub num_threads: usize,
    pub dx_coef: f64,
    pub dy_coef: f64,
    pub samples: u32,
    pub integrator: IntegratorConfig,
    pub gamma: bool,
    pub apply_median_filter: bool,
}

/// The direct and indirect accumulators, kept separate so a post-pass can
/// denoise only the high-variance indirect channel.
pub struct SampleBuffers {
    pub width: usize,
    pub height: usize,
    pub direct: Vec<Color>,
    pub indirect: Vec<Color>,
}

impl SampleBuffers {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            direct: vec![Color::zero(); width * height],
            indirect: vec![Color::zero(); width * height],
        }
    }

    /// The displayed/exported frame: `median_filter(indirect) + direct`
    /// (applied consistently, unlike the buffer policy the original leaves
    /// inconsistent between its filtered-but-discarded and displayed paths),
    /// averaged over `sample_count` passes, NaN-scrubbed, gamma-corrected and
    /// clamped to [0, 1].
    pub fn combined(&self, config: &RenderConfig, sample_count: f64) -> Vec<Color> {
        let indirect_source: Vec<Color> = if config.apply_median_filter {
            let grid = ColorGrid {
                width: self.width,
                height: self.height,
                pixels: &self.indirect,
            };
            let mut filtered = vec![Color::zero(); self.width * self.height];
            median_filter(&grid, &mut filtered);
            filtered
        } else {
            self.indirect.clone()
        };

        self.direct
            .iter()
            .zip(indirect_source.iter())
            .map(|(&d, &i)| {
                let mut c = ((d + i) / sample_count).nan_to_zero();
                if config.gamma {
                    c = c.gamma_correct();
                }
                c.saturate()
            })
            .collect()
    }
}

pub struct RenderStats {
    pub total_rays: u64,
    pub elapsed_secs: f64,
    pub width: u32,
    pub height: u32,
    pub samples: u32,
}

impl RenderStats {
    pub fn mrays_per_sec(&self) -> f64 {
        self.total_rays as f64 / self.elapsed_secs / 1e6
    }

    pub fn print_summary(&self) {
        let bar_width = 30;
        let fill = "━".repeat(bar_width);
        eprintln!("  {fill}");
        eprintln!("  Time:     {:.2}s", self.elapsed_secs);
        eprintln!("  Rays:     {:.2}M total", self.total_rays as f64 / 1e6);
        eprintln!("  Speed:    {:.2} Mrays/s", self.mrays_per_sec());
        eprintln!("  Image:    {}×{} @ {} spp", self.width, self.height, self.samples);
        eprintln!("  {fill}");
    }
}

/// A pixel sink: a terminal renderer, a PNG encoder, or (in tests) an
/// in-memory capture. `update` receives one full, display-ready frame per
/// sample pass so the sink can show progressive refinement.
pub trait DisplaySink {
    fn closed(&self) -> bool {
        false
    }
    fn update(&mut self, frame: &[Color], width: u32, height: u32);
}

fn worker_seed(pass: u32, worker_index: usize) -> u64 {
    ((pass as u64) << 32) | worker_index as u64
}

fn render_tile(
    tile: &Tile,
    scene: &Scene,
    camera: &Camera,
    integrator: &IntegratorConfig,
    image_width: usize,
    image_height: usize,
    rng: &mut SmallRng,
) -> (Vec<Color>, Vec<Color>) {
    let mut direct = vec![Color::zero(); tile.width * tile.height];
    let mut indirect = vec![Color::zero(); tile.width * tile.height];

    for ty in 0..tile.height {
        for tx in 0..tile.width {
            let px = tile.x + tx;
            let py = tile.y + ty;
            let jitter_x: f64 = rng.gen_range(0.0..1.0);
            let jitter_y: f64 = rng.gen_range(0.0..1.0);
            let ndc_x = 2.0 * ((px as f64 + jitter_x) / image_width as f64) - 1.0;
            let ndc_y = 1.0 - 2.0 * ((py as f64 + jitter_y) / image_height as f64);
            let ray = camera.get_ray(ndc_x, ndc_y);
            let (d, i) = cast_ray(&ray, scene, integrator, rng);
            let local = ty * tile.width + tx;
            direct[local] = d;
            indirect[local] = i;
        }
    }
    (direct, indirect)
}

/// Runs `config.samples` progressive passes, returning the final buffers and
/// aggregate statistics. `cancelled` is polled once per pass (tile-boundary
/// granularity, per the cooperative-cancellation contract); a set flag or a
/// closed sink both end the render early with whatever has accumulated so far.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    sink: &mut dyn DisplaySink,
    cancelled: &AtomicBool,
) -> (SampleBuffers, RenderStats) {
    let w = config.width as usize;
    let h = config.height as usize;
    let mut buffers = SampleBuffers::new(w, h);

    let tile_width = ((config.dx_coef * w as f64) / config.num_threads as f64).round().max(1.0) as usize;
    let tile_height = ((config.dy_coef * h as f64) / config.num_threads as f64).round().max(1.0) as usize;
    let per_thread_tiles = schedule_tiles(w, h, tile_width, tile_height, config.num_threads);

    let t0 = Instant::now();
    let mut passes_completed = 0u32;

    for pass in 0..config.samples {
        if cancelled.load(Ordering::Relaxed) || sink.closed() {
            break;
        }

        // Compute barrier: every worker owns a private buffer for its
        // assigned (non-overlapping) tiles; `thread::scope` joins all of them
        // before any result is merged, so the merge below never races.
        let worker_results: Vec<Vec<(Tile, Vec<Color>, Vec<Color>)>> = std::thread::scope(|scope| {
            let handles: Vec<_> = per_thread_tiles
                .iter()
                .enumerate()
                .map(|(worker_index, tiles)| {
                    let tiles = tiles.clone();
                    scope.spawn(move || {
                        let mut rng = SmallRng::seed_from_u64(worker_seed(pass, worker_index));
                        tiles
                            .into_iter()
                            .map(|tile| {
                                let (d, i) = render_tile(&tile, scene, camera, &config.integrator, w, h, &mut rng);
                                (tile, d, i)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("render worker thread panicked"))
                .collect()
        });

        for tiles in worker_results {
            for (tile, tile_direct, tile_indirect) in tiles {
                for ty in 0..tile.height {
                    for tx in 0..tile.width {
                        let local = ty * tile.width + tx;
                        let global = (tile.y + ty) * w + (tile.x + tx);
                        buffers.direct[global] += tile_direct[local];
                        buffers.indirect[global] += tile_indirect[local];
                    }
                }
            }
        }

        passes_completed += 1;

        // Display barrier: push the averaged, gamma-corrected frame so far.
        let combined = buffers.combined(config, passes_completed as f64);
        sink.update(&combined, config.width, config.height);

        tracing::debug!(pass, elapsed_ms = t0.elapsed().as_millis() as u64, "sample pass complete");
    }

    let elapsed = t0.elapsed();
    let total_rays = w as u64
        * h as u64
        * passes_completed as u64
        * (1 + config.integrator.shadow_rays as u64 * config.integrator.bounces as u64);

    let stats = RenderStats {
        total_rays,
        elapsed_secs: elapsed.as_secs_f64().max(f64::EPSILON),
        width: config.width,
        height: config.height,
        samples: passes_completed,
    };
    (buffers, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::math::{Point3, Vec3};
    use crate::scene::Sky;

    struct CapturingSink {
        last_frame: Vec<Color>,
        calls: usize,
    }

    impl DisplaySink for CapturingSink {
        fn update(&mut self, frame: &[Color], _width: u32, _height: u32) {
            self.last_frame = frame.to_vec();
            self.calls += 1;
        }
    }

    #[test]
    fn render_drives_one_display_update_per_sample_pass() {
        let scene = Scene::new(vec![], Sky::Solid(Vec3::new(0.2, 0.3, 0.4)));
        let camera = Camera::new(CameraConfig {
            look_from: Point3::new(0.0, 0.0, -5.0),
            look_at: Point3::zero(),
            up: Vec3::unit_y(),
            aspect_ratio: 1.0,
            vfov_degrees: 40.0,
        });
        let config = RenderConfig {
            width: 4,
            height: 4,
            num_threads: 2,
            dx_coef: 1.0,
            dy_coef: 1.0,
            samples: 3,
            integrator: IntegratorConfig::default(),
            gamma: true,
            apply_median_filter: false,
        };
        let mut sink = CapturingSink {
            last_frame: Vec::new(),
            calls: 0,
        };
        let cancelled = AtomicBool::new(false);
        let (buffers, stats) = render(&scene, &camera, &config, &mut sink, &cancelled);

        assert_eq!(sink.calls, 3);
        assert_eq!(stats.samples, 3);
        assert_eq!(buffers.direct.len(), 16);
        // Background-only scene: every pixel should end up with nonzero color.
        assert!(sink.last_frame.iter().all(|c| c.x > 0.0));
    }

    #[test]
    fn cancellation_stops_the_render_early() {
        let scene = Scene::new(vec![], Sky::Black);
        let camera = Camera::new(CameraConfig::default());
        let config = RenderConfig {
            width: 4,
            height: 4,
            num_threads: 1,
            dx_coef: 1.0,
            dy_coef: 1.0,
            samples: 10,
            integrator: IntegratorConfig::default(),
            gamma: false,
            apply_median_filter: false,
        };
        let mut sink = CapturingSink {
            last_frame: Vec::new(),
            calls: 0,
        };
        let cancelled = AtomicBool::new(true);
        let (_, stats) = render(&scene, &camera, &config, &mut sink, &cancelled);
        assert_eq!(stats.samples, 0);
    }
}
