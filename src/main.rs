//! # photon-tracer 🔬
//!
//! A physically-based Monte Carlo path tracer that renders 3D scenes directly
//! in your terminal using Unicode braille patterns and ANSI true-color escape codes.
//!
//! ## Architecture
//!
//! - **Geometry**: Sphere, Parallelogram, and octree-accelerated triangle meshes
//! - **Materials**: Lambertian diffuse surfaces and pure emitters
//! - **Integrator**: next-event estimation + cosine-weighted indirect bounces
//!   + Russian-roulette termination
//! - **Output modes**: Braille (2×4 subpixel), TrueColor, HalfBlock, ASCII
//!
//! ## Rendering equation
//!
//! ```text
//!   L_o(p, ω_o) = L_e(p, ω_o) + ∫_Ω f_r(p, ω_i, ω_o) · L_i(p, ω_i) · |cos θ_i| dω_i
//! ```

mod camera;
mod display;
mod error;
mod filters;
mod integrator;
mod material;
mod math;
mod mesh;
mod pdf;
mod ply;
mod presets;
mod primitives;
mod render;
mod scene;
mod scene_loader;
mod scene_text;
mod texture;
mod tile;
mod triangle;
mod vertex;

use anyhow::{Context, Result};
use camera::Camera;
use clap::Parser;
use display::{OutputMode, TerminalSink};
use integrator::{IntegratorConfig, RouletteOptions};
use presets::ScenePreset;
use render::{render, RenderConfig};
use scene::Scene;
use scene_loader::{load_scene, SceneLoadOptions};
use std::sync::atomic::AtomicBool;

/// photon-tracer — render 3D scenes in your terminal
#[derive(Parser, Debug)]
#[command(
    name = "photon-tracer",
    version,
    about = "A Monte Carlo path tracer that renders to your terminal 🦀",
    long_about = "Renders physically-based 3D scenes directly in your terminal using \
                  next-event estimation, cosine-weighted indirect sampling, and \
                  Russian-roulette path termination. Supports multiple output modes \
                  from high-res braille patterns to simple ASCII art.",
    after_help = "EXAMPLES:\n  \
                  photon-tracer --scene showcase --mode halfblock\n  \
                  photon-tracer --scene cornell --samples 200 --bounces 20\n  \
                  photon-tracer --scene-file room.scene --width 240 --height 120\n  \
                  photon-tracer --scene stress --samples 10 --save out.png"
)]
struct Cli {
    /// Built-in scene preset to render (ignored when --scene-file is given)
    #[arg(short, long, value_enum, default_value_t = ScenePreset::Showcase)]
    scene: ScenePreset,

    /// Load a textual scene-description file instead of a built-in preset
    #[arg(long)]
    scene_file: Option<String>,

    /// Vertical field of view in degrees, used only with --scene-file
    #[arg(long, default_value_t = 40.0)]
    vfov: f64,

    /// Maximum octree depth for mesh acceleration structures
    #[arg(long, default_value_t = 12)]
    octree_max_depth: usize,

    /// Max triangles per octree leaf before it subdivides further
    #[arg(long, default_value_t = 8)]
    octree_max_elements: usize,

    /// Image width in pixels
    #[arg(short = 'W', long, default_value_t = 120)]
    width: u32,

    /// Image height in pixels
    #[arg(short = 'H', long, default_value_t = 60)]
    height: u32,

    /// Size of the render worker pool
    #[arg(long, default_value_t = 8)]
    num_threads: usize,

    /// Tile width multiplier
    #[arg(long, default_value_t = 1.0)]
    dx_coef: f64,

    /// Tile height multiplier
    #[arg(long, default_value_t = 1.0)]
    dy_coef: f64,

    /// Samples per pixel (progressive passes) — higher reduces noise at the
    /// cost of render time. 10-50 for previews, 200+ for high quality.
    #[arg(long, default_value_t = 32)]
    samples: u32,

    /// Shadow rays cast per emitter per path vertex
    #[arg(long, default_value_t = 1)]
    shadow_rays: u32,

    /// Maximum path length after the primary hit. 8-16 is typically sufficient.
    #[arg(long, default_value_t = 8)]
    bounces: u32,

    /// Russian-roulette minimum survival probability
    #[arg(long, default_value_t = 0.05)]
    rr_min_p: f64,

    /// Russian-roulette maximum survival probability
    #[arg(long, default_value_t = 1.0)]
    rr_max_p: f64,

    /// Russian-roulette throughput-to-probability scale factor
    #[arg(long, default_value_t = 2.0)]
    rr_mul_factor: f64,

    /// Terminal output encoding mode
    #[arg(short, long, value_enum, default_value_t = CliOutputMode::Halfblock)]
    mode: CliOutputMode,

    /// Disable gamma correction (output linear radiance values directly)
    #[arg(long)]
    no_gamma: bool,

    /// Disable the median-filter denoising pass on the indirect channel
    #[arg(long)]
    no_denoise: bool,

    /// Save the final frame to this PNG path after rendering
    #[arg(short = 's', long)]
    save: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputMode {
    /// Unicode braille patterns — highest effective resolution (2×4 subpixel)
    Braille,
    /// Full-block characters with 24-bit true color
    Truecolor,
    /// Half-block characters (▀) — 2 vertical pixels per cell
    Halfblock,
    /// ASCII grayscale density ramp
    Ascii,
}

impl From<CliOutputMode> for OutputMode {
    fn from(m: CliOutputMode) -> Self {
        match m {
            CliOutputMode::Braille => OutputMode::Braille,
            CliOutputMode::Truecolor => OutputMode::TrueColor,
            CliOutputMode::Halfblock => OutputMode::HalfBlock,
            CliOutputMode::Ascii => OutputMode::Ascii,
        }
    }
}

fn print_header(scene_name: &str, config: &RenderConfig, mode: OutputMode) {
    let mode_name = match mode {
        OutputMode::Braille => "Braille (2×4 subpixel)",
        OutputMode::TrueColor => "TrueColor (24-bit)",
        OutputMode::HalfBlock => "HalfBlock (2× vertical)",
        OutputMode::Ascii => "ASCII grayscale",
    };
    eprintln!();
    eprintln!("  ╔═══════════════════════════════════════════════╗");
    eprintln!("  ║  photon-tracer 🔬  Terminal Path Tracer       ║");
    eprintln!("  ╚═══════════════════════════════════════════════╝");
    eprintln!();
    eprintln!("  Scene:      {scene_name}");
    eprintln!("  Resolution: {}×{} ({mode_name})", config.width, config.height);
    eprintln!("  Samples:    {} spp", config.samples);
    eprintln!("  Bounces:    {}", config.integrator.bounces);
    eprintln!();
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let (scene, camera, scene_name) = match &cli.scene_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scene file {path:?}"))?;
            let parsed = scene_text::parse(&text)
                .with_context(|| format!("failed to parse scene file {path:?}"))?;
            let options = SceneLoadOptions {
                aspect_ratio: cli.width as f64 / cli.height as f64,
                vfov_degrees: cli.vfov,
                octree_max_depth: cli.octree_max_depth,
                octree_max_elements: cli.octree_max_elements,
            };
            let loaded = load_scene(&parsed, &options)
                .with_context(|| format!("failed to load assets for scene file {path:?}"))?;
            tracing::info!(path = %path, objects = loaded.scene.objects.len(), "loaded scene file");
            (loaded.scene, Camera::new(loaded.camera_config), path.clone())
        }
        None => {
            let desc = cli.scene.build();
            let name = desc.name.to_string();
            let camera = Camera::new(desc.camera_config);
            tracing::info!(scene = %name, objects = desc.objects.len(), "built preset scene");
            (Scene::new(desc.objects, desc.background), camera, name)
        }
    };

    let config = RenderConfig {
        width: cli.width,
        height: cli.height,
        num_threads: cli.num_threads.max(1),
        dx_coef: cli.dx_coef,
        dy_coef: cli.dy_coef,
        samples: cli.samples,
        integrator: IntegratorConfig {
            shadow_rays: cli.shadow_rays as usize,
            bounces: cli.bounces as usize,
            roulette: RouletteOptions {
                min_p: cli.rr_min_p,
                max_p: cli.rr_max_p,
                mul_factor: cli.rr_mul_factor,
            },
        },
        gamma: !cli.no_gamma,
        apply_median_filter: !cli.no_denoise,
    };

    let mode: OutputMode = cli.mode.into();
    print_header(&scene_name, &config, mode);

    let mut sink = TerminalSink::new(mode);
    let cancelled = AtomicBool::new(false);

    let (buffers, stats) = render(&scene, &camera, &config, &mut sink, &cancelled);

    stats.print_summary();

    if let Some(path) = &cli.save {
        let combined = buffers.combined(&config, stats.samples.max(1) as f64);
        display::write_png(&combined, config.width, config.height, path)
            .with_context(|| format!("failed to save frame to {path:?}"))?;
        eprintln!("  Saved to {path}");
    }

    eprintln!();
    eprintln!("  Rendered with photon-tracer v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
