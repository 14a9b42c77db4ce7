use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use log::{ debug, info };

use whitted_tracer::camera::Camera;
use whitted_tracer::consts::{
    DEFAULT_BOUNCE_DEPTH, DEFAULT_FOV, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use whitted_tracer::envmap::Envmap;
use whitted_tracer::render::render;
use whitted_tracer::scene::Scene;

/// Renders a still image of an analytic sphere scene over an equirectangular
/// environment map.
#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    /// Environment map image (equirectangular, 3-channel)
    #[clap(short, long)]
    envmap: PathBuf,

    /// Scene description JSON; the built-in reference scene when omitted
    #[clap(short, long)]
    scene: Option<PathBuf>,

    /// Output PNG path; a timestamped name when omitted
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Image width in pixels
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Image height in pixels
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Vertical field of view in radians
    #[clap(long, default_value_t = DEFAULT_FOV)]
    fov: f32,

    /// Maximum reflection/refraction recursion depth
    #[clap(long, default_value_t = DEFAULT_BOUNCE_DEPTH)]
    depth: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    // A missing or malformed environment map aborts the run before any
    // rendering work; no partial image is ever produced.
    let envmap = Envmap::load(&args.envmap)
        .with_context(|| format!("loading environment map {}", args.envmap.display()))?;
    info!("environment map: {}x{}", envmap.width, envmap.height);

    let scene = match &args.scene {
        Some(path) => Scene::from_json(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => Scene::default(),
    };
    debug!(
        "scene: {} ring spheres, {} standalone spheres, {} lights",
        scene.ring.count,
        scene.spheres.len(),
        scene.lights.len()
    );

    let camera = Camera::new(args.width, args.height, args.fov);
    let image = render(&scene, &envmap, &camera, args.depth);

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "render_{}.png",
            Local::now().format("%Y-%m-%d_%H-%M-%S")
        ))
    });
    image
        .save(&output)
        .with_context(|| format!("saving {}", output.display()))?;
    info!("saved render to {}", output.display());

    Ok(())
}
