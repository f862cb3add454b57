use std::path::PathBuf;

use clap::Parser;
use indicatif::ProgressBar;
use lumen::{
    Camera, Material, Object, PathTracer, RenderSettings, Scene, cornell_box,
    geometry::{ScreenSize, WorldPoint, WorldVector},
    render,
    scene::Color,
};

/// Renders the Cornell box test scene (optionally with an OBJ mesh dropped
/// into it) to a PNG file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Samples per pixel.
    #[arg(long, default_value_t = 64)]
    samples: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 32)]
    tile_size: u32,

    /// Bounce depth at which Russian roulette starts.
    #[arg(long, default_value_t = 20)]
    min_bounces: u32,

    /// Hard recursion cap.
    #[arg(long, default_value_t = 30)]
    max_bounces: u32,

    /// Wavefront OBJ mesh to add to the scene, rendered matte white.
    #[arg(long)]
    obj: Option<PathBuf>,

    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut scene = cornell_box();
    if let Some(path) = &args.obj {
        let mesh = Object::from_obj(
            path,
            Material::opaque(Color::repeat(0.75), 10.0, 0.5, 0.06, 0.44),
        )?;
        log::info!("loaded {} with {} primitives", path.display(), mesh.primitives.len());
        scene.push_object(mesh);
    }
    scene.build_bvh();
    if let Some(bvh) = scene.bvh() {
        log::info!("{}", bvh.statistics());
    }

    let camera = Camera::builder()
        .center(WorldPoint::new(0.0, 0.0, -3.001))
        .forward(WorldVector::new(0.0, 0.0, 1.0))
        .up(WorldVector::new(0.0, -1.0, 0.0))
        .resolution(ScreenSize::new(args.width, args.height))
        .focal_length(1.0)
        .build();

    let settings = RenderSettings {
        tile_size: args.tile_size.try_into()?,
        sample_count: args.samples.try_into()?,
        seed: args.seed,
        tracer: PathTracer {
            min_bounces: args.min_bounces,
            max_bounces: args.max_bounces,
        },
    };

    let bar = ProgressBar::no_length();
    let mut render_progress = render(scene, camera, settings, |_| {}, {
        let bar = bar.clone();
        move |_| bar.inc(1)
    })?;
    bar.set_length(render_progress.progress().1 as u64);

    render_progress.wait();
    bar.finish();

    let image = render_progress.image().lock().expect("Poisoned lock!");
    image.save(&args.output)?;
    log::info!("saved {}", args.output.display());

    Ok(())
}
