use std::path::PathBuf;
use std::process;

use clap::{ Parser, ValueEnum };
use log::{ error, info, LevelFilter };

use phong_tracer::Result;
use phong_tracer::canvas::{ Canvas, ImageSink };
use phong_tracer::color::Color;
use phong_tracer::consts::OUT_FILE;
use phong_tracer::sampling::SamplingMethod;
use phong_tracer::scene::Scene;
use phong_tracer::tracer::SimpleRayTracer;

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum Sampling {
    Center,
    Grid,
    Jittered,
    Adaptive,
}

impl From<Sampling> for SamplingMethod {
    fn from(s: Sampling) -> Self {
        match s {
            Sampling::Center => SamplingMethod::Center,
            Sampling::Grid => SamplingMethod::Grid,
            Sampling::Jittered => SamplingMethod::Jittered,
            Sampling::Adaptive => SamplingMethod::Adaptive,
        }
    }
}

/// Renders a JSON scene description to a PPM image.
#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    /// The JSON scene description; must include a camera
    scene: PathBuf,

    /// Where to write the PPM image
    #[clap(short, long, default_value = OUT_FILE)]
    output: String,

    /// Thread count: 0 sequential, -1 data parallel, -2 automatic, N workers
    #[clap(short, long, allow_hyphen_values = true)]
    threads: Option<i32>,

    /// Overrides the scene's sampling method
    #[clap(long, value_enum)]
    sampling: Option<Sampling>,

    /// Rays per pixel side for --sampling (default 1)
    #[clap(long, requires = "sampling")]
    samples: Option<u32>,

    /// Draws a grid line every N pixels over the render
    #[clap(long)]
    grid: Option<usize>,

    /// Set the logging level
    #[clap(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn run(args: Args) -> Result<()> {
    let description = Scene::load(&args.scene)?;
    let scene = description.scene;

    let mut builder = match description.camera {
        Some(builder) => builder,
        None => return Err(phong_tracer::TracerError::Scene(
            format!("{} has no camera", args.scene.display())
        )),
    };

    if let Some(threads) = args.threads {
        builder = builder.threads(threads)?;
    }

    if let Some(sampling) = args.sampling {
        builder = builder.sampling(sampling.into(), args.samples.unwrap_or(1))?;
    }

    let camera = builder.build()?;
    let tracer = SimpleRayTracer::new(&scene);

    let (nx, ny) = camera.resolution();
    let mut canvas = Canvas::new(nx, ny);
    camera.render_into(&tracer, &mut canvas)?;

    if let Some(interval) = args.grid {
        canvas.draw_grid(interval, &Color::WHITE);
    }

    canvas.flush(&args.output)?;
    info!("saved render to {}", args.output);

    Ok(())
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.clone().into())
        .init();

    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}

#[test]
fn samples_need_a_sampling_method() {
    assert!(Args::try_parse_from(vec!["phong-tracer", "scene.json", "--samples", "4"])
        .is_err());

    let args = Args::try_parse_from(
        vec!["phong-tracer", "scene.json", "--sampling", "grid", "--samples", "4"]
    ).unwrap();
    assert_eq!(args.samples, Some(4));
    assert!(matches!(args.sampling, Some(Sampling::Grid)));
}

#[test]
fn negative_thread_counts_parse() {
    let args = Args::try_parse_from(vec!["phong-tracer", "scene.json", "-t", "-2"])
        .unwrap();
    assert_eq!(args.threads, Some(-2));
    assert_eq!(args.output, OUT_FILE);
}
