use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use splitwarp::{
    Camera, CameraRig, DisplaySurface, FrameInput, Mat4, RemoteConfig, RemoteSimulator, Size2,
    SoftwareRenderer, SplitConfig, SplitSession, Vec3,
};

const HOST_HZ: f64 = 60.0;
const EYE_HEIGHT: f32 = 1.6;
const HALF_IPD: f32 = 0.032;

#[derive(Parser, Debug)]
#[command(name = "splitwarp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the demo scene for a few frames and write the last composited frame as a PNG.
    Frame(FrameArgs),
    /// Run the pose latency path alone and print each tick's release.
    Poses(PosesArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Configuration JSON (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width in device pixels.
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Output height in device pixels.
    #[arg(long, default_value_t = 540)]
    height: u32,

    /// Render side-by-side stereo inside a presentation session.
    #[arg(long)]
    stereo: bool,

    /// Total local camera yaw reached on the last frame, in degrees (positive turns left).
    #[arg(long, default_value_t = 15.0, allow_negative_numbers = true)]
    yaw_deg: f32,

    /// Number of host frames to run.
    #[arg(long, default_value_t = 30)]
    ticks: u32,
}

#[derive(Parser, Debug)]
struct PosesArgs {
    /// Simulated round-trip latency in milliseconds.
    #[arg(long, default_value_t = 150.0, allow_negative_numbers = true)]
    latency_ms: f64,

    /// Remote tick rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Number of host frames to run (at 60 Hz).
    #[arg(long, default_value_t = 20)]
    ticks: u32,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Poses(args) => cmd_poses(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn host_time_ms(tick: u32) -> f64 {
    f64::from(tick) * 1000.0 / HOST_HZ
}

fn head_world(yaw_deg: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, EYE_HEIGHT, 0.0))
        * Mat4::from_rotation_y(yaw_deg.to_radians())
}

fn local_rig(stereo: bool, width: u32, height: u32, yaw_deg: f32) -> CameraRig {
    let world = head_world(yaw_deg);
    if !stereo {
        let aspect = width as f32 / height as f32;
        return CameraRig::Single(Camera::perspective(80.0, aspect, 0.1, 1000.0).with_world(world));
    }
    let eye_aspect = (width / 2).max(1) as f32 / height as f32;
    let eye = Camera::perspective(90.0, eye_aspect, 0.1, 1000.0);
    CameraRig::array(
        eye.with_world(world),
        [-HALF_IPD, HALF_IPD]
            .map(|dx| eye.with_world(world * Mat4::from_translation(Vec3::new(dx, 0.0, 0.0)))),
    )
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => SplitConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => SplitConfig::default(),
    };

    let initial = local_rig(args.stereo, args.width, args.height, 0.0);
    let surface = DisplaySurface::new(f64::from(args.width), f64::from(args.height), 1.0);
    let mut session = SplitSession::bind(
        SoftwareRenderer::demo(),
        config,
        surface,
        Some(*initial.head()),
    )
    .context("bind split session")?;
    if args.stereo {
        session.start_presentation(Some(Size2::new(args.width, args.height)));
    }

    let ticks = args.ticks.max(1);
    for i in 0..ticks {
        let yaw = if ticks > 1 {
            args.yaw_deg * i as f32 / (ticks - 1) as f32
        } else {
            args.yaw_deg
        };
        let rig = local_rig(args.stereo, args.width, args.height, yaw);
        session.tick(host_time_ms(i), rig.head().world);
        let stats = session.render_frame(FrameInput {
            rig: &rig,
            destination: None,
        })?;
        tracing::info!(
            frame = stats.frame,
            mode = ?stats.mode,
            reprojected_eyes = stats.reprojected_eyes,
            stretched_px = stats.stretched_px,
            "frame composed"
        );
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    session
        .backbuffer()
        .to_rgba_image()?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_poses(args: PosesArgs) -> anyhow::Result<()> {
    let cfg = RemoteConfig {
        fps: args.fps,
        latency_ms: args.latency_ms,
        ..RemoteConfig::default()
    };
    let mut remote = RemoteSimulator::new(&cfg, Camera::perspective(80.0, 1.0, 0.1, 1000.0));
    println!(
        "latency {} ms, remote {} fps, holding {} poses",
        remote.latency_ms(),
        remote.fps(),
        remote.buffer().capacity()
    );

    for i in 0..args.ticks {
        let fired_before = remote.fired_ticks();
        let released = remote.tick(host_time_ms(i), head_world(i as f32));
        let tick = i + 1;
        match released {
            Some(rec) => println!("tick {tick}: released capture {}", rec.seq + 1),
            None if remote.fired_ticks() == fired_before => println!("tick {tick}: throttled"),
            None => println!("tick {tick}: holding {}", remote.buffer().len()),
        }
    }
    Ok(())
}
