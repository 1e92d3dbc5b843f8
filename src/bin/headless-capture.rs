use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use headless_capture::{
    Capture, CaptureRequest, EngineCommand, ImageDescriptor, InvocationMode,
    Orientation, ProcessRunner,
};

#[derive(Parser, Debug)]
#[command(name = "headless-capture", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pipe a scene file to the engine and save the rendered image.
    Piped(PipedArgs),
    /// Render the engine's built-in scene and save the image.
    Builtin(BuiltinArgs),
    /// Run a capture described by a JSON job file.
    Job(JobArgs),
    /// Decode a previously captured engine output dump without running the engine.
    Split(SplitArgs),
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Source rows are top-down (the engine default is bottom-up).
    #[arg(long, default_value_t = false)]
    top_down: bool,

    /// Bytes per source row (0 = tightly packed).
    #[arg(long, default_value_t = 0)]
    stride: usize,

    /// Print the SHA-256 of the decoded raster.
    #[arg(long, default_value_t = false)]
    digest: bool,
}

impl LayoutArgs {
    fn descriptor(&self, width: u32, height: u32) -> anyhow::Result<ImageDescriptor> {
        let orientation = if self.top_down {
            Orientation::TopDown
        } else {
            Orientation::BottomUp
        };
        Ok(ImageDescriptor::rgb8(width, height)?
            .with_stride(self.stride)?
            .with_orientation(orientation))
    }
}

#[derive(Parser, Debug)]
struct PipedArgs {
    /// Engine executable.
    #[arg(long)]
    engine: PathBuf,

    /// Scene description file piped to the engine.
    #[arg(long)]
    scene: PathBuf,

    /// Output width in pixels.
    #[arg(long, default_value_t = 900)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 900)]
    height: u32,

    /// Iteration/quality budget.
    #[arg(long, default_value_t = headless_capture::DEFAULT_ITERATIONS)]
    iterations: u32,

    /// Kill the engine after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs,
}

#[derive(Parser, Debug)]
struct BuiltinArgs {
    /// Engine executable.
    #[arg(long)]
    engine: PathBuf,

    /// Output width in pixels.
    #[arg(long, default_value_t = 200)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 200)]
    height: u32,

    /// Kill the engine after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs,
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Input job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path (overrides the job's `out`).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the SHA-256 of the decoded raster.
    #[arg(long, default_value_t = false)]
    digest: bool,
}

#[derive(Parser, Debug)]
struct SplitArgs {
    /// Captured engine stdout.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Mode the dump was produced in (selects the payload encoding).
    #[arg(long, value_enum, default_value_t = ModeChoice::Piped)]
    mode: ModeChoice,

    /// Image width in pixels.
    #[arg(long)]
    width: u32,

    /// Image height in pixels.
    #[arg(long)]
    height: u32,

    /// Output PNG path; when omitted only diagnostics are printed.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    layout: LayoutArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Piped,
    Builtin,
}

impl ModeChoice {
    /// Mode whose payload encoding the dump carries; the scene itself is not needed offline.
    fn invocation_mode(self) -> InvocationMode {
        match self {
            Self::Piped => InvocationMode::piped(Vec::new()),
            Self::Builtin => InvocationMode::BuiltinScene,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Piped(args) => cmd_piped(args),
        Command::Builtin(args) => cmd_builtin(args),
        Command::Job(args) => cmd_job(args),
        Command::Split(args) => cmd_split(args),
    }
}

fn engine_command(engine: PathBuf, timeout_ms: Option<u64>) -> EngineCommand {
    let cmd = EngineCommand::new(engine);
    match timeout_ms {
        Some(ms) => cmd.with_timeout(Duration::from_millis(ms)),
        None => cmd,
    }
}

fn cmd_piped(args: PipedArgs) -> anyhow::Result<()> {
    let scene = std::fs::read(&args.scene)
        .with_context(|| format!("read scene '{}'", args.scene.display()))?;
    let request = CaptureRequest {
        mode: InvocationMode::PipedSource {
            scene,
            iterations: args.iterations,
        },
        descriptor: args.layout.descriptor(args.width, args.height)?,
    };
    let mut runner = ProcessRunner::new(engine_command(args.engine, args.timeout_ms));
    let capture = run_capture(&mut runner, &request)?;
    finish(&capture, Some(&args.out), args.layout.digest)
}

fn cmd_builtin(args: BuiltinArgs) -> anyhow::Result<()> {
    let request = CaptureRequest {
        mode: InvocationMode::BuiltinScene,
        descriptor: args.layout.descriptor(args.width, args.height)?,
    };
    let mut runner = ProcessRunner::new(engine_command(args.engine, args.timeout_ms));
    let capture = run_capture(&mut runner, &request)?;
    finish(&capture, Some(&args.out), args.layout.digest)
}

fn cmd_job(args: JobArgs) -> anyhow::Result<()> {
    let job = headless_capture::CaptureJob::from_path(&args.in_path)?;
    let request = job.request()?;
    let mut runner = ProcessRunner::new(job.engine_command());
    let capture = run_capture(&mut runner, &request)?;
    let out = args.out.or(job.out);
    finish(&capture, out.as_ref(), args.digest)
}

fn cmd_split(args: SplitArgs) -> anyhow::Result<()> {
    let output = std::fs::read(&args.in_path)
        .with_context(|| format!("read engine output '{}'", args.in_path.display()))?;
    let encoding = args.mode.invocation_mode().payload_encoding();
    let desc = args.layout.descriptor(args.width, args.height)?;
    let capture = headless_capture::decode_output(&output, encoding, &desc)?;
    finish(&capture, args.out.as_ref(), args.layout.digest)
}

fn run_capture(runner: &mut ProcessRunner, request: &CaptureRequest) -> anyhow::Result<Capture> {
    Ok(headless_capture::capture(runner, request)?)
}

fn finish(capture: &Capture, out: Option<&PathBuf>, digest: bool) -> anyhow::Result<()> {
    if !capture.diagnostics.is_empty() {
        eprint!("{}", capture.diagnostics);
    }
    if digest {
        println!("sha256 {}", capture.raster.sha256_hex());
    }
    if let Some(out) = out {
        headless_capture::save_png(&capture.raster, out)?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}
