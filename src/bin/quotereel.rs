use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quotereel::{
    Composition, FrameIndex, ManualFrameScheduler, OfflineOpts, OfflineRenderer, PreviewOpts,
    PreviewPlayer, RenderJob, Settings, TracingAudioSink,
};

#[derive(Parser, Debug)]
#[command(name = "quotereel", version, about = "Testimonial ad timeline tools")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one frame and print its visual state as JSON.
    Frame(FrameArgs),
    /// Write a render job (composition, audio cue, per-frame fingerprints).
    Export(ExportArgs),
    /// Re-evaluate a render job and check every fingerprint.
    Verify(VerifyArgs),
    /// Simulate an interactive preview session without a display or audio device.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input settings JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based). Frames past the end show the last frame.
    #[arg(long)]
    frame: u64,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input settings JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output render-job JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct VerifyArgs {
    /// Render-job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input settings JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Simulated wall-clock seconds.
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Host refresh interval in milliseconds.
    #[arg(long, default_value_t = 16)]
    step_ms: u64,

    /// Opt in to audio (logged through tracing).
    #[arg(long, default_value_t = false)]
    audio: bool,

    /// Stop on the last frame instead of looping.
    #[arg(long, default_value_t = false)]
    no_loop: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Verify(args) => cmd_verify(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    Settings::from_path(path).with_context(|| format!("read settings '{}'", path.display()))
}

fn write_output(out: Option<&Path>, body: &str) -> anyhow::Result<()> {
    let Some(out) = out else {
        println!("{body}");
        return Ok(());
    };
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, body).with_context(|| format!("write '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let settings = load_settings(&args.in_path)?;
    let comp = Composition::from_settings(&settings);
    let renderer = OfflineRenderer::new(comp, OfflineOpts::default())?;
    let state = renderer.frame(FrameIndex(args.frame));
    let body = serde_json::to_string_pretty(&state).context("serialize visual state")?;
    write_output(args.out.as_deref(), &body)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let settings = load_settings(&args.in_path)?;
    let comp = Composition::from_settings(&settings);
    for adj in &comp.adjustments {
        eprintln!(
            "note: {} clamped from {} to {}",
            adj.field, adj.requested, adj.applied
        );
    }
    let opts = OfflineOpts {
        parallel: args.parallel,
        threads: args.threads,
    };
    let job = RenderJob::build(comp, opts)?;
    let body = job.to_json_pretty()?;
    write_output(Some(&args.out), &body)
}

fn cmd_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let job = RenderJob::from_path(&args.in_path)
        .with_context(|| format!("read render job '{}'", args.in_path.display()))?;
    let opts = OfflineOpts {
        parallel: args.parallel,
        threads: None,
    };
    match job.first_mismatch(opts)? {
        None => {
            eprintln!("ok: {} frames match", job.total_frames);
            Ok(())
        }
        Some(f) => anyhow::bail!("fingerprint mismatch at frame {}", f.0),
    }
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    if !(args.seconds.is_finite() && args.seconds >= 0.0) {
        anyhow::bail!("--seconds must be a non-negative number");
    }
    if args.step_ms == 0 {
        anyhow::bail!("--step-ms must be >= 1");
    }
    let settings = load_settings(&args.in_path)?;
    let opts = PreviewOpts {
        audio_enabled: args.audio,
        looping: !args.no_loop,
        ..PreviewOpts::default()
    };
    let mut player = PreviewPlayer::new(
        &settings,
        TracingAudioSink::default(),
        ManualFrameScheduler::new(),
        opts,
    );

    let end_ms = (args.seconds * 1000.0) as u64;
    let mut now_ms = 0;
    let mut last_second = None;
    while now_ms <= end_ms && player.scheduler_mut().fire() {
        if let Some(state) = player.on_frame(Duration::from_millis(now_ms)) {
            let second = now_ms / 1000;
            if last_second != Some(second) {
                last_second = Some(second);
                let quote = state
                    .element(quotereel::composition::model::ids::QUOTE_TEXT)
                    .and_then(|e| e.text.clone())
                    .unwrap_or_default();
                tracing::info!(t_ms = now_ms, frame = state.frame.0, quote = %quote, "preview");
            }
        }
        for notice in player.drain_notices() {
            eprintln!("notice: {notice:?}");
        }
        now_ms += args.step_ms;
    }

    let body = serde_json::to_string_pretty(&player.state()).context("serialize playback state")?;
    player.shutdown();
    write_output(None, &body)
}
