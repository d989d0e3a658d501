use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;
use vidpress::{
    BackendKind, EncoderConfig, FrameKind, ImageSequenceSource, JsonlSink, encode_sequence,
    read_jsonl_stream,
};

#[derive(Parser, Debug)]
#[command(name = "vidpress", version)]
struct Cli {
    /// Log per-stage timings.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a numbered image sequence into a JSONL token stream.
    Encode(EncodeArgs),
    /// Summarize a written stream.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Frame path prefix; frame N is read from `{prefix}{N}.{extension}`.
    #[arg(long)]
    input_prefix: String,

    #[arg(long, default_value = "tiff")]
    extension: String,

    /// Output JSONL path.
    #[arg(long)]
    out: PathBuf,

    /// Encoder config JSON. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    quality: Option<f32>,

    #[arg(long)]
    i_frame_frequency: Option<u64>,

    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,

    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Override rayon worker threads (parallel backend only).
    #[arg(long)]
    threads: Option<usize>,

    /// Fail instead of retrying a broken kernel on the reference backend.
    #[arg(long)]
    no_fallback: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Stream written by `encode`.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Reference,
    Parallel,
}

impl From<BackendChoice> for BackendKind {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Reference => BackendKind::Reference,
            BackendChoice::Parallel => BackendKind::Parallel,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Encode(args) => cmd_encode(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => EncoderConfig::from_path(path)?,
        None => EncoderConfig::default(),
    };
    if let Some(q) = args.quality {
        cfg.quality = q;
    }
    if let Some(f) = args.i_frame_frequency {
        cfg.i_frame_frequency = f;
    }
    if let Some(n) = args.frames {
        cfg.max_frames = Some(n);
    }
    if let Some(b) = args.backend {
        cfg.backend = b.into();
    }
    if let Some(t) = args.threads {
        cfg.threads = Some(t);
    }
    if args.no_fallback {
        cfg.fallback_to_reference = false;
    }
    cfg.validate()?;

    let mut source = ImageSequenceSource::new(args.input_prefix.clone(), args.extension.clone());
    let mut sink = JsonlSink::new(&args.out);
    let stats = encode_sequence(&mut source, &mut sink, &cfg)
        .with_context(|| format!("encode '{}{{N}}.{}'", args.input_prefix, args.extension))?;

    eprintln!(
        "wrote {} ({} frames: {} I, {} P, {} tokens)",
        args.out.display(),
        stats.frames,
        stats.i_frames,
        stats.p_frames,
        stats.tokens
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let stream = read_jsonl_stream(&args.in_path)?;
    let h = stream.header;
    println!(
        "{}x{} quality={} block={} window={} frames={}",
        h.width,
        h.height,
        h.quality,
        h.block_size,
        h.window_size,
        stream.frames.len()
    );
    for f in &stream.frames {
        let kind = match f.kind {
            FrameKind::I => "I",
            FrameKind::P => "P",
        };
        let reference = f
            .reference
            .map(|r| format!(" ref={r}"))
            .unwrap_or_default();
        println!(
            "frame {} {kind}{reference} vectors={} tokens={}",
            f.index,
            f.vector_count(),
            f.token_count()
        );
    }
    Ok(())
}
