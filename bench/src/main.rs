use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;
use vidpress::{
    BackendKind, Channel, ColorSpace, Dimensions, EncoderConfig, Image, InMemorySink,
    InMemorySource, Planes, Stage, encode_sequence,
};

#[derive(Clone, Debug)]
struct BenchArgs {
    width: usize,
    height: usize,
    frames: u64,
    warmup: u32,
    repeats: u32,
    backend: BackendKind,
    threads: Option<usize>,
    i_frame_frequency: u64,
    json_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    stages: [Duration; 10],
    wall_total: Duration,
    output_sha256: String,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if !args.width.is_multiple_of(16) || !args.height.is_multiple_of(16) || args.width == 0 {
        anyhow::bail!("--width/--height must be non-zero multiples of 16");
    }
    if args.frames == 0 || args.repeats == 0 {
        anyhow::bail!("--frames and --repeats must be > 0");
    }
    if let Some(n) = args.threads
        && n == 0
    {
        anyhow::bail!("--threads must be >= 1 when set");
    }

    let dims = Dimensions::new(args.width, args.height)?;
    let scene = build_scene(dims, args.frames)?;

    if args.warmup > 0 {
        eprintln!("warmup: {} run(s)", args.warmup);
        for _ in 0..args.warmup {
            let _ = run_once(&args, &scene)?;
        }
    }

    eprintln!(
        "bench: {repeats} run(s) ({profile} build), {frames} frames/run at {dims}, backend={backend}, threads={threads}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        frames = args.frames,
        backend = args.backend,
        threads = args
            .threads
            .map(|n| n.to_string())
            .unwrap_or_else(|| "auto".to_string()),
    );

    let mut runs = Vec::<RunMetrics>::with_capacity(args.repeats as usize);
    for _ in 0..args.repeats {
        runs.push(run_once(&args, &scene)?);
    }

    let first = &runs[0].output_sha256;
    if runs.iter().any(|r| &r.output_sha256 != first) {
        anyhow::bail!("output hash changed between runs (non-deterministic encode)");
    }
    eprintln!("output sha256: {first}");

    report_percentiles(&runs);

    if let Some(path) = &args.json_out {
        write_json_report(path, &args, &runs)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

/// A noise texture panning two pixels right and one down per frame, with a flat band for motion
/// ties.
fn build_scene(dims: Dimensions, frames: u64) -> anyhow::Result<Vec<Image>> {
    (0..frames)
        .map(|n| {
            let planes = Planes::new(1u64, 2, 3).try_map(|_, salt| {
                Channel::from_fn(dims.width, dims.height, |x, y| {
                    if y < dims.height / 4 {
                        return 96.0;
                    }
                    let gx = x as u64 + 2 * n;
                    let gy = (y as u64).wrapping_sub(n);
                    (mix64((gx << 32) ^ gy ^ (salt << 60)) % 256) as f32
                })
            })?;
            Ok(Image::from_planes(dims, ColorSpace::Rgb, planes)?)
        })
        .collect()
}

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn run_once(args: &BenchArgs, scene: &[Image]) -> anyhow::Result<RunMetrics> {
    let cfg = EncoderConfig {
        backend: args.backend,
        threads: args.threads,
        i_frame_frequency: args.i_frame_frequency,
        ..Default::default()
    };
    let mut source = InMemorySource::new(scene.iter().cloned());
    let mut sink = InMemorySink::new();

    let t0 = Instant::now();
    let stats = encode_sequence(&mut source, &mut sink, &cfg).context("encode sequence")?;
    let wall_total = t0.elapsed();

    let mut metrics = RunMetrics {
        wall_total,
        ..Default::default()
    };
    for (i, stage) in Stage::ALL.iter().enumerate() {
        metrics.stages[i] = stats.timings.get(*stage);
    }

    let bytes = serde_json::to_vec(sink.frames()).context("serialize frames")?;
    metrics.output_sha256 = sha256_hex(&bytes);
    Ok(metrics)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        width: 320,
        height: 192,
        frames: 16,
        warmup: 1,
        repeats: 10,
        backend: BackendKind::Reference,
        threads: None,
        i_frame_frequency: 8,
        json_out: None,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_usize(args.next(), "--width")?,
            "--height" => out.height = parse_usize(args.next(), "--height")?,
            "--frames" => out.frames = parse_u64(args.next(), "--frames")?,
            "--warmup" => out.warmup = parse_u64(args.next(), "--warmup")? as u32,
            "--repeats" => out.repeats = parse_u64(args.next(), "--repeats")? as u32,
            "--i-frame-frequency" => {
                out.i_frame_frequency = parse_u64(args.next(), "--i-frame-frequency")?
            }
            "--backend" => {
                let v = args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --backend (reference|parallel)")
                })?;
                out.backend = match v.as_str() {
                    "reference" => BackendKind::Reference,
                    "parallel" => BackendKind::Parallel,
                    _ => anyhow::bail!("unknown --backend '{v}' (expected reference|parallel)"),
                };
            }
            "--threads" => out.threads = Some(parse_usize(args.next(), "--threads")?),
            "--json" => {
                out.json_out = Some(PathBuf::from(args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --json (expected a path)")
                })?))
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    Ok(out)
}

fn print_help() {
    eprintln!(
        r#"vidpress-bench

Encodes a synthetic panning sequence repeatedly and reports p50/p90/p99 per pipeline stage.
The SHA-256 of the encoded frames is printed so backends can be compared.

Usage:
  cargo run -q --release
  cargo run -q --release -- --backend parallel --threads 4
  cargo run -q --release -- --frames 32 --width 640 --height 368

Args:
  --width N              (default 320; multiple of 16)
  --height N             (default 192; multiple of 16)
  --frames N             (default 16)
  --warmup N             (default 1)
  --repeats N            (default 10)
  --i-frame-frequency N  (default 8)
  --backend reference|parallel (default reference)
  --threads N            worker threads for the parallel backend (default auto)
  --json PATH            also write a JSON summary
"#
    );
}

fn parse_u64(v: Option<String>, flag: &str) -> anyhow::Result<u64> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<u64>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn parse_usize(v: Option<String>, flag: &str) -> anyhow::Result<usize> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<usize>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn collect(runs: &[RunMetrics], f: impl Fn(&RunMetrics) -> Duration) -> Vec<Duration> {
    let mut v = runs.iter().map(f).collect::<Vec<_>>();
    v.sort_by_key(|d| d.as_nanos());
    v
}

fn percentile(v: &[Duration], p: f64) -> Duration {
    if v.is_empty() {
        return Duration::ZERO;
    }
    let n = v.len();
    let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
    v[rank - 1]
}

fn fmt_ms(d: Duration) -> String {
    format!("{:.3}ms", d.as_secs_f64() * 1000.0)
}

fn report_percentiles(runs: &[RunMetrics]) {
    eprintln!("\npercentiles across runs (p50/p90/p99):");
    let mut rows: Vec<(&str, Vec<Duration>)> = Stage::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name(), collect(runs, |m| m.stages[i])))
        .collect();
    rows.push(("wall_total", collect(runs, |m| m.wall_total)));

    for (name, v) in rows {
        eprintln!(
            "  {name:14} p50={p50:>10}  p90={p90:>10}  p99={p99:>10}",
            p50 = fmt_ms(percentile(&v, 0.50)),
            p90 = fmt_ms(percentile(&v, 0.90)),
            p99 = fmt_ms(percentile(&v, 0.99))
        );
    }
}

fn write_json_report(path: &Path, args: &BenchArgs, runs: &[RunMetrics]) -> anyhow::Result<()> {
    let stages: serde_json::Map<String, serde_json::Value> = Stage::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let v = collect(runs, |m| m.stages[i]);
            (
                s.name().to_string(),
                json!({
                    "p50_ms": percentile(&v, 0.50).as_secs_f64() * 1000.0,
                    "p90_ms": percentile(&v, 0.90).as_secs_f64() * 1000.0,
                }),
            )
        })
        .collect();
    let wall = collect(runs, |m| m.wall_total);

    let report = json!({
        "width": args.width,
        "height": args.height,
        "frames": args.frames,
        "repeats": args.repeats,
        "backend": args.backend.as_str(),
        "threads": args.threads,
        "output_sha256": runs.first().map(|r| r.output_sha256.clone()),
        "wall_p50_ms": percentile(&wall, 0.50).as_secs_f64() * 1000.0,
        "stages": stages,
    });

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report dir '{}'", parent.display()))?;
    }
    let f = std::fs::File::create(path)
        .with_context(|| format!("create report '{}'", path.display()))?;
    serde_json::to_writer_pretty(f, &report).context("write report")?;
    Ok(())
}
