use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use redact_core::animation::sampling_plan::AnimationQuality;
use redact_core::compositing::domain::strength_curve::StrengthCurve;
use redact_core::pipeline::engine::Engine;
use redact_core::regions::persistence::load_regions;
use redact_core::regions::region_store::RegionStore;
use redact_core::shared::constants::DEFAULT_MAX_WIDTH;
use redact_core::shared::region::Region;
use redact_core::shared::video_metadata::{frame_index_at, second_at};
use redact_core::video::domain::image_writer::ImageWriter;
use redact_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Obscure rectangular regions of a video over chosen frame ranges.
#[derive(Parser)]
#[command(name = "redact", version)]
struct Cli {
    /// Effect strength curve: advanced or basic.
    #[arg(long, global = true, default_value = "advanced")]
    strength: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print frame rate, frame count, duration, size and file size.
    Info {
        /// Input video.
        input: PathBuf,
    },

    /// Composite one frame and save it as an image (PNG by extension).
    Preview {
        input: PathBuf,
        output: PathBuf,

        /// Region file (JSON). Without it the raw frame is saved.
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Frame index to render.
        #[arg(long, conflicts_with = "second")]
        frame: Option<usize>,

        /// Playback position in seconds, converted with floor(seconds * fps).
        #[arg(long)]
        second: Option<f64>,
    },

    /// Render the whole video with every region applied.
    Export {
        input: PathBuf,
        output: PathBuf,

        /// Region file (JSON).
        #[arg(long)]
        regions: PathBuf,
    },

    /// Export a looping GIF sampled from the composited video.
    Gif {
        input: PathBuf,
        output: PathBuf,

        /// Region file (JSON).
        #[arg(long)]
        regions: Option<PathBuf>,

        /// Frame budget preset: high (60 frames) or low (15 frames).
        #[arg(long, default_value = "high")]
        quality: String,

        /// Exact frame budget; overrides --quality.
        #[arg(long)]
        target_frames: Option<usize>,

        /// Maximum output width in pixels.
        #[arg(long, default_value_t = DEFAULT_MAX_WIDTH)]
        max_width: u32,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let curve = StrengthCurve::parse(&cli.strength)
        .ok_or_else(|| format!("--strength must be advanced or basic, got '{}'", cli.strength))?;
    let engine = Engine::new(curve);

    match cli.command {
        Command::Info { input } => run_info(&engine, &input),
        Command::Preview {
            input,
            output,
            regions,
            frame,
            second,
        } => run_preview(&engine, &input, &output, regions.as_deref(), frame, second),
        Command::Export {
            input,
            output,
            regions,
        } => run_export(&engine, &input, &output, &regions),
        Command::Gif {
            input,
            output,
            regions,
            quality,
            target_frames,
            max_width,
        } => {
            let target = match target_frames {
                Some(n) if n > 0 => n,
                Some(_) => return Err("--target-frames must be at least 1".into()),
                None => AnimationQuality::parse(&quality)
                    .ok_or_else(|| format!("--quality must be high or low, got '{quality}'"))?
                    .target_frames(),
            };
            run_gif(&engine, &input, &output, regions.as_deref(), target, max_width)
        }
    }
}

/// Loads a region file through a [`RegionStore`] so the regions are
/// validated and ordered the same way the authoring layer would keep them.
fn read_regions(path: Option<&Path>) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let mut store = RegionStore::new();
    for region in load_regions(path)? {
        store.add(region)?;
    }
    log::debug!("Using {} regions from {}", store.len(), path.display());
    Ok(store.list())
}

fn run_info(engine: &Engine, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let info = engine.get_video_info(input)?;
    println!("File:       {}", input.display());
    println!("Resolution: {}x{}", info.width, info.height);
    println!("Frame rate: {:.3} fps", info.fps);
    println!("Frames:     {}", info.frame_count);
    println!(
        "Duration:   {:.2} s (last full second: {})",
        info.duration_seconds,
        second_at(info.frame_count.saturating_sub(1), info.fps)
    );
    println!("Size:       {} bytes", info.size_bytes);
    Ok(())
}

fn run_preview(
    engine: &Engine,
    input: &Path,
    output: &Path,
    regions: Option<&Path>,
    frame: Option<usize>,
    second: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let regions = read_regions(regions)?;
    let frame_index = match (frame, second) {
        (Some(index), _) => index,
        (None, Some(second)) => {
            let fps = engine.get_video_info(input)?.fps;
            frame_index_at(second, fps)
        }
        (None, None) => 0,
    };

    let composited = engine.composite_single_frame(input, frame_index, &regions)?;
    ImageFileWriter::new().write(output, &composited, None)?;
    log::info!("Frame {frame_index} written to {}", output.display());
    Ok(())
}

fn run_export(
    engine: &Engine,
    input: &Path,
    output: &Path,
    regions: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let regions = read_regions(Some(regions))?;
    let outcome = engine.export_video(input, output, &regions);
    if !outcome.success {
        let reason = outcome.error.unwrap_or_else(|| "unknown error".to_string());
        return Err(reason.into());
    }
    log::info!(
        "Exported {} frames to {}",
        outcome.total_frames,
        output.display()
    );
    Ok(())
}

fn run_gif(
    engine: &Engine,
    input: &Path,
    output: &Path,
    regions: Option<&Path>,
    target_frames: usize,
    max_width: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let regions = read_regions(regions)?;
    let outcome = engine.export_animated(input, output, &regions, target_frames, max_width);
    if !outcome.success {
        let reason = outcome.error.unwrap_or_else(|| "unknown error".to_string());
        return Err(reason.into());
    }
    log::info!(
        "Wrote {}-frame animation to {}",
        outcome.frame_count,
        output.display()
    );
    Ok(())
}
