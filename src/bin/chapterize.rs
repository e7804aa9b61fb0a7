use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use chapterize::{
    Caption, ChangePointOptions, FrameEmbedder, FusionOptions, GridEmbedder, MediaSource,
    Segmentation, Segmenter, VideoSource, format_timestamp,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  chapterize probe talk.mp4\n  chapterize scenes talk.mp4 --alpha 1.0 --json\n  chapterize segment talk.mp4 --captions talk.captions.json --out plan.json\n  chapterize segment talk.mp4 --captions talk.captions.json --frames-dir frames";

#[derive(Debug, Parser)]
#[command(
    name = "chapterize",
    version,
    about = "Segment a spoken-video transcript into paragraphs with illustrative frame picks",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress spinner while the video is analyzed.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// Grid size of the built-in embedder (N produces N*N dimensions).
    #[arg(long, default_value_t = 16)]
    grid: u32,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print basic video information (alias: info).
    #[command(
        about = "Print video information",
        visible_alias = "info",
        after_help = "Examples:\n  chapterize probe talk.mp4\n  chapterize probe talk.mp4 --json"
    )]
    Probe {
        /// Input media path.
        input: String,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Detect scene-change timestamps.
    #[command(
        about = "Detect scene changes",
        after_help = "Examples:\n  chapterize scenes talk.mp4\n  chapterize scenes talk.mp4 --alpha 1.0 --frames-per-minute 2 --json"
    )]
    Scenes {
        /// Input media path.
        input: String,

        /// Sensitivity of the statistical threshold (mean - alpha * std).
        #[arg(long, default_value_t = 0.0)]
        alpha: f64,

        /// Target scene changes per minute (percentile-rank cutoff).
        #[arg(long, default_value_t = 0.0)]
        frames_per_minute: f64,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Produce the full paragraph/frame plan for a caption stream.
    #[command(
        about = "Fuse captions with scene changes into a segmentation plan",
        after_help = "Examples:\n  chapterize segment talk.mp4 --captions talk.captions.json\n  chapterize segment talk.mp4 --captions talk.captions.json --minutes-per-paragraph 1 --no-pictures"
    )]
    Segment {
        /// Input media path.
        input: String,

        /// Caption list as JSON: [{"start": 0.0, "end": 4.2, "text": "..."}].
        #[arg(long)]
        captions: PathBuf,

        /// Sensitivity of the statistical threshold (mean - alpha * std).
        #[arg(long, default_value_t = 0.0)]
        alpha: f64,

        /// Target scene changes per minute (percentile-rank cutoff).
        #[arg(long, default_value_t = 0.0)]
        frames_per_minute: f64,

        /// Pacing floor in minutes per paragraph.
        #[arg(long, default_value_t = 0.5)]
        minutes_per_paragraph: f64,

        /// Minimum spacing between paragraph breaks, in seconds.
        #[arg(long, default_value_t = 30.0)]
        min_spacing: f64,

        /// Disable frame inserts entirely.
        #[arg(long)]
        no_pictures: bool,

        /// Write the plan JSON here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Extract the frames behind each insert decision into this directory.
        #[arg(long)]
        frames_dir: Option<PathBuf>,

        /// Image extension for extracted frames (png, jpg, bmp).
        #[arg(long, default_value = "png")]
        ext: String,
    },
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match cli.command {
        Commands::Probe { input, json } => {
            let source = MediaSource::open(&input)?;
            let (width, height) = source.dimensions();
            if json {
                let payload = json!({
                    "width": width,
                    "height": height,
                    "fps": source.frame_rate(),
                    "duration_seconds": source.duration().as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Video: {}x{} @ {:.2} fps", width, height, source.frame_rate());
                println!("Duration: {}", format_timestamp(source.duration()));
            }
        }

        Commands::Scenes {
            input,
            alpha,
            frames_per_minute,
            json,
        } => {
            let mut source = MediaSource::open(&input)?;
            let embedder = GridEmbedder::new().grid_size(cli.global.grid);
            let options = ChangePointOptions::new()
                .alpha(alpha)
                .target_rate(frames_per_minute);

            let spinner = analysis_spinner(cli.global.progress, &input)?;
            let scene_changes = detect_scenes(&mut source, &embedder, &options)?;
            finish_spinner(spinner);

            if json {
                let payload = json!({
                    "scene_changes": scene_changes
                        .iter()
                        .map(|t| t.as_secs_f64())
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if scene_changes.is_empty() {
                println!("No scene changes detected");
            } else {
                for timestamp in &scene_changes {
                    println!("{}", format_timestamp(*timestamp));
                }
                eprintln!(
                    "{} {} scene changes",
                    "detected".cyan().bold(),
                    scene_changes.len(),
                );
            }
        }

        Commands::Segment {
            input,
            captions,
            alpha,
            frames_per_minute,
            minutes_per_paragraph,
            min_spacing,
            no_pictures,
            out,
            frames_dir,
            ext,
        } => {
            let caption_list = load_captions(&captions)?;
            let mut source = MediaSource::open(&input)?;
            let embedder = GridEmbedder::new().grid_size(cli.global.grid);

            let segmenter = Segmenter::new()
                .change_points(
                    ChangePointOptions::new()
                        .alpha(alpha)
                        .target_rate(frames_per_minute),
                )
                .fusion(
                    FusionOptions::new()
                        .minutes_per_paragraph(minutes_per_paragraph)
                        .picture_embed(!no_pictures)
                        .min_break_spacing(Duration::from_secs_f64(min_spacing.max(0.0))),
                );

            let spinner = analysis_spinner(cli.global.progress, &input)?;
            let segmentation = run_segmenter(&segmenter, &mut source, &embedder, &caption_list)?;
            finish_spinner(spinner);

            let breaks = segmentation
                .items
                .iter()
                .filter(|item| item.paragraph_break)
                .count();
            let inserts = segmentation
                .items
                .iter()
                .filter(|item| item.insert_frame)
                .count();
            eprintln!(
                "{} {} captions, {} paragraph breaks, {} frame inserts",
                "segmented".cyan().bold(),
                segmentation.items.len(),
                breaks,
                inserts,
            );

            if let Some(directory) = frames_dir {
                extract_insert_frames(
                    &mut source,
                    &segmentation,
                    &directory,
                    &ext,
                    cli.global.overwrite,
                    cli.global.verbose,
                )?;
            }

            let payload = serde_json::to_string_pretty(&segmentation)?;
            match out {
                Some(path) => {
                    if path.exists() && !cli.global.overwrite {
                        return Err(format!(
                            "output file already exists: {} (use --overwrite)",
                            path.display()
                        )
                        .into());
                    }
                    fs::write(&path, payload)?;
                    eprintln!("{} {}", "wrote".green().bold(), path.display());
                }
                None => println!("{payload}"),
            }
        }
    }

    Ok(())
}

fn init_logging(global: &GlobalOptions) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if global.verbose {
        builder.filter_module("chapterize", log::LevelFilter::Debug);
    }
    builder.init();
}

fn load_captions(path: &Path) -> Result<Vec<Caption>, Box<dyn std::error::Error>> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("cannot read captions file {}: {error}", path.display()))?;
    let captions: Vec<Caption> = serde_json::from_str(&raw)
        .map_err(|error| format!("cannot parse captions file {}: {error}", path.display()))?;
    Ok(captions)
}

/// Run only the visual half of the pipeline: sample, embed, detect.
fn detect_scenes(
    source: &mut MediaSource,
    embedder: &GridEmbedder,
    options: &ChangePointOptions,
) -> Result<Vec<Duration>, Box<dyn std::error::Error>> {
    use chapterize::{SimilaritySeriesBuilder, collect_samples, detect_change_points};

    let samples = collect_samples(source)?;
    let mut builder = SimilaritySeriesBuilder::new(embedder.dimensions());
    for sample in samples {
        let vector = embedder.embed(&sample.image)?;
        builder.push(sample.timestamp, vector)?;
    }
    Ok(detect_change_points(&builder.finish(), options)?)
}

fn run_segmenter(
    segmenter: &Segmenter,
    source: &mut MediaSource,
    embedder: &GridEmbedder,
    captions: &[Caption],
) -> Result<Segmentation, chapterize::ChapterizeError> {
    #[cfg(feature = "rayon")]
    {
        segmenter.run_parallel(source, embedder, captions)
    }
    #[cfg(not(feature = "rayon"))]
    {
        segmenter.run(source, embedder, captions)
    }
}

fn extract_insert_frames(
    source: &mut MediaSource,
    segmentation: &Segmentation,
    directory: &Path,
    ext: &str,
    overwrite: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if directory.exists() && !overwrite {
        return Err(format!(
            "frames directory already exists: {} (use --overwrite)",
            directory.display()
        )
        .into());
    }
    fs::create_dir_all(directory)?;

    for item in &segmentation.items {
        let Some(timestamp) = item.frame_timestamp else {
            continue;
        };
        let frame = source.frame_at(timestamp)?;
        let output_path = directory.join(format!(
            "frame_{:06}_{:03}.{ext}",
            timestamp.as_secs(),
            timestamp.subsec_millis(),
        ));
        frame.save(&output_path)?;
        if verbose {
            eprintln!("saved frame {} -> {}", format_timestamp(timestamp), output_path.display());
        }
    }

    Ok(())
}

fn analysis_spinner(
    enabled: bool,
    input: &str,
) -> Result<Option<ProgressBar>, Box<dyn std::error::Error>> {
    if !enabled {
        return Ok(None);
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("analyzing {input}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(Some(spinner))
}

fn finish_spinner(spinner: Option<ProgressBar>) {
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
}
