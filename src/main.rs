use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn, Level};

use beatcut::{
    audio::AudioAnalysisLoader,
    composition::{join_analysis_tasks, CancelToken, EditDecisionEngine},
    config::{Config, StyleConfig},
    error::EditError,
    export::{reparse, EdlSerializer, ExportFormat},
    styles::StyleRegistry,
    timecode::FrameRate,
    video::VideoAnalysisLoader,
};

#[derive(Parser)]
#[command(
    name = "beatcut",
    version,
    about = "Cut video to music and export the edit to your NLE",
    long_about = "beatcut reads beat analysis of a soundtrack and scene analysis of your clips, cuts the footage on the strongest beats and writes an edit decision list for Premiere Pro, Final Cut Pro X or any CMX3600 reader."
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an edit from analysis files and export it
    Generate(GenerateArgs),

    /// Read an exported file back and list its clips
    Inspect {
        /// Format of the file (premiere, fcpx, cmx3600)
        #[arg(short, long)]
        format: String,

        /// Frame rate used to read CMX3600 timecodes
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Exported file
        file: PathBuf,
    },

    /// List the available editing styles
    Styles,
}

#[derive(Args)]
struct GenerateArgs {
    /// Audio analysis JSON
    #[arg(short, long)]
    audio: PathBuf,

    /// Video analysis JSON, one per clip
    #[arg(long = "video", required = true, num_args = 1..)]
    videos: Vec<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Editing style (dynamic, smooth, mixed, cinematic)
    #[arg(short, long)]
    style: Option<String>,

    /// Apply the preset for a musical genre
    #[arg(short, long)]
    genre: Option<String>,

    /// Reuse footage when the song outlasts it
    #[arg(long)]
    allow_loop: bool,

    /// Timeline frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Project name written into the export
    #[arg(long)]
    project: Option<String>,

    /// Export format (premiere, fcpx, cmx3600)
    #[arg(short, long, default_value = "fcpx")]
    format: String,

    /// Export file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the edit decision list as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let result = match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Inspect { format, fps, file } => inspect(&format, fps, &file).await,
        Command::Styles => {
            list_styles();
            Ok(())
        }
    };

    if let Err(e) = &result {
        if let Some(edit_error) = e.downcast_ref::<EditError>() {
            error!("{}", edit_error.user_message());
        }
    }
    result
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Ok(Config::from_file(path)?)
        }
        None => {
            info!("Using default configuration");
            Ok(Config::default())
        }
    }
}

/// Command line flags win over the configuration file
fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(genre) = &args.genre {
        config.style = StyleConfig {
            transition_preference: config.style.transition_preference,
            allow_loop: config.style.allow_loop,
            frame_rate: config.style.frame_rate,
            ..StyleConfig::for_genre(genre)
        };
    }
    if let Some(style) = &args.style {
        config.style.style = style.clone();
    }
    if args.allow_loop {
        config.style.allow_loop = true;
    }
    if let Some(fps) = args.fps {
        config.style.frame_rate = fps;
    }

    if let Some(project) = &args.project {
        config.project_name = project.clone();
    } else if config.project_name == Config::default().project_name {
        config.project_name = format!("beatcut {}", Local::now().format("%Y-%m-%d %H:%M"));
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    info!("Starting beatcut v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let format: ExportFormat = args.format.parse()?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("edit.{}", format.extension())));

    let cancel = match args.timeout {
        Some(seconds) => CancelToken::with_timeout(Duration::from_secs(seconds)),
        None => CancelToken::new(),
    };

    info!("Audio: {:?}", args.audio);
    info!("Videos: {}", args.videos.len());
    info!("Style: {} ({})", config.style.style, config.style.genre);

    // Analyses load concurrently and meet at the join barrier
    let audio_task = tokio::spawn(AudioAnalysisLoader::load(args.audio.clone()));
    let video_tasks = args
        .videos
        .iter()
        .cloned()
        .map(|path| tokio::spawn(VideoAnalysisLoader::load(path)))
        .collect();
    let (audio, videos) = join_analysis_tasks(audio_task, video_tasks, &cancel).await?;

    let engine = EditDecisionEngine::from_config(config.clone())?;
    let generated = engine.generate_with_cancel(&audio, &videos, &cancel)?;
    for warning in &generated.warnings {
        warn!("⚠️  {}", warning);
    }

    if let Some(json_path) = &args.json {
        tokio::fs::write(json_path, generated.edl.to_json()?)
            .await
            .with_context(|| format!("writing {:?}", json_path))?;
        info!("Edit decision list saved to: {:?}", json_path);
    }

    EdlSerializer::new(config.export.clone())
        .export_to_file(&generated.edl, format, &output)
        .await?;

    info!(
        "Edit complete! {} clips over {:.2}s saved to: {:?}",
        generated.edl.clips().len(),
        generated.edl.total_duration(),
        output
    );
    Ok(())
}

async fn inspect(format: &str, fps: f64, file: &Path) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {:?}", file))?;

    let rate = FrameRate::from_fps(fps);
    let clips = reparse(&text, format, rate)?;

    println!("{} clips in {:?} ({})", clips.len(), file, format);
    for (index, clip) in clips.iter().enumerate() {
        println!(
            "{:>4}  {:<24} rec {} - {}  src {} - {}",
            index + 1,
            clip.name,
            rate.timecode(clip.record_in),
            rate.timecode(clip.record_out),
            rate.timecode(clip.source_in),
            rate.timecode(clip.source_out),
        );
    }
    Ok(())
}

fn list_styles() {
    let registry = StyleRegistry::new();
    println!("Available styles:");
    for name in registry.available_styles() {
        if let Some(style) = registry.get_style(&name) {
            let metadata = style.metadata();
            let favoured: Vec<&str> = metadata
                .favoured_content
                .iter()
                .map(|c| c.as_str())
                .collect();
            println!("  {:<10} {}", name, style.description());
            println!(
                "  {:<10} soft transitions: {}, favours: {}",
                "",
                if metadata.soft_transitions { "yes" } else { "no" },
                favoured.join(", ")
            );
        }
    }
}
