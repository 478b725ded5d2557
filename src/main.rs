use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;

use onesub::config::{load_render_config, RenderConfig};
use onesub::encoding::{burn_subtitles, BurnOptions, FfmpegMode};
use onesub::error_codes::envelope_for;
use onesub::inputs::{load_loudness, load_transcript};
use onesub::logging;
use onesub::markup::SubtitleDocument;
use onesub::pipeline::{build_document, write_document};

#[derive(Debug, Parser)]
#[command(name = "onesub")]
#[command(about = "Loudness-driven styled subtitle compiler")]
#[command(version = env!("ONESUB_VERSION"))]
struct Cli {
    /// Report errors as a JSON envelope on stderr.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct RenderInputs {
    /// Word-timestamped transcript JSON.
    #[arg(long)]
    captions: PathBuf,
    /// Per-word loudness JSON.
    #[arg(long)]
    analysis: PathBuf,
    /// Render config (YAML or JSON).
    #[arg(long)]
    config: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the styled subtitle document.
    Subtitles {
        #[command(flatten)]
        inputs: RenderInputs,
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Build subtitles next to the output, then burn them into the video.
    Burn {
        video: PathBuf,
        #[command(flatten)]
        inputs: RenderInputs,
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
        #[arg(long)]
        ffmpeg: Option<PathBuf>,
        #[arg(long = "ffmpeg-mode", default_value = "auto")]
        ffmpeg_mode: String,
    },
    /// Load a render config and summarize what it resolves to.
    Check { config: PathBuf },
    /// Loudness statistics for an analysis file.
    Stats {
        #[arg(long)]
        analysis: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();
    let json_errors = cli.json;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_error(&error, json_errors);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Subtitles { inputs, output } => run_subtitles(&inputs, &output),
        Commands::Burn {
            video,
            inputs,
            output,
            ffmpeg,
            ffmpeg_mode,
        } => {
            let options = BurnOptions {
                mode: FfmpegMode::parse(&ffmpeg_mode)?,
                ffmpeg_binary: ffmpeg,
            };
            run_burn(&video, &inputs, &output, &options)
        }
        Commands::Check { config } => run_check(&config, cli.json),
        Commands::Stats { analysis } => run_stats(&analysis, cli.json),
    }
}

fn report_error(error: &anyhow::Error, json: bool) {
    if json {
        match serde_json::to_string(&envelope_for(error)) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!("error: {error:#}"),
        }
    } else {
        eprintln!("error: {error:#}");
    }
}

fn build_from_inputs(inputs: &RenderInputs) -> Result<SubtitleDocument> {
    let transcript = load_transcript(&inputs.captions)?;
    let loudness = load_loudness(&inputs.analysis)?;
    let config = load_render_config(&inputs.config)?;
    info!(
        words = transcript.word_count(),
        segments = transcript.segments.len(),
        analysed = loudness.len(),
        "loaded inputs"
    );
    Ok(build_document(&transcript, &loudness, &config))
}

fn run_subtitles(inputs: &RenderInputs, output: &Path) -> Result<()> {
    let document = build_from_inputs(inputs)?;
    write_document(&document, output)?;
    println!(
        "Wrote {} ({} dialogue events)",
        output.display(),
        document.events.len()
    );
    Ok(())
}

fn run_burn(
    video: &Path,
    inputs: &RenderInputs,
    output: &Path,
    options: &BurnOptions,
) -> Result<()> {
    let document = build_from_inputs(inputs)?;
    let ass_path = output.with_extension("ass");
    write_document(&document, &ass_path)?;
    burn_subtitles(video, &ass_path, output, options).with_context(|| {
        format!(
            "failed to burn {} into {}",
            ass_path.display(),
            video.display()
        )
    })?;
    println!("Wrote {} (subtitles: {})", output.display(), ass_path.display());
    Ok(())
}

fn run_check(config_path: &Path, json_output: bool) -> Result<()> {
    let config = load_render_config(config_path)?;
    if json_output {
        let summary = check_summary(config_path, &config);
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to serialize config summary")?
        );
        return Ok(());
    }

    println!(
        "OK: {} ({}x{}, mode={:?}, reveal={:?})",
        config_path.display(),
        config.resolution.width,
        config.resolution.height,
        config.display.mode,
        config.display.reveal_mode
    );
    println!(
        "Sizes: {}-{} (font {}, {} bands)",
        config.size_mapping.min_size,
        config.size_mapping.max_size,
        config.default_font,
        config.font_bands.len()
    );
    println!(
        "Placements: {} timed, {} by segment",
        config.placements.time_entries().len(),
        config.placements.segment_count()
    );
    println!("Color overrides: {}", config.colors.len());
    println!("Segment styles: {}", config.segment_styles.len());
    println!("Manual windows: {}", config.display.windows.len());
    Ok(())
}

fn check_summary(config_path: &Path, config: &RenderConfig) -> serde_json::Value {
    json!({
        "ok": true,
        "config": config_path.display().to_string(),
        "resolution": config.resolution,
        "size_mapping": config.size_mapping,
        "default_font": config.default_font,
        "font_bands": config.font_bands.len(),
        "alignment": config.alignment,
        "display": config.display,
        "placements": {
            "timed": config.placements.time_entries().len(),
            "by_segment": config.placements.segment_count(),
        },
        "color_overrides": config.colors.len(),
        "segment_styles": config.segment_styles.len(),
    })
}

fn run_stats(analysis: &Path, json_output: bool) -> Result<()> {
    let stats = load_loudness(analysis)?.stats();
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("failed to serialize loudness stats")?
        );
        return Ok(());
    }
    println!("Words: {}", stats.words);
    println!("RMS: {:.6} .. {:.6}", stats.rms_min, stats.rms_max);
    println!("Peak: {:.6} .. {:.6}", stats.peak_min, stats.peak_max);
    Ok(())
}
