//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use mediaconv_core::converter::FORMAT_PROFILES;
use mediaconv_core::{
    classify, locate_ffmpeg, target_formats_for, ConversionOutcome, ConversionTask, Converter,
    ConverterConfig, MediaCategory, MediaConverter,
};

/// Picks where converted files go: the `--output-dir` flag, then the
/// configured directory, then `downloads` (the user's Downloads folder when
/// it exists), then the source file's own directory.
pub fn resolve_output_dir(
    flag: Option<&Path>,
    configured: Option<&Path>,
    downloads: Option<&Path>,
    source: &Path,
) -> PathBuf {
    if let Some(dir) = flag.or(configured) {
        return dir.to_path_buf();
    }
    if let Some(dir) = downloads.filter(|d| d.is_dir()) {
        return dir.to_path_buf();
    }
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replaces the configured ffmpeg name with the resolved binary path.
fn with_located_ffmpeg(mut config: ConverterConfig) -> Result<ConverterConfig> {
    let path = locate_ffmpeg(&config).context("Unable to locate ffmpeg")?;
    debug!(path = %path.display(), "Resolved ffmpeg");
    config.ffmpeg_path = path;
    Ok(config)
}

fn progress_bar(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}

pub async fn convert(
    config: ConverterConfig,
    file: &Path,
    target: &str,
    output_dir: Option<&Path>,
    json: bool,
) -> Result<ExitCode> {
    let category = classify(file).context("Cannot convert this file")?;

    // Still images never need ffmpeg.
    let config = if category == MediaCategory::Image {
        config
    } else {
        with_located_ffmpeg(config)?
    };

    let downloads = dirs::download_dir();
    let output_dir = resolve_output_dir(
        output_dir,
        config.output_dir.as_deref(),
        downloads.as_deref(),
        file,
    );

    let converter = Arc::new(MediaConverter::new(config));
    let job = converter
        .plan(file, &output_dir, target)
        .context("Failed to plan conversion")?;
    info!(
        job_id = %job.job_id,
        output = %job.output_path.display(),
        "Planned conversion"
    );

    let pb = progress_bar(json)?;
    pb.set_message(format!("{} -> {}", category, job.target_format));

    let tasks = ConversionTask::new(converter);
    let handle = tasks.spawn(job)?;
    let outcome = handle.wait_with(|p| pb.set_position(u64::from(p.percent))).await;

    match &outcome {
        ConversionOutcome::Success(_) => pb.finish_and_clear(),
        ConversionOutcome::Failure { .. } => pb.abandon(),
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match &outcome {
            ConversionOutcome::Success(result) => println!(
                "Converted {} -> {} ({} bytes in {} ms)",
                file.display(),
                result.output_path.display(),
                result.output_size_bytes,
                result.duration_ms
            ),
            ConversionOutcome::Failure { reason } => eprintln!("{}", reason),
        }
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Targets `convert` can actually produce for `file`.
///
/// Images use the offered extension list. Audio and video use the ffmpeg
/// profile table, since not every offered extension (e.g. `aac`) has a
/// profile and some profiles (e.g. `m4a`) are not source extensions.
pub fn convertible_targets(file: &Path, category: MediaCategory) -> Vec<&'static str> {
    if category == MediaCategory::Image {
        return target_formats_for(file, category);
    }
    let current = file.extension().map(|ext| ext.to_string_lossy().to_lowercase());
    let mut targets: Vec<&'static str> = FORMAT_PROFILES
        .iter()
        .filter(|p| p.category == category && current.as_deref() != Some(p.format))
        .map(|p| p.format)
        .collect();
    targets.sort_unstable();
    targets
}

pub fn formats(file: &Path) -> Result<ExitCode> {
    let category = classify(file).context("Cannot convert this file")?;
    let targets = convertible_targets(file, category);
    println!("{} ({})", file.display(), category);
    for target in targets {
        println!("  {}", target);
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn encoders(config: ConverterConfig) -> Result<ExitCode> {
    let converter = MediaConverter::new(with_located_ffmpeg(config)?);
    converter
        .validate()
        .await
        .context("FFmpeg did not respond to -version")?;
    let caps = converter
        .capabilities()
        .await
        .context("Failed to probe ffmpeg encoders")?;
    if caps.is_empty() {
        eprintln!("No encoders reported");
        return Ok(ExitCode::FAILURE);
    }
    for name in caps.names() {
        println!("{}", name);
    }
    Ok(ExitCode::SUCCESS)
}
