//! Conversion dispatcher.
//!
//! Routes a job down exactly one path based on its category: images go
//! through the `image` crate, audio and video through ffmpeg.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::capabilities::EncoderCapabilities;
use super::command::build_command;
use super::config::ConverterConfig;
use super::error::ConverterError;
use super::image_converter::convert_image;
use super::progress::{milestones, ProgressReporter};
use super::runner::{ProcessRunner, ToolRunner};
use super::traits::Converter;
use super::types::{ConversionJob, ConversionProgress, ConversionResult};
use super::validate::validate_output;
use crate::media::MediaCategory;

/// Converter dispatching between the image library and ffmpeg.
pub struct MediaConverter<R = ProcessRunner> {
    config: ConverterConfig,
    runner: R,
}

impl MediaConverter<ProcessRunner> {
    /// Creates a converter that launches real processes.
    pub fn new(config: ConverterConfig) -> Self {
        Self::with_runner(config, ProcessRunner::new())
    }
}

impl<R: ToolRunner> MediaConverter<R> {
    /// Creates a converter with a custom tool runner.
    pub fn with_runner(config: ConverterConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Plans a job for `source_path` using the configured ffmpeg path.
    pub fn plan(
        &self,
        source_path: &Path,
        output_dir: &Path,
        target_format: &str,
    ) -> Result<ConversionJob, ConverterError> {
        ConversionJob::plan(
            source_path,
            output_dir,
            target_format,
            &self.config.ffmpeg_path,
        )
    }

    /// Checks the source exists, refuses to overwrite it, and makes sure
    /// the output directory is there.
    async fn prepare(&self, job: &ConversionJob) -> Result<(), ConverterError> {
        if !tokio::fs::try_exists(&job.source_path).await? {
            return Err(ConverterError::InputNotFound {
                path: job.source_path.clone(),
            });
        }

        if same_file(&job.source_path, &job.output_path).await {
            return Err(ConverterError::OutputCollidesWithSource {
                path: job.output_path.clone(),
            });
        }

        if let Some(parent) = job.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        Ok(())
    }

    async fn convert_still(
        &self,
        job: &ConversionJob,
        mut progress: ProgressReporter,
    ) -> Result<u64, ConverterError> {
        let source = job.source_path.clone();
        let output = job.output_path.clone();
        let target = job.target_format.clone();
        let quality = self.config.jpeg_quality;

        tokio::task::spawn_blocking(move || {
            convert_image(&source, &output, &target, quality, &mut progress)
        })
        .await
        .map_err(ConverterError::image)??;

        validate_output(&job.output_path).await
    }

    async fn convert_media(
        &self,
        job: &ConversionJob,
        mut progress: ProgressReporter,
    ) -> Result<u64, ConverterError> {
        let caps = EncoderCapabilities::detect(&self.runner, &job.ffmpeg_path).await?;
        let command = build_command(job, &caps)?;
        debug!(job_id = %job.job_id, %command, "Running ffmpeg");

        progress.report(milestones::MEDIA_STARTED);

        let output = self.runner.run(&command.program, &command.args()).await?;
        if !output.stderr.trim().is_empty() {
            debug!(job_id = %job.job_id, stderr = %output.stderr.trim(), "FFmpeg output");
        }
        output.into_result()?;

        let size = validate_output(&job.output_path).await?;
        progress.report(milestones::COMPLETE);
        Ok(size)
    }

    async fn run_conversion(
        &self,
        job: &ConversionJob,
        progress: ProgressReporter,
    ) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();
        info!(
            job_id = %job.job_id,
            source = %job.source_path.display(),
            output = %job.output_path.display(),
            category = %job.category,
            format = %job.target_format,
            "Starting conversion"
        );

        self.prepare(job).await?;

        let output_size_bytes = match job.category {
            MediaCategory::Image => self.convert_still(job, progress).await?,
            MediaCategory::Audio | MediaCategory::Video => {
                self.convert_media(job, progress).await?
            }
        };

        let result = ConversionResult {
            job_id: job.job_id.clone(),
            output_path: job.output_path.clone(),
            output_size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
            category: job.category,
            target_format: job.target_format.clone(),
        };
        info!(
            job_id = %result.job_id,
            size = result.output_size_bytes,
            duration_ms = result.duration_ms,
            "Conversion finished"
        );
        Ok(result)
    }
}

/// Whether two paths name the same file, resolving links when both exist.
async fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[async_trait]
impl<R: ToolRunner> Converter for MediaConverter<R> {
    fn name(&self) -> &str {
        "media"
    }

    async fn convert_with_progress(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::UnboundedSender<ConversionProgress>,
    ) -> Result<ConversionResult, ConverterError> {
        let result = self
            .run_conversion(&job, ProgressReporter::new(progress_tx))
            .await;
        if let Err(ref e) = result {
            warn!(
                job_id = %job.job_id,
                error = %e,
                preflight = e.is_preflight(),
                "Conversion failed"
            );
        }
        result
    }

    async fn capabilities(&self) -> Result<EncoderCapabilities, ConverterError> {
        EncoderCapabilities::detect(&self.runner, &self.config.ffmpeg_path).await
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        self.runner
            .run(&self.config.ffmpeg_path, &[OsString::from("-version")])
            .await?
            .into_result()?;
        Ok(())
    }
}
