//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::error::ConverterError;
use crate::media::{classify, MediaCategory};

/// Suffix appended to the source stem when naming the output file.
pub const OUTPUT_SUFFIX: &str = "_converted";

/// Builds the output file name for a source and target format:
/// `<source-stem>_converted.<target>`.
///
/// The stem keeps the source's raw bytes, valid UTF-8 or not.
pub fn output_file_name(source: &Path, target_format: &str) -> OsString {
    let mut name = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(OUTPUT_SUFFIX);
    name.push(".");
    name.push(target_format);
    name
}

/// Normalizes a user supplied format string (`".MP3"` -> `"mp3"`).
pub fn normalize_format(format: &str) -> String {
    format.trim().trim_start_matches('.').to_lowercase()
}

/// A conversion job request.
///
/// Built once when the caller starts a conversion and owned by the task
/// running it. The source file is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Unique job ID.
    pub job_id: String,
    /// Input file path.
    pub source_path: PathBuf,
    /// Output file path.
    pub output_path: PathBuf,
    /// Category, decides between the image and ffmpeg paths.
    pub category: MediaCategory,
    /// Target format, lowercase without a leading dot.
    pub target_format: String,
    /// FFmpeg binary used for audio and video jobs.
    pub ffmpeg_path: PathBuf,
}

impl ConversionJob {
    /// Creates a job with a fresh ID from already resolved parts.
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        category: MediaCategory,
        target_format: &str,
        ffmpeg_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            job_id: uuid::Uuid::new_v4().to_string(),
            source_path: source_path.into(),
            output_path: output_path.into(),
            category,
            target_format: normalize_format(target_format),
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Plans a job from caller input: validates the source and format,
    /// classifies the source and names the output inside `output_dir`.
    pub fn plan(
        source_path: &Path,
        output_dir: &Path,
        target_format: &str,
        ffmpeg_path: &Path,
    ) -> Result<Self, ConverterError> {
        if !source_path.is_file() {
            return Err(ConverterError::InputNotFound {
                path: source_path.to_path_buf(),
            });
        }

        let category = classify(source_path)?;

        let target_format = normalize_format(target_format);
        if target_format.is_empty() {
            return Err(ConverterError::unsupported_format(category, target_format));
        }

        let output_path = output_dir.join(output_file_name(source_path, &target_format));

        Ok(Self::new(
            source_path,
            output_path,
            category,
            &target_format,
            ffmpeg_path,
        ))
    }
}

/// Progress update during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionProgress {
    /// Progress percentage (0 - 100).
    pub percent: u8,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Job ID.
    pub job_id: String,
    /// Output file path.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Conversion duration in milliseconds.
    pub duration_ms: u64,
    /// Category of the source file.
    pub category: MediaCategory,
    /// Output format used.
    pub target_format: String,
}

/// Terminal outcome of a job, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Success(ConversionResult),
    Failure { reason: String },
}

impl ConversionOutcome {
    /// Folds a conversion result into an outcome, prefixing failures with
    /// the category so the user sees which path failed.
    pub fn from_result(
        category: MediaCategory,
        result: Result<ConversionResult, ConverterError>,
    ) -> Self {
        match result {
            Ok(result) => Self::Success(result),
            Err(e) => Self::Failure {
                reason: format!("{} conversion error: {}", category, e),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
