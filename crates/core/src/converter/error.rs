//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

use crate::media::MediaCategory;

/// Errors that can occur during conversion.
///
/// Every variant is terminal for the job; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Neither the extension nor the MIME registry resolved a category.
    #[error("Unsupported file type: {path}")]
    UnsupportedFileType { path: PathBuf },

    /// Target format is not offered for the job's category.
    #[error("Unsupported {category} format: {format}")]
    UnsupportedFormat {
        category: MediaCategory,
        format: String,
    },

    /// The installed ffmpeg lacks an encoder the target format requires.
    #[error("FFmpeg does not support the {encoder} encoder required for {format}")]
    EncoderUnavailable { encoder: String, format: String },

    /// FFmpeg exited with a non-zero status.
    #[error("FFmpeg error: {message}")]
    ToolFailure { message: String },

    /// Tool exited cleanly but produced no file.
    #[error("Conversion failed: output not generated ({path})")]
    OutputMissing { path: PathBuf },

    /// Tool exited cleanly but produced an empty file.
    #[error("Conversion failed: output size zero ({path})")]
    OutputEmpty { path: PathBuf },

    /// Image library failed to decode or encode.
    #[error("{message}")]
    Image { message: String },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// FFmpeg binary could not be spawned.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Output would overwrite the source file.
    #[error("Output path is the same as the source file: {path}")]
    OutputCollidesWithSource { path: PathBuf },

    /// Another conversion is still running.
    #[error("A conversion is already in progress")]
    JobInProgress,

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a tool failure from raw stderr text.
    pub fn tool_failure(stderr: &str) -> Self {
        let trimmed = stderr.trim();
        Self::ToolFailure {
            message: if trimmed.is_empty() {
                "unknown error".to_string()
            } else {
                trimmed.to_string()
            },
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(category: MediaCategory, format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            category,
            format: format.into(),
        }
    }

    /// Creates an image conversion error.
    pub fn image(message: impl std::fmt::Display) -> Self {
        Self::Image {
            message: message.to_string(),
        }
    }

    /// Whether the error was raised before the external tool was launched.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFileType { .. }
                | Self::UnsupportedFormat { .. }
                | Self::EncoderUnavailable { .. }
                | Self::InputNotFound { .. }
                | Self::OutputCollidesWithSource { .. }
                | Self::JobInProgress
        )
    }
}
