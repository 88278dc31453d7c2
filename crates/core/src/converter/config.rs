//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::image_converter::DEFAULT_JPEG_QUALITY;

/// Configuration for the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to ffmpeg binary. A bare name is looked up next to the
    /// executable (when `search_bundled` is set) and then on `PATH`.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Whether to look for a bundled `ffmpeg/` directory before `PATH`.
    #[serde(default = "default_search_bundled")]
    pub search_bundled: bool,

    /// Directory converted files are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// JPEG quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_search_bundled() -> bool {
    true
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            search_bundled: default_search_bundled(),
            output_dir: None,
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl ConverterConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_ffmpeg_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    /// Sets the JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert!(config.search_bundled);
        assert_eq!(config.output_dir, None);
        assert_eq!(config.jpeg_quality, 95);
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::with_ffmpeg_path(PathBuf::from("/usr/local/bin/ffmpeg"))
            .with_output_dir(PathBuf::from("/tmp/out"))
            .with_jpeg_quality(80);

        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.jpeg_quality, 80);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: ConverterConfig = serde_json::from_str(r#"{"jpeg_quality": 70}"#).unwrap();
        assert_eq!(config.jpeg_quality, 70);
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert!(config.search_bundled);
    }
}
