//! Testing utilities and mock implementations.
//!
//! The dispatcher talks to ffmpeg only through `ToolRunner`, so swapping in
//! `MockRunner` exercises every audio/video path without a real binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediaconv_core::testing::{fixtures, MockRunner};
//!
//! let runner = MockRunner::new().with_encoders(["libx264", "aac"]);
//! let dir = tempfile::TempDir::new()?;
//! let source = fixtures::write_source(dir.path(), "clip.mov");
//! ```

mod mock_runner;

pub use mock_runner::{MockRunner, RecordedInvocation};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Every encoder any profile requires.
    pub const ALL_REQUIRED_ENCODERS: &[&str] =
        &["libx264", "wmv2", "aac", "libmp3lame", "libvorbis"];

    /// Writes a placeholder source file; ffmpeg is mocked so the contents
    /// never get decoded.
    pub fn write_source(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"placeholder media bytes").expect("write fixture source");
        path
    }

    /// Writes a small RGBA PNG with a transparent left half.
    pub fn write_transparent_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                image::Rgba([0, 0, 0, 0])
            } else {
                image::Rgba([0, 128, 0, 255])
            }
        });
        img.save_with_format(&path, image::ImageFormat::Png)
            .expect("write fixture png");
        path
    }
}
