//! Converter module for turning one media file into another format.
//!
//! Images are re-encoded in process with the `image` crate; audio and video
//! are handed to ffmpeg with a fixed per-format set of codec and container
//! flags.
//!
//! # Flow
//!
//! 1. [`ConversionJob::plan`] classifies the source and names the output.
//! 2. [`MediaConverter`] probes `ffmpeg -encoders`, builds a [`CommandSpec`]
//!    and runs it (audio/video), or flattens and re-encodes (image).
//! 3. The output is checked to exist and be non-empty.
//! 4. [`ConversionTask`] runs all of this on a background task and hands
//!    back progress milestones plus one [`ConversionOutcome`].
//!
//! # Example
//!
//! ```ignore
//! use mediaconv_core::converter::{ConversionTask, ConverterConfig, MediaConverter};
//!
//! let converter = Arc::new(MediaConverter::new(ConverterConfig::default()));
//! let job = converter.plan(Path::new("clip.mov"), Path::new("/tmp"), "mp4")?;
//!
//! let tasks = ConversionTask::new(converter);
//! let outcome = tasks
//!     .spawn(job)?
//!     .wait_with(|p| println!("{}%", p.percent))
//!     .await;
//! ```

mod capabilities;
mod command;
mod config;
mod dispatcher;
mod error;
mod image_converter;
mod progress;
mod runner;
mod task;
mod traits;
mod types;
mod validate;

pub use capabilities::EncoderCapabilities;
pub use command::{
    build_command, display_args, lookup_profile, CommandSpec, FormatProfile, FORMAT_PROFILES,
};
pub use config::ConverterConfig;
pub use dispatcher::MediaConverter;
pub use error::ConverterError;
pub use image_converter::{
    convert_image, flatten_onto_white, image_format_for, DEFAULT_JPEG_QUALITY,
};
pub use progress::{milestones, ProgressReporter};
pub use runner::{ProcessRunner, ToolOutput, ToolRunner};
pub use task::{ConversionHandle, ConversionTask, JobSlot};
pub use traits::Converter;
pub use types::{
    normalize_format, output_file_name, ConversionJob, ConversionOutcome, ConversionProgress,
    ConversionResult, OUTPUT_SUFFIX,
};
pub use validate::validate_output;
