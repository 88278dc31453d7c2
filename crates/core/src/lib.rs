pub mod config;
pub mod converter;
pub mod media;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, locate_ffmpeg, validate_config,
    Config, ConfigError, LoggingConfig,
};
pub use converter::{
    ConversionHandle, ConversionJob, ConversionOutcome, ConversionProgress, ConversionResult,
    ConversionTask, Converter, ConverterConfig, ConverterError, EncoderCapabilities,
    MediaConverter, ProcessRunner, ToolRunner,
};
pub use media::{classify, target_formats_for, MediaCategory};
