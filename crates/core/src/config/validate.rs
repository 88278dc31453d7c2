use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - ffmpeg path is not empty
/// - JPEG quality is within 1..=100
/// - log filter is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.converter.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "converter.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if !(1..=100).contains(&config.converter.jpeg_quality) {
        return Err(ConfigError::ValidationError(format!(
            "converter.jpeg_quality must be between 1 and 100, got {}",
            config.converter.jpeg_quality
        )));
    }

    if config.logging.filter.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "logging.filter cannot be empty".to_string(),
        ));
    }

    Ok(())
}
