//! Extension and MIME based classification.

use std::path::Path;
use tracing::debug;

use super::types::MediaCategory;
use crate::converter::ConverterError;

/// Image extensions recognized without consulting the MIME registry.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "gif"];

/// Video extensions recognized without consulting the MIME registry.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv"];

/// Audio extensions recognized without consulting the MIME registry.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "ogg"];

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
}

fn extension_set(category: MediaCategory) -> &'static [&'static str] {
    match category {
        MediaCategory::Image => IMAGE_EXTENSIONS,
        MediaCategory::Audio => AUDIO_EXTENSIONS,
        MediaCategory::Video => VIDEO_EXTENSIONS,
    }
}

/// Classifies a file by extension, falling back to its guessed MIME type.
///
/// Only the path is inspected; the file does not have to exist.
pub fn classify(path: &Path) -> Result<MediaCategory, ConverterError> {
    if let Some(ext) = lowercase_extension(path) {
        for category in [MediaCategory::Image, MediaCategory::Video, MediaCategory::Audio] {
            if extension_set(category).contains(&ext.as_str()) {
                return Ok(category);
            }
        }
    }

    let category = mime_guess::from_path(path)
        .iter()
        .find_map(|mime| MediaCategory::from_mime_type(mime.type_().as_str()));

    match category {
        Some(category) => {
            debug!(path = %path.display(), %category, "Classified by MIME type");
            Ok(category)
        }
        None => Err(ConverterError::UnsupportedFileType {
            path: path.to_path_buf(),
        }),
    }
}

/// Target formats worth offering for a source file: the other extensions of
/// its category, sorted.
pub fn target_formats_for(path: &Path, category: MediaCategory) -> Vec<&'static str> {
    let current = lowercase_extension(path);
    let mut formats: Vec<&'static str> = extension_set(category)
        .iter()
        .copied()
        .filter(|ext| current.as_deref() != Some(*ext))
        .collect();
    formats.sort_unstable();
    formats
}
