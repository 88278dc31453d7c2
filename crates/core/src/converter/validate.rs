//! Post-conversion output checks.

use std::io::ErrorKind;
use std::path::Path;

use super::error::ConverterError;

/// Confirms the tool actually produced something and returns its size.
///
/// A zero-byte file usually means the encode failed even though ffmpeg
/// exited with status 0, so it is reported separately from a missing file.
pub async fn validate_output(path: &Path) -> Result<u64, ConverterError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConverterError::OutputMissing {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(ConverterError::Io(e)),
    };

    if !metadata.is_file() {
        return Err(ConverterError::OutputMissing {
            path: path.to_path_buf(),
        });
    }

    match metadata.len() {
        0 => Err(ConverterError::OutputEmpty {
            path: path.to_path_buf(),
        }),
        size => Ok(size),
    }
}
