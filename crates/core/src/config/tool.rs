//! FFmpeg binary discovery.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::ConfigError;
use crate::converter::ConverterConfig;

/// Directory name a bundled ffmpeg is shipped in, next to the executable or
/// in the working directory.
pub const BUNDLED_TOOL_DIR: &str = "ffmpeg";

fn executable_name(name: &Path) -> PathBuf {
    if cfg!(windows) && name.extension().is_none() {
        name.with_extension("exe")
    } else {
        name.to_path_buf()
    }
}

/// Resolves `tool` to an existing binary.
///
/// A path with directory components must exist as given. A bare name is
/// looked up under `<root>/ffmpeg/` for each bundle root (when
/// `search_bundled` is set) and then on `PATH`.
pub fn locate_tool_in(
    tool: &Path,
    search_bundled: bool,
    bundle_roots: &[PathBuf],
) -> Result<PathBuf, ConfigError> {
    if tool.is_absolute() || tool.components().count() > 1 {
        if tool.is_file() {
            return Ok(tool.to_path_buf());
        }
        return Err(ConfigError::ToolNotFound {
            tried: vec![tool.to_path_buf()],
        });
    }

    let exe = executable_name(tool);
    let mut tried = Vec::new();

    if search_bundled {
        for root in bundle_roots {
            let candidate = root.join(BUNDLED_TOOL_DIR).join(&exe);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "Using bundled ffmpeg");
                return Ok(candidate);
            }
            tried.push(candidate);
        }
    }

    match which::which(tool) {
        Ok(path) => {
            debug!(path = %path.display(), "Using ffmpeg from PATH");
            Ok(path)
        }
        Err(_) => {
            tried.push(tool.to_path_buf());
            Err(ConfigError::ToolNotFound { tried })
        }
    }
}

/// Resolves the configured ffmpeg, searching next to the running
/// executable and in the working directory before `PATH`.
pub fn locate_ffmpeg(config: &ConverterConfig) -> Result<PathBuf, ConfigError> {
    let mut roots = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(dir);
    }
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    locate_tool_in(&config.ffmpeg_path, config.search_bundled, &roots)
}
