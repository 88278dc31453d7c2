//! Encoder capability detection.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::Path;
use tracing::{debug, warn};

use super::error::ConverterError;
use super::runner::ToolRunner;

/// Matches an encoder row of `ffmpeg -encoders`, e.g.
/// ` V....D libx264              libx264 H.264 / AVC ...`.
static ENCODER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[VAS][F.][S.][X.][B.][D.]\s+([A-Za-z0-9_\-]+)\s")
        .expect("encoder line regex is valid")
});

/// Encoders reported by one ffmpeg installation.
///
/// Queried once per job, right before the command is built. Lookups are
/// substring matches against the lowercased listing, so `aac` is satisfied
/// by any row mentioning it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderCapabilities {
    listing: String,
    names: BTreeSet<String>,
}

impl EncoderCapabilities {
    /// Parses the text printed by `ffmpeg -encoders`.
    pub fn from_listing(listing: &str) -> Self {
        let names = listing
            .lines()
            .filter_map(|line| ENCODER_LINE.captures(line))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_lowercase()))
            .collect();
        Self {
            listing: listing.to_lowercase(),
            names,
        }
    }

    /// Capability set with the given encoder names only.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_lowercase())
            .collect();
        let listing = names.iter().cloned().collect::<Vec<_>>().join("\n");
        Self { listing, names }
    }

    /// Probes the tool with `-encoders`.
    ///
    /// A probe that runs but exits non-zero yields an empty set, so any
    /// format with a required encoder then fails before launch.
    pub async fn detect<R: ToolRunner + ?Sized>(
        runner: &R,
        ffmpeg_path: &Path,
    ) -> Result<Self, ConverterError> {
        let output = runner.run(ffmpeg_path, &[OsString::from("-encoders")]).await?;

        if !output.success() {
            warn!(
                code = ?output.status_code,
                "Encoder probe failed, assuming no optional encoders"
            );
            return Ok(Self::default());
        }

        let caps = Self::from_listing(&output.stdout);
        debug!(count = caps.names.len(), "Detected ffmpeg encoders");
        Ok(caps)
    }

    /// Whether the listing mentions `encoder`.
    pub fn supports(&self, encoder: &str) -> bool {
        !encoder.is_empty() && self.listing.contains(&encoder.to_lowercase())
    }

    /// Encoder names parsed from the listing rows.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.listing.trim().is_empty()
    }
}
