//! FFmpeg command construction for audio and video jobs.
//!
//! The flag table below pairs every target with the codec/container
//! combination known to produce a playable file. Rows that need an
//! optional encoder are checked against the probed capabilities before
//! anything is launched.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use super::capabilities::EncoderCapabilities;
use super::error::ConverterError;
use super::types::ConversionJob;
use crate::media::MediaCategory;

/// Codec and container flags for one target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatProfile {
    pub format: &'static str,
    pub category: MediaCategory,
    /// Encoder that must appear in `ffmpeg -encoders` for this row.
    pub required_encoder: Option<&'static str>,
    pub flags: &'static [&'static str],
}

const H264_FLAGS: &[&str] = &[
    "-c:a", "aac", "-c:v", "libx264", "-preset", "medium", "-crf", "23",
];

pub static FORMAT_PROFILES: &[FormatProfile] = &[
    FormatProfile {
        format: "mp4",
        category: MediaCategory::Video,
        required_encoder: Some("libx264"),
        flags: H264_FLAGS,
    },
    FormatProfile {
        format: "mkv",
        category: MediaCategory::Video,
        required_encoder: Some("libx264"),
        flags: H264_FLAGS,
    },
    FormatProfile {
        format: "flv",
        category: MediaCategory::Video,
        required_encoder: None,
        flags: &["-c:a", "aac", "-c:v", "flv", "-f", "flv"],
    },
    FormatProfile {
        format: "wmv",
        category: MediaCategory::Video,
        required_encoder: Some("wmv2"),
        flags: &["-c:a", "wmav2", "-c:v", "wmv2", "-f", "asf"],
    },
    FormatProfile {
        format: "avi",
        category: MediaCategory::Video,
        required_encoder: None,
        flags: &["-c:a", "mp3", "-c:v", "mpeg4"],
    },
    FormatProfile {
        format: "mov",
        category: MediaCategory::Video,
        required_encoder: None,
        flags: &["-c:a", "aac", "-c:v", "h264", "-f", "mov"],
    },
    FormatProfile {
        format: "m4a",
        category: MediaCategory::Audio,
        required_encoder: Some("aac"),
        flags: &[
            "-c:a",
            "aac",
            "-b:a",
            "192k",
            "-f",
            "mp4",
            "-movflags",
            "+faststart",
        ],
    },
    FormatProfile {
        format: "mp3",
        category: MediaCategory::Audio,
        required_encoder: Some("libmp3lame"),
        flags: &["-c:a", "libmp3lame", "-q:a", "4"],
    },
    FormatProfile {
        format: "wav",
        category: MediaCategory::Audio,
        required_encoder: None,
        flags: &["-c:a", "pcm_s16le", "-ar", "44100"],
    },
    FormatProfile {
        format: "ogg",
        category: MediaCategory::Audio,
        required_encoder: Some("libvorbis"),
        flags: &["-c:a", "libvorbis", "-q:a", "4"],
    },
];

/// Finds the profile for a target format within a category.
pub fn lookup_profile(category: MediaCategory, format: &str) -> Option<&'static FormatProfile> {
    let format = format.to_lowercase();
    FORMAT_PROFILES
        .iter()
        .find(|p| p.category == category && p.format == format)
}

/// Fully resolved ffmpeg invocation for one job.
///
/// Paths stay as OS strings so names that are not valid UTF-8 reach the
/// tool byte for byte; text conversion happens only for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    /// `-hide_banner -i <source> -y`
    pub base_args: Vec<OsString>,
    /// Codec and container flags from the profile table.
    pub format_args: Vec<&'static str>,
    pub output: PathBuf,
}

impl CommandSpec {
    /// Arguments in launch order, without the program.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.base_args.len() + self.format_args.len() + 1);
        args.extend(self.base_args.iter().cloned());
        args.extend(self.format_args.iter().map(OsString::from));
        args.push(self.output.clone().into_os_string());
        args
    }

    /// Program followed by the arguments.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv = vec![self.program.clone().into_os_string()];
        argv.extend(self.args());
        argv
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_args(&self.argv()))
    }
}

/// Space-joined, lossily decoded arguments for logs.
pub fn display_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the ffmpeg command for an audio or video job.
///
/// Fails with `UnsupportedFormat` for targets missing from the table and
/// with `EncoderUnavailable` when a required encoder is not in `caps`.
pub fn build_command(
    job: &ConversionJob,
    caps: &EncoderCapabilities,
) -> Result<CommandSpec, ConverterError> {
    let profile = lookup_profile(job.category, &job.target_format)
        .ok_or_else(|| ConverterError::unsupported_format(job.category, &job.target_format))?;

    if let Some(encoder) = profile.required_encoder {
        if !caps.supports(encoder) {
            return Err(ConverterError::EncoderUnavailable {
                encoder: encoder.to_string(),
                format: profile.format.to_string(),
            });
        }
    }

    Ok(CommandSpec {
        program: job.ffmpeg_path.clone(),
        base_args: vec![
            OsString::from("-hide_banner"),
            OsString::from("-i"),
            job.source_path.clone().into_os_string(),
            OsString::from("-y"),
        ],
        format_args: profile.flags.to_vec(),
        output: job.output_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(category: MediaCategory, format: &str) -> ConversionJob {
        ConversionJob::new(
            "/in/source.bin",
            format!("/out/source_converted.{}", format),
            category,
            format,
            "/opt/ffmpeg/ffmpeg",
        )
    }

    fn all_encoders() -> EncoderCapabilities {
        EncoderCapabilities::from_names(["libx264", "wmv2", "aac", "libmp3lame", "libvorbis"])
    }

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_every_profile_flags_and_grouping() {
        const H264: &[&str] = &[
            "-c:a", "aac", "-c:v", "libx264", "-preset", "medium", "-crf", "23",
        ];
        const M4A: &[&str] = &[
            "-c:a",
            "aac",
            "-b:a",
            "192k",
            "-f",
            "mp4",
            "-movflags",
            "+faststart",
        ];
        let expected: &[(MediaCategory, &str, &[&str])] = &[
            (MediaCategory::Video, "mp4", H264),
            (MediaCategory::Video, "mkv", H264),
            (
                MediaCategory::Video,
                "flv",
                &["-c:a", "aac", "-c:v", "flv", "-f", "flv"],
            ),
            (
                MediaCategory::Video,
                "wmv",
                &["-c:a", "wmav2", "-c:v", "wmv2", "-f", "asf"],
            ),
            (MediaCategory::Video, "avi", &["-c:a", "mp3", "-c:v", "mpeg4"]),
            (
                MediaCategory::Video,
                "mov",
                &["-c:a", "aac", "-c:v", "h264", "-f", "mov"],
            ),
            (MediaCategory::Audio, "m4a", M4A),
            (MediaCategory::Audio, "mp3", &["-c:a", "libmp3lame", "-q:a", "4"]),
            (MediaCategory::Audio, "wav", &["-c:a", "pcm_s16le", "-ar", "44100"]),
            (MediaCategory::Audio, "ogg", &["-c:a", "libvorbis", "-q:a", "4"]),
        ];
        assert_eq!(expected.len(), FORMAT_PROFILES.len());

        for (category, format, flags) in expected {
            let job = job(*category, format);
            let spec = build_command(&job, &all_encoders()).unwrap();

            assert_eq!(
                spec.base_args,
                os(&["-hide_banner", "-i", "/in/source.bin", "-y"]),
                "base args for {}",
                format
            );
            assert_eq!(spec.format_args, flags.to_vec(), "flags for {}", format);
            assert_eq!(
                spec.output,
                PathBuf::from(format!("/out/source_converted.{}", format))
            );

            let args = spec.args();
            assert_eq!(args.len(), 4 + flags.len() + 1);
            assert_eq!(&args[4..4 + flags.len()], os(flags).as_slice());
            assert_eq!(args.last(), Some(&spec.output.clone().into_os_string()));
        }
    }

    #[test]
    fn test_mp3_with_lame() {
        let caps = EncoderCapabilities::from_names(["libmp3lame"]);
        let spec = build_command(&job(MediaCategory::Audio, "mp3"), &caps).unwrap();
        assert_eq!(spec.format_args, vec!["-c:a", "libmp3lame", "-q:a", "4"]);
    }

    #[test]
    fn test_mp3_without_lame_fails() {
        let caps = EncoderCapabilities::from_names(["aac"]);
        let err = build_command(&job(MediaCategory::Audio, "mp3"), &caps).unwrap_err();
        assert!(matches!(
            err,
            ConverterError::EncoderUnavailable { ref encoder, .. } if encoder == "libmp3lame"
        ));
    }

    #[test]
    fn test_required_encoders() {
        let empty = EncoderCapabilities::default();
        for (category, format) in [
            (MediaCategory::Video, "mp4"),
            (MediaCategory::Video, "mkv"),
            (MediaCategory::Video, "wmv"),
            (MediaCategory::Audio, "m4a"),
            (MediaCategory::Audio, "ogg"),
        ] {
            let err = build_command(&job(category, format), &empty).unwrap_err();
            assert!(matches!(err, ConverterError::EncoderUnavailable { .. }), "{}", format);
        }

        for (category, format) in [
            (MediaCategory::Video, "flv"),
            (MediaCategory::Video, "avi"),
            (MediaCategory::Video, "mov"),
            (MediaCategory::Audio, "wav"),
        ] {
            assert!(build_command(&job(category, format), &empty).is_ok(), "{}", format);
        }
    }

    #[test]
    fn test_unknown_format() {
        let err =
            build_command(&job(MediaCategory::Video, "webm"), &all_encoders()).unwrap_err();
        assert!(matches!(err, ConverterError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_format_from_other_category_is_unsupported() {
        let err = build_command(&job(MediaCategory::Audio, "mp4"), &all_encoders()).unwrap_err();
        assert!(matches!(
            err,
            ConverterError::UnsupportedFormat {
                category: MediaCategory::Audio,
                ..
            }
        ));

        let err = build_command(&job(MediaCategory::Image, "png"), &all_encoders()).unwrap_err();
        assert!(matches!(err, ConverterError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_display_and_argv() {
        let caps = EncoderCapabilities::default();
        let spec = build_command(&job(MediaCategory::Audio, "wav"), &caps).unwrap();
        assert_eq!(spec.argv()[0], "/opt/ffmpeg/ffmpeg");
        assert_eq!(
            spec.to_string(),
            "/opt/ffmpeg/ffmpeg -hide_banner -i /in/source.bin -y \
             -c:a pcm_s16le -ar 44100 /out/source_converted.wav"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_pass_through_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let source = PathBuf::from(OsStr::from_bytes(b"/in/caf\xe9.wav"));
        let output = PathBuf::from(OsStr::from_bytes(b"/out/caf\xe9_converted.mp3"));
        let job = ConversionJob::new(&source, &output, MediaCategory::Audio, "mp3", "ffmpeg");
        let spec = build_command(&job, &all_encoders()).unwrap();

        let args = spec.args();
        assert_eq!(args[2].as_bytes(), b"/in/caf\xe9.wav");
        assert_eq!(args.last().unwrap().as_bytes(), b"/out/caf\xe9_converted.mp3");
        assert!(spec.to_string().contains("caf\u{FFFD}.wav"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(lookup_profile(MediaCategory::Video, "MOV").is_some());
        assert!(lookup_profile(MediaCategory::Image, "mov").is_none());
    }
}
