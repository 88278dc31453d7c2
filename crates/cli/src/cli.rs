//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mediaconv")]
#[command(
    version,
    about = "Convert images, audio and video between common formats",
    long_about = None
)]
pub struct Cli {
    /// Configuration file (defaults to $MEDIACONV_CONFIG, then ./mediaconv.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// FFmpeg binary, overriding the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a file to another format
    Convert {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Target format, e.g. png, mp3, mkv
        #[arg(short, long, value_name = "FORMAT")]
        to: String,

        /// Directory the converted file is written to
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the formats a file can be converted to
    Formats {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the encoders the installed ffmpeg provides
    Encoders,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from([
            "mediaconv", "convert", "clip.mov", "--to", "mp4", "-o", "/tmp/out", "--json",
        ]);
        match cli.command {
            Command::Convert {
                file,
                to,
                output_dir,
                json,
            } => {
                assert_eq!(file, PathBuf::from("clip.mov"));
                assert_eq!(to, "mp4");
                assert_eq!(output_dir, Some(PathBuf::from("/tmp/out")));
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["mediaconv", "encoders", "--ffmpeg", "/opt/ff", "-v"]);
        assert!(matches!(cli.command, Command::Encoders));
        assert_eq!(cli.ffmpeg, Some(PathBuf::from("/opt/ff")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_convert_requires_target() {
        assert!(Cli::try_parse_from(["mediaconv", "convert", "clip.mov"]).is_err());
    }
}
