//! External process execution.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::command::display_args;
use super::error::ConverterError;

/// Keeps a console window from flashing up for every child on Windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured result of one finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the child was terminated by a signal.
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// Turns a non-zero exit into `ToolFailure` carrying the trimmed stderr.
    pub fn into_result(self) -> Result<Self, ConverterError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ConverterError::tool_failure(&self.stderr))
        }
    }
}

/// Runs the external tool.
///
/// Implementations block the calling task until the child exits; there is
/// no retry and no cancellation.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Runs `program` with `args` and captures both output streams.
    ///
    /// Arguments are passed through as OS strings; only the captured
    /// output is decoded, replacing invalid UTF-8.
    async fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ConverterError>;
}

/// `ToolRunner` backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(program: &Path) -> Command {
        #[allow(unused_mut)]
        let mut cmd = Command::new(program);
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);
        cmd
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ConverterError> {
        debug!(program = %program.display(), args = %display_args(args), "Spawning tool");

        let output = Self::command(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::FfmpegNotFound {
                        path: program.to_path_buf(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        let result = ToolOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(code = ?result.status_code, "Tool exited");
        Ok(result)
    }
}
