//! Mock tool runner for testing.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::converter::{ConverterError, ToolOutput, ToolRunner};

/// A recorded invocation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl RecordedInvocation {
    /// Whether this was an `-encoders` capability probe.
    pub fn is_probe(&self) -> bool {
        self.args.len() == 1 && self.args[0] == "-encoders"
    }

    /// Whether this was a `-version` check.
    pub fn is_version_check(&self) -> bool {
        self.args.len() == 1 && self.args[0] == "-version"
    }

    /// Whether this was an actual conversion run.
    pub fn is_conversion(&self) -> bool {
        !self.is_probe() && !self.is_version_check()
    }
}

#[derive(Debug)]
struct MockState {
    listing: String,
    probe_exit_code: i32,
    exit_code: Option<i32>,
    stderr: String,
    output_bytes: Option<Vec<u8>>,
    missing_binary: bool,
    invocations: Vec<RecordedInvocation>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            listing: String::new(),
            probe_exit_code: 0,
            exit_code: Some(0),
            stderr: String::new(),
            output_bytes: None,
            missing_binary: false,
            invocations: Vec::new(),
        }
    }
}

/// Mock implementation of the `ToolRunner` trait.
///
/// Answers `-encoders` with a scripted listing, `-version` with success and
/// any other invocation as a conversion: optionally writes bytes to the
/// last argument (the output path) and exits with the scripted code.
/// Clones share state, so a clone handed to the converter can be inspected
/// afterwards.
///
/// # Example
///
/// ```rust,ignore
/// use mediaconv_core::testing::MockRunner;
///
/// let runner = MockRunner::new()
///     .with_encoders(["libmp3lame"])
///     .with_output_bytes(vec![0xFF; 128]);
/// let converter = MediaConverter::with_runner(ConverterConfig::default(), runner.clone());
///
/// converter.convert(job).await?;
/// assert_eq!(runner.conversion_invocations().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

impl MockRunner {
    /// Create a new mock runner: empty encoder listing, exit code 0, no
    /// output written.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Scripts the `-encoders` listing with one row per name.
    pub fn with_encoders<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut listing = String::from("Encoders:\n ------\n");
        for name in names {
            listing.push_str(&format!(" A....D {:<20} mock encoder\n", name.as_ref()));
        }
        self.with_listing(listing)
    }

    /// Scripts the raw `-encoders` output.
    pub fn with_listing(self, listing: impl Into<String>) -> Self {
        self.state().listing = listing.into();
        self
    }

    /// Exit code of the `-encoders` probe.
    pub fn with_probe_exit_code(self, code: i32) -> Self {
        self.state().probe_exit_code = code;
        self
    }

    /// Exit code of conversion runs; `None` simulates a signal.
    pub fn with_exit_code(self, code: Option<i32>) -> Self {
        self.state().exit_code = code;
        self
    }

    /// Stderr printed by conversion runs.
    pub fn with_stderr(self, stderr: impl Into<String>) -> Self {
        self.state().stderr = stderr.into();
        self
    }

    /// Bytes written to the output path by conversion runs.
    pub fn with_output_bytes(self, bytes: Vec<u8>) -> Self {
        self.state().output_bytes = Some(bytes);
        self
    }

    /// Makes every invocation fail as if the binary did not exist.
    pub fn with_missing_binary(self) -> Self {
        self.state().missing_binary = true;
        self
    }

    /// Get all recorded invocations.
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.state().invocations.clone()
    }

    /// Recorded conversion runs, excluding probes and version checks.
    pub fn conversion_invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations()
            .into_iter()
            .filter(RecordedInvocation::is_conversion)
            .collect()
    }

    /// Clear recorded invocations.
    pub fn clear_recorded(&self) {
        self.state().invocations.clear();
    }
}

#[async_trait]
impl ToolRunner for MockRunner {
    async fn run(&self, program: &Path, args: &[OsString]) -> Result<ToolOutput, ConverterError> {
        let invocation = RecordedInvocation {
            program: program.to_path_buf(),
            args: args.to_vec(),
        };

        let (missing_binary, output_bytes, response) = {
            let mut state = self.state();
            state.invocations.push(invocation.clone());

            let response = if invocation.is_probe() {
                ToolOutput {
                    status_code: Some(state.probe_exit_code),
                    stdout: state.listing.clone(),
                    stderr: String::new(),
                }
            } else if invocation.is_version_check() {
                ToolOutput {
                    status_code: Some(0),
                    stdout: "ffmpeg version mock".to_string(),
                    stderr: String::new(),
                }
            } else {
                ToolOutput {
                    status_code: state.exit_code,
                    stdout: String::new(),
                    stderr: state.stderr.clone(),
                }
            };
            (state.missing_binary, state.output_bytes.clone(), response)
        };

        if missing_binary {
            return Err(ConverterError::FfmpegNotFound {
                path: program.to_path_buf(),
            });
        }

        if invocation.is_conversion() {
            if let (Some(bytes), Some(output)) = (output_bytes, args.last()) {
                tokio::fs::write(output, bytes).await?;
            }
        }

        Ok(response)
    }
}
