//! Milestone progress reporting.
//!
//! Progress is a fixed set of milestones, not derived from the encoder's
//! position in the stream.

use tokio::sync::mpsc;
use tracing::trace;

use super::types::ConversionProgress;

/// Fixed percentages emitted along each conversion path.
pub mod milestones {
    /// Image decoded.
    pub const IMAGE_LOADED: u8 = 30;
    /// Image flattened to opaque RGB.
    pub const IMAGE_NORMALIZED: u8 = 60;
    /// FFmpeg about to be launched.
    pub const MEDIA_STARTED: u8 = 10;
    /// Output written and validated.
    pub const COMPLETE: u8 = 100;
}

/// Sends strictly increasing progress values to the caller.
///
/// Values that do not advance past the last one are dropped and values
/// above 100 are clamped. Sending never blocks; once the receiver is gone
/// the reporter goes quiet and conversion carries on.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<ConversionProgress>>,
    last: Option<u8>,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::UnboundedSender<ConversionProgress>) -> Self {
        Self {
            tx: Some(tx),
            last: None,
        }
    }

    /// Reporter that discards everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Reports `percent` if it advances past the previous value.
    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(milestones::COMPLETE);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        trace!(percent, "Progress");

        if let Some(tx) = &self.tx {
            if tx.send(ConversionProgress { percent }).is_err() {
                self.tx = None;
            }
        }
    }

    /// Last value reported, if any.
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}
