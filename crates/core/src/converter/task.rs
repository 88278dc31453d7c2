//! Background execution of a single conversion job.
//!
//! A job runs on its own tokio task so the caller stays responsive while
//! ffmpeg or the image encoder works. The caller gets a handle with a
//! progress receiver and the terminal outcome; the outcome can be taken
//! only once.

use std::sync::Arc;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionOutcome, ConversionProgress};
use crate::media::MediaCategory;

/// Admits one conversion at a time.
#[derive(Debug, Clone)]
pub struct JobSlot {
    semaphore: Arc<Semaphore>,
}

impl Default for JobSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl JobSlot {
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// Claims the slot, failing with `JobInProgress` while a job holds it.
    pub fn try_acquire(&self) -> Result<OwnedSemaphorePermit, ConverterError> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .map_err(|_| ConverterError::JobInProgress)
    }

    pub fn is_busy(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

/// Handle to a running conversion.
#[derive(Debug)]
pub struct ConversionHandle {
    job_id: String,
    category: MediaCategory,
    progress_rx: mpsc::UnboundedReceiver<ConversionProgress>,
    task: JoinHandle<ConversionOutcome>,
}

impl ConversionHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Next progress value; `None` once the job has finished and every
    /// value has been received.
    pub async fn next_progress(&mut self) -> Option<ConversionProgress> {
        self.progress_rx.recv().await
    }

    /// Waits for the terminal outcome. Progress not yet received is
    /// discarded.
    pub async fn outcome(self) -> ConversionOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(job_id = %self.job_id, error = %e, "Conversion task aborted");
                ConversionOutcome::Failure {
                    reason: format!("{} conversion error: task aborted: {}", self.category, e),
                }
            }
        }
    }

    /// Drains progress into `on_progress`, then returns the outcome.
    pub async fn wait_with<F>(mut self, mut on_progress: F) -> ConversionOutcome
    where
        F: FnMut(ConversionProgress),
    {
        while let Some(progress) = self.next_progress().await {
            on_progress(progress);
        }
        self.outcome().await
    }
}

/// Spawns conversion jobs for a converter, one at a time.
pub struct ConversionTask<C> {
    converter: Arc<C>,
    slot: JobSlot,
}

impl<C> Clone for ConversionTask<C> {
    fn clone(&self) -> Self {
        Self {
            converter: Arc::clone(&self.converter),
            slot: self.slot.clone(),
        }
    }
}

impl<C: Converter + 'static> ConversionTask<C> {
    pub fn new(converter: Arc<C>) -> Self {
        Self {
            converter,
            slot: JobSlot::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Starts `job` on a background task.
    ///
    /// Fails with `JobInProgress` if the previous job has not finished.
    pub fn spawn(&self, job: ConversionJob) -> Result<ConversionHandle, ConverterError> {
        let permit = self.slot.try_acquire()?;
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();

        let job_id = job.job_id.clone();
        let category = job.category;
        let converter = Arc::clone(&self.converter);

        info!(job_id = %job_id, converter = converter.name(), "Spawning conversion");
        let task = tokio::spawn(async move {
            let result = converter.convert_with_progress(job, progress_tx).await;
            drop(permit);
            ConversionOutcome::from_result(category, result)
        });

        Ok(ConversionHandle {
            job_id,
            category,
            progress_rx,
            task,
        })
    }
}
