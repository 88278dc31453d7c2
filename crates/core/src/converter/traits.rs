//! Trait definitions for the converter module.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::capabilities::EncoderCapabilities;
use super::error::ConverterError;
use super::types::{ConversionJob, ConversionProgress, ConversionResult};

/// A converter that can carry out conversion jobs.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts a file according to the job, reporting milestone progress.
    ///
    /// If the receiving end of `progress_tx` is dropped, conversion
    /// continues without progress reporting.
    async fn convert_with_progress(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::UnboundedSender<ConversionProgress>,
    ) -> Result<ConversionResult, ConverterError>;

    /// Converts a file without progress reporting.
    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        let (tx, _rx) = mpsc::unbounded_channel();
        self.convert_with_progress(job, tx).await
    }

    /// Queries the encoders the configured tool supports.
    async fn capabilities(&self) -> Result<EncoderCapabilities, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaCategory;

    struct EchoConverter;

    #[async_trait]
    impl Converter for EchoConverter {
        fn name(&self) -> &str {
            "echo"
        }

        async fn convert_with_progress(
            &self,
            job: ConversionJob,
            progress_tx: mpsc::UnboundedSender<ConversionProgress>,
        ) -> Result<ConversionResult, ConverterError> {
            let _ = progress_tx.send(ConversionProgress { percent: 100 });
            Ok(ConversionResult {
                job_id: job.job_id,
                output_path: job.output_path,
                output_size_bytes: 1,
                duration_ms: 0,
                category: job.category,
                target_format: job.target_format,
            })
        }

        async fn capabilities(&self) -> Result<EncoderCapabilities, ConverterError> {
            Ok(EncoderCapabilities::default())
        }

        async fn validate(&self) -> Result<(), ConverterError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_default_convert_ignores_progress() {
        let job = ConversionJob::new(
            "/a.wav",
            "/a_converted.mp3",
            MediaCategory::Audio,
            "mp3",
            "ffmpeg",
        );
        let result = EchoConverter.convert(job.clone()).await.unwrap();
        assert_eq!(result.job_id, job.job_id);
        assert_eq!(result.target_format, "mp3");
    }
}
