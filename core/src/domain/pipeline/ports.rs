use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    pipeline::{
        entities::{BatchItem, DetectionReport, PipelineResult},
        value_objects::AnalyzeImageInput,
    },
};

/// Detection-to-advice pipeline.
pub trait FoodAnalysisService: Send + Sync {
    /// Decode, detect, advise. Only decode and detection failures are errors.
    fn analyze_image(
        &self,
        input: AnalyzeImageInput,
    ) -> impl Future<Output = Result<PipelineResult, CoreError>> + Send;

    /// Decode and detect, never touching the LLM.
    fn detect_image(
        &self,
        input: AnalyzeImageInput,
    ) -> impl Future<Output = Result<DetectionReport, CoreError>> + Send;

    /// Runs every image independently and concurrently. The result has one
    /// entry per input, in input order; only batch-level limits are errors.
    fn analyze_batch(
        &self,
        inputs: Vec<AnalyzeImageInput>,
    ) -> impl Future<Output = Result<Vec<BatchItem>, CoreError>> + Send;

    /// Loads the model and runs one dummy inference. Idempotent.
    fn warmup(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}
