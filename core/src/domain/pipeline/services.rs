use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::future::join_all;
use tracing::{Span, error, field, info, instrument, warn};

use crate::domain::{
    common::{entities::app_errors::CoreError, generate_uuid_v7, services::Service},
    detection::{entities::DetectionSet, ports::ObjectDetector, services::decode_image},
    nutrition::{
        entities::AnalysisSource,
        fallback::no_detection_analysis,
        ports::AdviceClient,
        prompt::build_prompt,
        services::{Advice, advise},
    },
    pipeline::{
        entities::{BatchItem, BatchOutcome, DetectionReport, PipelineResult, StageTimings},
        ports::FoodAnalysisService,
        value_objects::AnalyzeImageInput,
    },
};

struct DetectionStage {
    detections: DetectionSet,
    decode_ms: f64,
    detection_ms: f64,
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

impl<D, A> Service<D, A>
where
    D: ObjectDetector,
    A: AdviceClient,
{
    /// Decodes and detects on the worker pool so request handling never
    /// blocks on CPU-bound work.
    async fn run_detection(&self, image_data: Bytes) -> Result<DetectionStage, CoreError> {
        let permit = Arc::clone(&self.workers)
            .acquire_owned()
            .await
            .map_err(|_| CoreError::InternalServerError)?;
        let detector = Arc::clone(&self.detector);

        tokio::task::spawn_blocking(move || {
            let _permit = permit;

            let started = Instant::now();
            let image = decode_image(&image_data)?;
            let decode_ms = elapsed_ms(started);

            let started = Instant::now();
            let detections = detector.detect(&image)?;

            Ok(DetectionStage {
                detections,
                decode_ms,
                detection_ms: elapsed_ms(started),
            })
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Detection worker failed");
            CoreError::InternalServerError
        })?
    }
}

impl<D, A> FoodAnalysisService for Service<D, A>
where
    D: ObjectDetector,
    A: AdviceClient,
{
    #[instrument(skip_all, fields(filename = %input.filename, request_id = field::Empty))]
    async fn analyze_image(&self, input: AnalyzeImageInput) -> Result<PipelineResult, CoreError> {
        let request_id = generate_uuid_v7();
        Span::current().record("request_id", field::display(request_id));
        let started = Instant::now();

        let stage = self.run_detection(input.image_data).await?;
        let labels = stage.detections.labels();

        let (advice, advice_ms) = if labels.is_empty() {
            info!("No food detected, skipping nutrition advice");
            let advice = Advice {
                analysis: no_detection_analysis(),
                source: AnalysisSource::Fallback,
            };
            (advice, None)
        } else {
            let prompt = build_prompt(
                self.config.prompt_style,
                &labels,
                &stage.detections,
                self.config.prompt_detail_limit,
            );
            let advice_started = Instant::now();
            let advice = advise(self.advice_client.as_ref(), prompt).await;
            (advice, Some(elapsed_ms(advice_started)))
        };

        let timings = StageTimings {
            decode_ms: stage.decode_ms,
            detection_ms: stage.detection_ms,
            advice_ms,
            total_ms: elapsed_ms(started),
        };

        info!(
            detected_foods = ?labels,
            detections = stage.detections.len(),
            analysis_source = ?advice.source,
            total_ms = timings.total_ms,
            "Food analysis completed"
        );

        Ok(PipelineResult::new(
            request_id,
            input.filename,
            stage.detections,
            advice,
            timings,
        ))
    }

    #[instrument(skip_all, fields(filename = %input.filename, request_id = field::Empty))]
    async fn detect_image(&self, input: AnalyzeImageInput) -> Result<DetectionReport, CoreError> {
        let request_id = generate_uuid_v7();
        Span::current().record("request_id", field::display(request_id));
        let started = Instant::now();

        let stage = self.run_detection(input.image_data).await?;
        let timings = StageTimings {
            decode_ms: stage.decode_ms,
            detection_ms: stage.detection_ms,
            advice_ms: None,
            total_ms: elapsed_ms(started),
        };

        info!(detections = stage.detections.len(), "Food detection completed");

        Ok(DetectionReport::new(
            request_id,
            input.filename,
            stage.detections,
            timings,
        ))
    }

    #[instrument(skip_all, fields(images = inputs.len()))]
    async fn analyze_batch(&self, inputs: Vec<AnalyzeImageInput>) -> Result<Vec<BatchItem>, CoreError> {
        if inputs.is_empty() {
            return Err(CoreError::EmptyBatch);
        }
        if inputs.len() > self.config.max_batch_size {
            return Err(CoreError::TooManyImages {
                max: self.config.max_batch_size,
            });
        }

        let runs = inputs.into_iter().enumerate().map(|(index, input)| async move {
            let filename = input.filename.clone();
            let outcome = match self.analyze_image(input).await {
                Ok(result) => BatchOutcome::Completed(Box::new(result)),
                Err(error) => {
                    warn!(index, filename = %filename, error = %error, "Batch item failed");
                    BatchOutcome::Failed { filename, error }
                }
            };

            BatchItem { index, outcome }
        });

        Ok(join_all(runs).await)
    }

    async fn warmup(&self) -> Result<(), CoreError> {
        let detector = Arc::clone(&self.detector);

        tokio::task::spawn_blocking(move || detector.warmup())
            .await
            .map_err(|e| {
                error!(error = %e, "Warmup worker failed");
                CoreError::InternalServerError
            })?
    }
}
