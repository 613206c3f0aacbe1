use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    common::entities::app_errors::CoreError,
    detection::entities::DetectionSet,
    nutrition::{
        entities::{AnalysisSource, NutritionAnalysis},
        services::Advice,
    },
};

/// Elapsed milliseconds per pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StageTimings {
    pub decode_ms: f64,
    pub detection_ms: f64,
    /// Absent when the LLM was not consulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice_ms: Option<f64>,
    pub total_ms: f64,
}

/// Outcome of one full detect-and-advise run. `detected_foods` is always the
/// unique-label projection of `detections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PipelineResult {
    pub request_id: Uuid,
    pub filename: String,
    pub detected_foods: Vec<String>,
    pub detections: DetectionSet,
    pub nutrition_analysis: NutritionAnalysis,
    pub analysis_source: AnalysisSource,
    pub timings: StageTimings,
}

impl PipelineResult {
    pub fn new(
        request_id: Uuid,
        filename: String,
        detections: DetectionSet,
        advice: Advice,
        timings: StageTimings,
    ) -> Self {
        Self {
            request_id,
            filename,
            detected_foods: detections.labels(),
            detections,
            nutrition_analysis: advice.analysis,
            analysis_source: advice.source,
            timings,
        }
    }
}

/// Outcome of the detection-only path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectionReport {
    pub request_id: Uuid,
    pub filename: String,
    pub detected_foods: Vec<String>,
    pub detections: DetectionSet,
    pub timings: StageTimings,
}

impl DetectionReport {
    pub fn new(
        request_id: Uuid,
        filename: String,
        detections: DetectionSet,
        timings: StageTimings,
    ) -> Self {
        Self {
            request_id,
            filename,
            detected_foods: detections.labels(),
            detections,
            timings,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Completed(Box<PipelineResult>),
    Failed { filename: String, error: CoreError },
}

/// One entry of a batch run; `index` is the position in the request.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub index: usize,
    pub outcome: BatchOutcome,
}
