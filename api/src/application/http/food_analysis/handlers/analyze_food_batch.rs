use axum::extract::{Multipart, State};
use nutrivision_core::domain::pipeline::{
    entities::{BatchItem, BatchOutcome},
    ports::FoodAnalysisService,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::{
    food_analysis::{
        handlers::analyze_food_image::AnalyzeFoodImageResponse,
        validators::{BatchUploadForm, read_batch_images},
    },
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse},
            response::Response,
        },
        app_state::AppState,
    },
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchItemCompleted {
    pub index: usize,
    #[serde(flatten)]
    pub analysis: AnalyzeFoodImageResponse,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchItemFailed {
    pub index: usize,
    pub filename: String,
    pub success: bool,
    pub error: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum BatchItemResponse {
    Completed(BatchItemCompleted),
    Failed(BatchItemFailed),
}

impl From<BatchItem> for BatchItemResponse {
    fn from(item: BatchItem) -> Self {
        match item.outcome {
            BatchOutcome::Completed(result) => BatchItemResponse::Completed(BatchItemCompleted {
                index: item.index,
                analysis: AnalyzeFoodImageResponse::from(*result),
            }),
            BatchOutcome::Failed { filename, error } => BatchItemResponse::Failed(BatchItemFailed {
                index: item.index,
                filename,
                success: false,
                error: error.to_string(),
            }),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeFoodBatchResponse {
    pub success: bool,
    pub count: usize,
    pub results: Vec<BatchItemResponse>,
}

#[utoipa::path(
    post,
    path = "/batch",
    tag = "food-analysis",
    summary = "Analyze several food photos",
    description = "Runs the full analysis on every uploaded image concurrently. A failing image is reported in its slot without affecting the others.",
    request_body(content = BatchUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = AnalyzeFoodBatchResponse),
        (status = 400, body = ApiErrorResponse, description = "No files, or more files than the batch limit"),
    ),
)]
pub async fn analyze_food_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response<AnalyzeFoodBatchResponse>, ApiError> {
    let inputs = read_batch_images(
        multipart,
        state.args.server.max_upload_bytes,
        state.service.config().max_batch_size,
    )
    .await?;

    let items = state
        .service
        .analyze_batch(inputs)
        .await
        .map_err(ApiError::from)?;

    let results: Vec<BatchItemResponse> = items.into_iter().map(BatchItemResponse::from).collect();

    Ok(Response::OK(AnalyzeFoodBatchResponse {
        success: true,
        count: results.len(),
        results,
    }))
}
