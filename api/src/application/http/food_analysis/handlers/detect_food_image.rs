use axum::extract::{Multipart, State};
use nutrivision_core::domain::pipeline::{entities::DetectionReport, ports::FoodAnalysisService};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::{
    food_analysis::validators::{ImageUploadForm, read_single_image},
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse},
            response::Response,
        },
        app_state::AppState,
    },
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectFoodImageResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: DetectionReport,
}

#[utoipa::path(
    post,
    path = "/detect",
    tag = "food-analysis",
    summary = "Detect food items only",
    description = "Runs detection without contacting the LLM.",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = DetectFoodImageResponse),
        (status = 400, body = ApiErrorResponse),
        (status = 503, body = ApiErrorResponse, description = "Detection model unavailable"),
    ),
)]
pub async fn detect_food_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response<DetectFoodImageResponse>, ApiError> {
    let input = read_single_image(multipart, state.args.server.max_upload_bytes).await?;

    let report = state
        .service
        .detect_image(input)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(DetectFoodImageResponse {
        success: true,
        report,
    }))
}
