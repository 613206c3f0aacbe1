use axum::extract::{Multipart, State};
use nutrivision_core::domain::{
    nutrition::entities::AnalysisSource,
    pipeline::{entities::PipelineResult, ports::FoodAnalysisService},
};
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
pub struct AnalyzeFoodImageResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: PipelineResult,
    pub message: String,
}

impl From<PipelineResult> for AnalyzeFoodImageResponse {
    fn from(result: PipelineResult) -> Self {
        let message = match (result.detected_foods.is_empty(), result.analysis_source) {
            (true, _) => "Tidak ada makanan yang terdeteksi pada gambar",
            (false, AnalysisSource::Llm) => "Analisis makanan berhasil",
            (false, AnalysisSource::Fallback) => {
                "Makanan terdeteksi, analisis gizi menggunakan rekomendasi standar"
            }
        };

        Self {
            success: true,
            result,
            message: message.to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/image",
    tag = "food-analysis",
    summary = "Analyze a food photo",
    description = "Detects food items in the uploaded image and asks the LLM for a nutrition analysis. LLM failures degrade to a fallback analysis instead of an error.",
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = AnalyzeFoodImageResponse),
        (status = 400, body = ApiErrorResponse, description = "Missing, empty, oversized or undecodable file"),
        (status = 503, body = ApiErrorResponse, description = "Detection model unavailable"),
    ),
)]
pub async fn analyze_food_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response<AnalyzeFoodImageResponse>, ApiError> {
    let input = read_single_image(multipart, state.args.server.max_upload_bytes).await?;

    let result = state
        .service
        .analyze_image(input)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(AnalyzeFoodImageResponse::from(result)))
}
