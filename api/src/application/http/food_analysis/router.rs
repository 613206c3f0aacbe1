use axum::{Router, routing::post};
use utoipa::OpenApi;

use super::handlers::{
    analyze_food_batch::{__path_analyze_food_batch, analyze_food_batch},
    analyze_food_image::{__path_analyze_food_image, analyze_food_image},
    detect_food_image::{__path_detect_food_image, detect_food_image},
};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(analyze_food_image, detect_food_image, analyze_food_batch))]
pub struct FoodAnalysisApiDoc;

pub fn food_analysis_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/food-analysis/image", state.args.server.root_path),
            post(analyze_food_image),
        )
        .route(
            &format!("{}/food-analysis/detect", state.args.server.root_path),
            post(detect_food_image),
        )
        .route(
            &format!("{}/food-analysis/batch", state.args.server.root_path),
            post(analyze_food_batch),
        )
}
