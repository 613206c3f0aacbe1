use utoipa::OpenApi;

use crate::application::http::food_analysis::router::FoodAnalysisApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nutrivision API",
        description = "Food detection and nutrition analysis from meal photos"
    ),
    nest(
        (path = "/food-analysis", api = FoodAnalysisApiDoc),
    )
)]
pub struct ApiDoc;
