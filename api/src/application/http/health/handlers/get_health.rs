use axum::extract::State;
use nutrivision_core::domain::health::{entities::HealthReport, ports::HealthCheckService};

use crate::application::http::server::{
    api_entities::{api_error::ApiError, response::Response},
    app_state::AppState,
};

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Service health",
    description = "Reports detection model state and LLM connectivity. Never loads the model.",
    responses(
        (status = 200, body = HealthReport),
    ),
)]
pub async fn get_health(State(state): State<AppState>) -> Result<Response<HealthReport>, ApiError> {
    Ok(Response::OK(state.service.health().await))
}
