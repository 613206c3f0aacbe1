use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::http::server::api_entities::{api_error::ApiError, response::Response};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    summary = "Service banner",
    responses(
        (status = 200, body = StatusResponse),
    ),
)]
pub async fn get_status() -> Result<Response<StatusResponse>, ApiError> {
    Ok(Response::OK(StatusResponse {
        status: "Food Detection API running!".to_string(),
    }))
}
