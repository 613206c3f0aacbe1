use axum::{Router, routing::get};
use utoipa::OpenApi;

use super::handlers::{
    get_health::{__path_get_health, get_health},
    get_status::{__path_get_status, get_status},
};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health, get_status))]
pub struct HealthApiDoc;

pub fn health_routes(state: AppState) -> Router<AppState> {
    let root_path = &state.args.server.root_path;
    let banner_path = if root_path.is_empty() {
        "/".to_string()
    } else {
        root_path.clone()
    };

    Router::new()
        .route(&format!("{}/health", root_path), get(get_health))
        .route(&banner_path, get(get_status))
}
