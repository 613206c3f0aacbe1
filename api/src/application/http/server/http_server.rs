use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use nutrivision_core::{
    application::create_service, domain::common::NutrivisionConfig,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{debug, info_span};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::application::http::food_analysis::router::food_analysis_routes;
use crate::application::http::health::router::{HealthApiDoc, health_routes};
use crate::application::http::server::app_state::AppState;
use crate::application::http::server::openapi::ApiDoc;
use crate::args::Args;

/// Multipart framing on top of the raw file bytes.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn state(args: Arc<Args>) -> AppState {
    let config = NutrivisionConfig::from(args.as_ref().clone());
    let service = create_service(config);

    AppState::new(args, service)
}

///  Returns the [`Router`] of this application.
pub fn router(state: AppState) -> Result<Router, anyhow::Error> {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri: String = request.uri().to_string();
            info_span!("http_request", method = ?request.method(), uri)
        },
    );

    let allowed_origins = state
        .args
        .server
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin {origin:?}"))
        })
        .collect::<Result<Vec<HeaderValue>, _>>()?;

    debug!("Allowed origins: {:?}", allowed_origins);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allowed_origins)
        .allow_headers([CONTENT_TYPE, CONTENT_LENGTH, ACCEPT]);

    let body_limit = state
        .args
        .server
        .max_upload_bytes
        .saturating_mul(state.service.config().max_batch_size.max(1))
        .saturating_add(MULTIPART_OVERHEAD);

    let mut openapi = ApiDoc::openapi();
    openapi.merge(HealthApiDoc::openapi());
    let mut paths = openapi.paths.clone();
    paths.paths = openapi
        .paths
        .paths
        .into_iter()
        .map(|(path, item)| (format!("{}{path}", state.args.server.root_path), item))
        .collect();
    openapi.paths = paths;

    let root_path = state.args.server.root_path.clone();

    let mut router = axum::Router::new()
        .merge(Scalar::with_url(format!("{}/scalar", root_path), openapi.clone()))
        .route(
            &format!("{}/api-docs/openapi.json", root_path),
            get(move || async move { axum::Json(openapi) }),
        )
        .merge(food_analysis_routes(state.clone()))
        .merge(health_routes(state.clone()));

    if state.args.server.metrics_enabled {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route(
                &format!("{}/metrics", root_path),
                get(|| async move { metric_handle.render() }),
            )
            .layer(prometheus_layer);
    }

    let router = router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.args.server.request_timeout(),
        ))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state);
    Ok(router)
}
