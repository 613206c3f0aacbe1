use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nutrivision_core::domain::common::entities::app_errors::CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub code: String,
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    FileTooLarge(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::FileTooLarge(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "E_BAD_REQUEST",
            ApiError::FileTooLarge(_) => "E_FILE_TOO_LARGE",
            ApiError::ServiceUnavailable(_) => "E_SERVICE_UNAVAILABLE",
            ApiError::InternalServerError(_) => "E_INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::ImageDecode(_) | CoreError::TooManyImages { .. } | CoreError::EmptyBatch => {
                ApiError::BadRequest(error.to_string())
            }
            CoreError::ModelUnavailable(_) => ApiError::ServiceUnavailable(error.to_string()),
            CoreError::Inference(_) | CoreError::InternalServerError => {
                ApiError::InternalServerError(error.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }

        let body = ApiErrorResponse {
            success: false,
            code: self.code().to_string(),
            status: status.as_u16(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_http_statuses() {
        let cases = [
            (CoreError::ImageDecode("bad".to_string()), StatusCode::BAD_REQUEST),
            (CoreError::TooManyImages { max: 10 }, StatusCode::BAD_REQUEST),
            (CoreError::EmptyBatch, StatusCode::BAD_REQUEST),
            (
                CoreError::ModelUnavailable("missing".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::Inference("shape".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (CoreError::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    async fn body_of(error: ApiError) -> (StatusCode, ApiErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn error_body_carries_code_and_message() {
        let (status, body) = body_of(ApiError::BadRequest("Missing file field".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            ApiErrorResponse {
                success: false,
                code: "E_BAD_REQUEST".to_string(),
                status: 400,
                message: "Missing file field".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn oversized_file_is_a_bad_request_with_its_own_code() {
        let message = "File plate.png too large. Max size is 10 bytes".to_string();

        let (status, body) = body_of(ApiError::FileTooLarge(message.clone())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "E_FILE_TOO_LARGE");
        assert_eq!(body.status, 400);
        assert_eq!(body.message, message);
        assert!(!body.success);
    }
}
