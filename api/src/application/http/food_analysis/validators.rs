use axum::extract::Multipart;
use axum::extract::multipart::Field;
use bytes::Bytes;
use nutrivision_core::domain::{
    common::entities::app_errors::CoreError, pipeline::value_objects::AnalyzeImageInput,
};
use utoipa::ToSchema;

use crate::application::http::server::api_entities::api_error::ApiError;

const FILE_FIELD: &str = "file";
const FILES_FIELD: &str = "files";

/// Multipart body with a single image.
#[derive(Debug, ToSchema)]
pub struct ImageUploadForm {
    #[schema(format = Binary)]
    pub file: String,
}

/// Multipart body with repeated `files` parts.
#[derive(Debug, ToSchema)]
pub struct BatchUploadForm {
    pub files: Vec<String>,
}

async fn read_image(field: Field<'_>, index: usize, max_bytes: usize) -> Result<AnalyzeImageInput, ApiError> {
    let filename = field
        .file_name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("upload-{}", index + 1));

    let data: Bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", filename, e)))?;

    if data.len() > max_bytes {
        return Err(ApiError::FileTooLarge(format!(
            "File {} too large. Max size is {} bytes",
            filename, max_bytes
        )));
    }

    Ok(AnalyzeImageInput::new(filename, data))
}

/// Reads the `file` part of a single-image upload. Other parts are ignored.
pub async fn read_single_image(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<AnalyzeImageInput, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            let image = read_image(field, 0, max_bytes).await?;
            if image.image_data.is_empty() {
                return Err(ApiError::BadRequest(format!(
                    "Uploaded file {} is empty",
                    image.filename
                )));
            }
            return Ok(image);
        }
    }

    Err(ApiError::BadRequest("Missing file field".to_string()))
}

/// Reads every `files` (or `file`) part of a batch upload, in order. Empty
/// parts are kept so they fail as their own batch item.
pub async fn read_batch_images(
    mut multipart: Multipart,
    max_bytes: usize,
    max_files: usize,
) -> Result<Vec<AnalyzeImageInput>, ApiError> {
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if !matches!(field.name(), Some(FILES_FIELD) | Some(FILE_FIELD)) {
            continue;
        }

        if images.len() == max_files {
            return Err(CoreError::TooManyImages { max: max_files }.into());
        }

        images.push(read_image(field, images.len(), max_bytes).await?);
    }

    if images.is_empty() {
        return Err(ApiError::BadRequest("Missing files field".to_string()));
    }

    Ok(images)
}
