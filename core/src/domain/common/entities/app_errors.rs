use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("Detection model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Too many images in batch (max {max})")]
    TooManyImages { max: usize },

    #[error("Batch contains no images")]
    EmptyBatch,

    #[error("Internal server error")]
    InternalServerError,
}

/// Failures on the LLM path. These never leave the pipeline: every variant is
/// absorbed into fallback nutrition content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdviceError {
    #[error("LLM credential not configured")]
    Disabled,

    #[error("LLM request timed out")]
    Timeout,

    #[error("LLM transport error: {0}")]
    Transport(String),

    #[error("LLM returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode LLM response: {0}")]
    Decode(String),

    #[error("LLM returned no content")]
    EmptyResponse,
}
