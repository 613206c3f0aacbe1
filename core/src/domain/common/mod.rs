use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp, Uuid};

use crate::domain::nutrition::prompt::PromptStyle;

pub mod entities;
pub mod services;

#[derive(Clone, Debug)]
pub struct NutrivisionConfig {
    pub detector: DetectorConfig,
    pub llm: LLMConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Clone, Debug)]
pub struct DetectorConfig {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    /// Square edge length of the model input tensor.
    pub input_size: u32,
    /// Lenient threshold handed to the model itself.
    pub model_confidence: f32,
    /// Strict threshold the adapter applies to whatever the model returns.
    pub min_confidence: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub max_image_dimension: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/best.onnx"),
            labels_path: PathBuf::from("models/labels.txt"),
            input_size: 640,
            model_confidence: 0.25,
            min_confidence: 0.5,
            iou_threshold: 0.45,
            max_detections: 8,
            max_image_dimension: 1280,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "mistral-small-latest".to_string(),
            base_url: "https://api.mistral.ai/v1".to_string(),
            timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl LLMConfig {
    /// Keeps the LLM timeout strictly below the HTTP request timeout, and the
    /// probe timeout at or below the LLM timeout.
    pub fn bounded_by(mut self, request_timeout: Duration) -> Self {
        let ceiling = request_timeout
            .checked_sub(Duration::from_secs(1))
            .unwrap_or(Duration::from_millis(500));

        if self.timeout >= request_timeout {
            tracing::warn!(
                llm_timeout = ?self.timeout,
                request_timeout = ?request_timeout,
                "LLM timeout must be shorter than the request timeout, clamping"
            );
            self.timeout = ceiling;
        }

        if self.probe_timeout > self.timeout {
            self.probe_timeout = self.timeout;
        }

        self
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub detection_workers: usize,
    pub max_batch_size: usize,
    pub prompt_detail_limit: usize,
    pub prompt_style: PromptStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detection_workers: 4,
            max_batch_size: 10,
            prompt_detail_limit: 5,
            prompt_style: PromptStyle::Comprehensive,
        }
    }
}

pub fn generate_timestamp() -> (DateTime<Utc>, Timestamp) {
    let now = Utc::now();
    let seconds = now.timestamp().try_into().unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, now.timestamp_subsec_nanos());

    (now, timestamp)
}

pub fn generate_uuid_v7() -> Uuid {
    let (_, timestamp) = generate_timestamp();
    Uuid::new_v7(timestamp)
}
