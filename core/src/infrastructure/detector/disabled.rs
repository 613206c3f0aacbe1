use image::DynamicImage;

use crate::domain::{
    common::{DetectorConfig, entities::app_errors::CoreError},
    detection::{entities::RawDetection, ports::ObjectDetector},
};

/// Stand-in used when the crate is built without an inference backend.
/// Loading always fails, so every detection request reports the model as
/// unavailable.
#[derive(Debug)]
pub struct DisabledDetector;

impl DisabledDetector {
    pub fn load(_config: &DetectorConfig) -> Result<Self, CoreError> {
        Err(CoreError::ModelUnavailable(
            "built without the onnx feature".to_string(),
        ))
    }
}

impl ObjectDetector for DisabledDetector {
    fn infer(
        &self,
        _image: &DynamicImage,
        _min_confidence: f32,
    ) -> Result<Vec<RawDetection>, CoreError> {
        Err(CoreError::ModelUnavailable(
            "built without the onnx feature".to_string(),
        ))
    }
}
