use std::sync::Mutex;

use image::DynamicImage;
use ndarray::Array4;
use ort::{session::Session, value::Tensor};
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    common::{DetectorConfig, entities::app_errors::CoreError},
    detection::{entities::RawDetection, ports::ObjectDetector},
};

use super::{
    labels::{parse_names_metadata, read_labels_file},
    postprocess::{decode_output, letterbox, non_max_suppression},
};

/// YOLO-format detector running on ONNX Runtime. Inference is serialised on
/// the session; concurrency comes from the caller's worker pool.
pub struct OnnxDetector {
    session: Mutex<Session>,
    labels: Vec<String>,
    input_size: u32,
    iou_threshold: f32,
}

impl OnnxDetector {
    #[instrument(skip_all, fields(model_path = %config.model_path.display()))]
    pub fn load(config: &DetectorConfig) -> Result<Self, CoreError> {
        if config.input_size == 0 {
            return Err(CoreError::ModelUnavailable(
                "model input size must be at least 1".to_string(),
            ));
        }

        if !config.model_path.exists() {
            return Err(CoreError::ModelUnavailable(format!(
                "model file {} not found",
                config.model_path.display()
            )));
        }

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(&config.model_path))
            .map_err(|e| CoreError::ModelUnavailable(e.to_string()))?;

        let labels = match read_labels_file(&config.labels_path) {
            Ok(labels) => labels,
            Err(e) => {
                warn!(error = %e, "Falling back to class names embedded in the model");
                Self::embedded_labels(&session).ok_or(e)?
            }
        };

        info!(classes = labels.len(), input_size = config.input_size, "ONNX detector ready");

        Ok(Self {
            session: Mutex::new(session),
            labels,
            input_size: config.input_size,
            iou_threshold: config.iou_threshold,
        })
    }

    fn embedded_labels(session: &Session) -> Option<Vec<String>> {
        let names = session.metadata().ok()?.custom("names").ok()??;
        let labels = parse_names_metadata(&names);
        (!labels.is_empty()).then_some(labels)
    }

    fn run(&self, input: Array4<f32>) -> Result<(Vec<i64>, Vec<f32>), CoreError> {
        let tensor = Tensor::from_array(input).map_err(|e| CoreError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| CoreError::Inference("session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| CoreError::Inference(e.to_string()))?;

        let output = outputs
            .get("output0")
            .or_else(|| outputs.get("output"))
            .ok_or_else(|| CoreError::Inference("model has no output0 tensor".to_string()))?;
        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| CoreError::Inference(e.to_string()))?;

        Ok((shape.to_vec(), data.to_vec()))
    }
}

impl ObjectDetector for OnnxDetector {
    fn infer(&self, image: &DynamicImage, min_confidence: f32) -> Result<Vec<RawDetection>, CoreError> {
        let side = self.input_size as usize;
        let (pixels, frame) = letterbox(image, self.input_size);
        let input = Array4::from_shape_vec((1, 3, side, side), pixels)
            .map_err(|e| CoreError::Inference(e.to_string()))?;

        let (shape, data) = self.run(input)?;
        let candidates = decode_output(&data, &shape, &self.labels, &frame, min_confidence)?;
        let before = candidates.len();
        let detections = non_max_suppression(candidates, self.iou_threshold);

        debug!(candidates = before, kept = detections.len(), "ONNX inference finished");
        Ok(detections)
    }
}
