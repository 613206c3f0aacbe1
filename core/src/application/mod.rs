use tracing::info;

use crate::{
    domain::{
        common::{NutrivisionConfig, services::Service},
        detection::{model::ModelHandle, services::DetectorAdapter},
    },
    infrastructure::{detector::FoodDetector, llm::MistralClient},
};

pub type NutrivisionService = Service<FoodDetector, MistralClient>;

/// Wires the concrete adapters together. The detection model is loaded on
/// first use (or on warmup), so this never touches the filesystem.
pub fn create_service(config: NutrivisionConfig) -> NutrivisionService {
    let detector_config = config.detector.clone();
    let model = ModelHandle::lazy(move || FoodDetector::load(&detector_config));
    let detector = DetectorAdapter::new(model, config.detector);

    let advice_client = MistralClient::new(config.llm);
    info!(
        llm_enabled = advice_client.is_enabled(),
        detection_workers = config.pipeline.detection_workers,
        "Nutrivision service created"
    );

    Service::new(detector, advice_client, config.pipeline)
}
