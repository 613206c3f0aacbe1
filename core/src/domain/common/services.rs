use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::domain::{
    common::PipelineConfig,
    detection::{ports::ObjectDetector, services::DetectorAdapter},
    nutrition::ports::AdviceClient,
};

/// Carries the injected ports every domain service is implemented on.
pub struct Service<D, A>
where
    D: ObjectDetector,
    A: AdviceClient,
{
    pub(crate) detector: Arc<DetectorAdapter<D>>,
    pub(crate) advice_client: Arc<A>,
    pub(crate) workers: Arc<Semaphore>,
    pub(crate) config: PipelineConfig,
}

impl<D, A> Service<D, A>
where
    D: ObjectDetector,
    A: AdviceClient,
{
    pub fn new(detector: DetectorAdapter<D>, advice_client: A, config: PipelineConfig) -> Self {
        Self {
            detector: Arc::new(detector),
            advice_client: Arc::new(advice_client),
            workers: Arc::new(Semaphore::new(config.detection_workers.max(1))),
            config,
        }
    }

    pub fn detector(&self) -> &DetectorAdapter<D> {
        &self.detector
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl<D, A> Clone for Service<D, A>
where
    D: ObjectDetector,
    A: AdviceClient,
{
    fn clone(&self) -> Self {
        Self {
            detector: Arc::clone(&self.detector),
            advice_client: Arc::clone(&self.advice_client),
            workers: Arc::clone(&self.workers),
            config: self.config.clone(),
        }
    }
}
