use crate::domain::{
    common::services::Service,
    detection::ports::ObjectDetector,
    health::{entities::HealthReport, ports::HealthCheckService},
    nutrition::ports::AdviceClient,
};

impl<D, A> HealthCheckService for Service<D, A>
where
    D: ObjectDetector,
    A: AdviceClient,
{
    async fn health(&self) -> HealthReport {
        let model = self.detector.health();
        let llm = self.advice_client.probe().await;

        HealthReport::new(model, llm)
    }
}
