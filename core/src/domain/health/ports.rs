use std::future::Future;

use crate::domain::health::entities::HealthReport;

pub trait HealthCheckService: Send + Sync {
    /// Reports model and LLM status. Never loads the model.
    fn health(&self) -> impl Future<Output = HealthReport> + Send;
}
