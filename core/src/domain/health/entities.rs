use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModelHealth {
    pub loaded: bool,
    pub warmed_up: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LlmStatus {
    Disabled,
    Connected,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LlmProbe {
    pub status: LlmStatus,
    pub message: String,
}

impl LlmProbe {
    pub fn new(status: LlmStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: ServiceStatus,
    pub model: ModelHealth,
    pub llm: LlmProbe,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// The service is degraded when the model is known to be broken or the
    /// LLM is configured but unreachable. A disabled LLM is a valid setup.
    pub fn new(model: ModelHealth, llm: LlmProbe) -> Self {
        let degraded = model.error.is_some() || llm.status == LlmStatus::Error;
        Self {
            status: if degraded {
                ServiceStatus::Degraded
            } else {
                ServiceStatus::Ok
            },
            model,
            llm,
            timestamp: Utc::now(),
        }
    }
}
