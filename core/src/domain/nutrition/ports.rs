use std::future::Future;

use crate::domain::{common::entities::app_errors::AdviceError, health::entities::LlmProbe};

/// Remote chat model that turns a prompt into nutrition advice text.
pub trait AdviceClient: Send + Sync + 'static {
    /// Sends `prompt` and returns the raw answer text. Bounded by the
    /// client's own timeout.
    fn ask(&self, prompt: String) -> impl Future<Output = Result<String, AdviceError>> + Send;

    /// Minimal low-token request classifying connectivity.
    fn probe(&self) -> impl Future<Output = LlmProbe> + Send;
}
