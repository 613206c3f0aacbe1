use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    common::{LLMConfig, entities::app_errors::AdviceError},
    health::entities::{LlmProbe, LlmStatus},
    nutrition::ports::AdviceClient,
};

const ERROR_BODY_LIMIT: usize = 512;

/// Chat-completions client for the Mistral API.
#[derive(Debug)]
pub struct MistralClient {
    config: LLMConfig,
    client: OnceLock<Client>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl MistralClient {
    pub fn new(config: LLMConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    fn client(&self) -> &Client {
        self.client.get_or_init(Client::new)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn complete(
        &self,
        content: &str,
        max_tokens: Option<u32>,
        timeout: Duration,
    ) -> Result<String, AdviceError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AdviceError::Disabled)?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            max_tokens,
        };

        let response = self
            .client()
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdviceError::Timeout
                } else {
                    debug!(error = %e, "Mistral API request failed");
                    AdviceError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(
                body.char_indices()
                    .nth(ERROR_BODY_LIMIT)
                    .map_or(body.len(), |(i, _)| i),
            );
            debug!(status = status.as_u16(), body = %body, "Mistral API returned an error status");
            return Err(AdviceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AdviceError::Timeout
            } else {
                debug!(error = %e, "Failed to decode Mistral response");
                AdviceError::Decode(e.to_string())
            }
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AdviceError::EmptyResponse)
    }
}

impl AdviceClient for MistralClient {
    async fn ask(&self, prompt: String) -> Result<String, AdviceError> {
        self.complete(&prompt, None, self.config.timeout).await
    }

    async fn probe(&self) -> LlmProbe {
        if !self.is_enabled() {
            return LlmProbe::new(LlmStatus::Disabled, "MISTRAL_API_KEY is not set");
        }

        match self.complete("ping", Some(1), self.config.probe_timeout).await {
            Ok(_) | Err(AdviceError::EmptyResponse) => {
                debug!("Mistral API probe succeeded");
                LlmProbe::new(LlmStatus::Connected, "Mistral API reachable")
            }
            Err(e) => LlmProbe::new(LlmStatus::Error, e.to_string()),
        }
    }
}
