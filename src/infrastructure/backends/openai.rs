#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::CompletionBackend;
use crate::domain::models::CompletionRequest;
use crate::domain::models::ModelConfig;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    role: String,
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<MessageRequest>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionMessageResponse {
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: CompletionMessageResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
}

/// OpenAI-compatible chat completions. Most providers in the registry
/// speak this wire shape behind their own base URL.
#[derive(Default)]
pub struct OpenAI {}

#[async_trait]
impl CompletionBackend for OpenAI {
    fn name(&self) -> BackendName {
        return BackendName::OpenAI;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self, config: &ModelConfig) -> Result<()> {
        if config.base_url.is_empty() {
            bail!("Provider URL is not defined");
        }
        config.ensure_api_key()?;

        // OpenAI are trolls with their API where the index either returns a
        // 404 or a 418. If using the official API, don't bother health
        // checking it.
        if config.base_url.starts_with("https://api.openai.com") {
            return Ok(());
        }

        let timeout = Config::get(ConfigKey::HealthCheckTimeout)
            .parse::<u64>()
            .unwrap_or(1000);
        let res = reqwest::Client::new()
            .get(&config.base_url)
            .timeout(Duration::from_millis(timeout))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "Provider is not reachable");
            bail!("Provider is not reachable");
        }

        let status = res.unwrap().status().as_u16();
        if status >= 500 {
            tracing::error!(status = status, "Provider health check failed");
            bail!("Provider health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn complete(&self, config: &ModelConfig, request: CompletionRequest) -> Result<String> {
        config.ensure_api_key()?;

        let messages = vec![
            MessageRequest {
                role: "system".to_string(),
                content: request.system_prompt,
            },
            MessageRequest {
                role: "user".to_string(),
                content: request.user_content,
            },
        ];

        let req = ChatCompletionRequest {
            model: config.model.to_string(),
            messages,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/chat/completions", url = config.base_url))
            .header("Authorization", format!("Bearer {}", config.api_key))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Failed to make completion request");
            bail!(format!("Completion request failed with status {status}"));
        }

        let ores = res.json::<CompletionResponse>().await?;
        tracing::debug!(body = ?ores, "Completion response");

        if ores.choices.is_empty() {
            return Ok("".to_string());
        }

        return Ok(ores.choices[0].message.content.clone().unwrap_or_default());
    }
}
