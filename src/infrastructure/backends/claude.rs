#[cfg(test)]
#[path = "claude_test.rs"]
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
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<MessageRequest>,
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContentBlockResponse {
    #[serde(rename = "type")]
    _type: String,
    #[serde(default)]
    text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlockResponse>,
}

/// Anthropic's native messages API. The system prompt travels as a
/// top-level field rather than a message.
#[derive(Default)]
pub struct Claude {}

#[async_trait]
impl CompletionBackend for Claude {
    fn name(&self) -> BackendName {
        return BackendName::Claude;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self, config: &ModelConfig) -> Result<()> {
        if config.base_url.is_empty() {
            bail!("Provider URL is not defined");
        }
        config.ensure_api_key()?;

        // The official API index has no meaningful health endpoint; only
        // probe self-hosted proxies.
        if config.base_url.starts_with("https://api.anthropic.com") {
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
            tracing::error!(error = ?res.unwrap_err(), "Claude is not reachable");
            bail!("Claude is not reachable");
        }

        let status = res.unwrap().status().as_u16();
        if status >= 500 {
            tracing::error!(status = status, "Claude health check failed");
            bail!("Claude health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn complete(&self, config: &ModelConfig, request: CompletionRequest) -> Result<String> {
        config.ensure_api_key()?;

        let req = MessagesRequest {
            model: config.model.to_string(),
            max_tokens: request.max_tokens,
            system: request.system_prompt,
            messages: vec![MessageRequest {
                role: "user".to_string(),
                content: request.user_content,
            }],
            stream: false,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/messages", url = config.base_url))
            .header("x-api-key", &config.api_key)
            .header("content-type", "application/json")
            .header("anthropic-version", "2023-06-01")
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Failed to make completion request to Claude");
            bail!(format!("Completion request to Claude failed with status {status}"));
        }

        let ores = res.json::<MessagesResponse>().await?;
        tracing::debug!(body = ?ores, "Completion response");

        let text = ores
            .content
            .iter()
            .filter(|block| return block._type == "text")
            .map(|block| return block.text.to_string())
            .collect::<Vec<String>>()
            .join("");

        return Ok(text);
    }
}
