#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

/// Connection details for one completion request. Built fresh per request
/// from the provider registry; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ModelConfig {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> ModelConfig {
        return ModelConfig {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            model: model.to_string(),
        };
    }

    /// A missing credential is a configuration error reported before any
    /// call is attempted.
    pub fn ensure_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            bail!("No API key configured. Set one with --api-key or the provider's environment variable.");
        }

        return Ok(());
    }
}

/// One completion request: a role system prompt, assembled user content,
/// and the role's output token budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_content: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system_prompt: String, user_content: String, max_tokens: u32) -> CompletionRequest {
        return CompletionRequest {
            system_prompt,
            user_content,
            max_tokens,
        };
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    OpenAI,
    Claude,
}

impl BackendName {
    pub fn parse(text: &str) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

#[async_trait]
pub trait CompletionBackend {
    fn name(&self) -> BackendName;

    /// Used before a generation request to verify the backend is reachable
    /// and credentials are present.
    async fn health_check(&self, config: &ModelConfig) -> Result<()>;

    /// Issues exactly one completion call and returns the extracted text.
    /// A response with no content yields an empty string; callers decide
    /// what an empty completion means for their role.
    async fn complete(&self, config: &ModelConfig, request: CompletionRequest) -> Result<String>;
}

pub type BackendBox = Box<dyn CompletionBackend + Send + Sync>;
