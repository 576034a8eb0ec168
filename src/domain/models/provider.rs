#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;

use std::env;

use anyhow::bail;
use anyhow::Result;
use once_cell::sync::Lazy;

use super::BackendName;
use super::ModelConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum CostTier {
    #[strum(serialize = "Low")]
    Low,
    #[strum(serialize = "Medium")]
    Medium,
    #[strum(serialize = "High")]
    High,
    #[strum(serialize = "Very High")]
    VeryHigh,
}

#[derive(Clone, Debug)]
pub struct ProviderModel {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub max_tokens: u32,
    pub cost: CostTier,
}

/// A completion provider: where requests go, which wire shape it speaks,
/// and which environment variable holds its credential by default.
#[derive(Clone, Debug)]
pub struct Provider {
    pub name: &'static str,
    pub base_url: &'static str,
    pub api_key_env: &'static str,
    pub backend: BackendName,
    pub models: &'static [ProviderModel],
}

pub const DEFAULT_PROVIDER: &str = "google";

static OPENAI_MODELS: &[ProviderModel] = &[
    ProviderModel {
        id: "gpt-5",
        display_name: "GPT-5",
        description: "The latest and most capable flagship model from OpenAI.",
        max_tokens: 8192,
        cost: CostTier::VeryHigh,
    },
    ProviderModel {
        id: "gpt-4o",
        display_name: "GPT-4o",
        description: "The latest omni-model, balances intelligence and speed.",
        max_tokens: 4096,
        cost: CostTier::High,
    },
    ProviderModel {
        id: "gpt-4o-mini",
        display_name: "GPT-4o Mini",
        description: "Fast and efficient, good for most tasks.",
        max_tokens: 4096,
        cost: CostTier::Medium,
    },
];

static ANTHROPIC_MODELS: &[ProviderModel] = &[
    ProviderModel {
        id: "claude-opus-4-1",
        display_name: "Claude Opus 4.1",
        description: "Most powerful Anthropic model for complex agentic tasks and coding.",
        max_tokens: 4096,
        cost: CostTier::VeryHigh,
    },
    ProviderModel {
        id: "claude-sonnet-4-0",
        display_name: "Claude Sonnet 4",
        description: "Balanced model for enterprise use, good for coding and general tasks.",
        max_tokens: 4096,
        cost: CostTier::High,
    },
    ProviderModel {
        id: "claude-3-5-haiku-20241022",
        display_name: "Claude 3.5 Haiku",
        description: "Fast and efficient Claude model.",
        max_tokens: 4096,
        cost: CostTier::Medium,
    },
];

static GOOGLE_MODELS: &[ProviderModel] = &[
    ProviderModel {
        id: "gemini-2.5-pro",
        display_name: "Gemini 2.5 Pro",
        description: "Google's most capable and advanced reasoning model.",
        max_tokens: 8192,
        cost: CostTier::VeryHigh,
    },
    ProviderModel {
        id: "gemini-2.0-flash",
        display_name: "Gemini 2.0 Flash",
        description: "Latest Gemini model, fast and capable.",
        max_tokens: 4096,
        cost: CostTier::Medium,
    },
];

static DEEPSEEK_MODELS: &[ProviderModel] = &[
    ProviderModel {
        id: "deepseek-chat",
        display_name: "DeepSeek V3 Chat",
        description: "Latest general-purpose chat model from DeepSeek.",
        max_tokens: 8192,
        cost: CostTier::Medium,
    },
    ProviderModel {
        id: "deepseek-reasoner",
        display_name: "DeepSeek R1",
        description: "A powerful reasoning model, excellent for complex logic.",
        max_tokens: 8192,
        cost: CostTier::High,
    },
];

static MISTRAL_MODELS: &[ProviderModel] = &[
    ProviderModel {
        id: "mistral-large-latest",
        display_name: "Mistral Large",
        description: "The flagship model from Mistral, with top-tier reasoning.",
        max_tokens: 8192,
        cost: CostTier::High,
    },
    ProviderModel {
        id: "codestral-latest",
        display_name: "Codestral",
        description: "A specialized model for code generation and interaction.",
        max_tokens: 8192,
        cost: CostTier::Medium,
    },
];

static OPENROUTER_MODELS: &[ProviderModel] = &[
    ProviderModel {
        id: "openai/gpt-5",
        display_name: "GPT-5 (OpenRouter)",
        description: "Access OpenAI's latest model via OpenRouter.",
        max_tokens: 8192,
        cost: CostTier::VeryHigh,
    },
    ProviderModel {
        id: "meta-llama/llama-3.1-405b-instruct",
        display_name: "Llama 3.1 405B Instruct",
        description: "Meta's largest and most capable instruction-tuned model.",
        max_tokens: 8192,
        cost: CostTier::High,
    },
    ProviderModel {
        id: "qwen/qwen3-coder",
        display_name: "Qwen 3 Coder",
        description: "Alibaba's coding-specialized model with advanced reasoning.",
        max_tokens: 8192,
        cost: CostTier::Medium,
    },
];

static PROVIDERS: Lazy<Vec<Provider>> = Lazy::new(|| {
    return vec![
        Provider {
            name: "openai",
            base_url: "https://api.openai.com/v1",
            api_key_env: "OPENAI_API_KEY",
            backend: BackendName::OpenAI,
            models: OPENAI_MODELS,
        },
        Provider {
            name: "anthropic",
            base_url: "https://api.anthropic.com",
            api_key_env: "ANTHROPIC_API_KEY",
            backend: BackendName::Claude,
            models: ANTHROPIC_MODELS,
        },
        Provider {
            name: "google",
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
            api_key_env: "GEMINI_API_KEY",
            backend: BackendName::OpenAI,
            models: GOOGLE_MODELS,
        },
        Provider {
            name: "deepseek",
            base_url: "https://api.deepseek.com",
            api_key_env: "DEEPSEEK_API_KEY",
            backend: BackendName::OpenAI,
            models: DEEPSEEK_MODELS,
        },
        Provider {
            name: "mistral",
            base_url: "https://api.mistral.ai/v1",
            api_key_env: "MISTRAL_API_KEY",
            backend: BackendName::OpenAI,
            models: MISTRAL_MODELS,
        },
        Provider {
            name: "openrouter",
            base_url: "https://openrouter.ai/api/v1",
            api_key_env: "OPENROUTER_API_KEY",
            backend: BackendName::OpenAI,
            models: OPENROUTER_MODELS,
        },
    ];
});

impl Provider {
    pub fn all() -> &'static [Provider] {
        return &PROVIDERS;
    }

    pub fn names() -> Vec<&'static str> {
        return PROVIDERS.iter().map(|e| return e.name).collect();
    }

    pub fn find(name: &str) -> Result<&'static Provider> {
        let lowered = name.to_lowercase();
        if let Some(provider) = PROVIDERS.iter().find(|e| return e.name == lowered) {
            return Ok(provider);
        }

        bail!(format!(
            "Unknown provider {name}. Available providers: {}",
            Provider::names().join(", ")
        ))
    }

    pub fn default_model(&self) -> &'static ProviderModel {
        return &self.models[0];
    }

    fn resolve_api_key(&self, override_key: &str) -> String {
        if !override_key.is_empty() {
            return override_key.to_string();
        }

        return env::var(self.api_key_env).unwrap_or_else(|_| return "".to_string());
    }

    /// Builds the per-request connection config. Model ids outside the
    /// registry are accepted as-is; the registry is a catalogue, not an
    /// allowlist.
    pub fn model_config(&self, model_id: &str, api_key_override: &str) -> ModelConfig {
        let mut model = model_id.to_string();
        if model.is_empty() {
            model = self.default_model().id.to_string();
        }

        return ModelConfig::new(&self.resolve_api_key(api_key_override), self.base_url, &model);
    }
}
