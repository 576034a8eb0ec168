#[cfg(test)]
#[path = "agents_test.rs"]
mod tests;

use anyhow::Result;

use super::code_blocks::extract_script;
use super::prompts;
use crate::domain::models::Attachments;
use crate::domain::models::BackendBox;
use crate::domain::models::CompletionRequest;
use crate::domain::models::Framework;
use crate::domain::models::ModelConfig;
use crate::domain::models::ERROR_MARKER;

// Output token budgets per role.
const CONFIGURATOR_MAX_TOKENS: u32 = 4096;
const PLANNER_MAX_TOKENS: u32 = 4096;
const CODE_GEN_MAX_TOKENS: u32 = 8192;
const LEARNING_MAX_TOKENS: u32 = 6144;
const EXPLAINER_MAX_TOKENS: u32 = 4096;

/// Brainstorms interactive features for a requested simulation. Failures
/// propagate; there is nothing useful to show without ideas.
pub struct ConfiguratorAgent {
    model_config: ModelConfig,
    framework: Framework,
}

impl ConfiguratorAgent {
    pub fn new(model_config: ModelConfig, framework: Framework) -> ConfiguratorAgent {
        return ConfiguratorAgent {
            model_config,
            framework,
        };
    }

    pub async fn run(
        &self,
        backend: &BackendBox,
        query: &str,
        attachments: &Attachments,
    ) -> Result<String> {
        let mut user_content = format!("Here is the user's request: {query}");
        user_content += &attachments.prompt_suffix();

        let request = CompletionRequest::new(
            prompts::configurator_prompt(self.framework),
            user_content,
            CONFIGURATOR_MAX_TOKENS,
        );

        return backend.complete(&self.model_config, request).await;
    }
}

/// Turns a query plus configuration ideas into a step-by-step plan for the
/// code generator. Failures propagate.
pub struct PlannerAgent {
    model_config: ModelConfig,
    framework: Framework,
}

impl PlannerAgent {
    pub fn new(model_config: ModelConfig, framework: Framework) -> PlannerAgent {
        return PlannerAgent {
            model_config,
            framework,
        };
    }

    pub async fn run(
        &self,
        backend: &BackendBox,
        query: &str,
        config_ideas: &str,
        attachments: &Attachments,
    ) -> Result<String> {
        let mut user_content = format!(
            "Original user request: {query}\n\nIncorporate these configuration ideas to make the simulation interactive and engaging:\n{config_ideas}"
        );
        user_content += &attachments.prompt_suffix();

        let request = CompletionRequest::new(
            prompts::planner_prompt(self.framework),
            user_content,
            PLANNER_MAX_TOKENS,
        );

        return backend.complete(&self.model_config, request).await;
    }
}

/// Generates the simulation script from a plan. Unlike the other roles this
/// agent never fails: every upstream error, and an empty completion, is
/// converted into a script-shaped sentinel string so downstream consumers
/// always have something to render, execute, and retry.
pub struct CodeGenAgent {
    model_config: ModelConfig,
    framework: Framework,
}

impl CodeGenAgent {
    pub fn new(model_config: ModelConfig, framework: Framework) -> CodeGenAgent {
        return CodeGenAgent {
            model_config,
            framework,
        };
    }

    pub async fn run(
        &self,
        backend: &BackendBox,
        plan: &str,
        error_feedback: Option<&str>,
        attachments: &Attachments,
    ) -> String {
        let mut user_content = format!("Generate the code for the following plan:\n\n{plan}");
        if let Some(error_text) = error_feedback {
            user_content += &format!(
                "\n\nThe previous attempt failed. Please fix the code. Error:\n{error_text}"
            );
        }
        user_content += &attachments.prompt_suffix();

        let request = CompletionRequest::new(
            prompts::code_gen_prompt(self.framework, error_feedback.is_some()),
            user_content,
            CODE_GEN_MAX_TOKENS,
        );

        let res = backend.complete(&self.model_config, request).await;
        match res {
            Ok(response) => {
                if response.trim().is_empty() {
                    return format!("{ERROR_MARKER} No code generated from AI response");
                }

                return extract_script(&response).into_code();
            }
            Err(err) => {
                tracing::error!(error = ?err, "Code generation call failed");
                return format!("{ERROR_MARKER} {err}");
            }
        }
    }
}

/// Produces educational content about a finished script. Failures
/// propagate.
pub struct LearningAgent {
    model_config: ModelConfig,
    framework: Framework,
}

impl LearningAgent {
    pub fn new(model_config: ModelConfig, framework: Framework) -> LearningAgent {
        return LearningAgent {
            model_config,
            framework,
        };
    }

    pub async fn run(
        &self,
        backend: &BackendBox,
        code: &str,
        query: &str,
        config_ideas: Option<&str>,
        plan: Option<&str>,
    ) -> Result<String> {
        let mut user_content =
            format!("Original Query: {query}\n\nCode to analyze:\n```python\n{code}\n```");
        if let Some(ideas) = config_ideas {
            user_content += &format!("\n\nConfiguration Ideas:\n{ideas}");
        }
        if let Some(plan_text) = plan {
            user_content += &format!("\n\nGeneration Plan:\n{plan_text}");
        }

        let request = CompletionRequest::new(
            prompts::learning_prompt(self.framework),
            user_content,
            LEARNING_MAX_TOKENS,
        );

        return backend.complete(&self.model_config, request).await;
    }
}

/// Walks through a script for readers rather than students. Failures
/// propagate.
pub struct ExplainerAgent {
    model_config: ModelConfig,
    framework: Framework,
}

impl ExplainerAgent {
    pub fn new(model_config: ModelConfig, framework: Framework) -> ExplainerAgent {
        return ExplainerAgent {
            model_config,
            framework,
        };
    }

    pub async fn run(&self, backend: &BackendBox, code: &str) -> Result<String> {
        let name = self.framework.library_name();
        let user_content = format!("Please explain this {name} code:\n\n```python\n{code}\n```");

        let request = CompletionRequest::new(
            prompts::explainer_prompt(self.framework),
            user_content,
            EXPLAINER_MAX_TOKENS,
        );

        return backend.complete(&self.model_config, request).await;
    }
}
