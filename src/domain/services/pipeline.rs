#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

use anyhow::Result;

use super::agents::CodeGenAgent;
use super::agents::ConfiguratorAgent;
use super::agents::PlannerAgent;
use super::history;
use super::history::CONTEXT_WINDOW;
use crate::domain::models::Attachments;
use crate::domain::models::BackendBox;
use crate::domain::models::Framework;
use crate::domain::models::GeneratedArtifact;
use crate::domain::models::ModelConfig;
use crate::domain::models::Workspace;

/// Sequences the generation agents: ideate, plan, generate. Each stage's
/// verbatim output is threaded into the next stage's prompt; no stage is
/// retried. The pipeline holds no state of its own — everything it needs
/// arrives as arguments and everything it produces lands in the caller's
/// workspace.
pub struct GenerationPipeline {
    backend: BackendBox,
    model_config: ModelConfig,
    framework: Framework,
}

impl GenerationPipeline {
    pub fn new(
        backend: BackendBox,
        model_config: ModelConfig,
        framework: Framework,
    ) -> GenerationPipeline {
        return GenerationPipeline {
            backend,
            model_config,
            framework,
        };
    }

    /// Runs the full ideate -> plan -> generate chain for the workspace's
    /// query. On failure the pipeline aborts, but every stage that
    /// completed has already been written to the workspace for display and
    /// debugging. An artifact is only appended once all stages succeed, so
    /// the workspace never holds a partially-derived script.
    pub async fn generate(
        &self,
        workspace: &mut Workspace,
        attachments: &Attachments,
    ) -> Result<()> {
        let configurator = ConfiguratorAgent::new(self.model_config.clone(), self.framework);
        let planner = PlannerAgent::new(self.model_config.clone(), self.framework);
        let code_generator = CodeGenAgent::new(self.model_config.clone(), self.framework);

        let config_ideas = configurator
            .run(&self.backend, &workspace.query, attachments)
            .await?;
        workspace.config_ideas = Some(config_ideas.clone());

        let plan = planner
            .run(&self.backend, &workspace.query, &config_ideas, attachments)
            .await?;
        workspace.plan = Some(plan.clone());

        let source_code = code_generator
            .run(&self.backend, &plan, None, attachments)
            .await;
        workspace.push_artifact(GeneratedArtifact::new(source_code, plan));

        return Ok(());
    }

    /// One self-correction cycle: re-invokes the code generator in fix
    /// mode with the failing script and its error text. A single attempt —
    /// the caller decides whether to invoke it again. Never fails; a
    /// failed call yields a sentinel-script artifact.
    pub async fn correct(
        &self,
        current_code: &str,
        error_text: &str,
        attachments: &Attachments,
    ) -> GeneratedArtifact {
        let code_generator = CodeGenAgent::new(self.model_config.clone(), self.framework);

        let source_code = code_generator
            .run(&self.backend, current_code, Some(error_text), attachments)
            .await;

        return GeneratedArtifact::corrected(
            source_code,
            current_code.to_string(),
            error_text.to_string(),
        );
    }

    /// Chat-based refinement: the prompt carries the original query, the
    /// configuration ideas and plan, the most recent script, a bounded
    /// window of prior exchanges (oldest to newest), and the new request.
    pub async fn refine(
        &self,
        workspace: &Workspace,
        request: &str,
        attachments: &Attachments,
    ) -> GeneratedArtifact {
        let code_generator = CodeGenAgent::new(self.model_config.clone(), self.framework);

        let current_code = workspace
            .current_artifact()
            .map(|e| return e.source_code.to_string())
            .unwrap_or_default();
        let config_ideas = workspace.config_ideas.clone().unwrap_or_else(|| {
            return "None".to_string();
        });
        let plan = workspace.plan.clone().unwrap_or_else(|| {
            return "None".to_string();
        });
        let chat_context = history::context_window(workspace.exchanges(), CONTEXT_WINDOW);

        let modification_context = format!(
            r#"IMPORTANT: Generate a COMPLETE, FULL, RUNNABLE Python script. Do not provide just code snippets or partial code.

## Original Project Context:
**Original Request:** {query}

**Configuration Ideas Used:**
{config_ideas}

**Generation Plan:**
{plan}

## Current Code:
```python
{current_code}
```
{chat_context}
## Current Modification Request:
{request}

## Instructions:
1. Analyze the conversation history to understand previous modifications
2. Apply the new modification while maintaining consistency
3. Return the COMPLETE, FULL, RUNNABLE Python script
4. Ensure all previous features and modifications are preserved unless explicitly changed"#,
            query = workspace.query,
        );

        let feedback = format!(
            "Modify the existing COMPLETE code considering conversation history. Request: {request}. Return the full, complete, runnable script."
        );

        let source_code = code_generator
            .run(&self.backend, &modification_context, Some(&feedback), attachments)
            .await;

        return GeneratedArtifact::corrected(source_code, modification_context, feedback);
    }

    /// Back-annotation for gallery entries: derives plausible configuration
    /// ideas and a plan from a known-good script. No code is produced; the
    /// existing script is reused verbatim by the caller.
    pub async fn generate_from_existing(
        &self,
        existing_code: &str,
        query: &str,
        attachments: &Attachments,
    ) -> Result<(String, String)> {
        let configurator = ConfiguratorAgent::new(self.model_config.clone(), self.framework);
        let planner = PlannerAgent::new(self.model_config.clone(), self.framework);

        let name = self.framework.library_name();
        let config_prompt = format!(
            r#"Analyze this existing {name} code and suggest what interactive features and configurations it demonstrates:

Query: {query}

Existing Code:
{existing_code}

Please describe the interactive features, physics parameters, and configuration options that this code implements."#
        );
        let config_ideas = configurator
            .run(&self.backend, &config_prompt, attachments)
            .await?;

        let plan_prompt = format!(
            r#"Create a detailed plan for this {name} simulation based on the existing implementation:

Query: {query}

Configuration Ideas: {config_ideas}

Existing Code Structure:
{existing_code}

Please create a plan that describes how this simulation is structured and what it accomplishes."#
        );
        let plan = planner
            .run(&self.backend, &plan_prompt, &config_ideas, attachments)
            .await?;

        return Ok((config_ideas, plan));
    }
}
