use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use super::CodeGenAgent;
use super::ConfiguratorAgent;
use super::LearningAgent;
use super::PlannerAgent;
use crate::domain::models::Attachments;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::CompletionBackend;
use crate::domain::models::CompletionRequest;
use crate::domain::models::Framework;
use crate::domain::models::ModelConfig;
use crate::domain::models::ERROR_MARKER;

struct StubBackend {
    responses: Mutex<VecDeque<Result<String, String>>>,
    seen: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl StubBackend {
    fn scripted(responses: Vec<Result<String, String>>) -> (BackendBox, Arc<Mutex<Vec<CompletionRequest>>>) {
        let seen = Arc::new(Mutex::new(vec![]));
        let backend = StubBackend {
            responses: Mutex::new(responses.into()),
            seen: seen.clone(),
        };

        return (Box::new(backend), seen);
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    fn name(&self) -> BackendName {
        return BackendName::OpenAI;
    }

    async fn health_check(&self, _config: &ModelConfig) -> Result<()> {
        return Ok(());
    }

    async fn complete(&self, _config: &ModelConfig, request: CompletionRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request);

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => return Ok(text),
            Some(Err(msg)) => bail!(msg),
            None => bail!("no scripted response left"),
        }
    }
}

fn model_config() -> ModelConfig {
    return ModelConfig::new("abc", "http://localhost", "test-model");
}

#[tokio::test]
async fn it_swallows_code_gen_failures_into_a_sentinel() {
    let (backend, _) = StubBackend::scripted(vec![Err("connection refused".to_string())]);
    let agent = CodeGenAgent::new(model_config(), Framework::PyGame);

    let code = agent
        .run(&backend, "step 1: draw a ball", None, &Attachments::none())
        .await;

    assert!(code.starts_with(ERROR_MARKER));
    assert!(code.contains("connection refused"));
}

#[tokio::test]
async fn it_returns_a_sentinel_for_empty_completions() {
    let (backend, _) = StubBackend::scripted(vec![Ok("  \n".to_string())]);
    let agent = CodeGenAgent::new(model_config(), Framework::PyGame);

    let code = agent
        .run(&backend, "step 1: draw a ball", None, &Attachments::none())
        .await;

    assert_eq!(code, format!("{ERROR_MARKER} No code generated from AI response"));
}

#[tokio::test]
async fn it_extracts_fenced_scripts_from_code_gen_responses() {
    let (backend, _) = StubBackend::scripted(vec![Ok(
        "Here you go!\n```python\nprint('ball')\n```\nHave fun.".to_string(),
    )]);
    let agent = CodeGenAgent::new(model_config(), Framework::PyGame);

    let code = agent
        .run(&backend, "step 1: draw a ball", None, &Attachments::none())
        .await;

    assert_eq!(code, "print('ball')");
}

#[tokio::test]
async fn it_switches_code_gen_to_fix_mode_with_error_feedback() {
    let (backend, seen) = StubBackend::scripted(vec![Ok("print('fixed')".to_string())]);
    let agent = CodeGenAgent::new(model_config(), Framework::PyGame);

    agent
        .run(
            &backend,
            "step 1: draw a ball",
            Some("NameError: ball"),
            &Attachments::none(),
        )
        .await;

    let requests = seen.lock().unwrap();
    assert!(requests[0].system_prompt.contains("self-correction loop"));
    assert!(requests[0]
        .user_content
        .contains("The previous attempt failed. Please fix the code. Error:\nNameError: ball"));
}

#[tokio::test]
async fn it_propagates_configurator_failures() {
    let (backend, _) = StubBackend::scripted(vec![Err("rate limited".to_string())]);
    let agent = ConfiguratorAgent::new(model_config(), Framework::PyGame);

    let res = agent
        .run(&backend, "a bouncing ball", &Attachments::none())
        .await;

    assert_eq!(res.unwrap_err().to_string(), "rate limited");
}

#[tokio::test]
async fn it_threads_ideas_into_the_planner_prompt() {
    let (backend, seen) = StubBackend::scripted(vec![Ok("1. Build a Ball class".to_string())]);
    let agent = PlannerAgent::new(model_config(), Framework::Ursina);

    let plan = agent
        .run(
            &backend,
            "a bouncing ball",
            "- Slider for gravity",
            &Attachments::none(),
        )
        .await
        .unwrap();

    assert_eq!(plan, "1. Build a Ball class");
    let requests = seen.lock().unwrap();
    assert!(requests[0].user_content.contains("Original user request: a bouncing ball"));
    assert!(requests[0].user_content.contains("- Slider for gravity"));
}

#[tokio::test]
async fn it_mentions_attachments_by_name_only() {
    let (backend, seen) = StubBackend::scripted(vec![Ok("ideas".to_string())]);
    let agent = ConfiguratorAgent::new(model_config(), Framework::PyGame);

    let attachments = Attachments {
        file_name: Some("notes.pdf".to_string()),
        audio_name: Some("prompt.wav".to_string()),
    };
    agent.run(&backend, "a pendulum", &attachments).await.unwrap();

    let requests = seen.lock().unwrap();
    assert!(requests[0]
        .user_content
        .contains("The user also provided a file: notes.pdf"));
    assert!(requests[0]
        .user_content
        .contains("The user also provided an audio file: prompt.wav"));
}

#[tokio::test]
async fn it_wraps_code_for_the_learning_agent() {
    let (backend, seen) = StubBackend::scripted(vec![Ok("## Core Physics Concepts".to_string())]);
    let agent = LearningAgent::new(model_config(), Framework::PyGame);

    agent
        .run(
            &backend,
            "print('ball')",
            "a bouncing ball",
            Some("- Slider for gravity"),
            Some("1. Build a Ball class"),
        )
        .await
        .unwrap();

    let requests = seen.lock().unwrap();
    assert!(requests[0].user_content.contains("```python\nprint('ball')\n```"));
    assert!(requests[0].user_content.contains("Configuration Ideas:\n- Slider for gravity"));
    assert!(requests[0].user_content.contains("Generation Plan:\n1. Build a Ball class"));
}
