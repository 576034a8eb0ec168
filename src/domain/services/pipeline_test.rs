use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use super::GenerationPipeline;
use crate::domain::models::Attachments;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::CompletionBackend;
use crate::domain::models::CompletionRequest;
use crate::domain::models::Framework;
use crate::domain::models::GeneratedArtifact;
use crate::domain::models::ModelConfig;
use crate::domain::models::Workspace;
use crate::domain::models::ERROR_MARKER;

struct StubBackend {
    responses: Mutex<VecDeque<Result<String, String>>>,
    seen: Arc<Mutex<Vec<CompletionRequest>>>,
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

fn pipeline_with(
    responses: Vec<Result<String, String>>,
) -> (GenerationPipeline, Arc<Mutex<Vec<CompletionRequest>>>) {
    let seen = Arc::new(Mutex::new(vec![]));
    let backend: BackendBox = Box::new(StubBackend {
        responses: Mutex::new(responses.into()),
        seen: seen.clone(),
    });

    let pipeline = GenerationPipeline::new(
        backend,
        ModelConfig::new("abc", "http://localhost", "test-model"),
        Framework::PyGame,
    );

    return (pipeline, seen);
}

#[tokio::test]
async fn it_threads_each_stage_into_the_next_verbatim() {
    let (pipeline, seen) = pipeline_with(vec![
        Ok("- Slider for gravity".to_string()),
        Ok("1. Build a Ball class".to_string()),
        Ok("```python\nprint('ball')\n```".to_string()),
    ]);

    let mut workspace = Workspace::new("a bouncing ball", Framework::PyGame);
    pipeline
        .generate(&mut workspace, &Attachments::none())
        .await
        .unwrap();

    assert_eq!(workspace.config_ideas.as_deref(), Some("- Slider for gravity"));
    assert_eq!(workspace.plan.as_deref(), Some("1. Build a Ball class"));
    assert_eq!(workspace.current_artifact().unwrap().source_code, "print('ball')");
    assert_eq!(workspace.current_artifact().unwrap().plan, "1. Build a Ball class");

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests[1].user_content.contains("- Slider for gravity"));
    assert!(requests[2].user_content.contains("1. Build a Ball class"));
}

#[tokio::test]
async fn it_aborts_on_planner_failure_but_keeps_completed_stages() {
    let (pipeline, _) = pipeline_with(vec![
        Ok("- Slider for gravity".to_string()),
        Err("rate limited".to_string()),
    ]);

    let mut workspace = Workspace::new("a bouncing ball", Framework::PyGame);
    let res = pipeline.generate(&mut workspace, &Attachments::none()).await;

    assert_eq!(res.unwrap_err().to_string(), "rate limited");
    assert_eq!(workspace.config_ideas.as_deref(), Some("- Slider for gravity"));
    assert!(workspace.plan.is_none());
    assert!(workspace.current_artifact().is_none());
}

#[tokio::test]
async fn it_degrades_code_generation_failures_into_a_sentinel_artifact() {
    let (pipeline, _) = pipeline_with(vec![
        Ok("- Slider for gravity".to_string()),
        Ok("1. Build a Ball class".to_string()),
        Err("connection refused".to_string()),
    ]);

    let mut workspace = Workspace::new("a bouncing ball", Framework::PyGame);
    pipeline
        .generate(&mut workspace, &Attachments::none())
        .await
        .unwrap();

    let artifact = workspace.current_artifact().unwrap();
    assert!(artifact.is_error());
    assert!(artifact.source_code.starts_with(ERROR_MARKER));
}

#[tokio::test]
async fn it_corrects_with_the_failing_script_and_error_text() {
    let (pipeline, seen) = pipeline_with(vec![Ok("print('fixed')".to_string())]);

    let artifact = pipeline
        .correct("print(ball)", "NameError: name 'ball' is not defined", &Attachments::none())
        .await;

    assert_eq!(artifact.source_code, "print('fixed')");
    assert_eq!(
        artifact.error_feedback.as_deref(),
        Some("NameError: name 'ball' is not defined")
    );

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].system_prompt.contains("self-correction loop"));
    assert!(requests[0].user_content.contains("print(ball)"));
    assert!(requests[0]
        .user_content
        .contains("NameError: name 'ball' is not defined"));
}

#[tokio::test]
async fn it_refines_with_a_bounded_history_window() {
    let (pipeline, seen) = pipeline_with(vec![Ok("print('v6')".to_string())]);

    let mut workspace = Workspace::new("a bouncing ball", Framework::PyGame);
    workspace.config_ideas = Some("- Slider for gravity".to_string());
    workspace.plan = Some("1. Build a Ball class".to_string());
    workspace.push_artifact(GeneratedArtifact::new(
        "print('v5')".to_string(),
        "1. Build a Ball class".to_string(),
    ));
    for request in ["one", "two", "three", "four", "five"] {
        workspace.record_exchange(request, "print('old')");
    }

    let artifact = pipeline
        .refine(&workspace, "make the ball red", &Attachments::none())
        .await;

    assert_eq!(artifact.source_code, "print('v6')");

    let requests = seen.lock().unwrap();
    let content = &requests[0].user_content;
    assert!(content.contains("**Original Request:** a bouncing ball"));
    assert!(content.contains("print('v5')"));
    assert!(content.contains("## Current Modification Request:\nmake the ball red"));

    // Window of three: the two oldest exchanges are gone.
    assert!(!content.contains("User: one"));
    assert!(!content.contains("User: two"));
    assert!(content.contains("User: three"));
    assert!(content.contains("User: four"));
    assert!(content.contains("User: five"));
}

#[tokio::test]
async fn it_back_annotates_existing_code_without_generating_any() {
    let (pipeline, seen) = pipeline_with(vec![
        Ok("- Demonstrates gravity sliders".to_string()),
        Ok("1. The Ball class integrates velocity".to_string()),
    ]);

    let (ideas, plan) = pipeline
        .generate_from_existing("print('ball')", "a bouncing ball", &Attachments::none())
        .await
        .unwrap();

    assert_eq!(ideas, "- Demonstrates gravity sliders");
    assert_eq!(plan, "1. The Ball class integrates velocity");

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].user_content.contains("print('ball')"));
    assert!(requests[1].user_content.contains("- Demonstrates gravity sliders"));
}
