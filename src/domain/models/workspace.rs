#[cfg(test)]
#[path = "workspace_test.rs"]
mod tests;

use super::ExecutionResult;
use super::Framework;
use super::GeneratedArtifact;

/// One refinement exchange: what the user asked for and the full script
/// that resulted.
#[derive(Clone, Debug)]
pub struct Exchange {
    pub request: String,
    pub code: String,
}

/// The complete state of one generation session, passed explicitly through
/// the call chain. Artifacts form an append-only version history; the
/// current script is always the last entry.
#[derive(Debug)]
pub struct Workspace {
    pub query: String,
    pub framework: Framework,
    pub config_ideas: Option<String>,
    pub plan: Option<String>,
    pub last_execution: Option<ExecutionResult>,
    artifacts: Vec<GeneratedArtifact>,
    exchanges: Vec<Exchange>,
}

impl Workspace {
    pub fn new(query: &str, framework: Framework) -> Workspace {
        return Workspace {
            query: query.to_string(),
            framework,
            config_ideas: None,
            plan: None,
            last_execution: None,
            artifacts: vec![],
            exchanges: vec![],
        };
    }

    pub fn push_artifact(&mut self, artifact: GeneratedArtifact) {
        self.artifacts.push(artifact);
    }

    pub fn artifacts(&self) -> &[GeneratedArtifact] {
        return &self.artifacts;
    }

    pub fn current_artifact(&self) -> Option<&GeneratedArtifact> {
        return self.artifacts.last();
    }

    pub fn record_exchange(&mut self, request: &str, code: &str) {
        self.exchanges.push(Exchange {
            request: request.to_string(),
            code: code.to_string(),
        });
    }

    pub fn exchanges(&self) -> &[Exchange] {
        return &self.exchanges;
    }
}
