#[cfg(test)]
#[path = "artifact_test.rs"]
mod tests;

/// Prefix carried by every script the code generation agent produces when
/// the underlying completion call failed or returned nothing. Downstream
/// consumers always receive a script string; they check for this marker
/// instead of handling an absent value.
pub const ERROR_MARKER: &str = "# Error:";

/// A generated simulation script together with its provenance. Artifacts
/// are appended to a workspace's version history and never mutated.
#[derive(Clone, Debug)]
pub struct GeneratedArtifact {
    pub source_code: String,
    pub plan: String,
    pub error_feedback: Option<String>,
}

impl GeneratedArtifact {
    pub fn new(source_code: String, plan: String) -> GeneratedArtifact {
        return GeneratedArtifact {
            source_code,
            plan,
            error_feedback: None,
        };
    }

    pub fn corrected(
        source_code: String,
        plan: String,
        error_feedback: String,
    ) -> GeneratedArtifact {
        return GeneratedArtifact {
            source_code,
            plan,
            error_feedback: Some(error_feedback),
        };
    }

    /// True when the script is a sentinel produced by a failed generation
    /// call rather than model output.
    pub fn is_error(&self) -> bool {
        return self.source_code.trim_start().starts_with(ERROR_MARKER);
    }
}
