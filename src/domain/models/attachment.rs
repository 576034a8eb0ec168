/// Names of files the user attached alongside a request. Only the names are
/// ever referenced in prompts; attachment content is never read by the
/// agents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachments {
    pub file_name: Option<String>,
    pub audio_name: Option<String>,
}

impl Attachments {
    pub fn none() -> Attachments {
        return Attachments::default();
    }

    /// Suffix appended to an agent's user content when attachments are
    /// present.
    pub fn prompt_suffix(&self) -> String {
        let mut suffix = String::new();
        if let Some(name) = &self.file_name {
            suffix += &format!("\nThe user also provided a file: {name}");
        }
        if let Some(name) = &self.audio_name {
            suffix += &format!("\nThe user also provided an audio file: {name}");
        }

        return suffix;
    }
}
