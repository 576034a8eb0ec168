#[cfg(test)]
#[path = "code_blocks_test.rs"]
mod tests;

/// Result of pulling a script out of a model response. Parsing is
/// best-effort with a defined fallback: when no complete fenced block is
/// present, the whole response is the script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptExtract {
    Fenced(String),
    Whole(String),
}

impl ScriptExtract {
    pub fn into_code(self) -> String {
        match self {
            ScriptExtract::Fenced(code) => return code,
            ScriptExtract::Whole(code) => return code,
        }
    }
}

/// Extracts the first fenced code block from a model response, labeled or
/// not. Models frequently wrap scripts in markdown chatter; the fence
/// content is the script, everything else is prose.
pub fn extract_script(response: &str) -> ScriptExtract {
    let mut current_block: Vec<&str> = vec![];
    let mut in_block = false;

    for line in response.split('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            if in_block {
                return ScriptExtract::Fenced(current_block.join("\n").trim().to_string());
            }
            in_block = true;
            continue;
        }

        if in_block {
            current_block.push(line);
        }
    }

    // An unterminated fence is treated as no fence at all.
    return ScriptExtract::Whole(response.trim().to_string());
}
