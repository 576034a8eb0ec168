#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use crate::domain::models::Exchange;

pub const CONTEXT_WINDOW: usize = 3;

/// Renders the bounded refinement context: the last `max_exchanges`
/// exchanges, oldest first, as plain prompt text. The agents have no
/// notion of history; this string is just more user content.
pub fn context_window(exchanges: &[Exchange], max_exchanges: usize) -> String {
    if exchanges.is_empty() {
        return "".to_string();
    }

    let start = exchanges.len().saturating_sub(max_exchanges);
    let mut context = "\n\n## Recent Conversation History:\n".to_string();

    for (idx, exchange) in exchanges[start..].iter().enumerate() {
        let n = idx + 1;
        context += &format!("\n**Exchange {n}:**\n");
        context += &format!("User: {}\n", exchange.request);
        context += "Assistant: Modified the simulation code\n";
    }

    context += "\n**Note:** Please consider this conversation history when making modifications to maintain consistency.\n";

    return context;
}
