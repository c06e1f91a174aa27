//! History condensation: fold the recent turns and the new question into a
//! single self-contained search query, via one completion call.

use crate::backend::CompletionBackend;
use crate::error::PipelineError;
use crate::transcript::{Role, Turn};

/// Fixed instruction template for the rewrite call.
pub(crate) const SUMMARIZE_INSTRUCTIONS: &str = "Based on the chat history below and the question, \
generate a query that extends the question with the chat history provided. \
The query should be in natural language. \
Answer with only the query. Do not add any explanation.";

/// Renders a history window as plain `role: text` lines.
pub(crate) fn render_history(turns: &[Turn]) -> String {
    let mut out = String::new();
    for t in turns {
        let role = match t.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        out.push_str(role);
        out.push_str(": ");
        out.push_str(&t.text);
        out.push('\n');
    }
    out
}

/// Collapses a model reply to a single line of whitespace-normalized text.
pub(crate) fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrites `question` into a self-contained query using `history`.
///
/// Reads the history, never mutates it. One completion call, no caching,
/// no retry; failure aborts the turn as [`PipelineError::Summarization`].
pub(crate) async fn summarize<C: CompletionBackend>(
    chat: &C,
    model: &str,
    history: &[Turn],
    question: &str,
) -> Result<String, PipelineError> {
    let mut prompt = String::new();
    prompt.push_str(SUMMARIZE_INSTRUCTIONS);
    prompt.push_str("\n\n<chat_history>\n");
    prompt.push_str(&render_history(history));
    prompt.push_str("</chat_history>\n<question>\n");
    prompt.push_str(question);
    prompt.push_str("\n</question>\n");

    let raw = chat
        .complete(model, &prompt)
        .await
        .map_err(PipelineError::Summarization)?;

    Ok(single_line(&raw))
}
