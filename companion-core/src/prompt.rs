//! Prompt builder: fixed instruction frame + history and context blocks.

use crate::api_types::RetrievedChunk;

/// Opening line of every prompt.
pub(crate) const PROMPT_INTRO: &str = "An excerpt from a document is given below.";

/// The rules block. The decline clause is the contract that keeps the
/// model from answering outside the excerpts; do not weaken it without
/// enforcing the same rule elsewhere.
pub(crate) const PROMPT_RULES: &str = "Given the document excerpt, answer the following query.
If the context does not provide enough information, decline to answer.
Do not output anything that can't be answered from the context.";

/// Label introducing the chat-history slot when a summary is present.
pub(crate) const HISTORY_LABEL: &str = "Summary of the conversation so far:";

/// Removes single quotes from text embedded in a prompt or shown to the
/// user. Downstream parameterized statements choke on them.
pub fn strip_quotes(s: &str) -> String {
    s.replace('\'', "")
}

/// Builds the final completion prompt.
///
/// Deterministic template with four slots: the fixed instruction frame,
/// the chat-history block (empty when `history_summary` is absent), the
/// context block (chunks joined in retrieval order, none dropped, no
/// re-ranking), and the literal question. The question is quote-sanitized
/// before embedding.
pub fn build_prompt(
    question: &str,
    chunks: &[RetrievedChunk],
    history_summary: Option<&str>,
) -> String {
    let question = strip_quotes(question);

    let mut out = String::new();
    out.push_str(PROMPT_INTRO);
    out.push_str("\n\n---------------------\n");
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&chunk.text);
    }
    out.push_str("\n---------------------\n\n");

    if let Some(summary) = history_summary {
        out.push_str(HISTORY_LABEL);
        out.push('\n');
        out.push_str(summary);
        out.push_str("\n\n");
    }

    out.push_str(PROMPT_RULES);
    out.push_str("\n\nQuestion: ");
    out.push_str(&question);
    out.push_str("\nAnswer:\n");
    out
}
