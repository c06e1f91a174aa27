//! Turn orchestration: summarize → retrieve → build prompt → complete.
//!
//! One logical thread of control per turn; every stage's output is a strict
//! input to the next, so the calls are sequential and blocking from the
//! orchestrator's perspective. The transcript is mutated only at the turn
//! boundary: both turns of a round are appended after a successful
//! completion, or nothing is.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use cortex_client::ConfigError;

use crate::api_types::{RetrievedChunk, TurnOptions, TurnOutcome};
use crate::backend::{CompletionBackend, SearchBackend};
use crate::cfg::{PipelineConfig, RetrievalQuerySource};
use crate::error::PipelineError;
use crate::observe::{NoopObserver, StageObserver};
use crate::prompt::{build_prompt, strip_quotes};
use crate::summarize::summarize;
use crate::transcript::{Transcript, Turn};

/// Whether turns carry conversational context into retrieval. Selected at
/// session start and fixed for the orchestrator's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationMode {
    /// Every turn is answered from the raw question alone.
    Stateless,
    /// Subsequent turns rewrite the question against the history window
    /// before retrieval; the first turn behaves like stateless.
    HistoryAware,
}

/// Progression of a single turn. Failures jump straight to `Failed`;
/// `AwaitingSummary` is skipped in stateless mode or on an empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnStage {
    Idle,
    AwaitingSummary,
    AwaitingRetrieval,
    AwaitingCompletion,
    Done,
    Failed,
}

fn advance(stage: &mut TurnStage, next: TurnStage) {
    trace!(from = ?stage, to = ?next, "turn stage");
    *stage = next;
}

/// Drives one conversation over a caller-owned [`Transcript`].
///
/// The transcript is passed in by reference each turn rather than held as
/// ambient state, so a host can run any number of concurrent sessions
/// against one orchestrator.
pub struct ConversationOrchestrator<S, C> {
    search: S,
    chat: C,
    cfg: PipelineConfig,
    mode: ConversationMode,
    observer: Arc<dyn StageObserver>,
}

impl<S: SearchBackend, C: CompletionBackend> ConversationOrchestrator<S, C> {
    pub fn new(search: S, chat: C, cfg: PipelineConfig, mode: ConversationMode) -> Self {
        Self {
            search,
            chat,
            cfg,
            mode,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attaches a stage observer (evaluation hook). Replaces the default
    /// no-op observer.
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn mode(&self) -> ConversationMode {
        self.mode
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Answers one question, appending both turns to `transcript` on
    /// success. On any stage failure the transcript is left unchanged and
    /// partial results are discarded.
    #[instrument(skip_all, fields(mode = ?self.mode))]
    pub async fn answer_turn(
        &self,
        transcript: &mut Transcript,
        question: &str,
        opts: &TurnOptions,
    ) -> Result<TurnOutcome, PipelineError> {
        let model = self.resolve_model(opts.model.as_deref())?;
        let top_k = if opts.top_k == 0 {
            self.cfg.top_k
        } else {
            opts.top_k
        };

        let mut stage = TurnStage::Idle;

        let summary = {
            let window = transcript.window(self.cfg.window);
            if self.mode == ConversationMode::HistoryAware && !window.is_empty() {
                advance(&mut stage, TurnStage::AwaitingSummary);
                match summarize(&self.chat, &model, window, question).await {
                    Ok(s) => {
                        self.observer.on_summary(window, question, &s);
                        Some(s)
                    }
                    Err(e) => {
                        advance(&mut stage, TurnStage::Failed);
                        return Err(e);
                    }
                }
            } else {
                None
            }
        };

        advance(&mut stage, TurnStage::AwaitingRetrieval);
        let retrieval_query = match (&summary, self.cfg.retrieval_query) {
            (Some(s), RetrievalQuerySource::Rewritten) => s.as_str(),
            _ => question,
        };
        let chunks = match self.search.search(retrieval_query, top_k).await {
            Ok(c) => c,
            Err(e) => {
                advance(&mut stage, TurnStage::Failed);
                return Err(PipelineError::Retrieval(e));
            }
        };
        self.observer.on_retrieval(retrieval_query, &chunks);
        debug!(hits = chunks.len(), "retrieved context");

        advance(&mut stage, TurnStage::AwaitingCompletion);
        let prompt = build_prompt(question, &chunks, summary.as_deref());
        let answer = match self.chat.complete(&model, &prompt).await {
            Ok(raw) => strip_quotes(&raw),
            Err(e) => {
                advance(&mut stage, TurnStage::Failed);
                return Err(PipelineError::Completion(e));
            }
        };
        self.observer.on_completion(&prompt, &answer);

        transcript.push(Turn::user(question));
        transcript.push(Turn::assistant(&answer));
        advance(&mut stage, TurnStage::Done);

        Ok(TurnOutcome {
            answer,
            sources: dedup_sources(&chunks),
        })
    }

    fn resolve_model(&self, requested: Option<&str>) -> Result<String, PipelineError> {
        match requested {
            None => self
                .cfg
                .models
                .first()
                .cloned()
                .ok_or_else(|| ConfigError::EmptyModel.into()),
            Some(m) if self.cfg.models.iter().any(|known| known == m) => Ok(m.to_string()),
            Some(m) => Err(ConfigError::UnsupportedModel(m.to_string()).into()),
        }
    }
}

/// Source identifiers of the chunks, deduplicated in first-seen order.
/// Chunks without a source are skipped.
fn dedup_sources(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for c in chunks {
        if !c.source_id.is_empty() && !seen.iter().any(|s| s == &c.source_id) {
            seen.push(c.source_id.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use cortex_client::{CompleteError, CortexError, SearchError};

    use crate::transcript::GREETING;

    fn chunk(text: &str, source: &str) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            source_id: source.to_string(),
        }
    }

    #[derive(Default)]
    struct StubSearch {
        chunks: Vec<RetrievedChunk>,
        fail: bool,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl StubSearch {
        fn returning(chunks: Vec<RetrievedChunk>) -> Self {
            Self {
                chunks,
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SearchBackend for StubSearch {
        async fn search(
            &self,
            query: &str,
            limit: u32,
        ) -> Result<Vec<RetrievedChunk>, CortexError> {
            self.calls.lock().unwrap().push((query.to_string(), limit));
            if self.fail {
                return Err(CortexError::Search(SearchError::Decode(
                    "service unreachable".into(),
                )));
            }
            let take = self.chunks.len().min(limit as usize);
            Ok(self.chunks[..take].to_vec())
        }
    }

    #[derive(Default)]
    struct StubChat {
        reply: String,
        summary_reply: String,
        fail: bool,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl StubChat {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                summary_reply: "rewritten query".to_string(),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }

        fn summary_prompts(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .map(|(_, p)| p)
                .filter(|p| p.contains("<chat_history>"))
                .collect()
        }

        fn answer_prompts(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .map(|(_, p)| p)
                .filter(|p| !p.contains("<chat_history>"))
                .collect()
        }
    }

    impl CompletionBackend for StubChat {
        async fn complete(&self, model: &str, prompt: &str) -> Result<String, CortexError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            if self.fail {
                return Err(CortexError::Complete(CompleteError::EmptyResponse));
            }
            if prompt.contains("<chat_history>") {
                Ok(self.summary_reply.clone())
            } else {
                Ok(self.reply.clone())
            }
        }
    }

    fn orchestrator(
        search: StubSearch,
        chat: StubChat,
        mode: ConversationMode,
    ) -> ConversationOrchestrator<StubSearch, StubChat> {
        ConversationOrchestrator::new(search, chat, PipelineConfig::default(), mode)
    }

    fn dialogue(pairs: &[(&str, &str)]) -> Transcript {
        let mut t = Transcript::seeded();
        for (q, a) in pairs {
            t.push(Turn::user(*q));
            t.push(Turn::assistant(*a));
        }
        t
    }

    #[tokio::test]
    async fn stateless_never_summarizes() {
        let orch = orchestrator(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::replying("answer"),
            ConversationMode::Stateless,
        );
        let mut transcript = dialogue(&[("q1", "a1"), ("q2", "a2")]);

        orch.answer_turn(&mut transcript, "q3", &TurnOptions::default())
            .await
            .unwrap();

        assert!(orch.chat.summary_prompts().is_empty());
        assert_eq!(orch.chat.calls().len(), 1);
        assert_eq!(orch.search.calls()[0].0, "q3");
    }

    #[tokio::test]
    async fn history_mode_with_empty_window_behaves_stateless() {
        let orch = orchestrator(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::replying("answer"),
            ConversationMode::HistoryAware,
        );
        let mut transcript = Transcript::seeded();

        orch.answer_turn(&mut transcript, "first question", &TurnOptions::default())
            .await
            .unwrap();

        assert!(orch.chat.summary_prompts().is_empty());
        assert_eq!(orch.search.calls()[0].0, "first question");
    }

    #[tokio::test]
    async fn history_mode_summarizes_and_retrieves_on_rewrite() {
        let orch = orchestrator(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::replying("answer"),
            ConversationMode::HistoryAware,
        );
        let mut transcript = dialogue(&[("do you have a savings account?", "Yes, we do.")]);
        transcript.push(Turn::user("what about fees?"));

        orch.answer_turn(&mut transcript, "and the interest rate?", &TurnOptions::default())
            .await
            .unwrap();

        let summaries = orch.chat.summary_prompts();
        assert_eq!(summaries.len(), 1);
        assert!(summaries[0].contains("do you have a savings account?"));
        assert!(summaries[0].contains("Yes, we do."));
        assert!(summaries[0].contains("what about fees?"));
        assert!(summaries[0].contains("and the interest rate?"));
        assert!(!summaries[0].contains(GREETING));

        // Retrieval used the rewritten query, not the raw question.
        assert_eq!(orch.search.calls()[0].0, "rewritten query");
        // The final prompt still embeds the raw question.
        let answers = orch.chat.answer_prompts();
        assert_eq!(answers.len(), 1);
        assert!(answers[0].contains("Question: and the interest rate?"));
    }

    #[tokio::test]
    async fn raw_policy_summarizes_but_retrieves_on_question() {
        let cfg = PipelineConfig {
            retrieval_query: RetrievalQuerySource::Raw,
            ..PipelineConfig::default()
        };
        let orch = ConversationOrchestrator::new(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::replying("answer"),
            cfg,
            ConversationMode::HistoryAware,
        );
        let mut transcript = dialogue(&[("q1", "a1")]);

        orch.answer_turn(&mut transcript, "q2", &TurnOptions::default())
            .await
            .unwrap();

        assert_eq!(orch.chat.summary_prompts().len(), 1);
        assert_eq!(orch.search.calls()[0].0, "q2");
        // The summary still lands in the final prompt's history block.
        assert!(orch.chat.answer_prompts()[0].contains("rewritten query"));
    }

    #[tokio::test]
    async fn summarizer_window_is_bounded_to_w_turns() {
        let pairs: Vec<(String, String)> = (1..=10)
            .map(|i| (format!("question-{i}"), format!("answer-{i}")))
            .collect();
        let mut transcript = Transcript::seeded();
        for (q, a) in &pairs {
            transcript.push(Turn::user(q.clone()));
            transcript.push(Turn::assistant(a.clone()));
        }

        let orch = orchestrator(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::replying("answer"),
            ConversationMode::HistoryAware,
        );

        orch.answer_turn(&mut transcript, "next", &TurnOptions::default())
            .await
            .unwrap();

        // W = 7: the seven most recent turns are answer-7 through answer-10.
        let summary = &orch.chat.summary_prompts()[0];
        assert!(summary.contains("answer-7"));
        assert!(summary.contains("question-10"));
        assert!(summary.contains("answer-10"));
        assert!(!summary.contains("question-7"));
        assert!(!summary.contains("answer-6"));
    }

    #[tokio::test]
    async fn summarizer_sees_exactly_three_prior_turns() {
        let mut transcript = Transcript::seeded();
        transcript.push(Turn::user("turn-one"));
        transcript.push(Turn::assistant("turn-two"));
        transcript.push(Turn::user("turn-three"));

        let orch = orchestrator(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::replying("answer"),
            ConversationMode::HistoryAware,
        );

        orch.answer_turn(&mut transcript, "the new question", &TurnOptions::default())
            .await
            .unwrap();

        let summary = &orch.chat.summary_prompts()[0];
        let history_block = summary
            .split("<chat_history>")
            .nth(1)
            .and_then(|s| s.split("</chat_history>").next())
            .unwrap();
        assert_eq!(history_block.trim().lines().count(), 3);
        assert!(history_block.contains("turn-one"));
        assert!(history_block.contains("turn-three"));
        assert!(summary.contains("the new question"));
    }

    #[tokio::test]
    async fn retrieval_error_leaves_transcript_unchanged() {
        let orch = orchestrator(
            StubSearch::failing(),
            StubChat::replying("answer"),
            ConversationMode::Stateless,
        );
        let mut transcript = dialogue(&[("q1", "a1")]);
        let before = transcript.len();

        let err = orch
            .answer_turn(&mut transcript, "q2", &TurnOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Retrieval(_)));
        assert_eq!(transcript.len(), before);
    }

    #[tokio::test]
    async fn completion_error_leaves_transcript_unchanged() {
        let orch = orchestrator(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::failing(),
            ConversationMode::Stateless,
        );
        let mut transcript = Transcript::seeded();

        let err = orch
            .answer_turn(&mut transcript, "q", &TurnOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Completion(_)));
        assert_eq!(transcript.len(), 1);
    }

    #[tokio::test]
    async fn summarization_error_aborts_before_retrieval() {
        let orch = orchestrator(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::failing(),
            ConversationMode::HistoryAware,
        );
        let mut transcript = dialogue(&[("q1", "a1")]);
        let before = transcript.len();

        let err = orch
            .answer_turn(&mut transcript, "q2", &TurnOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Summarization(_)));
        assert!(orch.search.calls().is_empty());
        assert_eq!(transcript.len(), before);
    }

    #[tokio::test]
    async fn answers_from_context_end_to_end() {
        let orch = orchestrator(
            StubSearch::returning(vec![chunk("No minimum balance is required.", "doc1")]),
            StubChat::replying("There is no minimum balance requirement."),
            ConversationMode::HistoryAware,
        );
        let mut transcript = Transcript::new();

        let outcome = orch
            .answer_turn(
                &mut transcript,
                "What is the minimum balance?",
                &TurnOptions::default(),
            )
            .await
            .unwrap();

        let prompt = &orch.chat.answer_prompts()[0];
        assert!(prompt.contains("No minimum balance is required."));
        assert!(prompt.contains("What is the minimum balance?"));

        assert_eq!(outcome.answer, "There is no minimum balance requirement.");
        assert!(!outcome.answer.contains('\''));
        assert_eq!(outcome.sources, vec!["doc1".to_string()]);

        // Both turns recorded, in order.
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0], Turn::user("What is the minimum balance?"));
        assert_eq!(
            transcript.turns()[1],
            Turn::assistant("There is no minimum balance requirement.")
        );
    }

    #[tokio::test]
    async fn zero_chunks_still_completes() {
        let orch = orchestrator(
            StubSearch::returning(vec![]),
            StubChat::replying("I cannot answer that from the available documents."),
            ConversationMode::Stateless,
        );
        let mut transcript = Transcript::seeded();

        let outcome = orch
            .answer_turn(&mut transcript, "anything?", &TurnOptions::default())
            .await
            .unwrap();

        let prompt = &orch.chat.answer_prompts()[0];
        assert!(prompt.contains("Question: anything?"));
        assert!(outcome.sources.is_empty());
    }

    #[tokio::test]
    async fn answer_quotes_are_stripped() {
        let orch = orchestrator(
            StubSearch::returning(vec![chunk("text", "doc")]),
            StubChat::replying("It's the bank's 'premier' account."),
            ConversationMode::Stateless,
        );
        let mut transcript = Transcript::seeded();

        let outcome = orch
            .answer_turn(&mut transcript, "which account?", &TurnOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.answer, "Its the banks premier account.");
        assert_eq!(transcript.turns()[2].text, "Its the banks premier account.");
    }

    #[tokio::test]
    async fn sources_are_deduplicated_in_first_seen_order() {
        let orch = orchestrator(
            StubSearch::returning(vec![
                chunk("one", "savings.pdf"),
                chunk("two", "cards.pdf"),
                chunk("three", "savings.pdf"),
                chunk("four", ""),
            ]),
            StubChat::replying("answer"),
            ConversationMode::Stateless,
        );
        let mut transcript = Transcript::seeded();

        let outcome = orch
            .answer_turn(&mut transcript, "q", &TurnOptions::default())
            .await
            .unwrap();

        assert_eq!(
            outcome.sources,
            vec!["savings.pdf".to_string(), "cards.pdf".to_string()]
        );
    }

    #[tokio::test]
    async fn top_k_override_and_default() {
        let orch = orchestrator(
            StubSearch::returning(vec![]),
            StubChat::replying("answer"),
            ConversationMode::Stateless,
        );
        let mut transcript = Transcript::seeded();

        orch.answer_turn(&mut transcript, "q1", &TurnOptions::default())
            .await
            .unwrap();
        orch.answer_turn(
            &mut transcript,
            "q2",
            &TurnOptions {
                top_k: 3,
                model: None,
            },
        )
        .await
        .unwrap();

        let calls = orch.search.calls();
        assert_eq!(calls[0].1, 10);
        assert_eq!(calls[1].1, 3);
    }

    #[tokio::test]
    async fn model_must_be_in_allow_list() {
        let orch = orchestrator(
            StubSearch::returning(vec![]),
            StubChat::replying("answer"),
            ConversationMode::Stateless,
        );
        let mut transcript = Transcript::seeded();

        let err = orch
            .answer_turn(
                &mut transcript,
                "q",
                &TurnOptions {
                    top_k: 0,
                    model: Some("gpt-unknown".into()),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Config(_)));
        assert!(orch.search.calls().is_empty());
        assert!(orch.chat.calls().is_empty());
        assert_eq!(transcript.len(), 1);
    }

    #[tokio::test]
    async fn default_model_is_first_allow_list_entry() {
        let orch = orchestrator(
            StubSearch::returning(vec![]),
            StubChat::replying("answer"),
            ConversationMode::Stateless,
        );
        let mut transcript = Transcript::seeded();

        orch.answer_turn(&mut transcript, "q", &TurnOptions::default())
            .await
            .unwrap();

        assert_eq!(orch.chat.calls()[0].0, "mistral-large2");
    }
}
