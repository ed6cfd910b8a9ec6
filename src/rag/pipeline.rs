// End-to-end RAG pipeline: rewrite -> retrieve -> assemble -> complete
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::PromptLog;
use crate::chat::history::{Turn, DEFAULT_WINDOW_SIZE};
use crate::chat::session::ConversationSession;
use crate::completion::CompletionService;
use crate::errors::{KaiError, Result};
use crate::rag::postprocess::{clean_numeric_spacing, summary_prompt};
use crate::rag::prompt::PromptAssembler;
use crate::rag::retrieval::{RetrievalResult, Retriever};
use crate::rag::rewriter::{QueryRewriter, RewriteOutcome};

/// User id recorded in the prompt log for sessions without a login
pub const ANONYMOUS_USER: &str = "anonymous";

/// RAG pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RAGConfig {
    /// Trailing turns shown to the rewriter and the prompt
    pub window_size: usize,
    /// Use the raw question when the rewrite call fails
    pub rewrite_fallback: bool,
    /// Collapse stray whitespace inside numbers in answers
    pub numeric_cleanup: bool,
}

impl Default for RAGConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            rewrite_fallback: true,
            numeric_cleanup: true,
        }
    }
}

/// Wall-clock time spent in each stage of a turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub rewrite_ms: u64,
    pub retrieval_ms: u64,
    pub completion_ms: u64,
    pub summary_ms: Option<u64>,
}

impl StageTimings {
    pub fn total_ms(&self) -> u64 {
        self.rewrite_ms + self.retrieval_ms + self.completion_ms + self.summary_ms.unwrap_or(0)
    }
}

/// Result of one question-answer cycle
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    /// Query actually sent to the search service
    pub effective_query: String,
    pub rewrite: RewriteOutcome,
    pub text: String,
    pub summary: Option<String>,
    pub retrieval: RetrievalResult,
    /// Flattened prompt sent to the completion service
    pub prompt: String,
    pub timings: StageTimings,
}

/// Sequences the pipeline stages for each incoming question
pub struct RAGPipeline {
    retriever: Retriever,
    rewriter: QueryRewriter,
    assembler: PromptAssembler,
    completion: Arc<dyn CompletionService>,
    prompt_log: Option<Arc<dyn PromptLog>>,
    config: RAGConfig,
}

impl RAGPipeline {
    /// Create pipeline with default configuration
    pub fn new(retriever: Retriever, completion: Arc<dyn CompletionService>) -> Self {
        Self::with_config(
            retriever,
            completion,
            PromptAssembler::default(),
            RAGConfig::default(),
        )
    }

    /// Create with custom configuration
    pub fn with_config(
        retriever: Retriever,
        completion: Arc<dyn CompletionService>,
        assembler: PromptAssembler,
        config: RAGConfig,
    ) -> Self {
        Self {
            rewriter: QueryRewriter::new(completion.clone(), config.rewrite_fallback),
            retriever,
            assembler,
            completion,
            prompt_log: None,
            config,
        }
    }

    /// Record every completion prompt in the given log
    pub fn with_prompt_log(mut self, log: Arc<dyn PromptLog>) -> Self {
        self.prompt_log = Some(log);
        self
    }

    /// Answer one question within a conversation.
    ///
    /// The session's history gains the (user, assistant) pair only when the
    /// answer was produced; any aborting error leaves it untouched.
    #[tracing::instrument(skip_all, fields(session = %session.id(), model = %session.settings().model))]
    pub async fn answer_question(
        &self,
        session: &mut ConversationSession,
        question: &str,
    ) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(KaiError::Validation("question must not be empty".to_string()));
        }

        let settings = session.settings().clone();
        let mut timings = StageTimings::default();

        // Step 1: History window
        let history: Vec<Turn> = if settings.use_history {
            session.history().window_view(self.config.window_size).to_vec()
        } else {
            Vec::new()
        };

        // Step 2: Effective query
        let started = Instant::now();
        let (effective_query, rewrite) = self
            .rewriter
            .rewrite(settings.model, &history, question)
            .await?;
        timings.rewrite_ms = started.elapsed().as_millis() as u64;

        // Step 3: Retrieval (never aborts the turn)
        let started = Instant::now();
        let retrieval = self
            .retriever
            .retrieve(&effective_query, &settings.category_filter)
            .await;
        timings.retrieval_ms = started.elapsed().as_millis() as u64;

        // Step 4: Prompt
        let prompt = self.assembler.assemble(&retrieval, &history, question).render();

        // Step 5: Completion
        let started = Instant::now();
        let raw = self.completion.complete(settings.model, &prompt).await?;
        timings.completion_ms = started.elapsed().as_millis() as u64;

        // Step 6: Post-processing
        let text = if self.config.numeric_cleanup {
            clean_numeric_spacing(&raw)
        } else {
            raw
        };

        let summary = if settings.summarize {
            let started = Instant::now();
            let summary = match self
                .completion
                .complete(settings.model, &summary_prompt(&text))
                .await
            {
                Ok(summary) => Some(summary.trim().to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "summary failed, returning answer without it");
                    None
                }
            };
            timings.summary_ms = Some(started.elapsed().as_millis() as u64);
            summary
        } else {
            None
        };

        // Step 7: Record the turn
        session.history_mut().append(Turn::user(question));
        session.history_mut().append(Turn::assistant(text.clone()));

        if let Some(log) = &self.prompt_log {
            let user = session.user_id().unwrap_or(ANONYMOUS_USER);
            if let Err(e) = log.append(user, &prompt) {
                tracing::warn!(error = %e, "failed to write prompt log");
            }
        }

        tracing::info!(
            chunks = retrieval.len(),
            failed_indices = retrieval.failures.len(),
            total_ms = timings.total_ms(),
            "question answered"
        );

        let answer = Answer {
            question: question.to_string(),
            effective_query,
            rewrite,
            text,
            summary,
            retrieval,
            prompt,
            timings,
        };
        session.set_last_answer(answer.clone());
        Ok(answer)
    }

    pub fn config(&self) -> &RAGConfig {
        &self.config
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }
}
