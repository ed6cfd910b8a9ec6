// History-aware query rewriting
use std::sync::Arc;

use crate::chat::history::{format_turns, Turn};
use crate::completion::{CompletionService, ModelId};
use crate::errors::Result;
use crate::rag::prompt::escape;

/// Instruction sent ahead of the history and question
const REWRITE_INSTRUCTION: &str = "Based on the chat history and the question below, write one \
standalone search query that extends the question with whatever the chat history implies. \
Write the query in natural language. Reply with the query only, no explanation.";

/// How the effective retrieval query was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// No history; the question was used as-is
    Bypassed,
    /// The model produced a new query
    Rewritten,
    /// The rewrite call failed or returned nothing; the question was used
    FellBack,
}

/// Condenses recent history and a new question into one retrieval query
pub struct QueryRewriter {
    completion: Arc<dyn CompletionService>,
    fallback_on_error: bool,
}

impl QueryRewriter {
    pub fn new(completion: Arc<dyn CompletionService>, fallback_on_error: bool) -> Self {
        Self {
            completion,
            fallback_on_error,
        }
    }

    /// Build the rewrite prompt for a non-empty history
    pub fn build_prompt(history: &[Turn], question: &str) -> String {
        format!(
            "{}\n<chat_history>\n{}\n</chat_history>\n<question>\n{}\n</question>",
            REWRITE_INSTRUCTION,
            escape(&format_turns(history)),
            escape(question)
        )
    }

    /// Effective query for retrieval. Empty history returns the question
    /// unchanged without calling the model.
    pub async fn rewrite(
        &self,
        model: ModelId,
        history: &[Turn],
        question: &str,
    ) -> Result<(String, RewriteOutcome)> {
        if history.is_empty() {
            return Ok((question.to_string(), RewriteOutcome::Bypassed));
        }

        let prompt = Self::build_prompt(history, question);
        match self.completion.complete(model, &prompt).await {
            Ok(text) => {
                let query = text.trim();
                if query.is_empty() {
                    tracing::warn!("query rewrite returned empty text, using raw question");
                    Ok((question.to_string(), RewriteOutcome::FellBack))
                } else {
                    tracing::debug!(query, "query rewritten");
                    Ok((query.to_string(), RewriteOutcome::Rewritten))
                }
            }
            Err(e) if self.fallback_on_error => {
                tracing::warn!(error = %e, "query rewrite failed, using raw question");
                Ok((question.to_string(), RewriteOutcome::FellBack))
            }
            Err(e) => Err(e),
        }
    }

    pub fn falls_back_on_error(&self) -> bool {
        self.fallback_on_error
    }
}
