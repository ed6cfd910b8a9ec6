// Prompt assembly for RAG-augmented completion requests
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::history::{format_turns, Turn};
use crate::errors::KaiError;
use crate::rag::retrieval::RetrievalResult;

const ANALYST_PREAMBLE: &str = "You are an expert financial analyst covering the cereal industry. \
Analyze the financial statements (10-Q, 10-K) of WK Kellogg Co and General Mills from 2019 to 2023. \
The aspects you may be asked about are:
1. Revenue trends (provide a table)
2. Net income
3. Cash flow analysis
4. Areas of investment made by the company (provide a table)
5. Efficiency and cost control strategies
6. Profit margins: gross, operating and net (display in a table)
7. Key risk factors
Address only the aspects the question asks about, not all of them at once. \
When the context lacks specific figures, rely on general industry knowledge and typical practice \
instead of saying the context is missing.";

const GROUNDED_PREAMBLE: &str = "You are an assistant that answers questions using only the \
information inside the <context> section. Use the <chat_history> section to resolve references \
in the question. If the context does not contain the answer, say that you don't know. \
Be concise and do not hallucinate.";

/// Role instructions placed at the top of every prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Financial analyst for the cereal-industry filings
    #[default]
    Analyst,
    /// Generic "answer only from context" assistant
    Grounded,
}

impl Persona {
    pub fn preamble(&self) -> &'static str {
        match self {
            Persona::Analyst => ANALYST_PREAMBLE,
            Persona::Grounded => GROUNDED_PREAMBLE,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Persona::Analyst => f.write_str("analyst"),
            Persona::Grounded => f.write_str("grounded"),
        }
    }
}

impl FromStr for Persona {
    type Err = KaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "analyst" => Ok(Persona::Analyst),
            "grounded" => Ok(Persona::Grounded),
            other => Err(KaiError::Validation(format!(
                "unknown persona '{}' (expected analyst or grounded)",
                other
            ))),
        }
    }
}

/// Escape text so it cannot open or close a prompt section
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// The sections of one completion request, before flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub instructions: String,
    pub context: String,
    pub history: String,
    pub question: String,
}

impl PromptRequest {
    /// Flatten into the single text blob sent to the model
    pub fn render(&self) -> String {
        format!(
            "{}\n\n<context>\n{}</context>\n<chat_history>\n{}</chat_history>\n<question>\n{}\n</question>\nAnswer:",
            self.instructions, self.context, self.history, self.question
        )
    }
}

/// Deterministic template combining persona, context, history and question
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    persona: Persona,
    custom_preamble: Option<String>,
}

impl PromptAssembler {
    pub fn new(persona: Persona) -> Self {
        Self {
            persona,
            custom_preamble: None,
        }
    }

    /// Use a custom preamble instead of the persona's
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.custom_preamble = Some(preamble.into());
        self
    }

    pub fn instructions(&self) -> &str {
        self.custom_preamble
            .as_deref()
            .unwrap_or_else(|| self.persona.preamble())
    }

    /// Assemble the request sections. Interpolated text is escaped; an
    /// empty retrieval result gives an empty context section.
    pub fn assemble(
        &self,
        retrieval: &RetrievalResult,
        history: &[Turn],
        question: &str,
    ) -> PromptRequest {
        let context: String = retrieval
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                format!(
                    "[{}] source: {} | category: {}\n{}\n",
                    i + 1,
                    escape(&chunk.source_path),
                    escape(&chunk.category),
                    escape(&chunk.text)
                )
            })
            .collect();

        let history = if history.is_empty() {
            String::new()
        } else {
            format!("{}\n", escape(&format_turns(history)))
        };

        PromptRequest {
            instructions: self.instructions().to_string(),
            context,
            history,
            question: escape(question),
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(Persona::default())
    }
}
