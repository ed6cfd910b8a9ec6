//! Per-user conversation state
//!
//! Everything the pipeline needs to know about the current conversation
//! lives here and is passed to it explicitly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::history::HistoryBuffer;
use crate::completion::ModelId;
use crate::errors::Result;
use crate::rag::pipeline::Answer;
use crate::search::CategoryFilter;

/// User-selectable settings for a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: ModelId,
    pub use_history: bool,
    pub category_filter: CategoryFilter,
    pub debug: bool,
    /// Ask for a bullet-point summary after every answer
    pub summarize: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            use_history: true,
            category_filter: CategoryFilter::All,
            debug: false,
            summarize: false,
        }
    }
}

/// One user's active conversation
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: Uuid,
    user_id: Option<String>,
    history: HistoryBuffer,
    settings: ChatSettings,
    last_answer: Option<Answer>,
}

impl ConversationSession {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            history: HistoryBuffer::new(),
            settings,
            last_answer: None,
        }
    }

    /// Session owned by a logged-in user
    pub fn for_user(user_id: &str, settings: ChatSettings) -> Self {
        let mut session = Self::new(settings);
        session.user_id = Some(user_id.to_string());
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut HistoryBuffer {
        &mut self.history
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn last_answer(&self) -> Option<&Answer> {
        self.last_answer.as_ref()
    }

    pub(crate) fn set_last_answer(&mut self, answer: Answer) {
        self.last_answer = Some(answer);
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.settings.model = model;
    }

    /// Select a model by its catalog name
    pub fn set_model_name(&mut self, name: &str) -> Result<ModelId> {
        let model: ModelId = name.parse()?;
        self.settings.model = model;
        Ok(model)
    }

    pub fn set_category_filter(&mut self, filter: CategoryFilter) {
        self.settings.category_filter = filter;
    }

    pub fn set_use_history(&mut self, enabled: bool) {
        self.settings.use_history = enabled;
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.settings.debug = enabled;
    }

    pub fn set_summarize(&mut self, enabled: bool) {
        self.settings.summarize = enabled;
    }

    /// Start over: forget all turns and the last answer, keep settings
    pub fn reset_conversation(&mut self) {
        self.history.clear();
        self.last_answer = None;
    }

    /// Serializable snapshot for `/save`
    pub fn transcript(&self) -> Transcript {
        Transcript {
            session_id: self.id.to_string(),
            user_id: self.user_id.clone(),
            model: self.settings.model,
            category: self.settings.category_filter.to_string(),
            history: self.history.clone(),
        }
    }
}

/// Saved form of a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub session_id: String,
    pub user_id: Option<String>,
    pub model: ModelId,
    pub category: String,
    pub history: HistoryBuffer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::history::Turn;

    #[test]
    fn test_defaults() {
        let session = ConversationSession::new(ChatSettings::default());
        assert!(session.user_id().is_none());
        assert!(session.settings().use_history);
        assert!(session.settings().category_filter.is_all());
        assert_eq!(session.settings().model, ModelId::Mixtral8x7b);
        assert!(session.history().is_fresh());
    }

    #[test]
    fn test_setters() {
        let mut session = ConversationSession::for_user("alice", ChatSettings::default());
        session.set_model(ModelId::Llama3_70b);
        session.set_category_filter(CategoryFilter::parse("Snacks"));
        session.set_use_history(false);
        session.set_debug(true);

        assert_eq!(session.user_id(), Some("alice"));
        assert_eq!(session.settings().model, ModelId::Llama3_70b);
        assert_eq!(
            session.settings().category_filter,
            CategoryFilter::Equals("Snacks".to_string())
        );
        assert!(!session.settings().use_history);
        assert!(session.settings().debug);
    }

    #[test]
    fn test_set_model_name_validates() {
        let mut session = ConversationSession::new(ChatSettings::default());
        assert_eq!(session.set_model_name("gemma-7b").unwrap(), ModelId::Gemma7b);
        assert!(session.set_model_name("unknown").is_err());
        assert_eq!(session.settings().model, ModelId::Gemma7b);
    }

    #[test]
    fn test_reset_keeps_settings() {
        let mut session = ConversationSession::new(ChatSettings::default());
        session.set_model(ModelId::RekaFlash);
        session.history_mut().append(Turn::user("hello"));
        session.reset_conversation();

        assert!(session.history().is_empty());
        assert!(session.history().is_fresh());
        assert_eq!(session.settings().model, ModelId::RekaFlash);
    }

    #[test]
    fn test_transcript_serializes() {
        let mut session = ConversationSession::for_user("bob", ChatSettings::default());
        session.history_mut().append(Turn::user("What was revenue in 2023?"));
        let json = serde_json::to_string(&session.transcript()).unwrap();
        assert!(json.contains("What was revenue in 2023?"));
        assert!(json.contains("\"model\":\"mixtral-8x7b\""));
    }
}
