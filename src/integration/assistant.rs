// Assistant wiring: builds the service clients and the pipeline from config
use std::sync::Arc;

use crate::auth::{AuthService, JsonCredentialStore, JsonlPromptLog, PromptLog};
use crate::chat::session::ConversationSession;
use crate::cli::Config;
use crate::completion::{CompletionService, HttpCompletionClient};
use crate::errors::Result;
use crate::rag::pipeline::{Answer, RAGPipeline};
use crate::rag::retrieval::Retriever;
use crate::search::types::ALL_CATEGORIES;
use crate::search::{HttpSearchClient, SearchService};

/// Starter questions offered before the first turn
pub const SUGGESTED_QUESTIONS: [&str; 5] = [
    "What was WK Kellogg Co's revenue for 2023?",
    "How did WK Kellogg Co compete with General Mills?",
    "What are the top product categories in the cereal industry?",
    "What are the health trends affecting cereal sales?",
    "How is the cereal industry adapting to consumer preferences?",
];

/// Fully wired assistant: pipeline, login and the settings it was built from
pub struct Assistant {
    pipeline: RAGPipeline,
    auth: AuthService,
    config: Config,
}

impl Assistant {
    /// Build HTTP clients, stores and pipeline from configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let token = config.auth_token();
        if token.is_none() {
            tracing::warn!(
                env = %config.account.auth_token_env,
                "no auth token set, requests will be sent unauthenticated"
            );
        }

        let mut indices: Vec<Arc<dyn SearchService>> = Vec::new();
        for location in config.service_locations() {
            let client = HttpSearchClient::with_config(
                &config.account.base_url,
                location,
                token.clone(),
                config.request_timeout(),
            )?;
            indices.push(Arc::new(client));
        }

        let completion: Arc<dyn CompletionService> = Arc::new(HttpCompletionClient::with_config(
            &config.account.base_url,
            token,
            config.request_timeout(),
        )?);

        let auth = AuthService::new(Arc::new(JsonCredentialStore::new(config.users_path())));
        let prompt_log: Arc<dyn PromptLog> = Arc::new(JsonlPromptLog::new(config.prompt_log_path()));

        Ok(Self::with_services(config, indices, completion, auth).with_prompt_log(prompt_log))
    }

    /// Build around caller-supplied services
    pub fn with_services(
        config: Config,
        indices: Vec<Arc<dyn SearchService>>,
        completion: Arc<dyn CompletionService>,
        auth: AuthService,
    ) -> Self {
        let retriever = Retriever::with_params(indices, config.retrieval_params());
        let pipeline = RAGPipeline::with_config(
            retriever,
            completion,
            config.prompt_assembler(),
            config.rag_config(),
        );

        Self {
            pipeline,
            auth,
            config,
        }
    }

    /// Record every completion prompt in the given log
    pub fn with_prompt_log(mut self, log: Arc<dyn PromptLog>) -> Self {
        self.pipeline = self.pipeline.with_prompt_log(log);
        self
    }

    /// Fresh conversation with configured defaults
    pub fn new_session(&self, user_id: Option<&str>) -> Result<ConversationSession> {
        let settings = self.config.chat_settings()?;
        Ok(match user_id {
            Some(user) => ConversationSession::for_user(user, settings),
            None => ConversationSession::new(settings),
        })
    }

    pub async fn answer_question(
        &self,
        session: &mut ConversationSession,
        question: &str,
    ) -> Result<Answer> {
        self.pipeline.answer_question(session, question).await
    }

    /// Categories offered for filtering, with ALL first
    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for category in &self.config.search.categories {
            let trimmed = category.trim();
            if !trimmed.is_empty()
                && !categories.iter().any(|c| c.eq_ignore_ascii_case(trimmed))
            {
                categories.push(trimmed.to_string());
            }
        }
        categories
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn pipeline(&self) -> &RAGPipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;
    use crate::completion::ModelId;
    use crate::errors::KaiError;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl CompletionService for Unreachable {
        async fn complete(&self, _model: ModelId, _prompt: &str) -> Result<String> {
            Err(KaiError::external("completion", "unreachable"))
        }
    }

    fn assistant(config: Config) -> Assistant {
        let auth = AuthService::with_cost(Arc::new(MemoryCredentialStore::new()), 4);
        Assistant::with_services(config, Vec::new(), Arc::new(Unreachable), auth)
    }

    #[test]
    fn test_categories_start_with_all() {
        let mut config = Config::default();
        config.search.categories = vec![
            "Cereal".to_string(),
            " ".to_string(),
            "all".to_string(),
            "Snacks".to_string(),
            "cereal".to_string(),
        ];
        assert_eq!(assistant(config).categories(), vec!["ALL", "Cereal", "Snacks"]);
    }

    #[test]
    fn test_new_session_uses_config_defaults() {
        let mut config = Config::default();
        config.completion.default_model = "reka-flash".to_string();
        config.chat.use_history = false;

        let assistant = assistant(config);
        let session = assistant.new_session(Some("alice")).unwrap();
        assert_eq!(session.user_id(), Some("alice"));
        assert_eq!(session.settings().model, ModelId::RekaFlash);
        assert!(!session.settings().use_history);
    }

    #[test]
    fn test_from_config_builds_one_index_per_service() {
        let mut config = Config::default();
        config.search.services = vec!["A".to_string(), "B".to_string()];
        let assistant = Assistant::from_config(config).unwrap();
        assert_eq!(assistant.pipeline().retriever().index_count(), 2);
    }
}
