//! Configuration management for AskKAI
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.askkai/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chat::history::DEFAULT_WINDOW_SIZE;
use crate::chat::session::ChatSettings;
use crate::completion::ModelId;
use crate::errors::{KaiError, Result};
use crate::rag::pipeline::RAGConfig;
use crate::rag::prompt::{Persona, PromptAssembler};
use crate::rag::retrieval::{RetrievalParams, DEFAULT_NUM_CHUNKS};
use crate::search::{ServiceLocation, DEFAULT_COLUMNS};

/// Complete configuration for AskKAI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection to the hosting account, shared by both services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub base_url: String,
    /// Environment variable holding the bearer token
    pub auth_token_env: String,
    pub request_timeout_secs: u64,
}

/// Chunk index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub database: String,
    pub schema: String,
    /// Search services queried per question, in order
    pub services: Vec<String>,
    pub limit: usize,
    pub dedupe: bool,
    /// Categories offered in the selector (besides ALL)
    pub categories: Vec<String>,
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub default_model: String,
    pub summarize: bool,
}

/// Conversation behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub window_size: usize,
    pub use_history: bool,
    pub rewrite_fallback: bool,
    pub numeric_cleanup: bool,
    pub persona: Persona,
    pub custom_preamble: Option<String>,
    pub debug: bool,
}

/// File system paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: String,
    pub users_file: String,
    pub prompt_log_file: String,
    pub history_file: String,
}

/// Log filter used when neither `ASKKAI_LOG` nor `-v` is given
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            base_url: "https://account.snowflakecomputing.com".to_string(),
            auth_token_env: "ASKKAI_TOKEN".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            database: "CC_QUICKSTART_CORTEX_SEARCH_DOCS".to_string(),
            schema: "DATA".to_string(),
            services: vec!["CC_SEARCH_SERVICE_CS".to_string()],
            limit: DEFAULT_NUM_CHUNKS,
            dedupe: true,
            categories: Vec::new(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            default_model: ModelId::default().to_string(),
            summarize: false,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            use_history: true,
            rewrite_fallback: true,
            numeric_cleanup: true,
            persona: Persona::default(),
            custom_preamble: None,
            debug: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: "~/.askkai".to_string(),
            users_file: "users.json".to_string(),
            prompt_log_file: "prompts.jsonl".to_string(),
            history_file: "repl_history".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| KaiError::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| KaiError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Config::default())
    }

    /// ~/.askkai/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".askkai").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.account.base_url.trim().is_empty() {
            return Err(KaiError::Config("account.base_url must not be empty".to_string()));
        }

        if self.account.request_timeout_secs == 0 {
            return Err(KaiError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.search.services.is_empty() {
            return Err(KaiError::Config(
                "search.services must name at least one service".to_string(),
            ));
        }

        if self.search.limit == 0 {
            return Err(KaiError::Config("search.limit must be greater than 0".to_string()));
        }

        if self.chat.window_size == 0 {
            return Err(KaiError::Config(
                "chat.window_size must be greater than 0".to_string(),
            ));
        }

        self.default_model()
            .map_err(|e| KaiError::Config(format!("completion.default_model: {}", e)))?;

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" | "off" => {}
            other => {
                return Err(KaiError::Config(format!("Invalid log level: {}", other)))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| KaiError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| KaiError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| KaiError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get state directory path
    pub fn state_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.state_dir)
    }

    /// Resolve a file name relative to the state directory
    fn state_file(&self, name: &str) -> PathBuf {
        let path = Self::expand_path(name);
        if path.is_absolute() {
            path
        } else {
            self.state_dir().join(path)
        }
    }

    pub fn users_path(&self) -> PathBuf {
        self.state_file(&self.paths.users_file)
    }

    pub fn prompt_log_path(&self) -> PathBuf {
        self.state_file(&self.paths.prompt_log_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_file(&self.paths.history_file)
    }

    /// Bearer token from the configured environment variable
    pub fn auth_token(&self) -> Option<String> {
        std::env::var(&self.account.auth_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.account.request_timeout_secs)
    }

    pub fn default_model(&self) -> Result<ModelId> {
        self.completion.default_model.parse()
    }

    /// Locations of the configured search services
    pub fn service_locations(&self) -> Vec<ServiceLocation> {
        self.search
            .services
            .iter()
            .map(|s| ServiceLocation::new(&self.search.database, &self.search.schema, s))
            .collect()
    }

    /// Initial settings for a new conversation
    pub fn chat_settings(&self) -> Result<ChatSettings> {
        Ok(ChatSettings {
            model: self.default_model()?,
            use_history: self.chat.use_history,
            debug: self.chat.debug,
            summarize: self.completion.summarize,
            ..ChatSettings::default()
        })
    }

    pub fn retrieval_params(&self) -> RetrievalParams {
        RetrievalParams {
            limit: self.search.limit,
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            dedupe: self.search.dedupe,
        }
    }

    pub fn rag_config(&self) -> RAGConfig {
        RAGConfig {
            window_size: self.chat.window_size,
            rewrite_fallback: self.chat.rewrite_fallback,
            numeric_cleanup: self.chat.numeric_cleanup,
        }
    }

    pub fn prompt_assembler(&self) -> PromptAssembler {
        let assembler = PromptAssembler::new(self.chat.persona);
        match &self.chat.custom_preamble {
            Some(preamble) if !preamble.trim().is_empty() => assembler.with_preamble(preamble.clone()),
            _ => assembler,
        }
    }
}
