//! REPL (Read-Eval-Print Loop) module for interactive chat
//!
//! Provides the interactive session: line editing, slash commands and
//! per-question display around the assistant pipeline.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;

use crate::chat::session::ConversationSession;
use crate::integration::{Assistant, SUGGESTED_QUESTIONS};
use crate::repl::commands::{is_command, Command, CommandHandler, CommandOutcome};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::InputHandler;

/// REPL session coordinator
///
/// Owns the conversation for the lifetime of the loop; the assistant is
/// borrowed per question.
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    display_manager: DisplayManager,
    conversation: ConversationSession,
    show_details: bool,
}

impl ReplSession {
    pub fn new(conversation: ConversationSession, categories: Vec<String>) -> Result<Self> {
        Self::build(InputHandler::new()?, conversation, categories)
    }

    /// Create REPL session with persistent input history
    pub fn with_history(
        history_path: PathBuf,
        conversation: ConversationSession,
        categories: Vec<String>,
    ) -> Result<Self> {
        Self::build(InputHandler::with_history(history_path)?, conversation, categories)
    }

    fn build(
        input_handler: InputHandler,
        conversation: ConversationSession,
        categories: Vec<String>,
    ) -> Result<Self> {
        Ok(ReplSession {
            input_handler,
            command_handler: CommandHandler::new(categories, &SUGGESTED_QUESTIONS),
            display_manager: DisplayManager::new(),
            conversation,
            show_details: false,
        })
    }

    /// Show timings after each answer
    pub fn set_show_details(&mut self, enable: bool) {
        self.show_details = enable;
    }

    /// Show banner and, for a fresh conversation, the starter questions
    pub fn show_welcome(&self, version: &str) {
        self.display_manager.show_banner(
            version,
            self.conversation.settings().model,
            self.conversation.user_id(),
        );
        if self.conversation.history().is_fresh() {
            self.display_manager.show_welcome(&SUGGESTED_QUESTIONS);
        }
    }

    pub fn read_input(&mut self) -> Result<Option<String>> {
        self.input_handler.read_line()
    }

    /// Handle one line of input without calling any service.
    ///
    /// Plain text comes back as `CommandOutcome::Ask`.
    pub fn handle_input(&mut self, input: &str) -> Result<CommandOutcome> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(CommandOutcome::Continue);
        }

        if !is_command(trimmed) {
            return Ok(CommandOutcome::Ask(trimmed.to_string()));
        }

        let command = self.command_handler.parse(trimmed);
        let reset = command == Command::Reset;
        let outcome =
            self.command_handler
                .execute(command, &mut self.conversation, &self.display_manager)?;
        if reset {
            self.display_manager.show_welcome(&SUGGESTED_QUESTIONS);
        }
        Ok(outcome)
    }

    /// Send a question through the assistant and display the outcome.
    ///
    /// Errors are shown to the user; the conversation stays usable.
    pub async fn ask(&mut self, assistant: &Assistant, question: &str) -> bool {
        self.display_manager.start_thinking("Searching documents and drafting an answer...");

        match assistant.answer_question(&mut self.conversation, question).await {
            Ok(answer) => {
                if self.conversation.settings().debug {
                    self.display_manager.finish_current();
                    self.display_manager.show_context(&answer);
                    self.display_manager.show_prompt_text(&answer.prompt);
                }
                self.display_manager.show_answer(&answer, self.show_details);
                true
            }
            Err(e) => {
                self.display_manager.finish_current();
                tracing::error!(error = %e, "question failed");
                self.display_manager.show_error(&e.to_string());
                false
            }
        }
    }

    /// Main loop: read, dispatch, answer, until /exit or Ctrl-D
    pub async fn run(&mut self, assistant: &Assistant) -> Result<()> {
        loop {
            let input = match self.read_input() {
                Ok(Some(input)) => input,
                Ok(None) => break,
                Err(e) if e.to_string() == "Interrupted" => {
                    self.display_manager.show_info("Press Ctrl-D or type /exit to quit");
                    continue;
                }
                Err(e) => return Err(e),
            };

            match self.handle_input(&input) {
                Ok(CommandOutcome::Continue) => {}
                Ok(CommandOutcome::Exit) => break,
                Ok(CommandOutcome::Ask(question)) => {
                    self.ask(assistant, &question).await;
                }
                Err(e) => self.display_manager.show_error(&e.to_string()),
            }
        }

        self.save()
    }

    pub fn conversation(&self) -> &ConversationSession {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut ConversationSession {
        &mut self.conversation
    }

    pub fn display(&self) -> &DisplayManager {
        &self.display_manager
    }

    /// Persist input history
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }
}
