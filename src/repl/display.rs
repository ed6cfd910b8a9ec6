//! Display manager for REPL terminal UI
//!
//! Manages the waiting spinner, formatted answers and color-coded output.

use colored::*;
use crossterm::{
    cursor,
    execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

use crate::chat::session::ConversationSession;
use crate::completion::ModelId;
use crate::rag::pipeline::Answer;
use crate::rag::retrieval::RetrievalResult;
use crate::rag::rewriter::RewriteOutcome;

/// Display manager for REPL UI
pub struct DisplayManager {
    current_bar: Option<ProgressBar>,
    update_interval: Duration,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager {
            current_bar: None,
            update_interval: Duration::from_millis(100),
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: ModelId, user: Option<&str>) {
        let width = 64;
        let top = format!("{}", "=".repeat(width).cyan());
        let title = format!("  AskKAI {} - Cereal Industry Analysis", version);
        let info = format!("  Model: {} | User: {}", model, user.unwrap_or("guest"));

        println!("\n{}", top);
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", top);
        println!(
            "Ask a question (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Greeting shown while the conversation is fresh
    pub fn show_welcome(&self, suggestions: &[&str]) {
        println!("{}", "Hi! I am Kai, your Cereal Industry Analysis Tool".bold());
        println!("Please select a question or type your own to begin.\n");
        self.show_suggestions(suggestions);
    }

    pub fn show_suggestions(&self, suggestions: &[&str]) {
        for (i, question) in suggestions.iter().enumerate() {
            self.show_numbered(i + 1, question);
        }
        println!("\n  Use {} to ask one of these.\n", "/ask <n>".green());
    }

    /// Spinner shown while waiting on the services
    pub fn start_thinking(&mut self, message: &str) -> ProgressBar {
        self.finish_current();

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(self.update_interval);

        self.current_bar = Some(pb.clone());
        pb
    }

    /// Finish current spinner
    pub fn finish_current(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Display an answer, any failed indices, its summary and its sources
    pub fn show_answer(&mut self, answer: &Answer, details: bool) {
        self.finish_current();

        println!("\n{}\n", answer.text);

        if let Some(summary) = &answer.summary {
            self.show_section("Summary");
            println!("{}\n", summary);
        }

        for message in answer.retrieval.failure_messages() {
            self.show_warning(&message);
        }

        let sources = answer.retrieval.sources();
        if !sources.is_empty() {
            println!("{} {}", "Sources:".dimmed(), sources.join(", ").dimmed());
        }

        if details {
            let timings = &answer.timings;
            println!(
                "{}",
                format!(
                    "rewrite {}ms | retrieval {}ms | completion {}ms | total {}ms",
                    timings.rewrite_ms,
                    timings.retrieval_ms,
                    timings.completion_ms,
                    timings.total_ms()
                )
                .dimmed()
            );
        }
        println!();
    }

    /// Effective query and the retrieved context for a turn
    pub fn show_context(&self, answer: &Answer) {
        self.show_section("Search Query");
        let origin = match answer.rewrite {
            RewriteOutcome::Bypassed => "question used as-is",
            RewriteOutcome::Rewritten => "rewritten from history",
            RewriteOutcome::FellBack => "rewrite failed, question used as-is",
        };
        println!("  {} {}", answer.effective_query, format!("({})", origin).dimmed());

        self.show_retrieval(&answer.retrieval);
    }

    pub fn show_retrieval(&self, retrieval: &RetrievalResult) {
        self.show_section(&format!("Retrieved Chunks ({})", retrieval.len()));
        if retrieval.is_empty() {
            println!("{}", "  No context was retrieved.".yellow());
        }
        for (i, chunk) in retrieval.chunks.iter().enumerate() {
            println!(
                "  {}. {} {}",
                (i + 1).to_string().cyan(),
                chunk.source_path.green(),
                format!("[{}]", chunk.category).dimmed()
            );
            println!("     {}", chunk.text);
        }
        println!();
    }

    /// Full prompt, for /debug on
    pub fn show_prompt_text(&self, prompt: &str) {
        self.show_section("Prompt");
        println!("{}\n", prompt.dimmed());
    }

    pub fn show_models(&self, current: ModelId) {
        self.show_section("Models");
        for model in ModelId::ALL {
            if model == current {
                println!("  {} {}", "*".green(), model.as_str().green().bold());
            } else {
                println!("    {}", model.as_str());
            }
        }
        println!();
    }

    pub fn show_categories(&self, categories: &[String], current: &str) {
        self.show_section("Categories");
        for category in categories {
            if category.eq_ignore_ascii_case(current) {
                println!("  {} {}", "*".green(), category.green().bold());
            } else {
                println!("    {}", category);
            }
        }
        println!();
    }

    pub fn show_status(&self, session: &ConversationSession) {
        let settings = session.settings();
        let on_off = |flag: bool| if flag { "On".green() } else { "Off".red() };

        self.show_section("Session Status");
        println!("  Session:      {}", session.id().to_string().dimmed());
        println!("  User:         {}", session.user_id().unwrap_or("guest").green());
        println!("  Model:        {}", settings.model.as_str().green());
        println!("  Category:     {}", settings.category_filter.to_string().green());
        println!("  History:      {}", on_off(settings.use_history));
        println!("  Turns:        {}", session.history().len().to_string().green());
        println!("  Summary:      {}", on_off(settings.summarize));
        println!("  Debug:        {}", on_off(settings.debug));
        println!();
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Display info message
    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    /// Clear screen
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    /// Show section header
    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(60).cyan());
    }

    /// Show numbered item
    pub fn show_numbered(&self, index: usize, text: &str) {
        println!("  {}. {}", index.to_string().cyan(), text);
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_manager_creation() {
        let manager = DisplayManager::new();
        assert!(manager.current_bar.is_none());
    }

    #[test]
    fn test_start_thinking() {
        let mut manager = DisplayManager::new();
        let pb = manager.start_thinking("Searching");
        assert!(manager.current_bar.is_some());
        pb.finish_and_clear();
    }

    #[test]
    fn test_finish_current() {
        let mut manager = DisplayManager::new();
        let _pb = manager.start_thinking("Searching");
        manager.finish_current();
        assert!(manager.current_bar.is_none());
    }

    #[test]
    fn test_start_thinking_replaces_previous() {
        let mut manager = DisplayManager::new();
        let first = manager.start_thinking("one");
        let _second = manager.start_thinking("two");
        assert!(first.is_finished());
        manager.finish_current();
    }
}
