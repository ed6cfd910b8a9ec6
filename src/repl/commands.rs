//! Command handler for REPL built-in commands
//!
//! Slash commands change the conversation settings or inspect the last
//! answer. Anything else typed at the prompt is a question.

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::chat::session::ConversationSession;
use crate::repl::display::DisplayManager;
use crate::search::CategoryFilter;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Model { name: Option<String> },
    Models,
    Category { name: Option<String> },
    Categories,
    History { enable: bool },
    Debug { enable: bool },
    Summary { enable: bool },
    Suggest,
    Ask { index: usize },
    Context,
    Status,
    Reset,
    Save { path: PathBuf },
    Clear,
    Exit,
    Unknown { input: String },
}

/// What the REPL loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    /// Send this text through the pipeline as if it had been typed
    Ask(String),
    Exit,
}

/// Command handler for parsing and executing REPL commands
pub struct CommandHandler {
    categories: Vec<String>,
    suggestions: Vec<String>,
}

impl CommandHandler {
    /// `categories` should list "ALL" first; an empty list accepts any name
    pub fn new(categories: Vec<String>, suggestions: &[&str]) -> Self {
        CommandHandler {
            categories,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Unknown { input: input.to_string() };
        };

        let mut parts = body.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_lowercase();
        let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

        match name.as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "model" => Command::Model { name: rest.map(str::to_string) },
            "models" => Command::Models,
            "category" | "cat" => Command::Category { name: rest.map(str::to_string) },
            "categories" => Command::Categories,
            "history" => match parse_toggle(rest) {
                Some(enable) => Command::History { enable },
                None => Command::Unknown { input: input.to_string() },
            },
            "debug" => match parse_toggle(rest) {
                Some(enable) => Command::Debug { enable },
                None => Command::Unknown { input: input.to_string() },
            },
            "summary" => match parse_toggle(rest) {
                Some(enable) => Command::Summary { enable },
                None => Command::Unknown { input: input.to_string() },
            },
            "suggest" => Command::Suggest,
            "ask" => match rest.and_then(|s| s.parse::<usize>().ok()) {
                Some(index) => Command::Ask { index },
                None => Command::Unknown { input: input.to_string() },
            },
            "context" | "ctx" => Command::Context,
            "status" => Command::Status,
            "reset" => Command::Reset,
            "save" => match rest {
                Some(path) => Command::Save { path: PathBuf::from(path) },
                None => Command::Unknown { input: input.to_string() },
            },
            "clear" | "cls" => Command::Clear,
            _ => Command::Unknown { input: input.to_string() },
        }
    }

    /// Execute a command against the conversation
    pub fn execute(
        &mut self,
        command: Command,
        session: &mut ConversationSession,
        display: &DisplayManager,
    ) -> Result<CommandOutcome> {
        match command {
            Command::Help => self.show_help(),
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                return Ok(CommandOutcome::Exit);
            }
            Command::Model { name: None } => {
                display.show_info(&format!("Current model: {}", session.settings().model));
            }
            Command::Model { name: Some(name) } => match session.set_model_name(&name) {
                Ok(model) => println!("{}", format!("Model set to {}", model).cyan()),
                Err(e) => display.show_error(&e.to_string()),
            },
            Command::Models => display.show_models(session.settings().model),
            Command::Category { name: None } => {
                display.show_info(&format!(
                    "Current category: {}",
                    session.settings().category_filter
                ));
            }
            Command::Category { name: Some(name) } => match self.resolve_category(&name) {
                Some(filter) => {
                    println!("{}", format!("Category set to {}", filter).cyan());
                    session.set_category_filter(filter);
                }
                None => display.show_error(&format!(
                    "Unknown category '{}'. Use /categories to list them.",
                    name
                )),
            },
            Command::Categories => {
                let current = session.settings().category_filter.to_string();
                display.show_categories(&self.categories, &current);
            }
            Command::History { enable } => {
                session.set_use_history(enable);
                println!("{}", format!("Chat history {}", enabled_str(enable)).cyan());
            }
            Command::Debug { enable } => {
                session.set_debug(enable);
                println!("{}", format!("Debug output {}", enabled_str(enable)).cyan());
            }
            Command::Summary { enable } => {
                session.set_summarize(enable);
                println!("{}", format!("Answer summaries {}", enabled_str(enable)).cyan());
            }
            Command::Suggest => {
                let suggestions: Vec<&str> = self.suggestions.iter().map(String::as_str).collect();
                display.show_suggestions(&suggestions);
            }
            Command::Ask { index } => match self.suggestion(index) {
                Some(question) => return Ok(CommandOutcome::Ask(question.to_string())),
                None => display.show_error(&format!(
                    "No suggested question {}; choose 1-{}",
                    index,
                    self.suggestions.len()
                )),
            },
            Command::Context => match session.last_answer() {
                Some(answer) => display.show_context(answer),
                None => println!("{}", "No answer yet.".yellow()),
            },
            Command::Status => display.show_status(session),
            Command::Reset => {
                session.reset_conversation();
                println!("{}", "Conversation reset. History cleared.".yellow());
            }
            Command::Save { path } => {
                let transcript = serde_json::to_string_pretty(&session.transcript())?;
                std::fs::write(&path, transcript)?;
                println!("{}", format!("Transcript saved to {}", path.display()).green());
            }
            Command::Clear => display.clear_screen()?,
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
            }
        }
        Ok(CommandOutcome::Continue)
    }

    /// Map a typed category onto the offered list
    pub fn resolve_category(&self, name: &str) -> Option<CategoryFilter> {
        let filter = CategoryFilter::parse(name);
        if filter.is_all() || self.categories.len() <= 1 {
            return Some(filter);
        }
        self.categories
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name.trim()))
            .map(|c| CategoryFilter::parse(c))
    }

    /// 1-based lookup into the suggested questions
    pub fn suggestion(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.suggestions.get(i))
            .map(String::as_str)
    }

    /// Display help information
    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = vec![
            ("/help, /h", "Show this help message"),
            ("/model [name]", "Show or change the completion model"),
            ("/models", "List supported models"),
            ("/category [name]", "Show or change the category filter (ALL = none)"),
            ("/categories", "List categories"),
            ("/history on|off", "Use chat history for follow-up questions"),
            ("/summary on|off", "Add a bullet summary to each answer"),
            ("/debug on|off", "Show search query, chunks and prompt"),
            ("/suggest", "Show suggested questions"),
            ("/ask <n>", "Ask suggested question n"),
            ("/context, /ctx", "Show context used for the last answer"),
            ("/status", "Show session settings"),
            ("/reset", "Start a new conversation"),
            ("/save <path>", "Save the conversation as JSON"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Exit"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<20} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Type your question directly (no / prefix)");
        println!("  - Use {} for input history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }
}

/// No argument means on; anything outside the known words is rejected
fn parse_toggle(arg: Option<&str>) -> Option<bool> {
    let Some(arg) = arg else {
        return Some(true);
    };
    match arg.to_lowercase().as_str() {
        "on" | "1" | "true" | "yes" => Some(true),
        "off" | "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn enabled_str(enable: bool) -> &'static str {
    if enable {
        "enabled"
    } else {
        "disabled"
    }
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}
