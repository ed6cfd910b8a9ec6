//! Command-line argument parsing for AskKAI
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AskKAI - ask questions about indexed industry documents
#[derive(Parser, Debug)]
#[command(name = "kai")]
#[command(version)]
#[command(about = "Retrieval-augmented chat over an indexed document corpus", long_about = None)]
pub struct Args {
    /// Completion model (overrides config)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Restrict retrieval to one category ("ALL" for no filter)
    #[arg(long, global = true)]
    pub category: Option<String>,

    /// Log in as this user before chatting
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Do not use chat history for rewriting or prompting
    #[arg(long, global = true)]
    pub no_history: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only print answers)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand (interactive chat when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Answer a single question and exit
    Ask {
        /// The question to answer
        #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Create a new user account
    Register {
        /// Username for the new account
        username: String,
    },

    /// List the supported completion models
    Models,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run, defaulting to interactive chat
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }
}

impl Commands {
    /// Question text for `ask`, words joined by single spaces
    pub fn question(&self) -> Option<String> {
        match self {
            Commands::Ask { question } => Some(question.join(" ")),
            _ => None,
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show retrieval details after each answer
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }

    /// Log filter implied by the flags, if any
    pub fn log_directive(&self) -> Option<&'static str> {
        match self {
            Verbosity::Quiet => Some("error"),
            Verbosity::Normal => None,
            Verbosity::Verbose => Some("askkai=info"),
            Verbosity::VeryVerbose => Some("askkai=debug"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_to_chat() {
        let args = parse(&["kai"]);
        assert_eq!(args.command(), Commands::Chat);
        assert_eq!(args.verbosity(), Verbosity::Normal);
        assert!(!args.no_history);
    }

    #[test]
    fn test_verbosity_quiet() {
        assert_eq!(parse(&["kai", "-q"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_verbosity_verbose() {
        assert_eq!(parse(&["kai", "-v"]).verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_very_verbose() {
        assert_eq!(parse(&["kai", "-vv"]).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_ask_joins_words() {
        let args = parse(&["kai", "ask", "What", "was", "revenue?", "--model", "llama3-8b"]);
        assert_eq!(args.command().question().as_deref(), Some("What was revenue?"));
        assert_eq!(args.model.as_deref(), Some("llama3-8b"));
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Args::try_parse_from(["kai", "ask"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["kai", "chat", "--category", "Snacks", "--no-history", "-u", "alice"]);
        assert_eq!(args.category.as_deref(), Some("Snacks"));
        assert_eq!(args.user.as_deref(), Some("alice"));
        assert!(args.no_history);
    }

    #[test]
    fn test_register() {
        let args = parse(&["kai", "register", "bob"]);
        assert_eq!(
            args.command(),
            Commands::Register {
                username: "bob".to_string()
            }
        );
        assert_eq!(args.command().question(), None);
    }

    #[test]
    fn test_verbosity_as_str() {
        assert_eq!(Verbosity::Quiet.as_str(), "quiet");
        assert_eq!(Verbosity::Normal.as_str(), "normal");
        assert_eq!(Verbosity::Verbose.as_str(), "verbose");
        assert_eq!(Verbosity::VeryVerbose.as_str(), "very_verbose");
    }

    #[test]
    fn test_verbosity_show_progress() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
        assert!(Verbosity::Verbose.show_progress());
    }

    #[test]
    fn test_verbosity_show_events() {
        assert!(!Verbosity::Normal.show_events());
        assert!(Verbosity::Verbose.show_events());
        assert!(Verbosity::VeryVerbose.show_events());
    }

    #[test]
    fn test_log_directive() {
        assert_eq!(Verbosity::Normal.log_directive(), None);
        assert_eq!(Verbosity::VeryVerbose.log_directive(), Some("askkai=debug"));
    }
}
