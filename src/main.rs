//! AskKAI - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

use askkai::auth::{AuthService, JsonCredentialStore};
use askkai::chat::ConversationSession;
use askkai::cli::{Args, Commands, Config, Verbosity};
use askkai::completion::ModelId;
use askkai::integration::Assistant;
use askkai::logging;
use askkai::repl::input::read_password;
use askkai::repl::{DisplayManager, ReplSession};
use askkai::search::CategoryFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    logging::init_tracing(args.verbosity(), &config.logging.level);

    match args.command() {
        Commands::Chat => run_chat(&args, config).await,
        Commands::Ask { .. } => {
            let question = args.command().question().unwrap_or_default();
            run_ask(&args, config, &question).await
        }
        Commands::Register { username } => register(&config, &username),
        Commands::Models => {
            list_models(&args, &config);
            Ok(())
        }
        Commands::Config => show_config(&args, &config),
    }
}

/// Interactive chat loop
async fn run_chat(args: &Args, config: Config) -> Result<()> {
    let history_path = config.history_path();
    let assistant = Assistant::from_config(config)?;
    let mut conversation = open_session(args, &assistant)?;
    apply_overrides(args, &mut conversation)?;

    let mut repl = ReplSession::with_history(history_path, conversation, assistant.categories())?;
    repl.set_show_details(args.verbosity().show_events());
    repl.show_welcome(VERSION);
    repl.run(&assistant).await
}

/// Answer one question and print it
async fn run_ask(args: &Args, config: Config, question: &str) -> Result<()> {
    let assistant = Assistant::from_config(config)?;
    let mut conversation = open_session(args, &assistant)?;
    apply_overrides(args, &mut conversation)?;

    let verbosity = args.verbosity();
    let mut display = DisplayManager::new();
    if verbosity.show_progress() {
        display.start_thinking("Searching documents and drafting an answer...");
    }

    let answer = assistant.answer_question(&mut conversation, question).await;
    display.finish_current();
    let answer = answer?;

    if verbosity == Verbosity::Quiet {
        for message in answer.retrieval.failure_messages() {
            eprintln!("{} {}", "Warning:".yellow().bold(), message);
        }
        println!("{}", answer.text);
        return Ok(());
    }

    if conversation.settings().debug {
        display.show_context(&answer);
        display.show_prompt_text(&answer.prompt);
    }
    display.show_answer(&answer, verbosity.show_events());
    Ok(())
}

/// Log in when `--user` is given, otherwise start a guest session
fn open_session(args: &Args, assistant: &Assistant) -> Result<ConversationSession> {
    match &args.user {
        Some(user) => {
            let password = read_password(&format!("Password for {}: ", user))?;
            let user_id = assistant.auth().login(user, &password)?;
            println!("{}", format!("Logged in as {}", user_id).green());
            Ok(assistant.new_session(Some(&user_id))?)
        }
        None => Ok(assistant.new_session(None)?),
    }
}

fn apply_overrides(args: &Args, conversation: &mut ConversationSession) -> Result<()> {
    if let Some(model) = &args.model {
        conversation.set_model_name(model)?;
    }
    if let Some(category) = &args.category {
        conversation.set_category_filter(CategoryFilter::parse(category));
    }
    if args.no_history {
        conversation.set_use_history(false);
    }
    Ok(())
}

fn register(config: &Config, username: &str) -> Result<()> {
    let password = read_password("Password: ")?;
    let confirm = read_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let auth = AuthService::new(Arc::new(JsonCredentialStore::new(config.users_path())));
    let user_id = auth.register(username, &password)?;
    println!("{}", format!("Registered user {}", user_id).green());
    Ok(())
}

fn list_models(args: &Args, config: &Config) {
    let default = args
        .model
        .as_deref()
        .and_then(|m| m.parse::<ModelId>().ok())
        .or_else(|| config.default_model().ok())
        .unwrap_or_default();

    println!("\n{}", "Available Models:".bold().cyan());
    println!("{}", "=".repeat(40).cyan());
    for model in ModelId::ALL {
        if model == default {
            println!("  {} {}", model.as_str().green().bold(), "(default)".dimmed());
        } else {
            println!("  {}", model.as_str());
        }
    }
    println!();
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = match &args.config {
        Some(path) => path.display().to_string(),
        None => match Config::default_path() {
            Some(path) if path.exists() => path.display().to_string(),
            _ => "built-in defaults".to_string(),
        },
    };

    println!("\n{} {}", "Configuration:".bold().cyan(), source.dimmed());
    println!("{}", "=".repeat(60).cyan());
    println!("{}", toml::to_string_pretty(config)?);

    let token = if config.auth_token().is_some() {
        "set".green()
    } else {
        "not set".red()
    };
    println!("  Auth token (${}): {}", config.account.auth_token_env, token);
    println!("  Users file:  {}", config.users_path().display());
    println!("  Prompt log:  {}", config.prompt_log_path().display());
    println!();
    Ok(())
}
