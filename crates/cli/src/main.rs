//! Helpdesk CLI
//!
//! Main entry point for the helpdesk command-line tool.
//! Answers customer questions from a local FAQ catalog and escalates
//! unhappy customers to a human agent.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, CatalogCommand, ChatCommand, SentimentCommand};
use helpdesk_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Helpdesk - FAQ support bot with sentiment-based escalation
#[derive(Parser, Debug)]
#[command(name = "helpdesk")]
#[command(about = "FAQ support bot with sentiment-based escalation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "HELPDESK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "HELPDESK_CONFIG")]
    config: Option<PathBuf>,

    /// FAQ catalog file or directory
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Embedding provider (trigram, ollama)
    #[arg(long, global = true)]
    embedding_provider: Option<String>,

    /// Sentiment provider (lexicon, ollama)
    #[arg(long, global = true)]
    sentiment_provider: Option<String>,

    /// Treat matches farther than this squared distance as no match
    #[arg(long, global = true)]
    max_distance: Option<f32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive support session
    Chat(ChatCommand),

    /// Answer a single question
    Ask(AskCommand),

    /// FAQ catalog tools
    Catalog(CatalogCommand),

    /// Score the sentiment of a message
    Sentiment(SentimentCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file and environment
    let config = AppConfig::load_with(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.catalog,
        cli.embedding_provider,
        cli.sentiment_provider,
        cli.max_distance,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Helpdesk CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Catalog: {:?}", config.catalog_path());
    tracing::debug!(
        "Providers: embedding={}, sentiment={}",
        config.embedding.provider,
        config.sentiment.provider
    );

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Catalog(_) => "catalog",
        Commands::Sentiment(_) => "sentiment",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Catalog(cmd) => cmd.execute(&config).await,
        Commands::Sentiment(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_globals() {
        let cli = Cli::try_parse_from([
            "helpdesk",
            "ask",
            "when",
            "are",
            "you",
            "open",
            "--user",
            "Ada",
            "--max-distance",
            "0.8",
        ])
        .unwrap();

        assert_eq!(cli.max_distance, Some(0.8));
        match cli.command {
            Commands::Ask(cmd) => {
                assert_eq!(cmd.query.join(" "), "when are you open");
                assert_eq!(cmd.user, "Ada");
                assert!(!cmd.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_chat_defaults() {
        let cli = Cli::try_parse_from(["helpdesk", "chat"]).unwrap();
        match cli.command {
            Commands::Chat(cmd) => {
                assert_eq!(cmd.typing_delay_ms, 30);
                assert!(!cmd.no_typing);
                assert!(cmd.user.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_catalog_search() {
        let cli =
            Cli::try_parse_from(["helpdesk", "catalog", "search", "reset", "password", "-k", "3"])
                .unwrap();
        match cli.command {
            Commands::Catalog(CatalogCommand {
                action: commands::catalog::CatalogAction::Search(cmd),
            }) => {
                assert_eq!(cmd.top_k, 3);
                assert_eq!(cmd.query, vec!["reset", "password"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
