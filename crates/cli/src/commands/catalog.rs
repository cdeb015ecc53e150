//! Catalog command handler.
//!
//! Inspects the FAQ catalog and its embedding index.

use clap::{Args, Subcommand};
use helpdesk_core::{config::AppConfig, AppResult};
use helpdesk_knowledge::{FaqCatalog, PhraseKind};

/// FAQ catalog tools
#[derive(Args, Debug)]
pub struct CatalogCommand {
    #[command(subcommand)]
    pub action: CatalogAction,
}

#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// Load the catalog and build its index
    Validate(CatalogValidateCommand),
    /// List catalog entries
    List(CatalogListCommand),
    /// Show the phrases nearest to a query
    Search(CatalogSearchCommand),
}

impl CatalogCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            CatalogAction::Validate(cmd) => cmd.execute(config).await,
            CatalogAction::List(cmd) => cmd.execute(config),
            CatalogAction::Search(cmd) => cmd.execute(config).await,
        }
    }
}

/// Load the catalog and build its index
#[derive(Args, Debug)]
pub struct CatalogValidateCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CatalogValidateCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing catalog validate command");

        let engine = helpdesk_knowledge::open(config).await?;
        let stats = engine.index().stats();
        let path = config.catalog_path();

        if self.json {
            let output = serde_json::json!({
                "catalog": path,
                "embeddingProvider": config.embedding.provider,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Catalog OK: {} entries, {} phrases, {} dimensions ({})",
                stats.entries,
                stats.phrases,
                stats.dimensions,
                path.display()
            );
        }

        Ok(())
    }
}

/// List catalog entries
#[derive(Args, Debug)]
pub struct CatalogListCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CatalogListCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing catalog list command");

        let catalog = FaqCatalog::load(&config.catalog_path())?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(catalog.entries())?);
            return Ok(());
        }

        if catalog.is_empty() {
            println!("Catalog is empty");
            return Ok(());
        }

        for entry in catalog.entries() {
            println!("{}  {}", entry.id, entry.question);
            for variation in &entry.variations {
                println!("    ~ {}", variation);
            }
        }
        println!(
            "\n{} entries, {} phrases",
            catalog.len(),
            catalog.phrase_count()
        );

        Ok(())
    }
}

/// Show the phrases nearest to a query
#[derive(Args, Debug)]
pub struct CatalogSearchCommand {
    /// Query text
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Number of phrases to show
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CatalogSearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing catalog search command");

        let engine = helpdesk_knowledge::open(config).await?;
        let query = self.query.join(" ");
        let matches = engine.search(&query, self.top_k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&matches)?);
            return Ok(());
        }

        let max_distance = engine.max_distance();
        for (rank, m) in matches.iter().enumerate() {
            let kind = match m.kind {
                PhraseKind::Question => "question".to_string(),
                PhraseKind::Variation(i) => format!("variation {}", i + 1),
            };
            let beyond = match max_distance {
                Some(max) if m.distance > max => "  (beyond maxDistance)",
                _ => "",
            };
            println!(
                "{}. [{:.4}] {}  {} ({}){}",
                rank + 1,
                m.distance,
                m.entry.id,
                m.phrase,
                kind,
                beyond
            );
        }

        Ok(())
    }
}
