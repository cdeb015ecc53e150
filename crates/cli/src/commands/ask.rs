//! Ask command handler.
//!
//! One-shot answer for a single query.

use clap::Args;
use helpdesk_assistant::Assistant;
use helpdesk_core::{config::AppConfig, AppResult};

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Name to address the reply to
    #[arg(short, long, default_value = "Guest")]
    pub user: String,

    /// Output as JSON, including outcome and match diagnostics
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let assistant = Assistant::from_config(config).await?;

        let query = self.query.join(" ");
        let reply = assistant.respond(&query, &self.user).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&reply)?);
        } else {
            println!("{}", reply.text);
            tracing::debug!("Outcome: {:?}", reply.outcome);
        }

        Ok(())
    }
}
