//! Sentiment command handler.
//!
//! Shows how the configured provider scores a message.

use clap::Args;
use helpdesk_core::{config::AppConfig, AppResult};
use helpdesk_sentiment::{create_provider, Sentiment, SentimentGate};

/// Score the sentiment of a message
#[derive(Args, Debug)]
pub struct SentimentCommand {
    /// Text to score
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SentimentCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing sentiment command");

        let provider = create_provider(&config.sentiment)?;
        let gate = SentimentGate::from_settings(provider, &config.sentiment)
            .with_timeout(config.provider_timeout());

        let text = self.text.join(" ");
        let classification = gate.classify(&text).await?;

        if self.json {
            let output = serde_json::json!({
                "provider": gate.provider_name(),
                "threshold": gate.threshold(),
                "polarity": classification.polarity,
                "sentiment": classification.sentiment,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            let label = match classification.sentiment {
                Sentiment::Negative => "negative (would escalate)",
                Sentiment::NeutralOrPositive => "neutral or positive",
            };
            println!("Polarity: {:.2}", classification.polarity);
            println!("Sentiment: {}", label);
        }

        Ok(())
    }
}
