//! Chat command handler.
//!
//! Interactive support session on the terminal.

use clap::Args;
use helpdesk_assistant::{Assistant, ConversationLog, Speaker};
use helpdesk_core::{config::AppConfig, AppResult};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Typed to end the session.
const EXIT_COMMAND: &str = "exit";

/// Start an interactive support session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Your name (asked interactively when omitted)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Print replies at once instead of character by character
    #[arg(long)]
    pub no_typing: bool,

    /// Delay between characters of the typing effect
    #[arg(long, default_value = "30")]
    pub typing_delay_ms: u64,

    /// Write the session transcript (JSON Lines) to this file on exit
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let assistant = Assistant::from_config(config).await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = std::io::stdout();

        println!("Customer Support Chatbot - Type '{}' to stop\n", EXIT_COMMAND);

        let user_id = match &self.user {
            Some(user) => user.trim().to_string(),
            None => {
                print!("Before we begin, may I have your name? ");
                stdout.flush()?;
                lines.next_line().await?.unwrap_or_default().trim().to_string()
            }
        };
        let user_id = helpdesk_assistant::policy::resolve_user(&user_id).to_string();

        let mut log = ConversationLog::new(&user_id);
        tracing::debug!("Started session {}", log.session_id());

        let greeting = assistant.greeting(&user_id)?;
        println!("{}", greeting);
        log.record(Speaker::Bot, greeting);

        loop {
            print!("{}: ", user_id);
            stdout.flush()?;

            // End of input ends the session like `exit`.
            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            let query = line.trim();

            if is_exit(query) {
                log.record(Speaker::User, query);
                break;
            }

            if query.is_empty() {
                continue;
            }

            let reply = assistant.respond(query, &user_id).await;
            tracing::debug!("Outcome: {:?}", reply.outcome);

            self.say(&mut stdout, &reply.text).await?;
            log.record_exchange(query, reply.text);
        }

        let goodbye = assistant.goodbye(&user_id)?;
        self.say(&mut stdout, &goodbye).await?;
        log.record(Speaker::Bot, goodbye);

        if let Some(path) = &self.transcript {
            log.save(path)?;
            tracing::info!("Transcript written to {}", path.display());
        }

        Ok(())
    }

    async fn say<W: Write>(&self, out: &mut W, text: &str) -> AppResult<()> {
        let delay = (!self.no_typing && self.typing_delay_ms > 0)
            .then(|| Duration::from_millis(self.typing_delay_ms));

        type_out(out, &format!("Bot: {}", text), delay).await
    }
}

fn is_exit(query: &str) -> bool {
    query.eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Write `text` followed by a blank line, one character at a time when a
/// delay is given.
async fn type_out<W: Write>(out: &mut W, text: &str, delay: Option<Duration>) -> AppResult<()> {
    match delay {
        Some(delay) => {
            let mut buf = [0u8; 4];
            for c in text.chars() {
                out.write_all(c.encode_utf8(&mut buf).as_bytes())?;
                out.flush()?;
                tokio::time::sleep(delay).await;
            }
        }
        None => out.write_all(text.as_bytes())?,
    }

    out.write_all(b"\n\n")?;
    out.flush()?;
    Ok(())
}
