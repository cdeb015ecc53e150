//! Per-session conversation transcript.
//!
//! The policy never writes here; callers record each exchange themselves.

use chrono::{DateTime, Utc};
use helpdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Who said something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One message in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Append-only log of one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationLog {
    session_id: Uuid,
    user_id: String,
    started_at: DateTime<Utc>,
    turns: Vec<ConversationTurn>,
}

/// Transcript line written to JSON Lines exports.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptLine<'a> {
    session_id: &'a Uuid,
    user_id: &'a str,
    #[serde(flatten)]
    turn: &'a ConversationTurn,
}

impl ConversationLog {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id: user_id.into(),
            started_at: Utc::now(),
            turns: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Append a turn stamped with the current time.
    pub fn record(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push(ConversationTurn {
            speaker,
            text: text.into(),
            at: Utc::now(),
        });
    }

    /// Record a user query and the bot's reply.
    pub fn record_exchange(&mut self, query: impl Into<String>, reply: impl Into<String>) {
        self.record(Speaker::User, query);
        self.record(Speaker::Bot, reply);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// One JSON object per turn, newline-terminated.
    pub fn to_jsonl(&self) -> AppResult<String> {
        let mut out = String::new();
        for turn in &self.turns {
            let line = TranscriptLine {
                session_id: &self.session_id,
                user_id: &self.user_id,
                turn,
            };
            out.push_str(&serde_json::to_string(&line)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the transcript as JSON Lines, creating parent directories.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_jsonl()?)?;

        tracing::info!(
            "Saved {} turns of session {} to {}",
            self.turns.len(),
            self.session_id,
            path.display()
        );

        Ok(())
    }
}

/// A conversation log shared between tasks of one session.
///
/// Appends are serialized by a mutex, so the log keeps a single writer at
/// a time.
#[derive(Debug, Clone)]
pub struct SharedConversationLog {
    inner: Arc<Mutex<ConversationLog>>,
}

impl SharedConversationLog {
    pub fn new(log: ConversationLog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(log)),
        }
    }

    pub fn record(&self, speaker: Speaker, text: impl Into<String>) -> AppResult<()> {
        self.with_log(|log| log.record(speaker, text))
    }

    pub fn record_exchange(&self, query: impl Into<String>, reply: impl Into<String>) -> AppResult<()> {
        self.with_log(|log| log.record_exchange(query, reply))
    }

    /// Copy of the log as it is now.
    pub fn snapshot(&self) -> AppResult<ConversationLog> {
        self.with_log(|log| log.clone())
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        self.snapshot()?.save(path)
    }

    fn with_log<T>(&self, f: impl FnOnce(&mut ConversationLog) -> T) -> AppResult<T> {
        let mut log = self
            .inner
            .lock()
            .map_err(|_| AppError::Other("Conversation log lock poisoned".to_string()))?;
        Ok(f(&mut log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_preserves_order() {
        let mut log = ConversationLog::new("Ada");
        log.record(Speaker::Bot, "Hello Ada! How can I assist you today?");
        log.record_exchange("hours?", "Ada, 9am-5pm");

        let speakers: Vec<_> = log.iter().map(|t| t.speaker).collect();
        assert_eq!(speakers, vec![Speaker::Bot, Speaker::User, Speaker::Bot]);
        assert_eq!(log.turns()[1].text, "hours?");
        assert!(log.turns().windows(2).all(|w| w[0].at <= w[1].at));
        assert_eq!(log.user_id(), "Ada");
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(
            ConversationLog::new("a").session_id(),
            ConversationLog::new("a").session_id()
        );
    }

    #[test]
    fn test_jsonl_export() {
        let mut log = ConversationLog::new("Ada");
        log.record_exchange("hours?", "Ada, 9am-5pm");

        let jsonl = log.to_jsonl().unwrap();
        let lines: Vec<serde_json::Value> = jsonl
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["speaker"], "user");
        assert_eq!(lines[0]["userId"], "Ada");
        assert_eq!(lines[1]["speaker"], "bot");
        assert_eq!(lines[1]["text"], "Ada, 9am-5pm");
        assert_eq!(
            lines[1]["sessionId"],
            serde_json::Value::String(log.session_id().to_string())
        );
        assert!(lines[1]["at"].is_string());
    }

    #[test]
    fn test_save_creates_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("transcripts/session.jsonl");

        let mut log = ConversationLog::new("Ada");
        log.record(Speaker::User, "hi");
        log.save(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_shared_log_across_tasks() {
        let shared = SharedConversationLog::new(ConversationLog::new("Ada"));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                tokio::spawn(async move {
                    shared
                        .record_exchange(format!("q{}", i), format!("a{}", i))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let log = shared.snapshot().unwrap();
        assert_eq!(log.len(), 16);

        // Each exchange stays contiguous.
        for pair in log.turns().chunks(2) {
            assert_eq!(pair[0].speaker, Speaker::User);
            assert_eq!(pair[1].speaker, Speaker::Bot);
            assert_eq!(pair[0].text[1..], pair[1].text[1..]);
        }
    }
}
