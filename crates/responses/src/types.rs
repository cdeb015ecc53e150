//! Response template types.

use serde::{Deserialize, Serialize};

/// Name used when the caller supplies no user id.
pub const DEFAULT_USER: &str = "Guest";

/// The bot's messages as Handlebars templates.
///
/// Available variables: `user_id` in every template, plus `answer`,
/// `question` and `acknowledgment` in `answer`. Fields missing from a YAML
/// override keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseTemplates {
    /// Opening line of an interactive session
    pub greeting: String,

    /// Closing line of an interactive session
    pub goodbye: String,

    /// Reply to a negative message
    pub escalation: String,

    /// Reply carrying a matched FAQ answer
    pub answer: String,

    /// Reply when no answer can be given
    pub fallback: String,

    /// Phrases that may open an answer
    pub acknowledgments: Vec<String>,
}

impl Default for ResponseTemplates {
    fn default() -> Self {
        Self {
            greeting: "Hello {{user_id}}! How can I assist you today?".to_string(),
            goodbye: "Thank you for using our service, {{user_id}}. Goodbye!".to_string(),
            escalation: "I understand this might be frustrating, {{user_id}}. \
                Let me escalate your request to a human agent."
                .to_string(),
            answer: "{{#if acknowledgment}}{{acknowledgment}}\n\n{{/if}}{{user_id}}, {{answer}}"
                .to_string(),
            fallback: "I'm sorry, {{user_id}}. I don't have an answer for that. \
                Let me connect you with an agent."
                .to_string(),
            acknowledgments: vec![
                "Great question! Let me find the best answer for you...".to_string(),
                "I'm on it! Give me a second...".to_string(),
                "You're asking the right questions! Let me help...".to_string(),
                "Good one! Checking my knowledge base...".to_string(),
            ],
        }
    }
}

/// Variables available to a template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseContext<'a> {
    pub user_id: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgment: Option<&'a str>,
}

impl<'a> ResponseContext<'a> {
    pub fn for_user(user_id: &'a str) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }
}
