//! Template rendering for the bot's messages.

use crate::selector::PhraseSelector;
use crate::types::{ResponseContext, ResponseTemplates};
use handlebars::Handlebars;
use helpdesk_core::{AppError, AppResult};
use serde::Serialize;
use std::sync::Arc;

const GREETING: &str = "greeting";
const GOODBYE: &str = "goodbye";
const ESCALATION: &str = "escalation";
const ANSWER: &str = "answer";
const FALLBACK: &str = "fallback";

/// Renders every message the bot can send.
///
/// Templates are compiled once at construction, so a renderer that was
/// built successfully only fails on pathological helper errors.
#[derive(Debug, Clone)]
pub struct ResponseRenderer {
    handlebars: Handlebars<'static>,
    acknowledgments: Vec<String>,
    selector: Arc<dyn PhraseSelector>,
}

impl ResponseRenderer {
    /// Compile `templates`.
    ///
    /// # Errors
    /// `AppError::Template` if any template has invalid Handlebars syntax.
    pub fn new(templates: ResponseTemplates, selector: Arc<dyn PhraseSelector>) -> AppResult<Self> {
        let mut handlebars = Handlebars::new();

        // Plain text output
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            (GREETING, &templates.greeting),
            (GOODBYE, &templates.goodbye),
            (ESCALATION, &templates.escalation),
            (ANSWER, &templates.answer),
            (FALLBACK, &templates.fallback),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| {
                    AppError::Template(format!("Failed to register template '{}': {}", name, e))
                })?;
        }

        for (i, acknowledgment) in templates.acknowledgments.iter().enumerate() {
            handlebars
                .register_template_string(&acknowledgment_name(i), acknowledgment)
                .map_err(|e| {
                    AppError::Template(format!(
                        "Failed to register acknowledgment {}: {}",
                        i + 1,
                        e
                    ))
                })?;
        }

        Ok(Self {
            handlebars,
            acknowledgments: templates.acknowledgments,
            selector,
        })
    }

    /// Never prefix answers with an acknowledgment.
    pub fn without_acknowledgments(mut self) -> Self {
        self.acknowledgments.clear();
        self
    }

    /// Replace the acknowledgment selection strategy.
    pub fn with_selector(mut self, selector: Arc<dyn PhraseSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn greeting(&self, user_id: &str) -> AppResult<String> {
        self.render(GREETING, &ResponseContext::for_user(user_id))
    }

    pub fn goodbye(&self, user_id: &str) -> AppResult<String> {
        self.render(GOODBYE, &ResponseContext::for_user(user_id))
    }

    pub fn escalation(&self, user_id: &str) -> AppResult<String> {
        self.render(ESCALATION, &ResponseContext::for_user(user_id))
    }

    pub fn fallback(&self, user_id: &str) -> AppResult<String> {
        self.render(FALLBACK, &ResponseContext::for_user(user_id))
    }

    /// Render an answer, opened by an acknowledgment when any are configured.
    pub fn answer(&self, user_id: &str, question: &str, answer: &str) -> AppResult<String> {
        let acknowledgment = self.acknowledgment(user_id)?;

        self.render(
            ANSWER,
            &ResponseContext {
                user_id,
                answer: Some(answer),
                question: Some(question),
                acknowledgment: acknowledgment.as_deref(),
            },
        )
    }

    fn acknowledgment(&self, user_id: &str) -> AppResult<Option<String>> {
        match self.selector.select(self.acknowledgments.len()) {
            Some(i) if i < self.acknowledgments.len() => self
                .render(&acknowledgment_name(i), &ResponseContext::for_user(user_id))
                .map(Some),
            _ => Ok(None),
        }
    }

    fn render<T: Serialize>(&self, name: &str, context: &T) -> AppResult<String> {
        self.handlebars
            .render(name, context)
            .map_err(|e| AppError::Template(format!("Failed to render template '{}': {}", name, e)))
    }
}

fn acknowledgment_name(i: usize) -> String {
    format!("acknowledgment-{}", i)
}
