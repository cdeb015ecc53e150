//! Customer-facing message rendering.
//!
//! This crate provides the bot's wording with:
//! - Built-in default messages, overridable from YAML
//! - Handlebars template rendering
//! - Pluggable acknowledgment phrase selection

pub mod loader;
pub mod renderer;
pub mod selector;
pub mod types;

// Re-export main types
pub use loader::load_templates;
pub use renderer::ResponseRenderer;
pub use selector::{FirstSelector, FixedSelector, PhraseSelector, RandomSelector};
pub use types::{ResponseContext, ResponseTemplates, DEFAULT_USER};

use helpdesk_core::{AppConfig, AppResult};
use std::sync::Arc;

/// Build the renderer described by configuration.
///
/// Uses the template file from `policy.templates` when set, and picks
/// acknowledgments at random unless `policy.acknowledgments` is off.
pub fn renderer_from_config(config: &AppConfig) -> AppResult<ResponseRenderer> {
    let templates = match config.templates_path() {
        Some(path) => load_templates(&path)?,
        None => ResponseTemplates::default(),
    };

    let renderer = ResponseRenderer::new(templates, Arc::new(RandomSelector))?;

    Ok(if config.policy.acknowledgments {
        renderer
    } else {
        renderer.without_acknowledgments()
    })
}
