//! Handlebars-based prompt renderer.

use super::template::{ANALYSIS_TEMPLATE, ANALYSIS_TEMPLATE_NAME};
use super::TemplateError;
use handlebars::{no_escape, Handlebars};
use serde::Serialize;

/// Creates a configured Handlebars registry holding the analysis prompt.
///
/// The registry is configured with:
/// - No HTML escaping (prompts are plain text)
/// - Strict mode (catches missing variables)
///
/// # Errors
///
/// Returns an error if the built-in template fails to compile.
pub fn create_handlebars_registry() -> Result<Handlebars<'static>, TemplateError> {
    let mut hbs = Handlebars::new();

    // Issue text must reach the model verbatim
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_template_string(ANALYSIS_TEMPLATE_NAME, ANALYSIS_TEMPLATE)?;

    Ok(hbs)
}

/// Renders the registered prompt template.
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl PromptRenderer {
    /// Creates a renderer with the built-in template registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in template fails to compile.
    pub fn new() -> Result<Self, TemplateError> {
        Ok(Self {
            handlebars: create_handlebars_registry()?,
        })
    }

    /// Renders the analysis prompt with the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if a template variable is missing.
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String, TemplateError> {
        Ok(self.handlebars.render(ANALYSIS_TEMPLATE_NAME, data)?)
    }
}
