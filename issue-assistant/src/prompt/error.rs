//! Prompt rendering error types.

/// Prompt template error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Handlebars rendering error.
    #[error("Prompt rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    /// Template registration error.
    #[error("Prompt template registration error: {0}")]
    RegistrationError(#[from] handlebars::TemplateError),
}
