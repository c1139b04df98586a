use handlebars::Handlebars;
use tracing::debug;

use crate::aggregate::ResumeData;
use crate::errors::AppError;
use crate::render::helpers::register_helpers;

/// Handlebars registry with the resume helpers registered. Holds no
/// templates: each request compiles its template inline, so the engine is
/// immutable after construction and shared across requests.
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        register_helpers(&mut registry);
        Self { registry }
    }

    /// Merges the aggregate into template HTML. Compile and render errors
    /// are fatal and keep the underlying message.
    pub fn populate(&self, template_html: &str, data: &ResumeData) -> Result<String, AppError> {
        let html = self
            .registry
            .render_template(template_html, data)
            .map_err(|e| AppError::Render(e.to_string()))?;
        debug!(
            template_bytes = template_html.len(),
            output_bytes = html.len(),
            "Template populated"
        );
        Ok(html)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
