use std::sync::Arc;

use crate::aggregate::ProfileSource;
use crate::config::Config;
use crate::export::pdf::PdfRenderer;
use crate::render::TemplateEngine;
use crate::templates::TemplateStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Storage and the PDF backend sit behind traits so handlers never see a
/// concrete pool or browser.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Immutable after startup; shared by every render.
    pub engine: Arc<TemplateEngine>,
    pub profiles: Arc<dyn ProfileSource>,
    pub templates: Arc<dyn TemplateStore>,
    pub pdf: Arc<dyn PdfRenderer>,
}
