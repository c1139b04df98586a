pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::render::handlers as render;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Template catalogue
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/templates/:id", get(templates::handle_get_template))
        // Resume data, render, export
        .route("/api/v1/resumes/data", get(render::handle_resume_data))
        .route("/api/v1/resumes/render", post(render::handle_render))
        .route("/api/v1/resumes/preview", get(render::handle_preview))
        .route("/api/v1/resumes/export", post(render::handle_export))
        .with_state(state)
}
