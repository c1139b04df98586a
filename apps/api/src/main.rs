mod aggregate;
mod config;
mod db;
mod errors;
mod export;
mod models;
mod render;
mod routes;
mod state;
mod templates;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::aggregate::PgProfileSource;
use crate::config::Config;
use crate::db::create_pool;
use crate::export::pdf::ChromePdfRenderer;
use crate::render::TemplateEngine;
use crate::routes::build_router;
use crate::state::AppState;
use crate::templates::PgTemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Headless browser pool for PDF export
    let pdf = Arc::new(ChromePdfRenderer::new(
        config.chrome_bin.clone(),
        config.pdf_max_concurrent_renders,
        config.pdf_render_timeout,
    ));
    info!(
        "PDF renderer: {} (max {} concurrent, {}s timeout)",
        config.chrome_bin,
        config.pdf_max_concurrent_renders,
        config.pdf_render_timeout.as_secs()
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine: Arc::new(TemplateEngine::new()),
        profiles: Arc::new(PgProfileSource::new(db.clone())),
        templates: Arc::new(PgTemplateStore::new(db)),
        pdf,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
