use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::template::{TemplateRow, TemplateSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TemplateListQuery {
    pub category: Option<String>,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
    Query(params): Query<TemplateListQuery>,
) -> Result<Json<Vec<TemplateSummary>>, AppError> {
    let category = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    Ok(Json(state.templates.list(category).await?))
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplateRow>, AppError> {
    let template = state
        .templates
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))?;
    Ok(Json(template))
}
