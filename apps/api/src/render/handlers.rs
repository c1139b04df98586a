use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{aggregate_user, ResumeData};
use crate::errors::AppError;
use crate::export::ExportFormat;
use crate::render::customize::Customizations;
use crate::render::pipeline::{export_resume, render_resume, RenderJob};
use crate::state::AppState;

/// Identifiers accepted by every render entry point. Both are optional at the
/// wire level so a missing one maps to a validation error, not a 422.
#[derive(Debug, Default, Deserialize)]
pub struct RenderTarget {
    pub user_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
}

impl RenderTarget {
    fn into_job(self, customizations: Customizations) -> Result<RenderJob, AppError> {
        let template_id = self
            .template_id
            .ok_or_else(|| AppError::Validation("template_id is required".to_string()))?;
        let user_id = self
            .user_id
            .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
        Ok(RenderJob {
            user_id,
            template_id,
            customizations,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(flatten)]
    pub target: RenderTarget,
    #[serde(default)]
    pub customizations: Customizations,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub target: RenderTarget,
    #[serde(default)]
    pub customizations: Customizations,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Serialize)]
pub struct RenderResponse {
    pub html: String,
    pub data: ResumeData,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<Uuid>,
}

/// POST /api/v1/resumes/render
pub async fn handle_render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    let job = req.target.into_job(req.customizations)?;
    let rendered = render_resume(&state, job).await?;
    Ok(Json(RenderResponse {
        html: rendered.html,
        data: rendered.data,
    }))
}

/// GET /api/v1/resumes/preview?user_id=&template_id=&color_scheme=&font_family=&layout=
pub async fn handle_preview(
    State(state): State<AppState>,
    Query(target): Query<RenderTarget>,
    Query(customizations): Query<Customizations>,
) -> Result<Html<String>, AppError> {
    let job = target.into_job(customizations)?;
    let rendered = render_resume(&state, job).await?;
    Ok(Html(rendered.html))
}

/// POST /api/v1/resumes/export
pub async fn handle_export(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let job = req.target.into_job(req.customizations)?;
    let document = export_resume(&state, job, req.format).await?;
    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// GET /api/v1/resumes/data
pub async fn handle_resume_data(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeData>, AppError> {
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    Ok(Json(aggregate_user(state.profiles.as_ref(), user_id).await?))
}
